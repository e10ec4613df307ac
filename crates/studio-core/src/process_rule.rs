//! Document segmentation rules sent with every indexing request.
//!
//! The wire shape is always `{"mode": ..., "rules": {...}}`. Automatic mode
//! sends an empty `rules` object and lets the backend apply its defaults.

use serde::{Deserialize, Serialize, Serializer};

use crate::defaults;

/// How documents are split into segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SegmentationMode {
    #[default]
    Automatic,
    Custom,
}

/// A toggleable cleanup step applied before segmentation,
/// e.g. `remove_extra_spaces` or `remove_urls_emails`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreProcessingRule {
    pub id: String,
    pub enabled: bool,
}

impl PreProcessingRule {
    pub fn new(id: impl Into<String>, enabled: bool) -> Self {
        Self {
            id: id.into(),
            enabled,
        }
    }
}

/// Separator and size limit for custom segmentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmentation {
    /// Separator as transmitted (a real newline, never the `\n` display token).
    pub separator: String,
    pub max_tokens: u32,
}

impl Default for Segmentation {
    fn default() -> Self {
        Self {
            separator: defaults::SEPARATOR.to_string(),
            max_tokens: defaults::MAX_TOKENS,
        }
    }
}

/// Full custom rule set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rules {
    #[serde(default)]
    pub pre_processing_rules: Vec<PreProcessingRule>,
    #[serde(default)]
    pub segmentation: Segmentation,
}

/// Process rule attached to indexing requests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ProcessRuleWire")]
pub enum ProcessRule {
    /// Backend-chosen defaults.
    Automatic,
    /// Caller-provided rules.
    Custom(Rules),
}

impl ProcessRule {
    pub fn mode(&self) -> SegmentationMode {
        match self {
            ProcessRule::Automatic => SegmentationMode::Automatic,
            ProcessRule::Custom(_) => SegmentationMode::Custom,
        }
    }

    /// Custom rules, if any.
    pub fn rules(&self) -> Option<&Rules> {
        match self {
            ProcessRule::Automatic => None,
            ProcessRule::Custom(rules) => Some(rules),
        }
    }
}

#[derive(Serialize)]
struct EmptyRules {}

#[derive(Serialize)]
#[serde(untagged)]
enum RulesRef<'a> {
    Empty(EmptyRules),
    Custom(&'a Rules),
}

#[derive(Serialize)]
struct ProcessRuleRef<'a> {
    rules: RulesRef<'a>,
    mode: SegmentationMode,
}

impl Serialize for ProcessRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rules = match self {
            ProcessRule::Automatic => RulesRef::Empty(EmptyRules {}),
            ProcessRule::Custom(rules) => RulesRef::Custom(rules),
        };
        ProcessRuleRef {
            rules,
            mode: self.mode(),
        }
        .serialize(serializer)
    }
}

#[derive(Deserialize)]
struct ProcessRuleWire {
    mode: SegmentationMode,
    #[serde(default)]
    rules: Option<Rules>,
}

impl From<ProcessRuleWire> for ProcessRule {
    fn from(wire: ProcessRuleWire) -> Self {
        match wire.mode {
            SegmentationMode::Automatic => ProcessRule::Automatic,
            SegmentationMode::Custom => ProcessRule::Custom(wire.rules.unwrap_or_default()),
        }
    }
}

/// Segmentation settings as edited by the user. The separator is kept in
/// display form, so a newline shows up as the two characters `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationSettings {
    pub pre_processing_rules: Vec<PreProcessingRule>,
    pub separator: String,
    pub max_tokens: u32,
}

impl Default for SegmentationSettings {
    fn default() -> Self {
        Self {
            pre_processing_rules: Vec::new(),
            separator: defaults::SEPARATOR_DISPLAY.to_string(),
            max_tokens: defaults::MAX_TOKENS,
        }
    }
}

impl SegmentationSettings {
    /// Settings for editing an existing rule set.
    pub fn from_rules(rules: &Rules) -> Self {
        Self {
            pre_processing_rules: rules.pre_processing_rules.clone(),
            separator: display_separator(&rules.segmentation.separator),
            max_tokens: rules.segmentation.max_tokens,
        }
    }

    /// Rules ready for transmission.
    pub fn to_rules(&self) -> Rules {
        Rules {
            pre_processing_rules: self.pre_processing_rules.clone(),
            segmentation: Segmentation {
                separator: normalize_separator(&self.separator),
                max_tokens: self.max_tokens,
            },
        }
    }
}

/// Translate a display separator into the separator sent to the backend.
/// The `\n` display token and an empty separator both mean newline.
pub fn normalize_separator(display: &str) -> String {
    if display.is_empty() || display == defaults::SEPARATOR_DISPLAY {
        defaults::SEPARATOR.to_string()
    } else {
        display.to_string()
    }
}

/// Inverse of [`normalize_separator`] for showing a stored separator.
pub fn display_separator(separator: &str) -> String {
    if separator.is_empty() || separator == defaults::SEPARATOR {
        defaults::SEPARATOR_DISPLAY.to_string()
    } else {
        separator.to_string()
    }
}

/// Build the process rule for `mode`. Custom mode without settings uses the
/// default separator and token limit with no pre-processing rules.
pub fn build_process_rule(
    mode: SegmentationMode,
    settings: Option<&SegmentationSettings>,
) -> ProcessRule {
    match mode {
        SegmentationMode::Automatic => ProcessRule::Automatic,
        SegmentationMode::Custom => ProcessRule::Custom(
            settings
                .map(SegmentationSettings::to_rules)
                .unwrap_or_else(|| SegmentationSettings::default().to_rules()),
        ),
    }
}
