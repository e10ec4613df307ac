//! Prompt variable and input value types shared by the debug panel and the
//! template renderer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Input control a prompt variable is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    /// Single-line text input.
    #[default]
    String,
    /// Multi-line text area.
    Paragraph,
    /// Choice among a fixed list of options.
    Select,
}

impl VariableType {
    /// Get the string representation.
    pub fn as_str(&self) -> &str {
        match self {
            VariableType::String => "string",
            VariableType::Paragraph => "paragraph",
            VariableType::Select => "select",
        }
    }

    /// Whether the variable carries a maximum value length.
    pub fn is_text(&self) -> bool {
        matches!(self, VariableType::String | VariableType::Paragraph)
    }
}

/// Variables and form fields are required unless marked otherwise.
pub(crate) fn default_required() -> bool {
    true
}

/// A variable declared by a prompt template and filled in by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptVariable {
    /// Identifier referenced as `{{key}}` in templates.
    pub key: String,
    /// Display label.
    pub name: String,
    #[serde(rename = "type", default)]
    pub var_type: VariableType,
    #[serde(default = "default_required")]
    pub required: bool,
    /// Maximum value length (string/paragraph only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// Ordered options (select only).
    #[serde(default)]
    pub options: Vec<String>,
}

impl PromptVariable {
    /// Create a required single-line variable.
    pub fn string(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            var_type: VariableType::String,
            required: true,
            max_length: None,
            options: Vec::new(),
        }
    }

    /// Create a required multi-line variable.
    pub fn paragraph(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            var_type: VariableType::Paragraph,
            ..Self::string(key, name)
        }
    }

    /// Create a required select variable with the given options.
    pub fn select(key: impl Into<String>, name: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            var_type: VariableType::Select,
            options,
            ..Self::string(key, name)
        }
    }

    /// A variable takes part in rendering and input handling only when both
    /// its key and its name are non-blank.
    pub fn is_valid(&self) -> bool {
        !self.key.trim().is_empty() && !self.name.trim().is_empty()
    }

    /// Maximum accepted value length, falling back to the console default.
    pub fn effective_max_length(&self) -> u32 {
        match self.max_length {
            Some(len) if len > 0 => len,
            _ => crate::defaults::VALUE_MAX_LEN,
        }
    }
}

/// Returns only the variables that pass [`PromptVariable::is_valid`],
/// preserving declaration order.
pub fn valid_variables(variables: &[PromptVariable]) -> Vec<&PromptVariable> {
    variables.iter().filter(|v| v.is_valid()).collect()
}

/// Kind of application being configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    Chat,
    Completion,
}

/// Current values typed into the prompt variable inputs, keyed by variable key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputValues(BTreeMap<String, String>);

impl InputValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `key`, if one was ever written.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Value for `key` only when it counts as set. Empty strings do not.
    pub fn value_for(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Write `value` for `key` when `key` belongs to a valid declared
    /// variable. Returns whether the value was stored.
    pub fn set(&mut self, variables: &[PromptVariable], key: &str, value: impl Into<String>) -> bool {
        if !variables.iter().any(|v| v.is_valid() && v.key == key) {
            tracing::trace!(key, "ignoring input for undeclared variable");
            return false;
        }
        self.0.insert(key.to_string(), value.into());
        true
    }

    /// Fresh values with every valid declared key mapped to an empty string.
    pub fn cleared(variables: &[PromptVariable]) -> Self {
        Self(
            variables
                .iter()
                .filter(|v| v.is_valid())
                .map(|v| (v.key.clone(), String::new()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InputValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Completion apps need a non-blank template before they can run; chat apps
/// can always run.
pub fn can_run(mode: AppMode, template: &str) -> bool {
    match mode {
        AppMode::Chat => true,
        AppMode::Completion => !template.trim().is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> Vec<PromptVariable> {
        vec![
            PromptVariable::string("name", "Name"),
            PromptVariable::paragraph("bio", "Biography"),
            PromptVariable::string("  ", "Blank key"),
        ]
    }

    #[test]
    fn test_is_valid_requires_key_and_name() {
        assert!(PromptVariable::string("a", "A").is_valid());
        assert!(!PromptVariable::string(" ", "A").is_valid());
        assert!(!PromptVariable::string("a", "\t").is_valid());
    }

    #[test]
    fn test_valid_variables_preserves_order() {
        let vars = vars();
        let keys: Vec<_> = valid_variables(&vars).iter().map(|v| v.key.as_str()).collect();
        assert_eq!(keys, vec!["name", "bio"]);
    }

    #[test]
    fn test_set_ignores_undeclared_keys() {
        let vars = vars();
        let mut inputs = InputValues::new();
        assert!(inputs.set(&vars, "name", "Ada"));
        assert!(!inputs.set(&vars, "unknown", "x"));
        assert!(!inputs.set(&vars, "  ", "x"));
        assert_eq!(inputs.get("name"), Some("Ada"));
        assert_eq!(inputs.len(), 1);
    }

    #[test]
    fn test_value_for_treats_empty_as_unset() {
        let inputs: InputValues = [("a", ""), ("b", "0")].into_iter().collect();
        assert_eq!(inputs.value_for("a"), None);
        assert_eq!(inputs.value_for("b"), Some("0"));
        assert_eq!(inputs.value_for("c"), None);
    }

    #[test]
    fn test_cleared_maps_every_valid_key_to_empty() {
        let inputs = InputValues::cleared(&vars());
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs.get("name"), Some(""));
        assert_eq!(inputs.get("bio"), Some(""));
    }

    #[test]
    fn test_effective_max_length() {
        let mut var = PromptVariable::string("a", "A");
        assert_eq!(var.effective_max_length(), crate::defaults::VALUE_MAX_LEN);
        var.max_length = Some(0);
        assert_eq!(var.effective_max_length(), crate::defaults::VALUE_MAX_LEN);
        var.max_length = Some(200);
        assert_eq!(var.effective_max_length(), 200);
    }

    #[test]
    fn test_can_run() {
        assert!(can_run(AppMode::Chat, ""));
        assert!(!can_run(AppMode::Completion, "   "));
        assert!(can_run(AppMode::Completion, "Hello {{name}}"));
    }

    #[test]
    fn test_missing_required_defaults_to_true() {
        let var: PromptVariable =
            serde_json::from_value(serde_json::json!({"key": "name", "name": "Name", "type": "string"}))
                .unwrap();
        assert!(var.required);

        let var: PromptVariable = serde_json::from_value(
            serde_json::json!({"key": "name", "name": "Name", "required": false}),
        )
        .unwrap();
        assert!(!var.required);
    }

    #[test]
    fn test_prompt_variable_json_shape() {
        let var = PromptVariable::select("tone", "Tone", vec!["formal".into(), "casual".into()]);
        let json = serde_json::to_value(&var).unwrap();
        assert_eq!(json["type"], "select");
        assert_eq!(json["options"][1], "casual");
        assert!(json.get("max_length").is_none());
    }
}
