//! Dataset creation wizard (segmentation and indexing step) as a pure state
//! machine.
//!
//! [`reduce`] maps `(state, action)` to a new state without side effects, so
//! every transition is testable without a UI. Request payloads are derived
//! from the state on demand.
//!
//! ```rust
//! use studio_core::wizard::{reduce, WizardAction, WizardContext, WizardState};
//! use studio_core::{DataSourceSelection, SegmentationMode};
//!
//! let state = WizardState::new(WizardContext::create(
//!     DataSourceSelection::Files(vec!["file-1".into()]),
//! ));
//! let state = reduce(state, WizardAction::SetSegmentationMode(SegmentationMode::Custom));
//! let state = reduce(state, WizardAction::SetSeparator("|".into()));
//!
//! let rule = state.process_rule();
//! assert_eq!(rule.rules().unwrap().segmentation.separator, "|");
//! ```

use tracing::debug;

use crate::defaults;
use crate::indexing::{
    build_create_request, build_estimate_request, build_reconfigure_request,
    default_indexing_technique, CreateDocumentRequest, DataSourceSelection, DocForm,
    DocumentDetail, IndexingEstimateRequest, IndexingRequest, IndexingTechnique,
    ReconfigureDocumentRequest,
};
use crate::process_rule::{
    build_process_rule, ProcessRule, Rules, SegmentationMode,
    SegmentationSettings,
};

/// Inputs the wizard step is opened with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardContext {
    /// Source picked in the previous step.
    pub data_source: DataSourceSelection,
    /// Document being reconfigured, if this is a settings pass.
    pub document: Option<DocumentDetail>,
    /// Dataset the documents go into. `None` creates a new dataset.
    pub dataset_id: Option<String>,
    /// Technique the dataset already uses.
    pub fixed_technique: Option<IndexingTechnique>,
    /// Whether an embedding provider key is configured.
    pub has_api_key: bool,
    /// UI locale, e.g. `en-US` or `zh-Hans`.
    pub locale: String,
}

impl WizardContext {
    /// Context for creating documents in a new dataset.
    pub fn create(data_source: DataSourceSelection) -> Self {
        Self {
            data_source,
            document: None,
            dataset_id: None,
            fixed_technique: None,
            has_api_key: false,
            locale: "en".to_string(),
        }
    }
}

/// Document language for a UI locale.
pub fn language_for_locale(locale: &str) -> &'static str {
    if locale == "en" || locale.starts_with("en-") || locale.starts_with("en_") {
        defaults::DOC_LANGUAGE_EN
    } else {
        defaults::DOC_LANGUAGE_ZH
    }
}

/// Wizard state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    pub data_source: DataSourceSelection,
    pub document_id: Option<String>,
    pub dataset_id: Option<String>,
    pub segmentation_mode: SegmentationMode,
    pub segmentation: SegmentationSettings,
    /// Rules the reset action restores.
    pub default_rules: Option<Rules>,
    pub fixed_technique: Option<IndexingTechnique>,
    pub selected_technique: IndexingTechnique,
    pub has_api_key: bool,
    pub doc_form: DocForm,
    pub doc_language: String,
}

/// State transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardAction {
    SetSegmentationMode(SegmentationMode),
    /// Separator in display form (`\n` for newline).
    SetSeparator(String),
    SetMaxTokens(u32),
    /// Flip the pre-processing rule with this id.
    ToggleRule(String),
    /// Default rules arrived from the backend; they become current and
    /// reset target.
    LoadDefaultRules(Rules),
    /// Restore the last loaded default rules.
    ResetRules,
    /// Ignored when the dataset already fixes a technique. High quality is
    /// also ignored while no embedding key is configured.
    SetIndexingTechnique(IndexingTechnique),
    SetDocForm(DocForm),
    SetDocLanguage(String),
    SetApiKeyConfigured(bool),
}

impl WizardState {
    pub fn new(context: WizardContext) -> Self {
        let selected_technique = context
            .fixed_technique
            .unwrap_or_else(|| default_indexing_technique(context.has_api_key));

        let mut state = Self {
            data_source: context.data_source,
            document_id: None,
            dataset_id: context.dataset_id,
            segmentation_mode: SegmentationMode::Automatic,
            segmentation: SegmentationSettings::default(),
            default_rules: None,
            fixed_technique: context.fixed_technique,
            selected_technique,
            has_api_key: context.has_api_key,
            doc_form: DocForm::Text,
            doc_language: language_for_locale(&context.locale).to_string(),
        };

        if let Some(document) = context.document {
            state.document_id = Some(document.id);
            state.segmentation_mode = document.dataset_process_rule.mode();
            if state.dataset_id.is_some() {
                state.doc_form = document.doc_form;
            }
            if let Some(rules) = document.dataset_process_rule.rules() {
                state.segmentation = SegmentationSettings::from_rules(rules);
                state.default_rules = Some(rules.clone());
            }
        }

        state.enforce_doc_form();
        state
    }

    /// Whether this pass reconfigures an existing document.
    pub fn is_reconfiguration(&self) -> bool {
        self.document_id.is_some()
    }

    /// Effective indexing technique.
    pub fn indexing_technique(&self) -> IndexingTechnique {
        self.fixed_technique.unwrap_or(self.selected_technique)
    }

    pub fn process_rule(&self) -> ProcessRule {
        build_process_rule(self.segmentation_mode, Some(&self.segmentation))
    }

    /// Creation payload for the current source selection.
    pub fn creation_request(&self) -> CreateDocumentRequest {
        build_create_request(
            &self.data_source,
            self.indexing_technique(),
            self.process_rule(),
            self.doc_form,
            self.doc_language.clone(),
        )
    }

    /// Reconfiguration payload, when a document is being reconfigured.
    pub fn reconfiguration_request(&self) -> Option<ReconfigureDocumentRequest> {
        self.document_id.as_ref().map(|id| {
            build_reconfigure_request(
                id.clone(),
                self.process_rule(),
                self.doc_form,
                self.doc_language.clone(),
            )
        })
    }

    /// Submission payload for this pass.
    pub fn indexing_request(&self) -> IndexingRequest {
        match self.reconfiguration_request() {
            Some(request) => IndexingRequest::Reconfigure(request),
            None => IndexingRequest::Create(self.creation_request()),
        }
    }

    /// Estimate payload for previewing with `doc_form`.
    pub fn estimate_request(&self, doc_form: DocForm) -> IndexingEstimateRequest {
        build_estimate_request(
            &self.data_source,
            self.indexing_technique(),
            self.process_rule(),
            doc_form,
            self.doc_language.clone(),
            self.dataset_id.clone(),
        )
    }

    /// QA documents need embedding-based indexing.
    fn enforce_doc_form(&mut self) {
        if self.indexing_technique() == IndexingTechnique::Economy && self.doc_form == DocForm::Qa {
            debug!("economy indexing does not support QA form, falling back to text");
            self.doc_form = DocForm::Text;
        }
    }

    fn load_rules(&mut self, rules: &Rules) {
        self.segmentation = SegmentationSettings::from_rules(rules);
    }
}

/// Apply `action` to `state`.
pub fn reduce(mut state: WizardState, action: WizardAction) -> WizardState {
    match action {
        WizardAction::SetSegmentationMode(mode) => state.segmentation_mode = mode,
        WizardAction::SetSeparator(separator) => state.segmentation.separator = separator,
        WizardAction::SetMaxTokens(max_tokens) => state.segmentation.max_tokens = max_tokens,
        WizardAction::ToggleRule(id) => {
            for rule in state
                .segmentation
                .pre_processing_rules
                .iter_mut()
                .filter(|r| r.id == id)
            {
                rule.enabled = !rule.enabled;
            }
        }
        WizardAction::LoadDefaultRules(rules) => {
            state.load_rules(&rules);
            state.default_rules = Some(rules);
        }
        WizardAction::ResetRules => {
            if let Some(rules) = state.default_rules.clone() {
                state.load_rules(&rules);
            }
        }
        WizardAction::SetIndexingTechnique(technique) => {
            if state.fixed_technique.is_some() {
                debug!(
                    technique = technique.as_str(),
                    "indexing technique fixed by dataset, ignoring selection"
                );
            } else if technique == IndexingTechnique::HighQuality && !state.has_api_key {
                debug!("no embedding key configured, ignoring high quality selection");
            } else {
                state.selected_technique = technique;
            }
        }
        WizardAction::SetDocForm(form) => state.doc_form = form,
        WizardAction::SetDocLanguage(language) => state.doc_language = language,
        WizardAction::SetApiKeyConfigured(configured) => {
            state.has_api_key = configured;
            if state.fixed_technique.is_none() {
                state.selected_technique = default_indexing_technique(configured);
            }
        }
    }
    state.enforce_doc_form();
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process_rule::{PreProcessingRule, Segmentation};

    fn files() -> DataSourceSelection {
        DataSourceSelection::Files(vec!["f1".into()])
    }

    fn default_rules() -> Rules {
        Rules {
            pre_processing_rules: vec![
                PreProcessingRule::new("remove_extra_spaces", true),
                PreProcessingRule::new("remove_urls_emails", false),
            ],
            segmentation: Segmentation {
                separator: "\n".to_string(),
                max_tokens: 1000,
            },
        }
    }

    fn state() -> WizardState {
        WizardState::new(WizardContext::create(files()))
    }

    #[test]
    fn test_initial_defaults() {
        let state = state();
        assert_eq!(state.segmentation_mode, SegmentationMode::Automatic);
        assert_eq!(state.segmentation.separator, "\\n");
        assert_eq!(state.segmentation.max_tokens, 1000);
        assert_eq!(state.indexing_technique(), IndexingTechnique::Economy);
        assert_eq!(state.doc_form, DocForm::Text);
        assert_eq!(state.doc_language, "English");
        assert!(!state.is_reconfiguration());
    }

    #[test]
    fn test_api_key_selects_high_quality() {
        let mut ctx = WizardContext::create(files());
        ctx.has_api_key = true;
        assert_eq!(
            WizardState::new(ctx).indexing_technique(),
            IndexingTechnique::HighQuality
        );
    }

    #[test]
    fn test_fixed_technique_survives_api_key() {
        let mut ctx = WizardContext::create(files());
        ctx.has_api_key = true;
        ctx.fixed_technique = Some(IndexingTechnique::Economy);
        let state = WizardState::new(ctx);
        assert_eq!(state.indexing_technique(), IndexingTechnique::Economy);

        let state = reduce(state, WizardAction::SetApiKeyConfigured(true));
        let state = reduce(
            state,
            WizardAction::SetIndexingTechnique(IndexingTechnique::HighQuality),
        );
        assert_eq!(state.indexing_technique(), IndexingTechnique::Economy);
    }

    #[test]
    fn test_api_key_change_rederives_default() {
        let state = reduce(state(), WizardAction::SetApiKeyConfigured(true));
        assert_eq!(state.indexing_technique(), IndexingTechnique::HighQuality);
    }

    #[test]
    fn test_language_for_locale() {
        assert_eq!(language_for_locale("en"), "English");
        assert_eq!(language_for_locale("en-US"), "English");
        assert_eq!(language_for_locale("zh-Hans"), "Chinese");
    }

    #[test]
    fn test_load_and_reset_rules() {
        let state = reduce(state(), WizardAction::LoadDefaultRules(default_rules()));
        assert_eq!(state.segmentation.separator, "\\n");
        assert_eq!(state.segmentation.pre_processing_rules.len(), 2);

        let state = reduce(state, WizardAction::SetSeparator("###".into()));
        let state = reduce(state, WizardAction::SetMaxTokens(200));
        let state = reduce(state, WizardAction::ToggleRule("remove_urls_emails".into()));
        assert!(state.segmentation.pre_processing_rules[1].enabled);

        let state = reduce(state, WizardAction::ResetRules);
        assert_eq!(state.segmentation.separator, "\\n");
        assert_eq!(state.segmentation.max_tokens, 1000);
        assert!(!state.segmentation.pre_processing_rules[1].enabled);
    }

    #[test]
    fn test_reset_without_defaults_is_noop() {
        let before = reduce(state(), WizardAction::SetSeparator("|".into()));
        let after = reduce(before.clone(), WizardAction::ResetRules);
        assert_eq!(before, after);
    }

    #[test]
    fn test_toggle_unknown_rule_is_noop() {
        let before = reduce(state(), WizardAction::LoadDefaultRules(default_rules()));
        let after = reduce(before.clone(), WizardAction::ToggleRule("nope".into()));
        assert_eq!(before, after);
    }

    #[test]
    fn test_high_quality_requires_api_key() {
        let state = reduce(
            state(),
            WizardAction::SetIndexingTechnique(IndexingTechnique::HighQuality),
        );
        assert_eq!(state.indexing_technique(), IndexingTechnique::Economy);
        assert_eq!(
            state.creation_request().indexing_technique,
            IndexingTechnique::Economy
        );

        let state = reduce(state, WizardAction::SetApiKeyConfigured(true));
        let state = reduce(
            state,
            WizardAction::SetIndexingTechnique(IndexingTechnique::Economy),
        );
        let state = reduce(
            state,
            WizardAction::SetIndexingTechnique(IndexingTechnique::HighQuality),
        );
        assert_eq!(state.indexing_technique(), IndexingTechnique::HighQuality);
    }

    #[test]
    fn test_qa_refused_under_economy() {
        let state = reduce(state(), WizardAction::SetDocForm(DocForm::Qa));
        assert_eq!(state.doc_form, DocForm::Text);

        let state = reduce(state, WizardAction::SetApiKeyConfigured(true));
        let state = reduce(
            state,
            WizardAction::SetIndexingTechnique(IndexingTechnique::Economy),
        );
        let state = reduce(state, WizardAction::SetDocForm(DocForm::Qa));
        assert_eq!(state.doc_form, DocForm::Text);

        let state = reduce(
            state,
            WizardAction::SetIndexingTechnique(IndexingTechnique::HighQuality),
        );
        let state = reduce(state, WizardAction::SetDocForm(DocForm::Qa));
        assert_eq!(state.doc_form, DocForm::Qa);

        let state = reduce(
            state,
            WizardAction::SetIndexingTechnique(IndexingTechnique::Economy),
        );
        assert_eq!(state.doc_form, DocForm::Text);
    }

    #[test]
    fn test_custom_process_rule_from_state() {
        let state = reduce(state(), WizardAction::LoadDefaultRules(default_rules()));
        let state = reduce(state, WizardAction::SetSegmentationMode(SegmentationMode::Custom));
        let rule = state.process_rule();
        assert_eq!(rule.mode(), SegmentationMode::Custom);
        assert_eq!(rule.rules().unwrap().segmentation.separator, "\n");
    }

    #[test]
    fn test_reconfiguration_context() {
        let document = DocumentDetail {
            id: "doc-9".into(),
            doc_form: DocForm::Qa,
            dataset_process_rule: ProcessRule::Custom(Rules {
                pre_processing_rules: vec![],
                segmentation: Segmentation {
                    separator: "##".into(),
                    max_tokens: 640,
                },
            }),
        };
        let ctx = WizardContext {
            data_source: files(),
            document: Some(document),
            dataset_id: Some("ds-1".into()),
            fixed_technique: Some(IndexingTechnique::HighQuality),
            has_api_key: true,
            locale: "zh-Hans".into(),
        };
        let state = WizardState::new(ctx);
        assert!(state.is_reconfiguration());
        assert_eq!(state.segmentation_mode, SegmentationMode::Custom);
        assert_eq!(state.segmentation.separator, "##");
        assert_eq!(state.doc_form, DocForm::Qa);
        assert_eq!(state.doc_language, "Chinese");

        match state.indexing_request() {
            IndexingRequest::Reconfigure(req) => {
                assert_eq!(req.original_document_id, "doc-9");
                assert_eq!(req.process_rule.rules().unwrap().segmentation.max_tokens, 640);
            }
            other => panic!("expected reconfiguration, got {:?}", other),
        }
    }

    #[test]
    fn test_estimate_carries_dataset_id() {
        let mut ctx = WizardContext::create(files());
        ctx.dataset_id = Some("ds-2".into());
        let request = WizardState::new(ctx).estimate_request(DocForm::Text);
        assert_eq!(request.dataset_id.as_deref(), Some("ds-2"));
    }
}
