//! Dataset indexing request construction.
//!
//! Three payloads go to the dataset endpoints, each with its own type so an
//! invalid combination of fields cannot be built:
//!
//! - [`CreateDocumentRequest`]: new documents from uploaded files or Notion pages
//! - [`ReconfigureDocumentRequest`]: re-segment an existing document
//! - [`IndexingEstimateRequest`]: cost/segment preview before committing
//!
//! Building never fails. Optional inputs that are absent are simply omitted.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::process_rule::ProcessRule;

/// Backend strategy used to index a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexingTechnique {
    /// Embedding-based.
    HighQuality,
    /// Keyword-based.
    Economy,
}

impl IndexingTechnique {
    pub fn as_str(&self) -> &str {
        match self {
            IndexingTechnique::HighQuality => "high_quality",
            IndexingTechnique::Economy => "economy",
        }
    }
}

/// Shape stored per segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DocForm {
    /// Raw paragraphs.
    #[default]
    #[serde(rename = "text", alias = "text_model")]
    Text,
    /// Generated question/answer pairs.
    #[serde(rename = "qa", alias = "qa_model")]
    Qa,
}

/// Where document content comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataSourceType {
    #[serde(rename = "upload_file")]
    File,
    #[serde(rename = "notion_import")]
    Notion,
}

/// Icon attached to a Notion page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotionPageIcon {
    #[serde(rename = "type")]
    pub icon_type: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
}

/// A Notion page picked in the data source step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotionPage {
    pub page_id: String,
    pub page_name: String,
    #[serde(default)]
    pub page_icon: Option<NotionPageIcon>,
    #[serde(rename = "type")]
    pub page_type: String,
    pub workspace_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Page entry inside a [`NotionInfo`] group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotionPageInfo {
    pub page_id: String,
    pub page_name: String,
    pub page_icon: Option<NotionPageIcon>,
    #[serde(rename = "type")]
    pub page_type: String,
}

impl From<&NotionPage> for NotionPageInfo {
    fn from(page: &NotionPage) -> Self {
        Self {
            page_id: page.page_id.clone(),
            page_name: page.page_name.clone(),
            page_icon: page.page_icon.clone(),
            page_type: page.page_type.clone(),
        }
    }
}

/// Pages of a single Notion workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotionInfo {
    pub workspace_id: String,
    pub pages: Vec<NotionPageInfo>,
}

/// Group selected pages by workspace. Workspaces appear in order of first
/// occurrence and pages keep their relative order within a workspace.
pub fn group_notion_pages(pages: &[NotionPage]) -> Vec<NotionInfo> {
    let mut groups: Vec<NotionInfo> = Vec::new();
    for page in pages {
        match groups.iter_mut().find(|g| g.workspace_id == page.workspace_id) {
            Some(group) => group.pages.push(page.into()),
            None => groups.push(NotionInfo {
                workspace_id: page.workspace_id.clone(),
                pages: vec![page.into()],
            }),
        }
    }
    groups
}

/// Uploaded file ids, in upload order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfoList {
    pub file_ids: Vec<String>,
}

/// Source selection collected by the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceSelection {
    /// Ids of uploaded files.
    Files(Vec<String>),
    /// Selected Notion pages, flat and in selection order.
    NotionPages(Vec<NotionPage>),
}

impl DataSourceSelection {
    pub fn source_type(&self) -> DataSourceType {
        match self {
            DataSourceSelection::Files(_) => DataSourceType::File,
            DataSourceSelection::NotionPages(_) => DataSourceType::Notion,
        }
    }

    /// The wire `info_list` for this selection.
    pub fn info_list(&self) -> InfoList {
        match self {
            DataSourceSelection::Files(ids) => InfoList::File {
                file_info_list: FileInfoList {
                    file_ids: ids.clone(),
                },
            },
            DataSourceSelection::NotionPages(pages) => InfoList::Notion {
                notion_info_list: group_notion_pages(pages),
            },
        }
    }
}

/// Polymorphic source descriptor. Exactly one of `file_info_list` and
/// `notion_info_list` appears, next to the matching `data_source_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "data_source_type")]
pub enum InfoList {
    #[serde(rename = "upload_file")]
    File { file_info_list: FileInfoList },
    #[serde(rename = "notion_import")]
    Notion { notion_info_list: Vec<NotionInfo> },
}

impl InfoList {
    pub fn source_type(&self) -> DataSourceType {
        match self {
            InfoList::File { .. } => DataSourceType::File,
            InfoList::Notion { .. } => DataSourceType::Notion,
        }
    }
}

/// `data_source` object of a creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    #[serde(rename = "type")]
    pub source_type: DataSourceType,
    pub info_list: InfoList,
}

impl From<InfoList> for DataSource {
    fn from(info_list: InfoList) -> Self {
        Self {
            source_type: info_list.source_type(),
            info_list,
        }
    }
}

/// Create new documents in a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    pub data_source: DataSource,
    pub indexing_technique: IndexingTechnique,
    pub process_rule: ProcessRule,
    pub doc_form: DocForm,
    pub doc_language: String,
}

/// Re-segment an existing document. Source and technique are reused by the
/// backend, so neither is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconfigureDocumentRequest {
    pub original_document_id: String,
    pub doc_form: DocForm,
    pub doc_language: String,
    pub process_rule: ProcessRule,
}

/// Ask for a segment/cost preview before committing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexingEstimateRequest {
    pub info_list: InfoList,
    pub indexing_technique: IndexingTechnique,
    pub process_rule: ProcessRule,
    pub doc_form: DocForm,
    pub doc_language: String,
    pub dataset_id: Option<String>,
}

/// Body for the document submission endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum IndexingRequest {
    Create(CreateDocumentRequest),
    Reconfigure(ReconfigureDocumentRequest),
}

impl IndexingRequest {
    pub fn is_reconfiguration(&self) -> bool {
        matches!(self, IndexingRequest::Reconfigure(_))
    }
}

/// Technique the wizard selects before the user touches it.
pub fn default_indexing_technique(has_api_key: bool) -> IndexingTechnique {
    if has_api_key {
        IndexingTechnique::HighQuality
    } else {
        IndexingTechnique::Economy
    }
}

/// Effective technique: a caller-fixed technique wins unconditionally, then
/// the local selection, then the default for `has_api_key`.
pub fn resolve_indexing_technique(
    fixed: Option<IndexingTechnique>,
    selected: Option<IndexingTechnique>,
    has_api_key: bool,
) -> IndexingTechnique {
    fixed
        .or(selected)
        .unwrap_or_else(|| default_indexing_technique(has_api_key))
}

/// What a submission does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexingOperation {
    /// Create documents from a new source selection.
    Create(DataSourceSelection),
    /// Reconfigure the document with this id.
    Reconfigure { document_id: String },
}

/// Everything needed to build an indexing payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexingContext {
    pub operation: IndexingOperation,
    /// Technique the dataset already uses, if any.
    pub fixed_technique: Option<IndexingTechnique>,
    /// Technique picked in the wizard.
    pub selected_technique: Option<IndexingTechnique>,
    pub has_api_key: bool,
    pub process_rule: ProcessRule,
    pub doc_form: DocForm,
    pub doc_language: String,
}

impl IndexingContext {
    pub fn indexing_technique(&self) -> IndexingTechnique {
        resolve_indexing_technique(
            self.fixed_technique,
            self.selected_technique,
            self.has_api_key,
        )
    }
}

/// Build a creation request.
pub fn build_create_request(
    source: &DataSourceSelection,
    indexing_technique: IndexingTechnique,
    process_rule: ProcessRule,
    doc_form: DocForm,
    doc_language: impl Into<String>,
) -> CreateDocumentRequest {
    CreateDocumentRequest {
        data_source: source.info_list().into(),
        indexing_technique,
        process_rule,
        doc_form,
        doc_language: doc_language.into(),
    }
}

/// Build a reconfiguration request.
pub fn build_reconfigure_request(
    document_id: impl Into<String>,
    process_rule: ProcessRule,
    doc_form: DocForm,
    doc_language: impl Into<String>,
) -> ReconfigureDocumentRequest {
    ReconfigureDocumentRequest {
        original_document_id: document_id.into(),
        doc_form,
        doc_language: doc_language.into(),
        process_rule,
    }
}

/// Build an estimate request.
pub fn build_estimate_request(
    source: &DataSourceSelection,
    indexing_technique: IndexingTechnique,
    process_rule: ProcessRule,
    doc_form: DocForm,
    doc_language: impl Into<String>,
    dataset_id: Option<String>,
) -> IndexingEstimateRequest {
    IndexingEstimateRequest {
        info_list: source.info_list(),
        indexing_technique,
        process_rule,
        doc_form,
        doc_language: doc_language.into(),
        dataset_id,
    }
}

/// Build the submission payload for `context`, branching on the operation.
pub fn build_indexing_request(context: &IndexingContext) -> IndexingRequest {
    match &context.operation {
        IndexingOperation::Reconfigure { document_id } => {
            debug!(document_id = %document_id, "building reconfiguration request");
            IndexingRequest::Reconfigure(build_reconfigure_request(
                document_id.clone(),
                context.process_rule.clone(),
                context.doc_form,
                context.doc_language.clone(),
            ))
        }
        IndexingOperation::Create(source) => {
            let technique = context.indexing_technique();
            debug!(
                source_type = ?source.source_type(),
                technique = technique.as_str(),
                "building creation request"
            );
            IndexingRequest::Create(build_create_request(
                source,
                technique,
                context.process_rule.clone(),
                context.doc_form,
                context.doc_language.clone(),
            ))
        }
    }
}

// ─── Responses ─────────────────────────────────────────────────────────────

/// Question/answer pair in a QA preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QaPreview {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

/// Indexing estimate returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct IndexingEstimate {
    #[serde(default)]
    pub total_nodes: u64,
    #[serde(default)]
    pub tokens: u64,
    #[serde(default)]
    pub total_price: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub total_segments: u64,
    #[serde(default)]
    pub preview: Vec<String>,
    #[serde(default)]
    pub qa_preview: Vec<QaPreview>,
}

/// Default rule set offered for custom segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultProcessRule {
    pub mode: crate::process_rule::SegmentationMode,
    pub rules: crate::process_rule::Rules,
    #[serde(default)]
    pub limits: serde_json::Value,
}

/// Dataset summary returned after document creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DatasetSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub indexing_technique: Option<IndexingTechnique>,
}

/// Document summary returned after document creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DocumentSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub indexing_status: Option<String>,
}

/// Result of a creation or reconfiguration call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CreateDocumentResponse {
    #[serde(default)]
    pub dataset: Option<DatasetSummary>,
    #[serde(default)]
    pub batch: String,
    #[serde(default)]
    pub documents: Vec<DocumentSummary>,
}

/// Existing document as needed to reconfigure it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDetail {
    pub id: String,
    #[serde(default)]
    pub doc_form: DocForm,
    pub dataset_process_rule: ProcessRule,
}
