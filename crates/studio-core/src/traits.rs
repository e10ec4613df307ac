//! Service traits implemented by the console transport.
//!
//! Keeping the dataset endpoints behind a trait lets wizard flows be driven
//! against an in-memory fake in tests.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, Result};
use crate::indexing::{
    CreateDocumentRequest, CreateDocumentResponse, DefaultProcessRule, IndexingEstimate,
    IndexingEstimateRequest, IndexingRequest,
};

// =============================================================================
// DATASET SERVICE
// =============================================================================

/// Dataset document endpoints.
#[async_trait]
pub trait DatasetService: Send + Sync {
    /// Rules offered as the starting point for custom segmentation.
    async fn fetch_default_process_rule(&self) -> Result<DefaultProcessRule>;

    /// Segment count and cost preview.
    async fn indexing_estimate(&self, request: &IndexingEstimateRequest) -> Result<IndexingEstimate>;

    /// Create a dataset together with its first documents.
    async fn create_first_document(
        &self,
        request: &CreateDocumentRequest,
    ) -> Result<CreateDocumentResponse>;

    /// Create or reconfigure documents in an existing dataset.
    async fn create_document(
        &self,
        dataset_id: &str,
        request: &IndexingRequest,
    ) -> Result<CreateDocumentResponse>;

    /// Submit `request`, creating a dataset first when `dataset_id` is absent.
    ///
    /// Reconfiguration always targets an existing dataset.
    async fn submit(
        &self,
        dataset_id: Option<&str>,
        request: &IndexingRequest,
    ) -> Result<CreateDocumentResponse> {
        match (dataset_id, request) {
            (Some(id), _) => self.create_document(id, request).await,
            (None, IndexingRequest::Create(create)) => {
                debug!("no dataset yet, creating it with the first documents");
                self.create_first_document(create).await
            }
            (None, IndexingRequest::Reconfigure(_)) => Err(Error::InvalidInput(
                "reconfiguring a document requires a dataset id".to_string(),
            )),
        }
    }
}
