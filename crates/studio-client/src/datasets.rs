//! Dataset document endpoints.

use async_trait::async_trait;
use std::time::Instant;
use tracing::{info, instrument};

use studio_core::{
    CreateDocumentRequest, CreateDocumentResponse, DatasetService, DefaultProcessRule,
    IndexingEstimate, IndexingEstimateRequest, IndexingRequest, Result,
};

use crate::client::ConsoleClient;

#[async_trait]
impl DatasetService for ConsoleClient {
    #[instrument(
        skip_all,
        fields(component = "datasets", op = "default_process_rule", request_id = tracing::field::Empty)
    )]
    async fn fetch_default_process_rule(&self) -> Result<DefaultProcessRule> {
        self.get_json("datasets/process-rule", &[]).await
    }

    #[instrument(
        skip_all,
        fields(component = "datasets", op = "indexing_estimate", request_id = tracing::field::Empty)
    )]
    async fn indexing_estimate(&self, request: &IndexingEstimateRequest) -> Result<IndexingEstimate> {
        self.post_json("datasets/indexing-estimate", request).await
    }

    #[instrument(
        skip_all,
        fields(component = "datasets", op = "create_first_document", request_id = tracing::field::Empty)
    )]
    async fn create_first_document(
        &self,
        request: &CreateDocumentRequest,
    ) -> Result<CreateDocumentResponse> {
        let start = Instant::now();
        let response: CreateDocumentResponse = self.post_json("datasets/init", request).await?;

        info!(
            dataset_id = ?response.dataset.as_ref().map(|d| d.id.as_str()),
            batch = %response.batch,
            document_count = response.documents.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Dataset created"
        );
        Ok(response)
    }

    #[instrument(
        skip(self, request),
        fields(component = "datasets", op = "create_document", request_id = tracing::field::Empty)
    )]
    async fn create_document(
        &self,
        dataset_id: &str,
        request: &IndexingRequest,
    ) -> Result<CreateDocumentResponse> {
        let start = Instant::now();
        let path = format!("datasets/{}/documents", dataset_id);
        let response: CreateDocumentResponse = self.post_json(&path, request).await?;

        info!(
            batch = %response.batch,
            document_count = response.documents.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Documents submitted"
        );
        Ok(response)
    }
}
