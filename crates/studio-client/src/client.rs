//! Console API HTTP client.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn, Span};
use uuid::Uuid;

use studio_core::{logging, Error, Result};

use crate::config::ClientConfig;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Error body returned by the console API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<u16>,
}

/// Client for the console API.
#[derive(Debug, Clone)]
pub struct ConsoleClient {
    client: Client,
    config: ClientConfig,
}

impl ConsoleClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut client_builder = Client::builder();
        if config.skip_tls_verify {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            base_url = %config.base_url,
            authenticated = config.api_token.is_some(),
            "Initializing console client"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Absolute URL for an endpoint path. Leading slashes on `path` are
    /// ignored so `"/rule-generate"` and `"rule-generate"` are equivalent.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Request with authentication and a fresh correlation id. The id is
    /// recorded on the current span when it declares a `request_id` field.
    pub(crate) fn request(&self, method: Method, path: &str) -> (RequestBuilder, String) {
        let request_id = Uuid::now_v7().to_string();
        Span::current().record(logging::REQUEST_ID, request_id.as_str());
        let mut req = self
            .client
            .request(method, self.url(path))
            .header(REQUEST_ID_HEADER, &request_id);

        if let Some(ref token) = self.config.api_token {
            req = req.bearer_auth(token);
        }

        (req, request_id)
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_seconds)
    }

    /// GET `path` and decode the JSON response.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let (req, request_id) = self.request(Method::GET, path);
        let req = req.query(query).timeout(self.timeout());
        self.execute_json(req, path, &request_id).await
    }

    /// POST `body` to `path` and decode the JSON response.
    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let (req, request_id) = self.request(Method::POST, path);
        let req = req.json(body).timeout(self.timeout());
        self.execute_json(req, path, &request_id).await
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        path: &str,
        request_id: &str,
    ) -> Result<T> {
        let started = Instant::now();
        let response = req
            .send()
            .await
            .map_err(|e| Error::Request(format!("Request failed: {}", e)))?;
        let response = check_status(response, request_id).await?;

        let result = response
            .json::<T>()
            .await
            .map_err(|e| Error::Serialization(format!("Failed to parse response: {}", e)))?;

        debug!(
            request_id = %request_id,
            path,
            duration_ms = started.elapsed().as_millis() as u64,
            "Request complete"
        );
        Ok(result)
    }
}

/// Pass successful responses through; turn anything else into
/// [`Error::Api`], using the console's error body when it parses.
pub(crate) async fn check_status(response: Response, request_id: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() || status.is_redirection() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ApiErrorBody>(&text) {
        Ok(body) if !body.message.is_empty() => (body.code, body.message),
        Ok(body) => (body.code, status.to_string()),
        Err(_) if !text.trim().is_empty() => (None, text.trim().to_string()),
        Err(_) => (None, status.to_string()),
    };

    warn!(
        request_id = %request_id,
        status = status.as_u16(),
        error = %message,
        "Console API returned an error"
    );

    Err(Error::Api {
        status: status.as_u16(),
        code,
        message,
    })
}
