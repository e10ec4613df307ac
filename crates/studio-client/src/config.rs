//! Client configuration.
//!
//! Configuration comes from code or from `STUDIO_*` environment variables:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | STUDIO_API_URL | http://127.0.0.1:5001/console/api | Console API base URL |
//! | STUDIO_API_TOKEN | (none) | Bearer token |
//! | STUDIO_TIMEOUT | 60 | Timeout for non-streaming requests (seconds) |
//! | STUDIO_SKIP_TLS_VERIFY | false | Accept self-signed certificates |

use std::env;
use thiserror::Error;

use studio_core::defaults;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for studio_core::Error {
    fn from(e: ConfigError) -> Self {
        studio_core::Error::Config(e.to_string())
    }
}

/// Console API client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: String,
    /// Bearer token sent as `Authorization`, if any.
    pub api_token: Option<String>,
    /// Timeout for ordinary requests. Streaming requests are not bounded.
    pub timeout_seconds: u64,
    /// Skip TLS verification (for self-signed certs in local environments).
    pub skip_tls_verify: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::API_URL.to_string(),
            api_token: None,
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECS,
            skip_tls_verify: false,
        }
    }
}

impl ClientConfig {
    /// Configuration for `base_url` with everything else defaulted.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("STUDIO_API_URL").unwrap_or_else(|_| defaults::API_URL.to_string()),
            api_token: env::var("STUDIO_API_TOKEN").ok().filter(|t| !t.is_empty()),
            timeout_seconds: env::var("STUDIO_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::REQUEST_TIMEOUT_SECS),
            skip_tls_verify: env::var("STUDIO_SKIP_TLS_VERIFY")
                .map(|v| v == "1" || v.to_lowercase() == "true")
                .unwrap_or(false),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.base_url.is_empty() {
            return Err(ConfigError::Validation(
                "base_url cannot be empty".to_string(),
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "timeout_seconds must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
