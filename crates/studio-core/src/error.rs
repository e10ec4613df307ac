//! Error types for the studio console.

use thiserror::Error;

/// Result type alias using the studio Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for studio console operations.
///
/// Template rendering and request building never fail; every variant here
/// comes from transport or configuration and is surfaced to the caller as-is.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Console API answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Streaming response could not be read, or the server sent an error event
    #[error("Stream error: {0}")]
    Stream(String),

    /// The caller aborted an in-flight streaming request
    #[error("Request aborted")]
    Aborted,

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status for API errors, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
