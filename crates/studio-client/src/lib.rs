//! # studio-client
//!
//! Async client for the studio console API.
//!
//! - [`ConsoleClient`] with bearer auth and per-request correlation ids
//! - Dataset endpoints through [`studio_core::DatasetService`]
//! - Streamed chat and completion messages through [`ChatStreaming`]
//! - Tracing setup for embedding programs
//!
//! ```no_run
//! use studio_client::{ClientConfig, ConsoleClient};
//! use studio_core::DatasetService;
//!
//! # async fn run() -> studio_core::Result<()> {
//! let client = ConsoleClient::new(ClientConfig::from_env())?;
//! let rule = client.fetch_default_process_rule().await?;
//! println!("default mode: {:?}", rule.mode);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod datasets;
pub mod debug;
pub mod streaming;
pub mod telemetry;
pub mod types;

pub use client::{ApiErrorBody, ConsoleClient, REQUEST_ID_HEADER};
pub use config::{ClientConfig, ConfigError, ConfigResult};
pub use debug::with_response_mode;
pub use streaming::{
    dispatch_events, parse_event_stream, parse_sse_line, ChatEventStream, ChatStreaming,
    SseDecoder, StreamHandler,
};
pub use telemetry::init_tracing;
pub use types::*;

// Abort handles for streaming calls.
pub use futures::future::{AbortHandle, AbortRegistration};
