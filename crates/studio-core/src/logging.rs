//! Structured logging field name constants.
//!
//! Both crates log with these keys so console traces can be queried
//! uniformly.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Request failed and nothing was delivered to the caller |
//! | WARN  | Error event or non-success status surfaced to the caller |
//! | INFO  | Client construction, request completion |
//! | DEBUG | Decision points (technique resolution, request kind) |
//! | TRACE | Per-event stream iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID sent as `X-Request-Id`. Format: UUIDv7.
pub const REQUEST_ID: &str = "request_id";

/// Component within the client.
/// Examples: "datasets", "debug", "sse"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "indexing_estimate", "send_chat_message"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Dataset id for indexing calls.
pub const DATASET_ID: &str = "dataset_id";

/// SSE event name.
pub const EVENT: &str = "event";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of stream events delivered.
pub const EVENT_COUNT: &str = "event_count";

/// HTTP status code.
pub const STATUS: &str = "status";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
