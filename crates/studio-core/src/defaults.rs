//! Centralized default constants for the studio console.
//!
//! Every crate references these instead of defining its own magic values.

// =============================================================================
// SEGMENTATION
// =============================================================================

/// Separator as shown to the user: a literal backslash followed by `n`.
pub const SEPARATOR_DISPLAY: &str = "\\n";

/// Separator actually transmitted when the display token is `\n` or unset.
pub const SEPARATOR: &str = "\n";

/// Maximum tokens per segment in custom segmentation.
pub const MAX_TOKENS: u32 = 1000;

// =============================================================================
// PROMPT VARIABLES
// =============================================================================

/// Maximum length of a single-line input value when the variable sets none.
pub const VALUE_MAX_LEN: u32 = 48;

// =============================================================================
// DOCUMENT LANGUAGE
// =============================================================================

/// Document language for English locales.
pub const DOC_LANGUAGE_EN: &str = "English";

/// Document language for every other locale.
pub const DOC_LANGUAGE_ZH: &str = "Chinese";

// =============================================================================
// CLIENT
// =============================================================================

/// Default console API base URL.
pub const API_URL: &str = "http://127.0.0.1:5001/console/api";

/// Timeout for ordinary console requests in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Response mode injected into every chat/completion message body.
pub const RESPONSE_MODE_STREAMING: &str = "streaming";
