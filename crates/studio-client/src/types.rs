//! Request and response types for the app debug endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifiers attached to every streamed answer chunk.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageMeta {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default, rename = "id")]
    pub message_id: String,
    #[serde(default)]
    pub task_id: Option<String>,
}

/// Terminal marker of a streamed message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageEnd {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    /// Retrieval sources, usage and anything else the server attaches.
    #[serde(default)]
    pub metadata: Value,
}

/// One decoded event of a message stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// Incremental answer text.
    Message { answer: String, meta: MessageMeta },
    /// The server finished the message.
    MessageEnd(MessageEnd),
    /// The server reported a failure inside the stream.
    Error {
        status: Option<u16>,
        code: Option<String>,
        message: String,
    },
}

/// Suggested follow-up questions for a message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SuggestedQuestions {
    #[serde(default)]
    pub data: Vec<String>,
}

/// A stored message of a debug conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: String,
    #[serde(default)]
    pub conversation_id: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub inputs: Value,
    #[serde(default)]
    pub created_at: i64,
}

/// Page of conversation messages.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversationMessages {
    #[serde(default)]
    pub data: Vec<ConversationMessage>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub limit: u32,
}

/// Input for generating a prompt from a short brief.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleGenerateRequest {
    pub audiences: String,
    pub hoping_to_solve: String,
}

/// Generated prompt, its variables and an opening statement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeneratedRule {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub variables: Vec<String>,
    #[serde(default)]
    pub opening_statement: String,
}

/// Result of a stop request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StopResponse {
    #[serde(default)]
    pub result: String,
}
