//! App debugging endpoints: streamed chat and completion messages, stop,
//! suggested questions, conversation history, prompt generation and model
//! parameter rules.

use async_trait::async_trait;
use futures::future::AbortRegistration;
use reqwest::header::ACCEPT;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument};

use studio_core::defaults;
use studio_core::{Error, Result};

use crate::client::{check_status, ConsoleClient};
use crate::streaming::{
    dispatch_events, parse_event_stream, run_abortable, ChatEventStream, ChatStreaming,
    StreamHandler,
};
use crate::types::{
    ConversationMessages, GeneratedRule, RuleGenerateRequest, StopResponse, SuggestedQuestions,
};

/// Force streaming mode on a message body. The body must be a JSON object.
pub fn with_response_mode(body: Value) -> Result<Value> {
    match body {
        Value::Object(mut map) => {
            map.insert(
                "response_mode".to_string(),
                Value::String(defaults::RESPONSE_MODE_STREAMING.to_string()),
            );
            Ok(Value::Object(map))
        }
        other => Err(Error::InvalidInput(format!(
            "Message body must be a JSON object, got {}",
            other
        ))),
    }
}

impl ConsoleClient {
    async fn open_stream(&self, path: &str, body: Value) -> Result<ChatEventStream> {
        let body = with_response_mode(body)?;
        let (req, request_id) = self.request(Method::POST, path);

        // No timeout: answers stream for as long as the model generates.
        let response = req
            .header(ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Request(format!("Request failed: {}", e)))?;
        let response = check_status(response, &request_id).await?;

        debug!(request_id = %request_id, path, "Stream opened");
        Ok(parse_event_stream(response.bytes_stream()))
    }

    async fn stream_into(
        &self,
        path: String,
        body: Value,
        handler: &mut dyn StreamHandler,
        abort: Option<AbortRegistration>,
    ) -> Result<()> {
        let h = &mut *handler;
        let call = async move {
            let events = match self.open_stream(&path, body).await {
                Ok(events) => events,
                Err(err) => {
                    h.on_error(&err);
                    return Err(err);
                }
            };
            dispatch_events(events, h).await
        };

        match run_abortable(call, abort).await {
            Some(result) => result,
            None => {
                handler.on_error(&Error::Aborted);
                Err(Error::Aborted)
            }
        }
    }

    /// Ask the server to stop generating the answer for `task_id`.
    #[instrument(
        skip(self),
        fields(component = "debug", op = "stop_responding", request_id = tracing::field::Empty)
    )]
    pub async fn stop_chat_message_responding(
        &self,
        app_id: &str,
        task_id: &str,
    ) -> Result<StopResponse> {
        let path = format!("apps/{}/chat-messages/{}/stop", app_id, task_id);
        self.post_json(&path, &serde_json::json!({})).await
    }

    /// Suggested follow-up questions for an answered message.
    #[instrument(
        skip(self),
        fields(component = "debug", op = "suggested_questions", request_id = tracing::field::Empty)
    )]
    pub async fn fetch_suggested_questions(
        &self,
        app_id: &str,
        message_id: &str,
    ) -> Result<SuggestedQuestions> {
        let path = format!(
            "apps/{}/chat-messages/{}/suggested-questions",
            app_id, message_id
        );
        self.get_json(&path, &[]).await
    }

    /// Message history of a debug conversation.
    #[instrument(
        skip(self),
        fields(component = "debug", op = "conversation_messages", request_id = tracing::field::Empty)
    )]
    pub async fn fetch_conversation_messages(
        &self,
        app_id: &str,
        conversation_id: &str,
    ) -> Result<ConversationMessages> {
        let path = format!("apps/{}/chat-messages", app_id);
        self.get_json(&path, &[("conversation_id", conversation_id)])
            .await
    }

    /// Generate a prompt template from an audience and goal.
    #[instrument(
        skip_all,
        fields(component = "debug", op = "generate_rule", request_id = tracing::field::Empty)
    )]
    pub async fn generate_rule(&self, request: &RuleGenerateRequest) -> Result<GeneratedRule> {
        self.post_json("rule-generate", request).await
    }

    /// Parameter rules of a provider's model, returned as the server sends
    /// them.
    #[instrument(
        skip(self),
        fields(component = "debug", op = "model_params", request_id = tracing::field::Empty)
    )]
    pub async fn fetch_model_params(&self, provider: &str, model_name: &str) -> Result<Value> {
        let path = format!(
            "workspaces/current/model-providers/{}/models/parameter-rules",
            provider
        );
        self.get_json(&path, &[("model_name", model_name)]).await
    }
}

#[async_trait]
impl ChatStreaming for ConsoleClient {
    async fn open_chat_stream(&self, app_id: &str, body: Value) -> Result<ChatEventStream> {
        self.open_stream(&format!("apps/{}/chat-messages", app_id), body)
            .await
    }

    async fn open_completion_stream(&self, app_id: &str, body: Value) -> Result<ChatEventStream> {
        self.open_stream(&format!("apps/{}/completion-messages", app_id), body)
            .await
    }

    #[instrument(
        skip(self, body, handler, abort),
        fields(component = "debug", op = "chat_message", request_id = tracing::field::Empty)
    )]
    async fn send_chat_message(
        &self,
        app_id: &str,
        body: Value,
        handler: &mut dyn StreamHandler,
        abort: Option<AbortRegistration>,
    ) -> Result<()> {
        let path = format!("apps/{}/chat-messages", app_id);
        self.stream_into(path, body, handler, abort).await
    }

    #[instrument(
        skip(self, body, handler, abort),
        fields(component = "debug", op = "completion_message", request_id = tracing::field::Empty)
    )]
    async fn send_completion_message(
        &self,
        app_id: &str,
        body: Value,
        handler: &mut dyn StreamHandler,
        abort: Option<AbortRegistration>,
    ) -> Result<()> {
        let path = format!("apps/{}/completion-messages", app_id);
        self.stream_into(path, body, handler, abort).await
    }
}
