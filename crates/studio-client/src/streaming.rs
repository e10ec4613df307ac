//! Streaming chat and completion messages.
//!
//! The server answers with `text/event-stream` where every event is a
//! `data: {json}` line. Lines can arrive split across network chunks, so
//! [`SseDecoder`] buffers bytes until a full line is available. Events are
//! delivered to a [`StreamHandler`] strictly in arrival order, and delivery
//! stops at the first error.

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::{AbortRegistration, Abortable};
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::pin::Pin;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

use studio_core::{Error, Result};

use crate::types::{ChatEvent, MessageEnd, MessageMeta};

/// Stream of decoded chat events.
pub type ChatEventStream = Pin<Box<dyn Stream<Item = Result<ChatEvent>> + Send>>;

/// Receives the events of one streamed message.
///
/// `on_data` fires for every answer chunk, `on_message_end` for the end
/// marker. A stream that runs to completion ends with `on_completed(false)`.
/// An error event from the server yields `on_error` followed by
/// `on_completed(true)`. Transport failures and aborts yield only `on_error`.
pub trait StreamHandler: Send {
    /// An answer chunk. `is_first` is set for the first chunk of the stream.
    fn on_data(&mut self, answer: &str, is_first: bool, meta: &MessageMeta);

    fn on_message_end(&mut self, _end: &MessageEnd) {}

    fn on_completed(&mut self, _has_error: bool) {}

    fn on_error(&mut self, _error: &Error) {}
}

/// Incremental `data:` line decoder.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the events of every line it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<ChatEvent>> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = parse_sse_line(&String::from_utf8_lossy(&line)) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Vec<Result<ChatEvent>> {
        if self.buffer.is_empty() {
            return Vec::new();
        }
        let line = std::mem::take(&mut self.buffer);
        parse_sse_line(&String::from_utf8_lossy(&line))
            .into_iter()
            .collect()
    }
}

/// Parse a single SSE line. Blank lines, comments, non-data fields and
/// events the console does not act on yield `None`.
pub fn parse_sse_line(line: &str) -> Option<Result<ChatEvent>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return None;
    }

    let data = line.strip_prefix("data:")?.trim_start();
    let value: Value = match serde_json::from_str(data) {
        Ok(value) => value,
        Err(e) => {
            return Some(Err(Error::Stream(format!(
                "Failed to parse SSE event: {}",
                e
            ))))
        }
    };

    parse_event(value)
}

fn parse_event(value: Value) -> Option<Result<ChatEvent>> {
    let status = value
        .get("status")
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok());
    let event = value.get("event").and_then(Value::as_str);

    let is_error = matches!(status, Some(s) if s >= 400) || matches!(event, None | Some("error"));
    if is_error {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown stream error")
            .to_string();
        let code = value.get("code").and_then(Value::as_str).map(str::to_string);
        return Some(Ok(ChatEvent::Error {
            status,
            code,
            message,
        }));
    }

    match event {
        Some("message") | Some("agent_message") => {
            let answer = value
                .get("answer")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let meta = serde_json::from_value::<MessageMeta>(value).unwrap_or_default();
            Some(Ok(ChatEvent::Message { answer, meta }))
        }
        Some("message_end") => Some(
            serde_json::from_value::<MessageEnd>(value)
                .map(ChatEvent::MessageEnd)
                .map_err(Error::from),
        ),
        Some(other) => {
            trace!(event = other, "skipping unhandled stream event");
            None
        }
        None => None,
    }
}

/// Decode a byte stream into chat events.
pub fn parse_event_stream<E>(
    stream: impl Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
) -> ChatEventStream
where
    E: std::fmt::Display + 'static,
{
    let mut decoder = SseDecoder::new();
    let events = stream
        .map(Some)
        .chain(futures::stream::once(async { None }))
        .flat_map(move |chunk| {
            let batch = match chunk {
                Some(Ok(bytes)) => decoder.push(&bytes),
                Some(Err(e)) => vec![Err(Error::Stream(format!("Stream error: {}", e)))],
                None => decoder.finish(),
            };
            futures::stream::iter(batch)
        });

    Box::pin(events)
}

/// Deliver `events` to `handler` in order until the stream ends or fails.
pub async fn dispatch_events(
    mut events: ChatEventStream,
    handler: &mut dyn StreamHandler,
) -> Result<()> {
    let started = Instant::now();
    let mut is_first = true;
    let mut event_count: u64 = 0;

    while let Some(item) = events.next().await {
        event_count += 1;
        match item {
            Ok(ChatEvent::Message { answer, meta }) => {
                trace!(message_id = %meta.message_id, len = answer.len(), "answer chunk");
                handler.on_data(&answer, is_first, &meta);
                is_first = false;
            }
            Ok(ChatEvent::MessageEnd(end)) => {
                trace!(message_id = %end.id, "message end");
                handler.on_message_end(&end);
            }
            Ok(ChatEvent::Error {
                status,
                code,
                message,
            }) => {
                warn!(status = ?status, code = ?code, error = %message, "error event in stream");
                let err = match status {
                    Some(status) => Error::Api {
                        status,
                        code,
                        message,
                    },
                    None => Error::Stream(message),
                };
                handler.on_error(&err);
                handler.on_completed(true);
                return Err(err);
            }
            Err(err) => {
                warn!(error = %err, "stream failed");
                handler.on_error(&err);
                return Err(err);
            }
        }
    }

    info!(
        event_count,
        duration_ms = started.elapsed().as_millis() as u64,
        "Stream complete"
    );
    handler.on_completed(false);
    Ok(())
}

/// Run a streaming call, optionally under an abort registration. Returns
/// `None` when the caller aborted, in which case the in-flight request has
/// been dropped.
pub(crate) async fn run_abortable<F>(call: F, abort: Option<AbortRegistration>) -> Option<Result<()>>
where
    F: std::future::Future<Output = Result<()>> + Send,
{
    let Some(registration) = abort else {
        return Some(call.await);
    };

    match Abortable::new(call, registration).await {
        Ok(result) => Some(result),
        Err(_) => {
            debug!("streaming request aborted by caller");
            None
        }
    }
}

/// Streaming message endpoints.
#[async_trait]
pub trait ChatStreaming: Send + Sync {
    /// Open a chat message stream.
    async fn open_chat_stream(&self, app_id: &str, body: Value) -> Result<ChatEventStream>;

    /// Open a completion message stream.
    async fn open_completion_stream(&self, app_id: &str, body: Value) -> Result<ChatEventStream>;

    /// Send a chat message and deliver the streamed answer to `handler`.
    async fn send_chat_message(
        &self,
        app_id: &str,
        body: Value,
        handler: &mut dyn StreamHandler,
        abort: Option<AbortRegistration>,
    ) -> Result<()>;

    /// Send a completion request and deliver the streamed answer to `handler`.
    async fn send_completion_message(
        &self,
        app_id: &str,
        body: Value,
        handler: &mut dyn StreamHandler,
        abort: Option<AbortRegistration>,
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        chunks: Vec<(String, bool)>,
        ends: usize,
        completed: Vec<bool>,
        errors: Vec<String>,
    }

    impl StreamHandler for Recorder {
        fn on_data(&mut self, answer: &str, is_first: bool, _meta: &MessageMeta) {
            self.chunks.push((answer.to_string(), is_first));
        }

        fn on_message_end(&mut self, _end: &MessageEnd) {
            self.ends += 1;
        }

        fn on_completed(&mut self, has_error: bool) {
            self.completed.push(has_error);
        }

        fn on_error(&mut self, error: &Error) {
            self.errors.push(error.to_string());
        }
    }

    fn stream_of(chunks: Vec<&'static str>) -> ChatEventStream {
        let items: Vec<std::result::Result<Bytes, std::io::Error>> = chunks
            .into_iter()
            .map(|c| Ok(Bytes::from_static(c.as_bytes())))
            .collect();
        parse_event_stream(futures::stream::iter(items))
    }

    #[test]
    fn test_parse_message_line() {
        let line = r#"data: {"event": "message", "id": "m1", "conversation_id": "c1", "task_id": "t1", "answer": "Hi"}"#;
        match parse_sse_line(line).unwrap().unwrap() {
            ChatEvent::Message { answer, meta } => {
                assert_eq!(answer, "Hi");
                assert_eq!(meta.message_id, "m1");
                assert_eq!(meta.conversation_id.as_deref(), Some("c1"));
                assert_eq!(meta.task_id.as_deref(), Some("t1"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_message_end_line() {
        let line = r#"data: {"event": "message_end", "id": "m1", "metadata": {"usage": {"total_tokens": 5}}}"#;
        match parse_sse_line(line).unwrap().unwrap() {
            ChatEvent::MessageEnd(end) => {
                assert_eq!(end.id, "m1");
                assert_eq!(end.metadata["usage"]["total_tokens"], 5);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_status() {
        let line = r#"data: {"status": 400, "code": "completion_request_error", "message": "quota"}"#;
        assert_eq!(
            parse_sse_line(line).unwrap().unwrap(),
            ChatEvent::Error {
                status: Some(400),
                code: Some("completion_request_error".to_string()),
                message: "quota".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_missing_event_is_error() {
        let line = r#"data: {"answer": "orphan"}"#;
        assert!(matches!(
            parse_sse_line(line).unwrap().unwrap(),
            ChatEvent::Error { status: None, .. }
        ));
    }

    #[test]
    fn test_parse_skips_noise() {
        assert!(parse_sse_line("").is_none());
        assert!(parse_sse_line(": keep-alive").is_none());
        assert!(parse_sse_line("event: ping").is_none());
        assert!(parse_sse_line(r#"data: {"event": "ping"}"#).is_none());
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(parse_sse_line("data: {broken").unwrap().is_err());
    }

    #[test]
    fn test_decoder_buffers_split_lines() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(br#"data: {"event": "mess"#).is_empty());
        let events = decoder.push(b"age\", \"answer\": \"ok\"}\n\n");
        assert_eq!(events.len(), 1);
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_decoder_handles_split_utf8() {
        let line = "data: {\"event\": \"message\", \"answer\": \"é\"}\n".as_bytes();
        let split = line.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(&line[..split]).is_empty());
        match decoder.push(&line[split..]).remove(0).unwrap() {
            ChatEvent::Message { answer, .. } => assert_eq!(answer, "é"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decoder_flushes_unterminated_line() {
        let mut decoder = SseDecoder::new();
        assert!(decoder
            .push(br#"data: {"event": "message_end", "id": "m"}"#)
            .is_empty());
        assert_eq!(decoder.finish().len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_in_order() {
        let events = stream_of(vec![
            "data: {\"event\": \"message\", \"id\": \"m\", \"answer\": \"Hel\"}\n\n",
            "data: {\"event\": \"message\", \"id\": \"m\", \"answer\": \"lo\"}\n\ndata: {\"event\": \"message_end\", \"id\": \"m\"}\n\n",
        ]);
        let mut recorder = Recorder::default();
        dispatch_events(events, &mut recorder).await.unwrap();

        assert_eq!(
            recorder.chunks,
            vec![("Hel".to_string(), true), ("lo".to_string(), false)]
        );
        assert_eq!(recorder.ends, 1);
        assert_eq!(recorder.completed, vec![false]);
        assert!(recorder.errors.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_stops_at_error_event() {
        let events = stream_of(vec![
            "data: {\"event\": \"message\", \"id\": \"m\", \"answer\": \"a\"}\n",
            "data: {\"event\": \"error\", \"message\": \"model overloaded\"}\n",
            "data: {\"event\": \"message\", \"id\": \"m\", \"answer\": \"b\"}\n",
        ]);
        let mut recorder = Recorder::default();
        let err = dispatch_events(events, &mut recorder).await.unwrap_err();

        assert!(matches!(err, Error::Stream(_)));
        assert_eq!(recorder.chunks.len(), 1);
        assert_eq!(recorder.errors, vec!["Stream error: model overloaded"]);
        assert_eq!(recorder.completed, vec![true]);
    }

    #[tokio::test]
    async fn test_abort_before_completion() {
        let (handle, registration) = futures::future::AbortHandle::new_pair();
        handle.abort();

        let call = futures::future::pending::<Result<()>>();
        assert!(run_abortable(call, Some(registration)).await.is_none());
    }

    #[tokio::test]
    async fn test_run_without_registration() {
        let call = async { Ok(()) };
        assert!(matches!(run_abortable(call, None).await, Some(Ok(()))));
    }
}
