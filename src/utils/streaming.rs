//! Common streaming utilities.
//!
//! Bridges provider SSE responses into `ChatStream`, using
//! eventsource-stream for UTF-8 boundaries, line buffering, and SSE parsing.

use eventsource_stream::{Event, Eventsource};
use futures_util::StreamExt;
use std::future::Future;
use std::pin::Pin;

use crate::error::LlmError;
use crate::stream::{ChatStream, ChatStreamEvent};

/// Type alias for SSE event conversion futures; one provider event may
/// expand to several stream events (e.g. StreamStart + ContentDelta).
type SseEventFuture<'a> =
    Pin<Box<dyn Future<Output = Vec<Result<ChatStreamEvent, LlmError>>> + Send + Sync + 'a>>;

/// Converts provider-specific SSE events into `ChatStreamEvent`s.
pub trait SseEventConverter: Send + Sync {
    /// Convert an SSE event to zero or more `ChatStreamEvent`s.
    fn convert_event(&self, event: Event) -> SseEventFuture<'_>;

    /// Handle the `[DONE]` sentinel at the end of the stream.
    fn handle_stream_end(&self) -> Option<Result<ChatStreamEvent, LlmError>> {
        None
    }
}

/// Factory for building `ChatStream`s out of HTTP responses.
pub struct StreamFactory;

impl StreamFactory {
    /// Send the request and convert the SSE response into a `ChatStream`.
    pub async fn create_eventsource_stream<C>(
        request_builder: reqwest::RequestBuilder,
        converter: C,
    ) -> Result<ChatStream, LlmError>
    where
        C: SseEventConverter + Clone + Send + 'static,
    {
        let response = request_builder
            .send()
            .await
            .map_err(|e| LlmError::HttpError(format!("Failed to send request: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::api_error(
                status.as_u16(),
                format!("HTTP {status}: {error_text}"),
            ));
        }

        let sse_stream = response.bytes_stream().eventsource();

        let chat_stream = sse_stream
            .then(move |event_result| {
                let converter = converter.clone();
                async move {
                    match event_result {
                        Ok(event) => {
                            if event.data.trim() == "[DONE]" {
                                return match converter.handle_stream_end() {
                                    Some(end_event) => vec![end_event],
                                    None => vec![],
                                };
                            }

                            if event.data.trim().is_empty() {
                                return vec![];
                            }

                            converter.convert_event(event).await
                        }
                        Err(e) => {
                            vec![Err(LlmError::StreamError(format!("SSE parsing error: {e}")))]
                        }
                    }
                }
            })
            .flat_map(futures::stream::iter);

        Ok(Box::pin(chat_stream))
    }
}

/// Accumulates the events produced from one provider event.
pub struct EventBuilder {
    events: Vec<ChatStreamEvent>,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self {
            // Most conversions produce 1-2 events
            events: Vec::with_capacity(2),
        }
    }

    pub fn add_stream_start(mut self, metadata: crate::types::ResponseMetadata) -> Self {
        self.events.push(ChatStreamEvent::StreamStart { metadata });
        self
    }

    /// Add a ContentDelta event (only if the delta is not empty).
    pub fn add_content_delta(mut self, delta: String, index: Option<usize>) -> Self {
        if !delta.is_empty() {
            self.events
                .push(ChatStreamEvent::ContentDelta { delta, index });
        }
        self
    }

    /// Add a ThinkingDelta event (only if the delta is not empty).
    pub fn add_thinking_delta(mut self, delta: String) -> Self {
        if !delta.is_empty() {
            self.events.push(ChatStreamEvent::ThinkingDelta { delta });
        }
        self
    }

    pub fn add_tool_call_delta(
        mut self,
        id: String,
        function_name: Option<String>,
        arguments_delta: Option<String>,
        index: Option<usize>,
    ) -> Self {
        self.events.push(ChatStreamEvent::ToolCallDelta {
            id,
            function_name,
            arguments_delta,
            index,
        });
        self
    }

    pub fn add_usage_update(mut self, usage: crate::types::Usage) -> Self {
        self.events.push(ChatStreamEvent::UsageUpdate { usage });
        self
    }

    pub fn build(self) -> Vec<ChatStreamEvent> {
        self.events
    }
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder_skips_empty_deltas() {
        let events = EventBuilder::new()
            .add_content_delta(String::new(), Some(0))
            .add_thinking_delta(String::new())
            .add_content_delta("hi".to_string(), Some(0))
            .build();

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ChatStreamEvent::ContentDelta { delta, .. } if delta == "hi"));
    }
}
