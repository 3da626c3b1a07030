//! Streaming for OpenAI-compatible providers.
//!
//! Uses the same SSE format as OpenAI, with provider-specific reasoning
//! fields surfaced as `ThinkingDelta` events.

use eventsource_stream::Event;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::config::{self, CompatConfig};
use crate::error::LlmError;
use crate::stream::{ChatStream, ChatStreamEvent};
use crate::types::{
    ChatMessage, ChatResponse, FinishReason, MessageContent, ResponseMetadata, Tool,
};
use crate::utils::streaming::{EventBuilder, SseEventConverter, StreamFactory};

/// Stream event in the OpenAI wire format
#[derive(Debug, Deserialize, Serialize)]
pub struct CompatStreamEvent {
    pub id: Option<String>,
    pub model: Option<String>,
    pub created: Option<u64>,
    pub choices: Option<Vec<StreamChoice>>,
    pub usage: Option<StreamUsage>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StreamChoice {
    pub index: Option<u32>,
    pub delta: Option<StreamDelta>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StreamDelta {
    pub role: Option<String>,
    pub content: Option<String>,
    pub tool_calls: Option<Vec<serde_json::Value>>,

    // Provider-specific reasoning fields
    pub thinking: Option<String>,
    pub reasoning_content: Option<String>,
    pub reasoning: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StreamUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Converts OpenAI-compatible SSE events into `ChatStreamEvent`s
#[derive(Clone)]
pub struct CompatEventConverter {
    config: CompatConfig,
    stream_started: Arc<Mutex<bool>>,
}

impl CompatEventConverter {
    pub fn new(config: CompatConfig) -> Self {
        Self {
            config,
            stream_started: Arc::new(Mutex::new(false)),
        }
    }

    async fn convert_event_async(&self, event: CompatStreamEvent) -> Vec<ChatStreamEvent> {
        let mut builder = EventBuilder::new();

        if self.needs_stream_start().await {
            builder = builder.add_stream_start(self.stream_start_metadata(&event));
        }

        let index = event
            .choices
            .as_ref()
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.index)
            .map(|index| index as usize);

        if let Some(delta) = event
            .choices
            .as_ref()
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.delta.as_ref())
        {
            if let Some(content) = &delta.content {
                builder = builder.add_content_delta(content.clone(), index);
            }

            if let Some(thinking) = self.extract_thinking(delta) {
                builder = builder.add_thinking_delta(thinking);
            }

            if let Some((id, name, arguments)) = extract_tool_call(delta) {
                builder = builder.add_tool_call_delta(id, name, arguments, index);
            }
        }

        if let Some(usage) = &event.usage {
            builder = builder.add_usage_update(crate::types::Usage {
                prompt_tokens: usage.prompt_tokens.unwrap_or(0),
                completion_tokens: usage.completion_tokens.unwrap_or(0),
                total_tokens: usage.total_tokens.unwrap_or(0),
                cached_tokens: None,
                reasoning_tokens: None,
            });
        }

        builder.build()
    }

    /// First event of the stream emits StreamStart exactly once.
    async fn needs_stream_start(&self) -> bool {
        let mut started = self.stream_started.lock().await;
        if !*started {
            *started = true;
            true
        } else {
            false
        }
    }

    fn stream_start_metadata(&self, event: &CompatStreamEvent) -> ResponseMetadata {
        ResponseMetadata {
            id: event.id.clone(),
            model: event.model.clone(),
            created: event.created.map(|ts| {
                chrono::DateTime::from_timestamp(ts as i64, 0).unwrap_or_else(chrono::Utc::now)
            }),
            provider: self.config.provider_id.clone(),
            request_id: None,
        }
    }

    /// Reasoning content from the adapter's fields, in priority order.
    fn extract_thinking(&self, delta: &StreamDelta) -> Option<String> {
        for field in self.config.adapter.thinking_fields() {
            let value = match *field {
                "thinking" => &delta.thinking,
                "reasoning_content" => &delta.reasoning_content,
                "reasoning" => &delta.reasoning,
                _ => &None,
            };
            if let Some(text) = value
                && !text.is_empty()
            {
                return Some(text.clone());
            }
        }
        None
    }
}

fn extract_tool_call(delta: &StreamDelta) -> Option<(String, Option<String>, Option<String>)> {
    let tool_call = delta.tool_calls.as_ref()?.first()?;

    let id = tool_call.get("id")?.as_str()?.to_string();
    let function = tool_call.get("function");
    let name = function
        .and_then(|f| f.get("name"))
        .and_then(|n| n.as_str())
        .map(|s| s.to_string());
    let arguments = function
        .and_then(|f| f.get("arguments"))
        .and_then(|a| a.as_str())
        .map(|s| s.to_string());

    Some((id, name, arguments))
}

impl SseEventConverter for CompatEventConverter {
    fn convert_event(
        &self,
        event: Event,
    ) -> Pin<Box<dyn Future<Output = Vec<Result<ChatStreamEvent, LlmError>>> + Send + Sync + '_>>
    {
        Box::pin(async move {
            match serde_json::from_str::<CompatStreamEvent>(&event.data) {
                Ok(compat_event) => self
                    .convert_event_async(compat_event)
                    .await
                    .into_iter()
                    .map(Ok)
                    .collect(),
                Err(e) => {
                    vec![Err(LlmError::ParseError(format!(
                        "Failed to parse stream event: {e}"
                    )))]
                }
            }
        })
    }

    fn handle_stream_end(&self) -> Option<Result<ChatStreamEvent, LlmError>> {
        let response = ChatResponse {
            id: None,
            model: None,
            content: MessageContent::Text(String::new()),
            usage: None,
            finish_reason: Some(FinishReason::Stop),
            tool_calls: None,
            thinking: None,
            metadata: HashMap::new(),
        };

        Some(Ok(ChatStreamEvent::StreamEnd { response }))
    }
}

/// Streaming client for OpenAI-compatible providers
#[derive(Clone)]
pub struct CompatStreaming {
    config: CompatConfig,
    http_client: reqwest::Client,
}

impl CompatStreaming {
    pub fn new(config: CompatConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Open the SSE stream for a chat request.
    pub async fn create_chat_stream(
        self,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<Tool>>,
    ) -> Result<ChatStream, LlmError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let body = super::client::build_chat_body(&self.config, &messages, tools.as_deref(), true)?;

        let headers = config::build_headers(&self.config)?;

        tracing::debug!(
            provider = %self.config.provider_id,
            model = %self.config.model,
            "opening chat stream"
        );

        let request_builder = self.http_client.post(&url).headers(headers).json(&body);

        let converter = CompatEventConverter::new(self.config);
        StreamFactory::create_eventsource_stream(request_builder, converter).await
    }
}
