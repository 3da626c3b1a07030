//! OpenAI-compatible client.
//!
//! One `CompatClient` serves one (provider, model) pair; plugins construct
//! one per registered model action.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::adapter::RequestType;
use super::config::{self, CompatConfig};
use crate::error::LlmError;
use crate::retry::RetryPolicy;
use crate::stream::ChatStream;
use crate::traits::{EmbeddingModel, LanguageModel, ModelListing, ProviderCapabilities};
use crate::types::{
    ChatMessage, ChatResponse, ContentPart, EmbeddingResponse, EmbeddingUsage, FinishReason,
    FunctionCall, MessageContent, ModelInfo, Tool, ToolCall, Usage,
};

/// Chat response in the OpenAI wire format, with the reasoning fields some
/// providers add
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompatChatResponse {
    pub id: String,
    pub model: String,
    pub choices: Vec<CompatChoice>,
    pub usage: Option<CompatUsage>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompatChoice {
    pub index: u32,
    pub message: CompatMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompatMessage {
    pub role: String,
    pub content: Option<serde_json::Value>,
    pub tool_calls: Option<Vec<CompatToolCall>>,

    // Provider-specific reasoning fields
    pub thinking: Option<String>,
    pub reasoning_content: Option<String>,
    pub reasoning: Option<String>,
}

impl CompatMessage {
    /// Reasoning content, checking the adapter's fields in priority order.
    fn thinking_for(&self, fields: &[&'static str]) -> Option<String> {
        for field in fields {
            let value = match *field {
                "thinking" => &self.thinking,
                "reasoning_content" => &self.reasoning_content,
                "reasoning" => &self.reasoning,
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

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompatToolCall {
    pub id: String,
    pub r#type: String,
    pub function: Option<CompatFunction>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompatFunction {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompatUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// OpenAI-compatible client
#[derive(Debug, Clone)]
pub struct CompatClient {
    config: CompatConfig,
    http_client: reqwest::Client,
    retry_policy: RetryPolicy,
}

impl CompatClient {
    /// Create a new client, validating the configuration first.
    pub fn new(config: CompatConfig) -> Result<Self, LlmError> {
        config.validate()?;

        if !config.model.is_empty() {
            config.adapter.validate_model(&config.model)?;
        }

        let http_client = build_http_client(&config)?;

        Ok(Self {
            config,
            http_client,
            retry_policy: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn config(&self) -> &CompatConfig {
        &self.config
    }

    /// Send a POST request, retrying transient failures.
    async fn send_request(
        &self,
        params: &serde_json::Value,
        endpoint: &str,
    ) -> Result<reqwest::Response, LlmError> {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        );
        let headers = config::build_headers(&self.config)?;

        self.retry_policy
            .run(|| {
                let request = self
                    .http_client
                    .post(&url)
                    .headers(headers.clone())
                    .json(params);
                async move {
                    let response = request
                        .send()
                        .await
                        .map_err(|e| LlmError::HttpError(e.to_string()))?;

                    if !response.status().is_success() {
                        let status = response.status();
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        return Err(LlmError::api_error(
                            status.as_u16(),
                            format!("HTTP {status}: {error_text}"),
                        ));
                    }

                    Ok(response)
                }
            })
            .await
    }

    /// Convert a wire response into `ChatResponse`.
    fn parse_chat_response(&self, response: CompatChatResponse) -> Result<ChatResponse, LlmError> {
        let thinking_fields = self.config.adapter.thinking_fields();

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::ApiError {
                code: 500,
                message: "No choices in response".to_string(),
                details: None,
            })?;

        let mut thinking = choice.message.thinking_for(thinking_fields);

        let content = match choice.message.content {
            Some(serde_json::Value::String(text)) => {
                // Some providers inline reasoning as <think> tags instead of
                // a dedicated field.
                if thinking.is_none()
                    && let Some((tagged, cleaned)) = split_think_tags(&text)
                {
                    thinking = Some(tagged);
                    MessageContent::Text(cleaned)
                } else {
                    MessageContent::Text(text)
                }
            }
            Some(serde_json::Value::Array(parts)) => {
                let content_parts = parts
                    .iter()
                    .filter_map(|part| {
                        part.get("text").and_then(|t| t.as_str()).map(|text| {
                            ContentPart::Text {
                                text: text.to_string(),
                            }
                        })
                    })
                    .collect();
                MessageContent::MultiModal(content_parts)
            }
            _ => MessageContent::Text(String::new()),
        };

        let tool_calls = choice.message.tool_calls.map(|calls| {
            calls
                .into_iter()
                .map(|call| ToolCall {
                    id: call.id,
                    r#type: call.r#type,
                    function: call.function.map(|f| FunctionCall {
                        name: f.name,
                        arguments: f.arguments,
                    }),
                })
                .collect()
        });

        let usage = response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens.unwrap_or(0),
            completion_tokens: u.completion_tokens.unwrap_or(0),
            total_tokens: u.total_tokens.unwrap_or(0),
            cached_tokens: None,
            reasoning_tokens: None,
        });

        let finish_reason = choice.finish_reason.map(|reason| match reason.as_str() {
            "stop" => FinishReason::Stop,
            "length" => FinishReason::Length,
            "tool_calls" => FinishReason::ToolCalls,
            "content_filter" => FinishReason::ContentFilter,
            _ => FinishReason::Other(reason),
        });

        Ok(ChatResponse {
            id: Some(response.id),
            model: Some(response.model),
            content,
            usage,
            finish_reason,
            tool_calls,
            thinking,
            metadata: HashMap::new(),
        })
    }

    async fn list_models_internal(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let url = format!("{}/models", self.config.base_url.trim_end_matches('/'));
        let headers = config::build_headers(&self.config)?;

        let response = self
            .http_client
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| LlmError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError {
                code: status.as_u16(),
                message: format!("{} models API error: {}", self.config.provider_id, error_text),
                details: serde_json::from_str(&error_text).ok(),
            });
        }

        let models_response: serde_json::Value = response.json().await?;
        let models = models_response
            .get("data")
            .and_then(|data| data.as_array())
            .ok_or_else(|| LlmError::ParseError("Invalid models response format".to_string()))?;

        let mut model_infos = Vec::new();
        for model in models {
            if let Some(model_id) = model.get("id").and_then(|id| id.as_str()) {
                model_infos.push(ModelInfo {
                    id: model_id.to_string(),
                    description: model
                        .get("description")
                        .and_then(|d| d.as_str())
                        .map(|s| s.to_string()),
                    owned_by: model
                        .get("owned_by")
                        .and_then(|o| o.as_str())
                        .unwrap_or(&self.config.provider_id)
                        .to_string(),
                    created: model.get("created").and_then(|c| c.as_u64()),
                });
            }
        }

        Ok(model_infos)
    }
}

#[async_trait]
impl LanguageModel for CompatClient {
    fn model_id(&self) -> &str {
        &self.config.model
    }

    fn provider_id(&self) -> &str {
        &self.config.provider_id
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.config.adapter.capabilities()
    }

    async fn chat_with_tools(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<Tool>>,
    ) -> Result<ChatResponse, LlmError> {
        let params = build_chat_body(&self.config, &messages, tools.as_deref(), false)?;

        tracing::debug!(
            provider = %self.config.provider_id,
            model = %self.config.model,
            messages = messages.len(),
            "sending chat request"
        );

        let response = self.send_request(&params, "chat/completions").await?;
        let response_text = response
            .text()
            .await
            .map_err(|e| LlmError::HttpError(e.to_string()))?;

        let compat_response: CompatChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| LlmError::ParseError(format!("Failed to parse chat response: {e}")))?;

        self.parse_chat_response(compat_response)
    }

    async fn chat_stream(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<Tool>>,
    ) -> Result<ChatStream, LlmError> {
        super::streaming::CompatStreaming::new(self.config.clone(), self.http_client.clone())
            .create_chat_stream(messages, tools)
            .await
    }
}

#[async_trait]
impl EmbeddingModel for CompatClient {
    fn model_id(&self) -> &str {
        &self.config.model
    }

    async fn embed(&self, texts: Vec<String>) -> Result<EmbeddingResponse, LlmError> {
        let mut params = serde_json::json!({
            "model": self.config.model,
            "input": texts,
        });

        self.config.adapter.transform_request_params(
            &mut params,
            &self.config.model,
            RequestType::Embedding,
        )?;

        let response = self.send_request(&params, "embeddings").await?;
        let response_text = response
            .text()
            .await
            .map_err(|e| LlmError::HttpError(e.to_string()))?;

        parse_embedding_response(&response_text)
    }
}

#[async_trait]
impl ModelListing for CompatClient {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        self.list_models_internal().await
    }
}

/// Build the `reqwest` client for a configuration.
fn build_http_client(config: &CompatConfig) -> Result<reqwest::Client, LlmError> {
    let mut builder = reqwest::Client::builder();

    if let Some(timeout) = config.http_config.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(connect_timeout) = config.http_config.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }
    if let Some(proxy_url) = &config.http_config.proxy {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| LlmError::ConfigurationError(format!("Invalid proxy URL: {e}")))?;
        builder = builder.proxy(proxy);
    }
    if let Some(user_agent) = &config.http_config.user_agent {
        builder = builder.user_agent(user_agent);
    }

    builder
        .build()
        .map_err(|e| LlmError::HttpError(format!("Failed to create HTTP client: {e}")))
}

/// Build an OpenAI-style chat request body.
pub(crate) fn build_chat_body(
    config: &CompatConfig,
    messages: &[ChatMessage],
    tools: Option<&[Tool]>,
    stream: bool,
) -> Result<serde_json::Value, LlmError> {
    let wire_messages = convert_messages(messages)?;

    let mut params = serde_json::json!({
        "model": config.model,
        "messages": wire_messages,
        "stream": stream,
    });

    config.common_params.apply_to(&mut params);

    if let Some(tools) = tools
        && !tools.is_empty()
    {
        params["tools"] = serde_json::to_value(tools)
            .map_err(|e| LlmError::ParseError(format!("Failed to serialize tools: {e}")))?;
    }

    config
        .adapter
        .transform_request_params(&mut params, &config.model, RequestType::Chat)?;

    Ok(params)
}

/// Convert messages to the OpenAI wire format.
pub(crate) fn convert_messages(
    messages: &[ChatMessage],
) -> Result<Vec<serde_json::Value>, LlmError> {
    messages
        .iter()
        .map(|message| {
            let role = match message.role {
                crate::types::MessageRole::System => "system",
                crate::types::MessageRole::User => "user",
                crate::types::MessageRole::Assistant => "assistant",
                crate::types::MessageRole::Tool => "tool",
            };

            let content = match &message.content {
                MessageContent::Text(text) => serde_json::json!(text),
                MessageContent::MultiModal(parts) => {
                    let wire_parts: Vec<serde_json::Value> = parts
                        .iter()
                        .map(|part| match part {
                            ContentPart::Text { text } => {
                                serde_json::json!({"type": "text", "text": text})
                            }
                            ContentPart::ImageUrl { url } => {
                                serde_json::json!({"type": "image_url", "image_url": {"url": url}})
                            }
                        })
                        .collect();
                    serde_json::json!(wire_parts)
                }
            };

            let mut wire = serde_json::json!({"role": role, "content": content});

            if let Some(tool_call_id) = &message.tool_call_id {
                wire["tool_call_id"] = serde_json::json!(tool_call_id);
            }
            if let Some(tool_calls) = &message.tool_calls {
                wire["tool_calls"] = serde_json::to_value(tool_calls)?;
            }

            Ok(wire)
        })
        .collect()
}

/// Split `<think>...</think>` reasoning out of response text.
fn split_think_tags(text: &str) -> Option<(String, String)> {
    const OPEN: &str = "<think>";
    const CLOSE: &str = "</think>";

    let start = text.find(OPEN)?;
    let end = text[start..].find(CLOSE)? + start;

    let thinking = text[start + OPEN.len()..end].to_string();
    let mut cleaned = String::with_capacity(text.len());
    cleaned.push_str(&text[..start]);
    cleaned.push_str(&text[end + CLOSE.len()..]);

    Some((thinking, cleaned.trim().to_string()))
}

/// OpenAI-compatible embedding response shape
#[derive(Debug, Clone, Deserialize)]
struct CompatEmbeddingResponse {
    data: Vec<CompatEmbeddingData>,
    model: String,
    usage: Option<EmbeddingUsage>,
}

#[derive(Debug, Clone, Deserialize)]
struct CompatEmbeddingData {
    embedding: Vec<f32>,
}

fn parse_embedding_response(response_text: &str) -> Result<EmbeddingResponse, LlmError> {
    let compat_response: CompatEmbeddingResponse = serde_json::from_str(response_text)
        .map_err(|e| LlmError::ParseError(format!("Failed to parse embedding response: {e}")))?;

    let embeddings = compat_response
        .data
        .into_iter()
        .map(|data| data.embedding)
        .collect();

    let mut response = EmbeddingResponse::new(embeddings, compat_response.model);
    response.usage = compat_response.usage;
    Ok(response)
}
