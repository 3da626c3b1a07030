//! Capability traits implemented by actions.
//!
//! Each trait corresponds to one `ActionKind`: plugins register trait
//! objects into the `ActionRegistry` and callers resolve them by name.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::LlmError;
use crate::stream::ChatStream;
use crate::types::{
    ChatMessage, ChatResponse, EmbeddingResponse, ModelInfo, RetrieverRequest, RetrieverResponse,
    Tool,
};

/// Chat capability of a model action
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model id without the provider prefix
    fn model_id(&self) -> &str;

    /// Provider id (the action name prefix)
    fn provider_id(&self) -> &str;

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::new().with_chat().with_streaming()
    }

    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<ChatResponse, LlmError> {
        self.chat_with_tools(messages, None).await
    }

    async fn chat_with_tools(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<Tool>>,
    ) -> Result<ChatResponse, LlmError>;

    async fn chat_stream(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<Tool>>,
    ) -> Result<ChatStream, LlmError>;
}

/// Embedding capability of an embedder action
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    fn model_id(&self) -> &str;

    async fn embed(&self, texts: Vec<String>) -> Result<EmbeddingResponse, LlmError>;
}

/// Document retrieval capability of a retriever action
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, request: RetrieverRequest) -> Result<RetrieverResponse, LlmError>;
}

/// A callable tool action
#[async_trait]
pub trait ToolAction: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema for the tool input
    fn input_schema(&self) -> serde_json::Value;

    async fn call(&self, input: serde_json::Value) -> Result<serde_json::Value, LlmError>;
}

/// Live model listing, for providers that expose a `/models` endpoint
#[async_trait]
pub trait ModelListing: Send + Sync {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError>;
}

/// What a provider supports
#[derive(Debug, Clone, Default)]
pub struct ProviderCapabilities {
    pub chat: bool,
    pub streaming: bool,
    pub tools: bool,
    pub vision: bool,
    pub embedding: bool,
    pub custom_features: HashMap<String, bool>,
}

impl ProviderCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chat(mut self) -> Self {
        self.chat = true;
        self
    }

    pub fn with_streaming(mut self) -> Self {
        self.streaming = true;
        self
    }

    pub fn with_tools(mut self) -> Self {
        self.tools = true;
        self
    }

    pub fn with_vision(mut self) -> Self {
        self.vision = true;
        self
    }

    pub fn with_embedding(mut self) -> Self {
        self.embedding = true;
        self
    }

    pub fn with_custom_feature(mut self, name: &str, enabled: bool) -> Self {
        self.custom_features.insert(name.to_string(), enabled);
        self
    }

    pub fn supports(&self, feature: &str) -> bool {
        match feature {
            "chat" => self.chat,
            "streaming" => self.streaming,
            "tools" => self.tools,
            "vision" => self.vision,
            "embedding" => self.embedding,
            _ => self.custom_features.get(feature).copied().unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_builder() {
        let caps = ProviderCapabilities::new()
            .with_chat()
            .with_streaming()
            .with_custom_feature("reasoning", true);

        assert!(caps.supports("chat"));
        assert!(caps.supports("streaming"));
        assert!(caps.supports("reasoning"));
        assert!(!caps.supports("vision"));
        assert!(!caps.supports("unknown"));
    }
}
