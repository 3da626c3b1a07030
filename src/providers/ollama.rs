//! Ollama plugin.
//!
//! Talks to a local Ollama server through its OpenAI-compatible endpoint
//! (`{host}/v1`). There is no API key and no fixed model catalog: models
//! must be declared on the options, matching whatever has been pulled into
//! the local server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::compat::{AuthScheme, CompatClient, CompatConfig, ProviderAdapter};
use crate::error::LlmError;
use crate::plugin::Plugin;
use crate::registry::{ActionRegistry, action_name};

/// Plugin identifier
pub const PLUGIN_NAME: &str = "ollama";

/// Environment variable holding the server address
pub const HOST_ENV: &str = "OLLAMA_HOST";

/// Default server address
pub const DEFAULT_HOST: &str = "http://localhost:11434";

/// Ollama adapter
#[derive(Debug, Clone, Default)]
pub struct OllamaAdapter;

impl ProviderAdapter for OllamaAdapter {
    fn provider_id(&self) -> &'static str {
        PLUGIN_NAME
    }

    fn default_base_url(&self) -> &str {
        // Joined with the resolved host at init; only used as a fallback.
        "http://localhost:11434/v1"
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::None
    }

    fn thinking_fields(&self) -> &[&'static str] {
        &["thinking", "reasoning"]
    }
}

/// Ollama plugin options
#[derive(Debug, Clone, Default)]
pub struct OllamaOptions {
    host: Option<String>,
    timeout: Option<Duration>,
    models: Vec<String>,
    embedders: Vec<String>,
}

impl OllamaOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Server address; overrides `OLLAMA_HOST`.
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Declare a chat model available on the server.
    pub fn model<S: Into<String>>(mut self, model: S) -> Self {
        self.models.push(model.into());
        self
    }

    /// Declare an embedding model available on the server.
    pub fn embedder<S: Into<String>>(mut self, model: S) -> Self {
        self.embedders.push(model.into());
        self
    }
}

/// Ollama plugin
#[derive(Debug, Clone, Default)]
pub struct OllamaPlugin {
    options: OllamaOptions,
}

impl OllamaPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: OllamaOptions) -> Self {
        Self { options }
    }

    fn resolve_host(&self) -> String {
        self.options
            .host
            .clone()
            .or_else(|| std::env::var(HOST_ENV).ok().filter(|h| !h.is_empty()))
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }
}

#[async_trait]
impl Plugin for OllamaPlugin {
    fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    async fn init(&self, registry: &ActionRegistry) -> Result<Vec<String>, LlmError> {
        let host = self.resolve_host();
        let base_url = format!("{}/v1", host.trim_end_matches('/'));

        let adapter = Arc::new(OllamaAdapter);
        let http_config = super::http_config_with_timeout(self.options.timeout);

        let build = |model: &str| -> Result<CompatClient, LlmError> {
            let config = CompatConfig::new("", &base_url, adapter.clone())
                .with_model(model)
                .with_http_config(http_config.clone());
            CompatClient::new(config)
        };

        let mut registered = Vec::new();
        for model in &self.options.models {
            registered.push(registry.register_model(
                action_name(PLUGIN_NAME, model),
                Arc::new(build(model)?),
            ));
        }
        for model in &self.options.embedders {
            registered.push(registry.register_embedder(
                action_name(PLUGIN_NAME, model),
                Arc::new(build(model)?),
            ));
        }

        Ok(registered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ActionKind;

    #[test]
    fn test_plugin_name() {
        assert_eq!(OllamaPlugin::default().name(), "ollama");
    }

    #[test]
    fn test_default_host() {
        assert_eq!(DEFAULT_HOST, "http://localhost:11434");
    }

    #[test]
    fn test_explicit_host_wins() {
        let plugin =
            OllamaPlugin::with_options(OllamaOptions::new().host("http://gpu-box:11434"));
        assert_eq!(plugin.resolve_host(), "http://gpu-box:11434");
    }

    #[test]
    fn test_options_builder_chaining() {
        let options = OllamaOptions::new()
            .host("http://gpu-box:11434")
            .timeout(Duration::from_secs(300))
            .model("llama3.2")
            .model("qwen3")
            .embedder("nomic-embed-text");

        assert_eq!(options.host.as_deref(), Some("http://gpu-box:11434"));
        assert_eq!(options.timeout, Some(Duration::from_secs(300)));
        assert_eq!(options.models, vec!["llama3.2", "qwen3"]);
        assert_eq!(options.embedders, vec!["nomic-embed-text"]);
    }

    #[tokio::test]
    async fn test_declared_models_are_registered() {
        let registry = ActionRegistry::new();
        let plugin = OllamaPlugin::with_options(
            OllamaOptions::new()
                .host("http://localhost:11434")
                .model("llama3.2")
                .embedder("nomic-embed-text"),
        );

        let registered = registry.apply(&plugin).await.unwrap();
        assert_eq!(registered.len(), 2);
        assert!(registry.lookup_model("ollama/llama3.2").is_some());
        assert!(
            registry
                .lookup_embedder("ollama/nomic-embed-text")
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_no_declared_models_registers_nothing() {
        let registry = ActionRegistry::new();
        let plugin = OllamaPlugin::with_options(OllamaOptions::new().host(DEFAULT_HOST));

        let registered = registry.apply(&plugin).await.unwrap();
        assert!(registered.is_empty());
        assert!(registry.list(ActionKind::Model).is_empty());
    }
}
