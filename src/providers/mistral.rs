//! Mistral plugin.
//!
//! Mistral's La Plateforme is OpenAI-compatible. Besides the chat models,
//! the plugin registers `mistral-embed` as an embedder action.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::compat::{CompatClient, CompatConfig, ProviderAdapter};
use crate::error::LlmError;
use crate::plugin::Plugin;
use crate::registry::{ActionRegistry, action_name};

/// Plugin identifier
pub const PLUGIN_NAME: &str = "mistral";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "MISTRAL_API_KEY";

/// Mistral model constants
pub mod models {
    /// Flagship model
    pub const LARGE: &str = "mistral-large-latest";

    /// Small, fast model
    pub const SMALL: &str = "mistral-small-latest";

    /// Open-weights model
    pub const OPEN_NEMO: &str = "open-mistral-nemo";

    /// Code generation model
    pub const CODESTRAL: &str = "codestral-latest";

    /// Embedding model, registered as an embedder action
    pub const EMBED: &str = "mistral-embed";

    /// Chat models registered by default
    pub const KNOWN: &[&str] = &[LARGE, SMALL, OPEN_NEMO, CODESTRAL];
}

/// Mistral adapter
#[derive(Debug, Clone, Default)]
pub struct MistralAdapter;

impl ProviderAdapter for MistralAdapter {
    fn provider_id(&self) -> &'static str {
        PLUGIN_NAME
    }

    fn default_base_url(&self) -> &str {
        "https://api.mistral.ai/v1"
    }
}

/// Mistral plugin options
#[derive(Debug, Clone, Default)]
pub struct MistralOptions {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    custom_models: Vec<String>,
}

impl MistralOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit API key; overrides `MISTRAL_API_KEY`.
    pub fn api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Custom base URL (optional)
    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Register an additional chat model beyond the known list.
    pub fn custom_model<S: Into<String>>(mut self, model: S) -> Self {
        self.custom_models.push(model.into());
        self
    }
}

/// Mistral plugin
#[derive(Debug, Clone, Default)]
pub struct MistralPlugin {
    options: MistralOptions,
}

impl MistralPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: MistralOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Plugin for MistralPlugin {
    fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    async fn init(&self, registry: &ActionRegistry) -> Result<Vec<String>, LlmError> {
        let api_key = super::resolve_api_key(self.options.api_key.as_deref(), API_KEY_ENV)?;

        let adapter = Arc::new(MistralAdapter);
        let base_url = self
            .options
            .base_url
            .clone()
            .unwrap_or_else(|| adapter.default_base_url().to_string());
        let http_config = super::http_config_with_timeout(self.options.timeout);

        let build = |model: &str| -> Result<CompatClient, LlmError> {
            let config = CompatConfig::new(&api_key, &base_url, adapter.clone())
                .with_model(model)
                .with_http_config(http_config.clone());
            CompatClient::new(config)
        };

        let mut registered = Vec::new();
        for model in models::KNOWN
            .iter()
            .copied()
            .chain(self.options.custom_models.iter().map(String::as_str))
        {
            registered.push(registry.register_model(
                action_name(PLUGIN_NAME, model),
                Arc::new(build(model)?),
            ));
        }

        registered.push(registry.register_embedder(
            action_name(PLUGIN_NAME, models::EMBED),
            Arc::new(build(models::EMBED)?),
        ));

        Ok(registered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ActionKind;

    #[test]
    fn test_plugin_name() {
        assert_eq!(MistralPlugin::default().name(), "mistral");
    }

    #[test]
    fn test_default_base_url() {
        assert_eq!(
            MistralAdapter.default_base_url(),
            "https://api.mistral.ai/v1"
        );
    }

    #[test]
    fn test_options_builder_chaining() {
        let options = MistralOptions::new()
            .api_key("key")
            .timeout(Duration::from_secs(10))
            .custom_model("ministral-8b-latest");

        assert_eq!(options.api_key.as_deref(), Some("key"));
        assert_eq!(options.timeout, Some(Duration::from_secs(10)));
        assert_eq!(options.custom_models, vec!["ministral-8b-latest"]);
        assert!(options.base_url.is_none());
    }

    #[tokio::test]
    async fn test_init_registers_chat_models_and_embedder() {
        let registry = ActionRegistry::new();
        let plugin = MistralPlugin::with_options(MistralOptions::new().api_key("key"));

        let registered = registry.apply(&plugin).await.unwrap();
        // Known chat models plus the embedder.
        assert_eq!(registered.len(), models::KNOWN.len() + 1);
        assert_eq!(registry.list(ActionKind::Model).len(), models::KNOWN.len());
        assert!(
            registry
                .lookup_embedder("mistral/mistral-embed")
                .is_some()
        );
        assert!(
            registry
                .lookup_model("mistral/mistral-large-latest")
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_custom_models_increase_action_count() {
        let registry = ActionRegistry::new();
        let plugin = MistralPlugin::with_options(
            MistralOptions::new()
                .api_key("key")
                .custom_model("ministral-3b-latest"),
        );

        let registered = registry.apply(&plugin).await.unwrap();
        assert_eq!(registered.len(), models::KNOWN.len() + 2);
        assert!(
            registry
                .lookup_model("mistral/ministral-3b-latest")
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_fast() {
        let original = std::env::var(API_KEY_ENV).ok();
        unsafe { std::env::remove_var(API_KEY_ENV) };

        let registry = ActionRegistry::new();
        let result = registry.apply(&MistralPlugin::default()).await;
        assert!(matches!(result, Err(LlmError::ConfigurationError(_))));

        if let Some(value) = original {
            unsafe { std::env::set_var(API_KEY_ENV, value) };
        }
    }
}
