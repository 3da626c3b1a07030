//! DeepSeek plugin.
//!
//! DeepSeek's API is fully OpenAI-compatible. The reasoning model returns
//! its thinking in the `reasoning_content` field, which the compat layer
//! surfaces as `ChatResponse::thinking` / `ThinkingDelta` events.
//!
//! # Usage
//! ```rust,no_run
//! use ensemble::providers::deepseek::DeepSeekPlugin;
//! use ensemble::registry::ActionRegistry;
//!
//! # async fn run() -> Result<(), ensemble::error::LlmError> {
//! let registry = ActionRegistry::new();
//! registry.apply(&DeepSeekPlugin::default()).await?;
//!
//! let model = registry.lookup_model("deepseek/deepseek-chat").unwrap();
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::compat::{CompatClient, CompatConfig, ProviderAdapter};
use crate::error::LlmError;
use crate::plugin::Plugin;
use crate::registry::{ActionRegistry, action_name};
use crate::traits::ProviderCapabilities;

/// Plugin identifier
pub const PLUGIN_NAME: &str = "deepseek";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

/// DeepSeek model constants
pub mod models {
    /// General purpose conversational model
    pub const CHAT: &str = "deepseek-chat";

    /// Reasoning model with thinking output
    pub const REASONER: &str = "deepseek-reasoner";

    /// Models registered by default
    pub const KNOWN: &[&str] = &[CHAT, REASONER];
}

/// DeepSeek adapter
#[derive(Debug, Clone, Default)]
pub struct DeepSeekAdapter;

impl ProviderAdapter for DeepSeekAdapter {
    fn provider_id(&self) -> &'static str {
        PLUGIN_NAME
    }

    fn default_base_url(&self) -> &str {
        "https://api.deepseek.com/v1"
    }

    fn thinking_fields(&self) -> &[&'static str] {
        &["reasoning_content", "thinking"]
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::new()
            .with_chat()
            .with_streaming()
            .with_tools()
            .with_custom_feature("reasoning", true)
    }
}

/// DeepSeek plugin options
#[derive(Debug, Clone, Default)]
pub struct DeepSeekOptions {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    custom_models: Vec<String>,
}

impl DeepSeekOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit API key; overrides `DEEPSEEK_API_KEY`.
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

    /// Register an additional model beyond the known list.
    pub fn custom_model<S: Into<String>>(mut self, model: S) -> Self {
        self.custom_models.push(model.into());
        self
    }
}

/// DeepSeek plugin
#[derive(Debug, Clone, Default)]
pub struct DeepSeekPlugin {
    options: DeepSeekOptions,
}

impl DeepSeekPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DeepSeekOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Plugin for DeepSeekPlugin {
    fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    async fn init(&self, registry: &ActionRegistry) -> Result<Vec<String>, LlmError> {
        let api_key = super::resolve_api_key(self.options.api_key.as_deref(), API_KEY_ENV)?;

        let adapter = Arc::new(DeepSeekAdapter);
        let base_url = self
            .options
            .base_url
            .clone()
            .unwrap_or_else(|| adapter.default_base_url().to_string());
        let http_config = super::http_config_with_timeout(self.options.timeout);

        let mut registered = Vec::new();
        for model in models::KNOWN
            .iter()
            .copied()
            .chain(self.options.custom_models.iter().map(String::as_str))
        {
            let config = CompatConfig::new(&api_key, &base_url, adapter.clone())
                .with_model(model)
                .with_http_config(http_config.clone());
            let client = CompatClient::new(config)?;
            registered.push(registry.register_model(
                action_name(PLUGIN_NAME, model),
                Arc::new(client),
            ));
        }

        Ok(registered)
    }
}
