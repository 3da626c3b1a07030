//! xAI plugin.
//!
//! Grok models over xAI's OpenAI-compatible API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::compat::{CompatClient, CompatConfig, ProviderAdapter};
use crate::error::LlmError;
use crate::plugin::Plugin;
use crate::registry::{ActionRegistry, action_name};
use crate::traits::ProviderCapabilities;

/// Plugin identifier
pub const PLUGIN_NAME: &str = "xai";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "XAI_API_KEY";

/// xAI model constants
pub mod models {
    /// Flagship Grok model
    pub const GROK_3: &str = "grok-3";

    /// Lightweight reasoning model
    pub const GROK_3_MINI: &str = "grok-3-mini";

    /// Vision-capable model
    pub const GROK_2_VISION: &str = "grok-2-vision-1212";

    /// Models registered by default
    pub const KNOWN: &[&str] = &[GROK_3, GROK_3_MINI, GROK_2_VISION];
}

/// xAI adapter
#[derive(Debug, Clone, Default)]
pub struct XaiAdapter;

impl ProviderAdapter for XaiAdapter {
    fn provider_id(&self) -> &'static str {
        PLUGIN_NAME
    }

    fn default_base_url(&self) -> &str {
        "https://api.x.ai/v1"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::new()
            .with_chat()
            .with_streaming()
            .with_tools()
            .with_vision()
    }
}

/// xAI plugin options
#[derive(Debug, Clone, Default)]
pub struct XaiOptions {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    custom_models: Vec<String>,
}

impl XaiOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit API key; overrides `XAI_API_KEY`.
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

/// xAI plugin
#[derive(Debug, Clone, Default)]
pub struct XaiPlugin {
    options: XaiOptions,
}

impl XaiPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: XaiOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Plugin for XaiPlugin {
    fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    async fn init(&self, registry: &ActionRegistry) -> Result<Vec<String>, LlmError> {
        let api_key = super::resolve_api_key(self.options.api_key.as_deref(), API_KEY_ENV)?;

        let adapter = Arc::new(XaiAdapter);
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
