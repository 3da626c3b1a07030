//! Azure AI Foundry plugin.
//!
//! Azure serves OpenAI models behind per-resource endpoints and
//! authenticates with an `api-key` header instead of a Bearer token.
//! Model actions map to the deployments on the resource; the known list
//! covers the standard model-named deployments, and resource-specific
//! deployment names are added with `deployment()`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::compat::{AuthScheme, CompatClient, CompatConfig, ProviderAdapter};
use crate::error::LlmError;
use crate::plugin::Plugin;
use crate::registry::{ActionRegistry, action_name};

/// Plugin identifier
pub const PLUGIN_NAME: &str = "azure";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "AZURE_OPENAI_API_KEY";

/// Environment variable holding the resource endpoint
pub const ENDPOINT_ENV: &str = "AZURE_OPENAI_ENDPOINT";

/// Azure model constants
pub mod models {
    pub const GPT_4O: &str = "gpt-4o";
    pub const GPT_4O_MINI: &str = "gpt-4o-mini";
    pub const GPT_4_1: &str = "gpt-4.1";
    pub const GPT_4_1_MINI: &str = "gpt-4.1-mini";
    pub const O3_MINI: &str = "o3-mini";

    /// Embedding models, registered as embedder actions
    pub const TEXT_EMBEDDING_3_SMALL: &str = "text-embedding-3-small";
    pub const TEXT_EMBEDDING_3_LARGE: &str = "text-embedding-3-large";

    /// Chat deployments registered by default
    pub const KNOWN: &[&str] = &[GPT_4O, GPT_4O_MINI, GPT_4_1, GPT_4_1_MINI, O3_MINI];

    /// Embedding deployments registered by default
    pub const KNOWN_EMBEDDERS: &[&str] = &[TEXT_EMBEDDING_3_SMALL, TEXT_EMBEDDING_3_LARGE];
}

/// Azure adapter
#[derive(Debug, Clone, Default)]
pub struct AzureAdapter;

impl ProviderAdapter for AzureAdapter {
    fn provider_id(&self) -> &'static str {
        PLUGIN_NAME
    }

    fn default_base_url(&self) -> &str {
        // There is no global endpoint; the resource endpoint is required.
        ""
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::Header("api-key")
    }
}

/// Azure plugin options
#[derive(Debug, Clone, Default)]
pub struct AzureOptions {
    api_key: Option<String>,
    endpoint: Option<String>,
    timeout: Option<Duration>,
    deployments: Vec<String>,
}

impl AzureOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit API key; overrides `AZURE_OPENAI_API_KEY`.
    pub fn api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Resource endpoint (`https://<resource>.openai.azure.com`); overrides
    /// `AZURE_OPENAI_ENDPOINT`.
    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Register a resource-specific deployment name as a chat model action.
    pub fn deployment<S: Into<String>>(mut self, name: S) -> Self {
        self.deployments.push(name.into());
        self
    }
}

/// Azure AI Foundry plugin
#[derive(Debug, Clone, Default)]
pub struct AzurePlugin {
    options: AzureOptions,
}

impl AzurePlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: AzureOptions) -> Self {
        Self { options }
    }

    fn resolve_endpoint(&self) -> Result<String, LlmError> {
        self.options
            .endpoint
            .clone()
            .or_else(|| std::env::var(ENDPOINT_ENV).ok().filter(|e| !e.is_empty()))
            .ok_or_else(|| {
                LlmError::ConfigurationError(format!(
                    "Missing {ENDPOINT_ENV} or explicit endpoint in plugin options"
                ))
            })
    }
}

#[async_trait]
impl Plugin for AzurePlugin {
    fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    async fn init(&self, registry: &ActionRegistry) -> Result<Vec<String>, LlmError> {
        let api_key = super::resolve_api_key(self.options.api_key.as_deref(), API_KEY_ENV)?;
        let endpoint = self.resolve_endpoint()?;
        let base_url = format!("{}/openai/v1", endpoint.trim_end_matches('/'));

        let adapter = Arc::new(AzureAdapter);
        let http_config = super::http_config_with_timeout(self.options.timeout);

        let build = |deployment: &str| -> Result<CompatClient, LlmError> {
            let config = CompatConfig::new(&api_key, &base_url, adapter.clone())
                .with_model(deployment)
                .with_http_config(http_config.clone());
            CompatClient::new(config)
        };

        let mut registered = Vec::new();
        for deployment in models::KNOWN
            .iter()
            .copied()
            .chain(self.options.deployments.iter().map(String::as_str))
        {
            registered.push(registry.register_model(
                action_name(PLUGIN_NAME, deployment),
                Arc::new(build(deployment)?),
            ));
        }

        for deployment in models::KNOWN_EMBEDDERS {
            registered.push(registry.register_embedder(
                action_name(PLUGIN_NAME, deployment),
                Arc::new(build(deployment)?),
            ));
        }

        Ok(registered)
    }
}
