//! OpenAI-compatible provider configuration.

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

use super::adapter::{AuthScheme, ProviderAdapter};
use crate::error::LlmError;
use crate::types::{CommonParams, HttpConfig};

/// Configuration for an OpenAI-compatible client
#[derive(Debug, Clone)]
pub struct CompatConfig {
    /// Provider identifier
    pub provider_id: String,
    /// API key; empty is only valid for `AuthScheme::None` providers
    pub api_key: SecretString,
    /// Base URL for the provider
    pub base_url: String,
    /// Model to use
    pub model: String,
    /// Common generation parameters
    pub common_params: CommonParams,
    /// HTTP configuration (timeout, proxy, headers)
    pub http_config: HttpConfig,
    /// Provider adapter for handling specifics
    pub adapter: Arc<dyn ProviderAdapter>,
}

impl CompatConfig {
    pub fn new(api_key: &str, base_url: &str, adapter: Arc<dyn ProviderAdapter>) -> Self {
        Self {
            provider_id: adapter.provider_id().to_string(),
            api_key: SecretString::from(api_key.to_string()),
            base_url: base_url.to_string(),
            model: String::new(),
            common_params: CommonParams::default(),
            http_config: HttpConfig::default(),
            adapter,
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_common_params(mut self, params: CommonParams) -> Self {
        self.common_params = params;
        self
    }

    pub fn with_http_config(mut self, config: HttpConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Validate the configuration. Runs before any I/O.
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.provider_id.is_empty() {
            return Err(LlmError::ConfigurationError(
                "Provider ID cannot be empty".to_string(),
            ));
        }

        if self.api_key.expose_secret().is_empty()
            && self.adapter.auth_scheme() != AuthScheme::None
        {
            return Err(LlmError::ConfigurationError(format!(
                "API key is required for provider '{}'",
                self.provider_id
            )));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(LlmError::ConfigurationError(
                "Base URL must start with http:// or https://".to_string(),
            ));
        }

        Ok(())
    }
}

/// Build the header set for a request against this configuration.
pub(crate) fn build_headers(
    config: &CompatConfig,
) -> Result<reqwest::header::HeaderMap, LlmError> {
    let mut headers = reqwest::header::HeaderMap::new();

    headers.insert(
        reqwest::header::CONTENT_TYPE,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    match config.adapter.auth_scheme() {
        AuthScheme::Bearer => {
            let value = format!("Bearer {}", config.api_key.expose_secret());
            headers.insert(
                reqwest::header::AUTHORIZATION,
                reqwest::header::HeaderValue::from_str(&value)
                    .map_err(|e| LlmError::ConfigurationError(format!("Invalid API key: {e}")))?,
            );
        }
        AuthScheme::Header(name) => {
            headers.insert(
                reqwest::header::HeaderName::from_static(name),
                reqwest::header::HeaderValue::from_str(config.api_key.expose_secret())
                    .map_err(|e| LlmError::ConfigurationError(format!("Invalid API key: {e}")))?,
            );
        }
        AuthScheme::None => {}
    }

    for (key, value) in &config.http_config.headers {
        let header_name = reqwest::header::HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| LlmError::ConfigurationError(format!("Invalid header name '{key}': {e}")))?;
        let header_value = reqwest::header::HeaderValue::from_str(value).map_err(|e| {
            LlmError::ConfigurationError(format!("Invalid header value '{value}': {e}"))
        })?;
        headers.insert(header_name, header_value);
    }

    for (key, value) in config.adapter.custom_headers().iter() {
        headers.insert(key, value.clone());
    }

    Ok(headers)
}
