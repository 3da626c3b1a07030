//! Provider Adapter System
//!
//! The adapter trait captures everything that differs between
//! OpenAI-compatible providers: base URL, auth style, extra headers,
//! request tweaks, and where reasoning content shows up in responses.

use crate::error::LlmError;
use crate::traits::ProviderCapabilities;

/// The type of request being prepared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Chat,
    Embedding,
    Models,
}

/// How the API key is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>` (the OpenAI default)
    Bearer,
    /// Key in a provider-specific header (e.g. Azure's `api-key`)
    Header(&'static str),
    /// No authentication (local providers)
    None,
}

/// Adapter for one OpenAI-compatible provider
pub trait ProviderAdapter: Send + Sync + std::fmt::Debug {
    /// Provider identifier, used as the action name prefix
    fn provider_id(&self) -> &'static str;

    /// Base URL used when the caller does not override it
    fn default_base_url(&self) -> &str;

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::Bearer
    }

    /// Additional headers this provider requires
    fn custom_headers(&self) -> reqwest::header::HeaderMap {
        reqwest::header::HeaderMap::new()
    }

    /// Adjust request parameters for provider-specific requirements.
    ///
    /// Most OpenAI-compatible providers need no changes; the default is a
    /// no-op.
    fn transform_request_params(
        &self,
        params: &mut serde_json::Value,
        model: &str,
        request_type: RequestType,
    ) -> Result<(), LlmError> {
        let _ = (params, model, request_type);
        Ok(())
    }

    /// Response fields that carry reasoning content, in priority order.
    fn thinking_fields(&self) -> &[&'static str] {
        &["thinking"]
    }

    /// What this provider supports.
    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::new()
            .with_chat()
            .with_streaming()
            .with_tools()
    }

    /// Check whether this provider accepts the model id.
    fn validate_model(&self, model: &str) -> Result<(), LlmError> {
        if model.is_empty() {
            return Err(LlmError::ConfigurationError(
                "Model name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
