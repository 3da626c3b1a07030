//! Plugin trait.
//!
//! A plugin packages the actions of one provider: it resolves credentials,
//! wraps each known model in the shared OpenAI-compatible client, and
//! registers the result under provider-prefixed names.

use async_trait::async_trait;

use crate::error::LlmError;
use crate::registry::ActionRegistry;

/// A provider plugin
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Plugin (and action name prefix) identifier
    fn name(&self) -> &'static str;

    /// Register this plugin's actions.
    ///
    /// Credential resolution happens here, before any registration: a
    /// missing required credential returns `ConfigurationError` and leaves
    /// the registry untouched.
    async fn init(&self, registry: &ActionRegistry) -> Result<Vec<String>, LlmError>;
}
