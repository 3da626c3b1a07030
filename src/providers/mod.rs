//! Provider plugins.
//!
//! Every plugin follows the same control flow: resolve credentials
//! (explicit option first, then the provider's environment variable,
//! failing fast if both are absent), wrap each known model in the shared
//! OpenAI-compatible client, append caller-registered custom models, and
//! return the registered action names.

#[cfg(feature = "azure")]
pub mod azure;
#[cfg(feature = "deepseek")]
pub mod deepseek;
#[cfg(feature = "mistral")]
pub mod mistral;
#[cfg(feature = "ollama")]
pub mod ollama;
#[cfg(feature = "pinecone")]
pub mod pinecone;
#[cfg(feature = "xai")]
pub mod xai;

use std::time::Duration;

use crate::error::LlmError;
use crate::types::HttpConfig;

/// Resolve an API key: explicit option first, then the environment.
pub(crate) fn resolve_api_key(explicit: Option<&str>, env_var: &str) -> Result<String, LlmError> {
    if let Some(key) = explicit
        && !key.is_empty()
    {
        return Ok(key.to_string());
    }

    std::env::var(env_var)
        .ok()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            LlmError::ConfigurationError(format!(
                "Missing {env_var} or explicit api_key in plugin options"
            ))
        })
}

/// HTTP configuration with an optional timeout override.
pub(crate) fn http_config_with_timeout(timeout: Option<Duration>) -> HttpConfig {
    match timeout {
        Some(timeout) => HttpConfig::builder().timeout(timeout).build(),
        None => HttpConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_key_wins() {
        let key = resolve_api_key(Some("explicit"), "ENSEMBLE_TEST_UNSET_VAR").unwrap();
        assert_eq!(key, "explicit");
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let result = resolve_api_key(None, "ENSEMBLE_TEST_UNSET_VAR");
        match result {
            Err(LlmError::ConfigurationError(msg)) => {
                assert!(msg.contains("ENSEMBLE_TEST_UNSET_VAR"))
            }
            other => panic!("expected ConfigurationError, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_explicit_key_falls_through() {
        assert!(resolve_api_key(Some(""), "ENSEMBLE_TEST_UNSET_VAR").is_err());
    }
}
