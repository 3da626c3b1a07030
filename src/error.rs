//! Error Handling
//!
//! Core error type for the library. Every fallible operation returns
//! `Result<T, LlmError>`; the retry layer uses `is_retryable()` and the
//! server adapters use `user_message()` for outward-facing error text.

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone)]
pub enum LlmError {
    /// Provider API returned a non-success response
    #[error("API error {code}: {message}")]
    ApiError {
        /// HTTP status code
        code: u16,
        /// Error message from the provider
        message: String,
        /// Raw error body, when it parsed as JSON
        details: Option<serde_json::Value>,
    },

    /// HTTP transport failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Invalid or incomplete configuration, detected before any I/O
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Credential was rejected by the provider
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failure inside a streaming response
    #[error("Stream error: {0}")]
    StreamError(String),

    /// Caller-supplied input was rejected locally
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The provider or action does not support the requested operation
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A named action or resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invariant violation inside the library
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Coarse error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller or configuration mistake
    Client,
    /// Provider-side failure
    Server,
    /// Transport-level failure
    Network,
    /// Credential problem
    Auth,
    /// Everything else
    Other,
}

impl LlmError {
    /// Construct an `ApiError`, parsing the message as JSON details when possible.
    pub fn api_error(code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        let details = serde_json::from_str(&message).ok();
        Self::ApiError {
            code,
            message,
            details,
        }
    }

    /// Classify the error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError { code, .. } => match code {
                401 | 403 => ErrorCategory::Auth,
                400..=499 => ErrorCategory::Client,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Other,
            },
            Self::HttpError(_) | Self::StreamError(_) => ErrorCategory::Network,
            Self::AuthenticationError(_) => ErrorCategory::Auth,
            Self::ConfigurationError(_) | Self::InvalidInput(_) | Self::NotFound(_) => {
                ErrorCategory::Client
            }
            _ => ErrorCategory::Other,
        }
    }

    /// Whether a retry has any chance of succeeding.
    ///
    /// Rate limits, provider-side failures, and transport errors are
    /// retryable; configuration and parse errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ApiError { code, .. } => *code == 429 || (500..=599).contains(code),
            Self::HttpError(_) | Self::StreamError(_) => true,
            _ => false,
        }
    }

    /// A short message safe to show to end users.
    ///
    /// Strips provider response bodies, which may echo request content.
    pub fn user_message(&self) -> String {
        match self {
            Self::ApiError { code, .. } => format!("upstream API error (status {code})"),
            Self::HttpError(_) => "network error".to_string(),
            Self::StreamError(_) => "stream interrupted".to_string(),
            Self::AuthenticationError(_) => "authentication failed".to_string(),
            Self::ConfigurationError(msg) | Self::InvalidInput(msg) | Self::NotFound(msg) => {
                msg.clone()
            }
            Self::UnsupportedOperation(msg) => msg.clone(),
            Self::ParseError(_) | Self::InternalError(_) => "internal error".to_string(),
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}
