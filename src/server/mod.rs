//! Server adapters.
//!
//! Exposes a registry's actions over HTTP. Enabled with the
//! `server-adapters` feature.

pub mod axum;

/// SSE encoding options
#[derive(Debug, Clone)]
pub struct SseOptions {
    /// Emit the `start` event with response metadata
    pub include_start: bool,
    /// Emit the `end` event with the final response
    pub include_end: bool,
    /// Emit `usage` events
    pub include_usage: bool,
    /// Replace error details with a generic message
    pub mask_errors: bool,
    /// Message used when `mask_errors` is set
    pub masked_error_message: Option<String>,
}

impl Default for SseOptions {
    fn default() -> Self {
        Self {
            include_start: true,
            include_end: true,
            include_usage: true,
            mask_errors: false,
            masked_error_message: None,
        }
    }
}

impl SseOptions {
    /// Production settings: mask error details from clients.
    pub fn production() -> Self {
        Self {
            mask_errors: true,
            ..Self::default()
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Path prefix for all routes
    pub base_path: String,
    /// SSE encoding options for streaming routes
    pub sse: SseOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: crate::defaults::server::HOST.to_string(),
            port: crate::defaults::server::PORT,
            base_path: crate::defaults::server::BASE_PATH.to_string(),
            sse: SseOptions::default(),
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn base_path<S: Into<String>>(mut self, base_path: S) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn sse(mut self, sse: SseOptions) -> Self {
        self.sse = sse;
        self
    }

    /// Socket address string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
