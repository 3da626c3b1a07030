//! Library-wide default values.

/// HTTP defaults applied by `HttpConfig::default()`.
pub mod http {
    use std::time::Duration;

    /// Default request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

    /// Default connect timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default `User-Agent` header value.
    pub const USER_AGENT: &str = concat!("ensemble/", env!("CARGO_PKG_VERSION"));
}

/// Server adapter defaults.
#[cfg(feature = "server-adapters")]
pub mod server {
    /// Default bind host.
    pub const HOST: &str = "127.0.0.1";

    /// Default bind port.
    pub const PORT: u16 = 3400;

    /// Default API base path.
    pub const BASE_PATH: &str = "/api";
}
