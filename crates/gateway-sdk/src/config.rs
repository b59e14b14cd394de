//! Client configuration for the Gateway SDK.

use gateway_core::Vendor;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

/// Configuration for the Gateway SDK client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the gateway server.
    pub(crate) base_url: Url,
    /// Bearer key for deployments behind an authenticating proxy.
    pub(crate) api_key: Option<SecretString>,
    /// Request timeout duration.
    pub(crate) timeout: Duration,
    /// Connection timeout duration.
    pub(crate) connect_timeout: Duration,
    /// User agent string.
    pub(crate) user_agent: String,
    /// Explicit vendor; `None` uses the gateway's defaults.
    pub(crate) provider: Option<Vendor>,
    /// Custom headers to include in requests.
    pub(crate) custom_headers: Vec<(String, String)>,
}

impl ClientConfig {
    /// Default gateway address.
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8080";
    /// Default request timeout. Upstream generation calls can take minutes.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);
    /// Default connection timeout (10 seconds).
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Default user agent.
    pub const DEFAULT_USER_AGENT: &'static str =
        concat!("gateway-sdk-rust/", env!("CARGO_PKG_VERSION"));

    /// Create a new configuration with default values.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_key: None,
            timeout: Self::DEFAULT_TIMEOUT,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            user_agent: Self::DEFAULT_USER_AGENT.to_string(),
            provider: None,
            custom_headers: Vec::new(),
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Check if an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub(crate) fn api_key_value(&self) -> Option<&str> {
        self.api_key.as_ref().map(|s| s.expose_secret().as_str())
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the explicit vendor, if any.
    pub fn provider(&self) -> Option<Vendor> {
        self.provider
    }

    /// Get the user agent.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let url = Url::parse("https://gateway.example.com").unwrap();
        let config = ClientConfig::new(url.clone());
        assert_eq!(config.base_url(), &url);
        assert!(!config.has_api_key());
        assert!(config.provider().is_none());
        assert_eq!(config.timeout(), ClientConfig::DEFAULT_TIMEOUT);
    }
}
