//! Gateway configuration.
//!
//! Supports reading the API endpoint from the `TASKMATE_API_URL`
//! environment variable, falling back to the local development server.

use std::env;
use std::time::Duration;

/// Connection settings shared by the HTTP gateways.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Base URL of the Taskmate backend, without a trailing slash.
    pub base_url: String,
    /// Bound applied to every request; a request that exceeds it fails
    /// exactly like a rejected one.
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Default backend endpoint for local development.
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8000";

    /// Default request timeout (policy value).
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates a configuration for the given endpoint with the default
    /// timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads the endpoint from `TASKMATE_API_URL`, falling back to
    /// [`GatewayConfig::DEFAULT_BASE_URL`].
    pub fn from_env() -> Self {
        let base_url =
            env::var("TASKMATE_API_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_trailing_slash_is_normalized() {
        let config = GatewayConfig::new("https://api.example.com/");
        assert_eq!(config.base_url, "https://api.example.com");
    }

    #[test]
    fn test_timeout_override() {
        let config = GatewayConfig::default().with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
