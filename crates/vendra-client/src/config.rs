//! # Client Configuration
//!
//! Connection settings for the backend.

use std::time::Duration;
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Configuration for the backend HTTP client.
///
/// ## Example
/// ```rust
/// use vendra_client::ClientConfig;
///
/// let config = ClientConfig::new("https://pos.example.com/api")
///     .unwrap()
///     .with_token("eyJ...")
///     .with_timeout_secs(10);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend, without a trailing slash.
    pub base_url: String,

    /// Bearer token, if a session has been established.
    pub token: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,
}

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

impl ClientConfig {
    /// Creates a configuration after validating the base URL.
    ///
    /// ## Rules
    /// - Must parse as an absolute http(s) URL
    /// - A trailing slash is stripped so path joining stays uniform
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let raw = base_url.into();

        let parsed = Url::parse(&raw)
            .map_err(|e| ClientError::InvalidConfig(format!("invalid base URL: {}", e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ClientError::InvalidConfig(format!(
                "unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        Ok(ClientConfig {
            base_url: raw.trim_end_matches('/').to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Sets the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the per-request timeout in seconds.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_base_url() {
        let config = ClientConfig::new("https://pos.example.com/api/").unwrap();
        assert_eq!(config.base_url, "https://pos.example.com/api");
        assert!(config.token.is_none());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(ClientConfig::new("not a url").is_err());
        assert!(ClientConfig::new("ftp://example.com").is_err());
    }

    #[test]
    fn test_builders() {
        let config = ClientConfig::new("http://localhost:3000")
            .unwrap()
            .with_token("tok")
            .with_timeout_secs(5);

        assert_eq!(config.token.as_deref(), Some("tok"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
