//! Gateway client configuration.
//!
//! Defaults point to the production gateway. Override via environment
//! variables or explicit construction for staging/testing.

use url::Url;
use zeroize::Zeroizing;

/// Default base URL of the bills REST API.
pub const DEFAULT_API_URL: &str = "https://api.qiwi.com/partner/bill/v1/bills/";

/// Default hosted checkout page.
pub const DEFAULT_CHECKOUT_URL: &str = "https://oplata.qiwi.com/create";

/// Configuration for connecting to the gateway.
///
/// Custom `Debug` implementation redacts the `secret_key` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the bills API. Bill identifiers are appended as path
    /// segments.
    pub api_url: Url,
    /// Hosted checkout page used by payment-form links.
    pub checkout_url: Url,
    /// Merchant secret key: bearer token for API calls and the default
    /// notification signing secret.
    pub secret_key: Zeroizing<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("checkout_url", &self.checkout_url)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

impl ClientConfig {
    /// Production endpoints with the given secret key.
    pub fn new(secret_key: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_url("api_url", DEFAULT_API_URL)?,
            checkout_url: parse_url("checkout_url", DEFAULT_CHECKOUT_URL)?,
            secret_key: Zeroizing::new(secret_key.into()),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `QIWI_SECRET_KEY` (required)
    /// - `QIWI_API_URL` (default: `https://api.qiwi.com/partner/bill/v1/bills/`)
    /// - `QIWI_CHECKOUT_URL` (default: `https://oplata.qiwi.com/create`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret_key = std::env::var("QIWI_SECRET_KEY").map_err(|_| ConfigError::MissingKey)?;
        if secret_key.is_empty() {
            return Err(ConfigError::MissingKey);
        }

        Ok(Self {
            api_url: env_url("QIWI_API_URL", DEFAULT_API_URL)?,
            checkout_url: env_url("QIWI_CHECKOUT_URL", DEFAULT_CHECKOUT_URL)?,
            secret_key: Zeroizing::new(secret_key),
        })
    }

    /// Point the bills API at a local mock server (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if `base_url` cannot be parsed.
    pub fn local_mock(base_url: &str, secret_key: &str) -> Result<Self, ConfigError> {
        let api_url = format!("{}/partner/bill/v1/bills/", base_url.trim_end_matches('/'));
        Ok(Self {
            api_url: parse_url("api_url", &api_url)?,
            checkout_url: parse_url("checkout_url", DEFAULT_CHECKOUT_URL)?,
            secret_key: Zeroizing::new(secret_key.to_string()),
        })
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    parse_url(var, &raw)
}

fn parse_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(name.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("QIWI_SECRET_KEY environment variable is required")]
    MissingKey,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("secret key contains characters not allowed in an HTTP header")]
    InvalidKey,
}
