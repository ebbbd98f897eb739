//! Provider connection settings.

use std::time::Duration;

/// Default Alpha Vantage endpoint host.
pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";

/// Default timeout for a single upstream call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings injected into a provider at construction.
///
/// The API key is optional so that an unconfigured gateway can still start
/// and report `UpstreamUnconfigured` per request.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Create a config for the public endpoint with the given key.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            ..Default::default()
        }
    }

    /// Override the endpoint host (used for proxies and tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The API key, if present and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
