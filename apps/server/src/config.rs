use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use marketlens_market_data::provider::{ProviderConfig, DEFAULT_BASE_URL};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub api_key: Option<String>,
    pub provider_base_url: String,
    pub provider_timeout: Duration,
}

impl Config {
    /// Read the process environment, after loading `.env` if present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let listen_addr_raw =
            lookup("ML_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr: SocketAddr = listen_addr_raw
            .parse()
            .with_context(|| format!("Invalid ML_LISTEN_ADDR: {}", listen_addr_raw))?;

        let api_key = lookup("ALPHA_VANTAGE_API_KEY");
        let provider_base_url =
            lookup("ML_PROVIDER_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_ms = match lookup("ML_PROVIDER_TIMEOUT_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid ML_PROVIDER_TIMEOUT_MS: {}", raw))?,
            None => DEFAULT_TIMEOUT_MS,
        };

        Ok(Self {
            listen_addr,
            api_key,
            provider_base_url,
            provider_timeout: Duration::from_millis(timeout_ms),
        })
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig::new(self.api_key.clone())
            .with_base_url(self.provider_base_url.clone())
            .with_timeout(self.provider_timeout)
    }
}
