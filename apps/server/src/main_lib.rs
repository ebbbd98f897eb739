use std::sync::Arc;

use anyhow::Context;
use marketlens_market_data::{AlphaVantageProvider, MarketDataProvider, MarketDataService};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub market_data: MarketDataService,
}

/// JSON logs filtered by `RUST_LOG` (default `info`). `log` records from the
/// library crates are forwarded into the subscriber.
pub fn init_tracing() {
    let fmt_layer = fmt::layer().json().with_current_span(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let provider_config = config.provider_config();
    let client = reqwest::Client::builder()
        .timeout(provider_config.timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let provider = AlphaVantageProvider::with_client(client, provider_config);
    if provider.is_configured() {
        tracing::info!("Market data provider: {}", provider.id());
    } else {
        tracing::warn!("ALPHA_VANTAGE_API_KEY is not set; market data requests will fail");
    }

    Ok(Arc::new(AppState {
        market_data: MarketDataService::new(Arc::new(provider)),
    }))
}
