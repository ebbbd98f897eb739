//! Alpha Vantage market data provider implementation.
//!
//! This module provides market data from the Alpha Vantage API:
//! - Symbol search via SYMBOL_SEARCH
//! - Real-time quotes via GLOBAL_QUOTE, fundamentals via OVERVIEW
//! - Historical bars via TIME_SERIES_{DAILY,WEEKLY,MONTHLY,INTRADAY}
//!
//! Note: Alpha Vantage free tier is limited to 5 API calls per minute. Limits
//! are not enforced locally; throttling notices surface as rate-limit errors.

pub mod models;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::errors::ProviderFailure;
use crate::models::Period;
use crate::provider::{MarketDataProvider, ProviderConfig};

use models::{
    CompanyOverviewResponse, GlobalQuoteResponse, SymbolSearchResponse, TimeSeriesResponse,
};

const PROVIDER_ID: &str = "ALPHA_VANTAGE";
const INTRADAY_INTERVAL: &str = "5min";

/// Alpha Vantage market data provider.
pub struct AlphaVantageProvider {
    client: Client,
    config: ProviderConfig,
}

impl AlphaVantageProvider {
    /// Create a new Alpha Vantage provider from injected settings.
    pub fn new(config: ProviderConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    /// Create a provider sharing an existing HTTP client (and its pool).
    pub fn with_client(client: Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }

    /// Build the request URL. The API key is always the last parameter.
    fn build_url(&self, params: &[(&str, &str)]) -> Result<Url, ProviderFailure> {
        let endpoint = format!("{}/query", self.config.base_url.trim_end_matches('/'));
        let api_key = self.config.api_key().unwrap_or_default();

        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", api_key));

        Url::parse_with_params(&endpoint, &all_params)
            .map_err(|e| ProviderFailure::InvalidUrl(e.to_string()))
    }

    /// Render a URL for logging with the API key masked.
    fn redact(&self, url: &Url) -> String {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(name, value)| {
                let value = if name == "apikey" {
                    "***".to_string()
                } else {
                    value.into_owned()
                };
                (name.into_owned(), value)
            })
            .collect();

        let mut masked = url.clone();
        masked.query_pairs_mut().clear().extend_pairs(&pairs);
        masked.to_string()
    }

    /// Make a request to the Alpha Vantage API.
    async fn fetch(&self, params: &[(&str, &str)]) -> Result<String, ProviderFailure> {
        let url = self.build_url(params)?;

        debug!("Alpha Vantage request: {}", self.redact(&url));

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderFailure::Timeout
            } else {
                ProviderFailure::Request(e)
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderFailure::Throttled);
        }

        if !status.is_success() {
            return Err(ProviderFailure::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                ProviderFailure::Timeout
            } else {
                ProviderFailure::Request(e)
            }
        })
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, ProviderFailure> {
        let text = self.fetch(params).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Upstream function selector for a period.
fn series_function(period: Period) -> &'static str {
    match period {
        Period::Daily => "TIME_SERIES_DAILY",
        Period::Weekly => "TIME_SERIES_WEEKLY",
        Period::Monthly => "TIME_SERIES_MONTHLY",
        Period::Intraday => "TIME_SERIES_INTRADAY",
    }
}

/// Name of the series block in the response for a period.
fn series_key(period: Period) -> &'static str {
    match period {
        Period::Daily => "Time Series (Daily)",
        Period::Weekly => "Weekly Time Series",
        Period::Monthly => "Monthly Time Series",
        Period::Intraday => "Time Series (5min)",
    }
}

#[async_trait]
impl MarketDataProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn is_configured(&self) -> bool {
        self.config.api_key().is_some()
    }

    async fn search(&self, query: &str) -> Result<SymbolSearchResponse, ProviderFailure> {
        let params = [("function", "SYMBOL_SEARCH"), ("keywords", query)];
        let response: SymbolSearchResponse = self.fetch_json(&params).await?;

        debug!(
            "Alpha Vantage: {} matches for '{}'",
            response.best_matches.as_ref().map_or(0, Vec::len),
            query
        );

        Ok(response)
    }

    async fn global_quote(&self, symbol: &str) -> Result<GlobalQuoteResponse, ProviderFailure> {
        let params = [("function", "GLOBAL_QUOTE"), ("symbol", symbol)];
        self.fetch_json(&params).await
    }

    async fn company_overview(
        &self,
        symbol: &str,
    ) -> Result<CompanyOverviewResponse, ProviderFailure> {
        let params = [("function", "OVERVIEW"), ("symbol", symbol)];
        self.fetch_json(&params).await
    }

    async fn history(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<TimeSeriesResponse, ProviderFailure> {
        let mut params = vec![("function", series_function(period)), ("symbol", symbol)];
        if period == Period::Intraday {
            params.push(("interval", INTRADAY_INTERVAL));
        }

        let text = self.fetch(&params).await?;
        let response = TimeSeriesResponse::parse(&text, series_key(period))?;

        debug!(
            "Alpha Vantage: fetched {} {} entries for {}",
            response.series.as_ref().map_or(0, |s| s.len()),
            period,
            symbol
        );

        Ok(response)
    }
}
