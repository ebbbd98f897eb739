//! Typed HTTP client for the gateway endpoints.

use async_trait::async_trait;
use marketlens_market_data::{HistoricalSeries, Period, Quote, SearchResult};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::SymbolSearch;
use crate::errors::ClientError;

const API_PREFIX: &str = "api/v1";

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
}

#[derive(Serialize)]
struct SymbolRequest<'a> {
    symbol: &'a str,
}

#[derive(Serialize)]
struct HistoryRequest<'a> {
    symbol: &'a str,
    period: Period,
}

#[derive(Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct HistoryResponse {
    data: HistoricalSeries,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: String,
}

/// Quote and history loaded together after a symbol is selected.
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolSnapshot {
    pub quote: Quote,
    pub history: HistoricalSeries,
}

/// Client for `POST /api/v1/finance-*`.
#[derive(Clone, Debug)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ClientError> {
        let response: SearchResponse = self
            .post("finance-search", &SearchRequest { query })
            .await?;
        Ok(response.results)
    }

    pub async fn quote(&self, symbol: &str) -> Result<Quote, ClientError> {
        self.post("finance-quote", &SymbolRequest { symbol }).await
    }

    pub async fn history(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<HistoricalSeries, ClientError> {
        let response: HistoryResponse = self
            .post("finance-history", &HistoryRequest { symbol, period })
            .await?;
        Ok(response.data)
    }

    /// Fetch quote and history in parallel. Fails if either call fails.
    pub async fn load_symbol(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<SymbolSnapshot, ClientError> {
        let (quote, history) = tokio::try_join!(self.quote(symbol), self.history(symbol, period))?;
        Ok(SymbolSnapshot { quote, history })
    }

    fn endpoint(&self, name: &str) -> Result<Url, ClientError> {
        let url = format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            API_PREFIX,
            name
        );
        Url::parse(&url).map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }

    async fn post<B, T>(&self, name: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(name)?;
        debug!(%url, "gateway request");

        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| envelope.error)
                .unwrap_or_else(|_| format!("Gateway returned HTTP {}", status.as_u16()));
            return Err(ClientError::Gateway {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl SymbolSearch for GatewayClient {
    async fn search_symbols(&self, query: &str) -> Result<Vec<SearchResult>, ClientError> {
        self.search(query).await
    }
}
