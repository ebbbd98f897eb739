//! Gateway operations: validate, call the provider, classify, normalize.
//!
//! Each operation follows `Received -> Validated -> UpstreamCalled ->
//! Normalized -> Responded`, short-circuiting with a [`GatewayError`] at any
//! step. The service holds no mutable state and is safe to share across
//! concurrent requests.

use std::sync::Arc;

use log::{debug, warn};

use crate::errors::{classify, GatewayError, Operation};
use crate::models::{HistoricalSeries, Period, Quote, SearchResult};
use crate::normalizer::{normalize_history, normalize_quote, normalize_search};
use crate::provider::alpha_vantage::AlphaVantageProvider;
use crate::provider::{MarketDataProvider, ProviderConfig};

/// Transport-agnostic implementation of the search, quote and history operations.
#[derive(Clone)]
pub struct MarketDataService {
    provider: Arc<dyn MarketDataProvider>,
}

impl MarketDataService {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    /// Build a service backed by Alpha Vantage.
    pub fn from_config(config: ProviderConfig) -> Self {
        Self::new(Arc::new(AlphaVantageProvider::new(config)))
    }

    /// Search symbols by keyword. Returns at most ten results in relevance order.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, GatewayError> {
        let query = required("Query", query)?;
        self.ensure_configured()?;

        debug!("Searching for symbols: {}", query);
        let response = classify(Operation::Search, self.provider.search(query).await)?;
        Ok(normalize_search(response))
    }

    /// Fetch a quote merged with company overview data.
    ///
    /// The overview is best-effort: if it is unavailable for any reason the
    /// overview fields degrade to "N/A" and the quote still succeeds.
    pub async fn quote(&self, symbol: &str) -> Result<Quote, GatewayError> {
        let symbol = required("Symbol", symbol)?;
        self.ensure_configured()?;

        debug!("Fetching quote for symbol: {}", symbol);
        let outcome = self.provider.quote(symbol).await;

        let response = classify(Operation::Quote, outcome.quote)?;
        let Some(block) = response.global_quote else {
            return Err(GatewayError::NoData(
                "No quote data available for this symbol".to_string(),
            ));
        };

        let overview = match classify(Operation::Overview, outcome.overview) {
            Ok(overview) => Some(overview),
            Err(e) => {
                warn!("Company overview unavailable for {}: {}", symbol, e);
                None
            }
        };

        normalize_quote(symbol, &block, overview.as_ref())
    }

    /// Fetch up to the 100 most recent bars for `period`, oldest first.
    pub async fn history(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<HistoricalSeries, GatewayError> {
        let symbol = required("Symbol", symbol)?;
        self.ensure_configured()?;

        debug!(
            "Fetching historical data for symbol: {} period: {}",
            symbol, period
        );
        let response = classify(
            Operation::History,
            self.provider.history(symbol, period).await,
        )?;

        Ok(normalize_history(response.series.unwrap_or_default()))
    }

    /// History with the period given as text, as received on the wire.
    ///
    /// The symbol is validated before the period; an absent period means daily.
    pub async fn history_named(
        &self,
        symbol: &str,
        period: Option<&str>,
    ) -> Result<HistoricalSeries, GatewayError> {
        required("Symbol", symbol)?;
        let period = period.map(str::parse::<Period>).transpose()?.unwrap_or_default();
        self.history(symbol, period).await
    }

    fn ensure_configured(&self) -> Result<(), GatewayError> {
        if self.provider.is_configured() {
            Ok(())
        } else {
            Err(GatewayError::UpstreamUnconfigured)
        }
    }
}

/// Trimmed, non-empty parameter or `InvalidInput`.
fn required<'a>(name: &str, value: &'a str) -> Result<&'a str, GatewayError> {
    let value = value.trim();
    if value.is_empty() {
        Err(GatewayError::InvalidInput(format!(
            "{} parameter is required",
            name
        )))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Barrier;

    use crate::errors::{ErrorKind, ProviderFailure};
    use crate::provider::alpha_vantage::models::{
        CompanyOverviewResponse, GlobalQuoteResponse, SymbolSearchResponse, TimeSeriesResponse,
    };

    const QUOTE_JSON: &str = r#"{"Global Quote": {
        "01. symbol": "MSFT", "02. open": "410.00", "03. high": "415.50",
        "04. low": "408.25", "05. price": "414.74", "06. volume": "16250000",
        "07. latest trading day": "2024-05-10", "08. previous close": "412.32",
        "09. change": "2.4200", "10. change percent": "0.5869%"}}"#;

    /// Canned provider. `None` bodies simulate a timeout.
    #[derive(Default)]
    struct FakeProvider {
        configured: bool,
        search_json: Option<&'static str>,
        quote_json: Option<&'static str>,
        overview_json: Option<&'static str>,
        history_json: Option<&'static str>,
        barrier: Option<Barrier>,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn configured() -> Self {
            Self {
                configured: true,
                ..Default::default()
            }
        }

        fn respond<T: serde::de::DeserializeOwned>(
            &self,
            body: Option<&str>,
        ) -> Result<T, ProviderFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match body {
                Some(json) => Ok(serde_json::from_str(json)?),
                None => Err(ProviderFailure::Timeout),
            }
        }

        async fn rendezvous(&self) {
            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for FakeProvider {
        fn id(&self) -> &'static str {
            "FAKE"
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn search(&self, _query: &str) -> Result<SymbolSearchResponse, ProviderFailure> {
            self.respond(self.search_json)
        }

        async fn global_quote(
            &self,
            _symbol: &str,
        ) -> Result<GlobalQuoteResponse, ProviderFailure> {
            self.rendezvous().await;
            self.respond(self.quote_json)
        }

        async fn company_overview(
            &self,
            _symbol: &str,
        ) -> Result<CompanyOverviewResponse, ProviderFailure> {
            self.rendezvous().await;
            self.respond(self.overview_json)
        }

        async fn history(
            &self,
            _symbol: &str,
            period: Period,
        ) -> Result<TimeSeriesResponse, ProviderFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let key = match period {
                Period::Daily => "Time Series (Daily)",
                Period::Weekly => "Weekly Time Series",
                Period::Monthly => "Monthly Time Series",
                Period::Intraday => "Time Series (5min)",
            };
            match self.history_json {
                Some(json) => Ok(TimeSeriesResponse::parse(json, key)?),
                None => Err(ProviderFailure::Timeout),
            }
        }
    }

    fn service(provider: FakeProvider) -> (MarketDataService, Arc<FakeProvider>) {
        let provider = Arc::new(provider);
        (MarketDataService::new(provider.clone()), provider)
    }

    #[tokio::test]
    async fn test_blank_input_is_rejected_before_provider() {
        let (service, provider) = service(FakeProvider::configured());

        let err = service.search("   ").await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::InvalidInput("Query parameter is required".into())
        );
        let err = service.quote("").await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::InvalidInput("Symbol parameter is required".into())
        );
        let err = service.history("", Period::Daily).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_detected_before_network() {
        let (service, provider) = service(FakeProvider {
            quote_json: Some(QUOTE_JSON),
            ..Default::default()
        });

        assert_eq!(
            service.quote("MSFT").await.unwrap_err(),
            GatewayError::UpstreamUnconfigured
        );
        assert_eq!(
            service.search("micro").await.unwrap_err(),
            GatewayError::UpstreamUnconfigured
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_validation_precedes_configuration_check() {
        let (service, _) = service(FakeProvider::default());
        let err = service.search("").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_quote_survives_overview_failure() {
        let (service, _) = service(FakeProvider {
            quote_json: Some(QUOTE_JSON),
            overview_json: None,
            ..FakeProvider::configured()
        });

        let quote = service.quote("MSFT").await.unwrap();
        assert_eq!(quote.symbol, "MSFT");
        assert_eq!(quote.market_cap, "N/A");
        assert_eq!(quote.description, "N/A");
        assert_eq!(quote.name, "MSFT");
    }

    #[tokio::test]
    async fn test_quote_survives_overview_rate_limit() {
        let (service, _) = service(FakeProvider {
            quote_json: Some(QUOTE_JSON),
            overview_json: Some(r#"{"Note": "Thank you for using Alpha Vantage!"}"#),
            ..FakeProvider::configured()
        });

        let quote = service.quote("MSFT").await.unwrap();
        assert_eq!(quote.sector, "N/A");
    }

    #[tokio::test]
    async fn test_empty_quote_block_is_no_data_regardless_of_overview() {
        let (service, _) = service(FakeProvider {
            quote_json: Some(r#"{"Global Quote": {}}"#),
            overview_json: Some(r#"{"Symbol": "ZZZZINVALID", "Name": "Ghost"}"#),
            ..FakeProvider::configured()
        });

        let err = service.quote("ZZZZINVALID").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoData);
    }

    #[tokio::test]
    async fn test_quote_sub_calls_run_concurrently() {
        // Each sub-call waits for the other; sequential execution would hang.
        let (service, _) = service(FakeProvider {
            quote_json: Some(QUOTE_JSON),
            overview_json: Some(r#"{"Symbol": "MSFT", "Name": "Microsoft Corporation"}"#),
            barrier: Some(Barrier::new(2)),
            ..FakeProvider::configured()
        });

        let quote = tokio::time::timeout(Duration::from_secs(5), service.quote("MSFT"))
            .await
            .expect("quote sub-calls did not overlap")
            .unwrap();
        assert_eq!(quote.name, "Microsoft Corporation");
    }

    #[tokio::test]
    async fn test_history_named_validates_symbol_then_period() {
        let (service, provider) = service(FakeProvider::configured());

        let err = service.history_named("", Some("yearly")).await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::InvalidInput("Symbol parameter is required".into())
        );

        let err = service
            .history_named("AAPL", Some("yearly"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("yearly"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_history_named_defaults_to_daily() {
        let (service, _) = service(FakeProvider {
            history_json: Some(
                r#"{"Time Series (Daily)": {"2024-05-10": {"1. open": "1", "2. high": "2", "3. low": "0.5", "4. close": "1.5", "5. volume": "10"}}}"#,
            ),
            ..FakeProvider::configured()
        });

        let bars = service.history_named("AAPL", None).await.unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, "2024-05-10");
    }

    #[tokio::test]
    async fn test_missing_series_block_is_no_data() {
        let (service, _) = service(FakeProvider {
            history_json: Some(r#"{"Meta Data": {}}"#),
            ..FakeProvider::configured()
        });

        let err = service.history("IBM", Period::Weekly).await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::NoData("No historical data available for this symbol".into())
        );
    }

    #[tokio::test]
    async fn test_search_without_match_list_is_no_data() {
        let (service, _) = service(FakeProvider {
            search_json: Some("{}"),
            ..FakeProvider::configured()
        });

        let err = service.search("zzzz").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoData);
    }

    #[tokio::test]
    async fn test_search_empty_match_list_is_empty_success() {
        let (service, _) = service(FakeProvider {
            search_json: Some(r#"{"bestMatches": []}"#),
            ..FakeProvider::configured()
        });

        assert!(service.search("zzzz").await.unwrap().is_empty());
    }
}
