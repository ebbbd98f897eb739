//! Market data provider trait definitions.
//!
//! This module defines the `MarketDataProvider` trait the gateway service
//! calls. The trait is the seam for test doubles: the service never talks to
//! HTTP directly.

use async_trait::async_trait;

use crate::errors::ProviderFailure;
use crate::models::Period;

use super::alpha_vantage::models::{
    CompanyOverviewResponse, GlobalQuoteResponse, SymbolSearchResponse, TimeSeriesResponse,
};

/// Outcome of the two independent quote sub-calls.
///
/// The quote side is mandatory; the overview side may fail without failing
/// the quote.
#[derive(Debug)]
pub struct QuoteOutcome {
    pub quote: Result<GlobalQuoteResponse, ProviderFailure>,
    pub overview: Result<CompanyOverviewResponse, ProviderFailure>,
}

/// Trait for the upstream market data provider.
///
/// Every method performs exactly one attempt per upstream call. Retry policy,
/// if any, belongs to the caller.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider, used in logs.
    fn id(&self) -> &'static str;

    /// Whether a credential is available. Checked before any network call.
    fn is_configured(&self) -> bool;

    /// Search symbols by keyword.
    async fn search(&self, query: &str) -> Result<SymbolSearchResponse, ProviderFailure>;

    /// Fetch the real-time quote block.
    async fn global_quote(&self, symbol: &str) -> Result<GlobalQuoteResponse, ProviderFailure>;

    /// Fetch company fundamentals.
    async fn company_overview(
        &self,
        symbol: &str,
    ) -> Result<CompanyOverviewResponse, ProviderFailure>;

    /// Fetch the time series for `period`, newest entries included.
    async fn history(
        &self,
        symbol: &str,
        period: Period,
    ) -> Result<TimeSeriesResponse, ProviderFailure>;

    /// Fetch quote and overview concurrently. Completes when both settle.
    async fn quote(&self, symbol: &str) -> QuoteOutcome {
        let (quote, overview) =
            tokio::join!(self.global_quote(symbol), self.company_overview(symbol));
        QuoteOutcome { quote, overview }
    }
}
