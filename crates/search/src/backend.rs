//! The symbol search seam used by the coordinator.

use async_trait::async_trait;
use marketlens_market_data::{MarketDataService, SearchResult};

use crate::errors::ClientError;

/// Anything that can answer a symbol search.
///
/// Implemented by [`GatewayClient`](crate::GatewayClient) for remote use and by
/// [`MarketDataService`] when the coordinator runs in-process.
#[async_trait]
pub trait SymbolSearch: Send + Sync {
    async fn search_symbols(&self, query: &str) -> Result<Vec<SearchResult>, ClientError>;
}

#[async_trait]
impl SymbolSearch for MarketDataService {
    async fn search_symbols(&self, query: &str) -> Result<Vec<SearchResult>, ClientError> {
        Ok(self.search(query).await?)
    }
}
