//! Search result models for symbol lookup.

use serde::{Deserialize, Serialize};

/// Result from a ticker/symbol search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Symbol/ticker (e.g., "AAPL", "SHOP.TRT")
    pub symbol: String,

    /// Display name (e.g., "Apple Inc.")
    pub name: String,

    /// Security type as reported by the provider (e.g., "Equity", "ETF")
    pub security_type: String,

    /// Market region (e.g., "United States")
    pub region: String,

    /// Trading currency (e.g., "USD")
    pub currency: String,
}

impl SearchResult {
    /// Create a new search result.
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        security_type: impl Into<String>,
        region: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            security_type: security_type.into(),
            region: region.into(),
            currency: currency.into(),
        }
    }
}
