use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sentinel for overview fields the provider did not supply.
pub const NOT_AVAILABLE: &str = "N/A";

/// Real-time quote merged with company overview data.
///
/// Numeric fields come from the real-time quote and are always present.
/// The string fields after `low` come from the company overview and degrade
/// to [`NOT_AVAILABLE`] individually.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,

    /// Latest trade price
    pub price: Decimal,

    /// Absolute change against the previous close
    pub change: Decimal,

    /// Percent change as numeric text, without the `%` suffix (e.g., "-1.2345")
    pub change_percent: String,

    pub volume: u64,

    pub previous_close: Decimal,

    pub open: Decimal,

    pub high: Decimal,

    pub low: Decimal,

    /// Market capitalization as numeric text, or "N/A"
    pub market_cap: String,

    /// Price-to-earnings ratio as numeric text, or "N/A"
    pub pe_ratio: String,

    /// Company name; falls back to the symbol
    pub name: String,

    pub sector: String,

    pub industry: String,

    pub description: String,
}
