use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One OHLCV period of a historical series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalBar {
    /// Calendar day (`YYYY-MM-DD`) or intraday timestamp (`YYYY-MM-DD HH:MM:SS`)
    pub date: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

/// Bars in ascending chronological order.
pub type HistoricalSeries = Vec<HistoricalBar>;
