//! Alpha Vantage API response models.
//!
//! Every field is optional: the provider omits blocks instead of failing, so
//! presence is checked explicitly by the classifier and the normalizer.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::errors::{ProviderNotices, ProviderPayload};

/// SYMBOL_SEARCH response
#[derive(Debug, Default, Deserialize)]
pub struct SymbolSearchResponse {
    #[serde(rename = "bestMatches")]
    pub best_matches: Option<Vec<SymbolMatch>>,
    #[serde(rename = "Error Message")]
    pub error_message: Option<String>,
    #[serde(rename = "Note")]
    pub note: Option<String>,
    #[serde(rename = "Information")]
    pub information: Option<String>,
}

/// One entry of `bestMatches`
#[derive(Debug, Default, Deserialize)]
pub struct SymbolMatch {
    #[serde(rename = "1. symbol")]
    pub symbol: Option<String>,
    #[serde(rename = "2. name")]
    pub name: Option<String>,
    #[serde(rename = "3. type")]
    pub security_type: Option<String>,
    #[serde(rename = "4. region")]
    pub region: Option<String>,
    #[serde(rename = "8. currency")]
    pub currency: Option<String>,
    // Note: API also returns marketOpen, marketClose, timezone and matchScore
}

/// GLOBAL_QUOTE response
#[derive(Debug, Default, Deserialize)]
pub struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    pub global_quote: Option<GlobalQuoteBlock>,
    #[serde(rename = "Error Message")]
    pub error_message: Option<String>,
    #[serde(rename = "Note")]
    pub note: Option<String>,
    #[serde(rename = "Information")]
    pub information: Option<String>,
}

/// The `Global Quote` block. Unknown symbols yield an empty object.
#[derive(Debug, Default, Deserialize)]
pub struct GlobalQuoteBlock {
    #[serde(rename = "01. symbol")]
    pub symbol: Option<String>,
    #[serde(rename = "02. open")]
    pub open: Option<String>,
    #[serde(rename = "03. high")]
    pub high: Option<String>,
    #[serde(rename = "04. low")]
    pub low: Option<String>,
    #[serde(rename = "05. price")]
    pub price: Option<String>,
    #[serde(rename = "06. volume")]
    pub volume: Option<String>,
    #[serde(rename = "07. latest trading day")]
    pub latest_trading_day: Option<String>,
    #[serde(rename = "08. previous close")]
    pub previous_close: Option<String>,
    #[serde(rename = "09. change")]
    pub change: Option<String>,
    #[serde(rename = "10. change percent")]
    pub change_percent: Option<String>,
}

impl GlobalQuoteBlock {
    fn is_empty(&self) -> bool {
        self.symbol.is_none()
            && self.open.is_none()
            && self.high.is_none()
            && self.low.is_none()
            && self.price.is_none()
            && self.volume.is_none()
            && self.latest_trading_day.is_none()
            && self.previous_close.is_none()
            && self.change.is_none()
            && self.change_percent.is_none()
    }
}

/// OVERVIEW response for company fundamentals
/// Only includes fields that map to Quote; API returns many more fields.
#[derive(Debug, Default, Deserialize)]
pub struct CompanyOverviewResponse {
    #[serde(rename = "Symbol")]
    pub symbol: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Sector")]
    pub sector: Option<String>,
    #[serde(rename = "Industry")]
    pub industry: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    pub market_capitalization: Option<String>,
    #[serde(rename = "PERatio")]
    pub pe_ratio: Option<String>,

    #[serde(rename = "Error Message")]
    pub error_message: Option<String>,
    #[serde(rename = "Note")]
    pub note: Option<String>,
    #[serde(rename = "Information")]
    pub information: Option<String>,
}

/// TIME_SERIES_* response with the series block already selected by period.
#[derive(Debug, Default)]
pub struct TimeSeriesResponse {
    /// Entries keyed by date or timestamp; keys sort chronologically.
    pub series: Option<BTreeMap<String, SeriesEntry>>,
    pub error_message: Option<String>,
    pub note: Option<String>,
    pub information: Option<String>,
}

/// One dated entry of a time series block
#[derive(Debug, Default, Deserialize)]
pub struct SeriesEntry {
    #[serde(rename = "1. open")]
    pub open: Option<String>,
    #[serde(rename = "2. high")]
    pub high: Option<String>,
    #[serde(rename = "3. low")]
    pub low: Option<String>,
    #[serde(rename = "4. close")]
    pub close: Option<String>,
    #[serde(rename = "5. volume")]
    pub volume: Option<String>,
}

/// Wire shape of a time series body. The series block name depends on the
/// requested function, so blocks are captured generically.
#[derive(Debug, Deserialize)]
struct RawTimeSeriesResponse {
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(flatten)]
    blocks: HashMap<String, serde_json::Value>,
}

impl TimeSeriesResponse {
    /// Parse a time series body, keeping only the block named `series_key`.
    pub fn parse(text: &str, series_key: &str) -> Result<Self, serde_json::Error> {
        let mut raw: RawTimeSeriesResponse = serde_json::from_str(text)?;
        let series = raw
            .blocks
            .remove(series_key)
            .map(serde_json::from_value::<BTreeMap<String, serde_json::Value>>)
            .transpose()?
            .map(|entries| {
                entries
                    .into_iter()
                    .map(|(date, value)| (date, decode_entry(value)))
                    .collect()
            });

        Ok(Self {
            series,
            error_message: raw.error_message,
            note: raw.note,
            information: raw.information,
        })
    }
}

/// A mistyped entry keeps its slot with every field empty, so the normalizer
/// drops it without shifting the window of most recent entries.
fn decode_entry(value: serde_json::Value) -> SeriesEntry {
    serde_json::from_value(value).unwrap_or_default()
}

impl ProviderPayload for SymbolSearchResponse {
    fn notices(&self) -> ProviderNotices<'_> {
        ProviderNotices {
            error_message: self.error_message.as_deref(),
            note: self.note.as_deref(),
            information: self.information.as_deref(),
        }
    }

    fn has_data(&self) -> bool {
        self.best_matches.is_some()
    }
}

impl ProviderPayload for GlobalQuoteResponse {
    fn notices(&self) -> ProviderNotices<'_> {
        ProviderNotices {
            error_message: self.error_message.as_deref(),
            note: self.note.as_deref(),
            information: self.information.as_deref(),
        }
    }

    fn has_data(&self) -> bool {
        self.global_quote.as_ref().is_some_and(|q| !q.is_empty())
    }
}

impl ProviderPayload for CompanyOverviewResponse {
    fn notices(&self) -> ProviderNotices<'_> {
        ProviderNotices {
            error_message: self.error_message.as_deref(),
            note: self.note.as_deref(),
            information: self.information.as_deref(),
        }
    }

    fn has_data(&self) -> bool {
        self.symbol.is_some()
    }
}

impl ProviderPayload for TimeSeriesResponse {
    fn notices(&self) -> ProviderNotices<'_> {
        ProviderNotices {
            error_message: self.error_message.as_deref(),
            note: self.note.as_deref(),
            information: self.information.as_deref(),
        }
    }

    fn has_data(&self) -> bool {
        self.series.is_some()
    }
}
