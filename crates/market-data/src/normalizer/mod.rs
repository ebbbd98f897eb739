//! Conversion of classified provider payloads into canonical models.
//!
//! Two failure policies apply:
//! - quotes are all-or-nothing: one unparseable number fails the quote
//! - series are partial-success: an unparseable entry is dropped

use std::collections::BTreeMap;
use std::str::FromStr;

use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::errors::GatewayError;
use crate::models::{HistoricalBar, HistoricalSeries, Quote, SearchResult, NOT_AVAILABLE};
use crate::provider::alpha_vantage::models::{
    CompanyOverviewResponse, GlobalQuoteBlock, SeriesEntry, SymbolSearchResponse,
};

/// Maximum number of search results returned.
pub const MAX_SEARCH_RESULTS: usize = 10;

/// Maximum number of historical bars returned (most recent periods).
pub const MAX_HISTORY_BARS: usize = 100;

/// Map the first [`MAX_SEARCH_RESULTS`] matches, keeping provider relevance order.
pub fn normalize_search(response: SymbolSearchResponse) -> Vec<SearchResult> {
    response
        .best_matches
        .unwrap_or_default()
        .into_iter()
        .take(MAX_SEARCH_RESULTS)
        .map(|m| {
            SearchResult::new(
                m.symbol.unwrap_or_default(),
                m.name.unwrap_or_default(),
                m.security_type.unwrap_or_default(),
                m.region.unwrap_or_default(),
                m.currency.unwrap_or_default(),
            )
        })
        .collect()
}

/// Merge a quote block with an optional overview.
///
/// `symbol` is the requested symbol, used when the provider omits one.
pub fn normalize_quote(
    symbol: &str,
    quote: &GlobalQuoteBlock,
    overview: Option<&CompanyOverviewResponse>,
) -> Result<Quote, GatewayError> {
    let change_percent = required_text("change percent", quote.change_percent.as_deref())?
        .trim_end_matches('%')
        .trim()
        .to_string();
    if parse_decimal(&change_percent).is_none() {
        return Err(malformed("change percent"));
    }

    let symbol = non_empty(quote.symbol.as_deref()).unwrap_or(symbol).to_string();
    let name = overview
        .and_then(|o| non_empty(o.name.as_deref()))
        .unwrap_or(&symbol)
        .to_string();

    Ok(Quote {
        price: required_decimal("price", quote.price.as_deref())?,
        change: required_decimal("change", quote.change.as_deref())?,
        change_percent,
        volume: required_text("volume", quote.volume.as_deref())
            .and_then(|v| parse_volume(v).ok_or_else(|| malformed("volume")))?,
        previous_close: required_decimal("previous close", quote.previous_close.as_deref())?,
        open: required_decimal("open", quote.open.as_deref())?,
        high: required_decimal("high", quote.high.as_deref())?,
        low: required_decimal("low", quote.low.as_deref())?,
        market_cap: overview_field(overview.and_then(|o| o.market_capitalization.as_deref())),
        pe_ratio: overview_field(overview.and_then(|o| o.pe_ratio.as_deref())),
        sector: overview_field(overview.and_then(|o| o.sector.as_deref())),
        industry: overview_field(overview.and_then(|o| o.industry.as_deref())),
        description: overview_field(overview.and_then(|o| o.description.as_deref())),
        name,
        symbol,
    })
}

/// Keep the most recent [`MAX_HISTORY_BARS`] entries in ascending order.
///
/// Keys sort chronologically, so the provider's own ordering is irrelevant.
pub fn normalize_history(series: BTreeMap<String, SeriesEntry>) -> HistoricalSeries {
    let mut bars: HistoricalSeries = series
        .into_iter()
        .rev()
        .take(MAX_HISTORY_BARS)
        .filter_map(|(date, entry)| {
            let bar = parse_bar(&date, &entry);
            if bar.is_none() {
                debug!("Dropping unparseable series entry for {}", date);
            }
            bar
        })
        .collect();

    bars.reverse();
    bars
}

fn parse_bar(date: &str, entry: &SeriesEntry) -> Option<HistoricalBar> {
    Some(HistoricalBar {
        date: date.to_string(),
        open: parse_decimal(entry.open.as_deref()?)?,
        high: parse_decimal(entry.high.as_deref()?)?,
        low: parse_decimal(entry.low.as_deref()?)?,
        close: parse_decimal(entry.close.as_deref()?)?,
        volume: parse_volume(entry.volume.as_deref()?)?,
    })
}

/// Parse a decimal value from a string. Rejects NaN and infinities.
fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Parse a non-negative integer volume, accepting a fractional notation.
fn parse_volume(s: &str) -> Option<u64> {
    let s = s.trim();
    s.parse::<u64>()
        .ok()
        .or_else(|| parse_decimal(s).and_then(|d| d.trunc().to_u64()))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn overview_field(value: Option<&str>) -> String {
    non_empty(value).unwrap_or(NOT_AVAILABLE).to_string()
}

fn malformed(field: &str) -> GatewayError {
    GatewayError::TransportFailure(format!(
        "Malformed quote from market data provider: invalid {}",
        field
    ))
}

fn required_text<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, GatewayError> {
    non_empty(value).ok_or_else(|| malformed(field))
}

fn required_decimal(field: &str, value: Option<&str>) -> Result<Decimal, GatewayError> {
    required_text(field, value).and_then(|v| parse_decimal(v).ok_or_else(|| malformed(field)))
}
