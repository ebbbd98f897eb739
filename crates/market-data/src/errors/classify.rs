//! Upstream error classification.
//!
//! The provider signals errors inconsistently: sometimes an explicit
//! `Error Message`, sometimes a `Note` or `Information` about throttling, and
//! sometimes by silently omitting the data block. [`classify`] applies one
//! detection order to every operation.

use log::warn;

use super::{GatewayError, ProviderFailure};

/// Upstream message fields shared by every provider payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProviderNotices<'a> {
    /// `Error Message`: invalid call or unknown symbol.
    pub error_message: Option<&'a str>,
    /// `Note`: throttling notice.
    pub note: Option<&'a str>,
    /// `Information`: throttling or plan notice.
    pub information: Option<&'a str>,
}

/// A parsed provider payload that can be inspected before normalization.
pub trait ProviderPayload {
    /// The upstream message fields of this payload.
    fn notices(&self) -> ProviderNotices<'_>;

    /// Whether the data block expected for the operation is present.
    fn has_data(&self) -> bool;
}

/// The logical operation a payload belongs to. Selects the `NoData` message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operation {
    Search,
    Quote,
    Overview,
    History,
}

impl Operation {
    fn no_data_message(self) -> &'static str {
        match self {
            Self::Search => "No search results available for this query",
            Self::Quote => "No quote data available for this symbol",
            Self::Overview => "No company overview available for this symbol",
            Self::History => "No historical data available for this symbol",
        }
    }
}

/// Classifies a provider outcome.
///
/// Detection order, first match wins:
/// 1. transport or decode failure
/// 2. explicit `Error Message`
/// 3. throttling `Note` (or an `Information` mentioning a rate limit)
/// 4. missing data block
/// 5. proceed
pub fn classify<P: ProviderPayload>(
    operation: Operation,
    outcome: Result<P, ProviderFailure>,
) -> Result<P, GatewayError> {
    let payload = match outcome {
        Ok(payload) => payload,
        Err(ProviderFailure::Throttled) => return Err(GatewayError::UpstreamRateLimited),
        Err(failure) => return Err(GatewayError::TransportFailure(failure.to_string())),
    };

    let notices = payload.notices();

    if let Some(message) = notices.error_message {
        return Err(GatewayError::UpstreamError(message.to_string()));
    }

    if notices.note.is_some() {
        return Err(GatewayError::UpstreamRateLimited);
    }

    if let Some(info) = notices.information {
        if mentions_rate_limit(info) {
            return Err(GatewayError::UpstreamRateLimited);
        }
        warn!("Alpha Vantage info ({:?}): {}", operation, info);
    }

    if !payload.has_data() {
        return Err(GatewayError::NoData(operation.no_data_message().to_string()));
    }

    Ok(payload)
}

fn mentions_rate_limit(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("rate limit") || lower.contains("call frequency")
}
