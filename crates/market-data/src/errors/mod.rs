//! Error types and upstream error classification for the market data crate.
//!
//! This module provides:
//! - [`GatewayError`]: The error returned by every gateway operation
//! - [`ErrorKind`]: The fixed, provider-independent error taxonomy
//! - [`ProviderFailure`]: Transport-level failures reaching or reading the provider
//! - [`classify`]: Maps a provider outcome to "proceed" or a [`GatewayError`]

mod classify;
mod kind;

pub use classify::{classify, Operation, ProviderNotices, ProviderPayload};
pub use kind::ErrorKind;

use thiserror::Error;

/// Fixed message for throttled requests. The provider's own wording is never surfaced.
pub const RATE_LIMIT_MESSAGE: &str = "API rate limit reached. Please try again later.";

/// Errors that can occur during gateway operations.
///
/// Every variant maps onto exactly one [`ErrorKind`] via [`kind`](Self::kind).
/// The `Display` output is the message placed in the `{error}` envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The caller supplied a missing or malformed parameter.
    #[error("{0}")]
    InvalidInput(String),

    /// No provider credential is configured. Operator error.
    #[error("Market data API key not configured")]
    UpstreamUnconfigured,

    /// The provider throttled the request.
    #[error("{}", RATE_LIMIT_MESSAGE)]
    UpstreamRateLimited,

    /// The provider reported an explicit error (e.g. an unknown symbol).
    /// The provider's message is passed through.
    #[error("{0}")]
    UpstreamError(String),

    /// The request was valid but the provider returned nothing for it.
    #[error("{0}")]
    NoData(String),

    /// Network, decode or normalization failure.
    #[error("{0}")]
    TransportFailure(String),
}

impl GatewayError {
    /// Returns the taxonomy kind for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use marketlens_market_data::errors::{ErrorKind, GatewayError};
    ///
    /// let error = GatewayError::UpstreamRateLimited;
    /// assert_eq!(error.kind(), ErrorKind::UpstreamRateLimited);
    /// assert!(error.is_transient());
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::UpstreamUnconfigured => ErrorKind::UpstreamUnconfigured,
            Self::UpstreamRateLimited => ErrorKind::UpstreamRateLimited,
            Self::UpstreamError(_) => ErrorKind::UpstreamError,
            Self::NoData(_) => ErrorKind::NoData,
            Self::TransportFailure(_) => ErrorKind::TransportFailure,
        }
    }

    /// Whether the caller may succeed by retrying the same request later.
    pub fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }
}

/// Failures reaching or reading the provider, before any payload inspection.
#[derive(Error, Debug)]
pub enum ProviderFailure {
    /// The request URL could not be built.
    #[error("Failed to build URL: {0}")]
    InvalidUrl(String),

    /// The request did not complete in time.
    #[error("Request to market data provider timed out")]
    Timeout,

    /// The provider answered with HTTP 429.
    #[error("Market data provider returned HTTP 429")]
    Throttled,

    /// The provider answered with a non-success HTTP status.
    #[error("Market data provider returned HTTP {0}")]
    Status(u16),

    /// Connection or body read failure.
    #[error("Failed to reach market data provider: {0}")]
    Request(#[from] reqwest::Error),

    /// The body was not the JSON shape expected for the operation.
    #[error("Failed to parse provider response: {0}")]
    Decode(#[from] serde_json::Error),
}
