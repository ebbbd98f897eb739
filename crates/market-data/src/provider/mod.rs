//! Market data provider abstraction and the Alpha Vantage implementation.
//!
//! This module contains:
//! - The `MarketDataProvider` trait the gateway service calls
//! - `ProviderConfig`, the injected credential and connection settings
//! - The Alpha Vantage client and its raw response models
//!
//! Providers return raw payloads or a `ProviderFailure`; they never decide
//! what a payload means. Classification and normalization happen in the
//! `errors` and `normalizer` modules.

mod config;
mod traits;

pub mod alpha_vantage;

// Re-exports
pub use config::{ProviderConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use traits::{MarketDataProvider, QuoteOutcome};
