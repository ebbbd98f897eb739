//! MarketLens Market Data Crate
//!
//! This crate implements the market-data gateway operations on top of the
//! Alpha Vantage API.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Symbol search (at most ten results, relevance order)
//! - Real-time quotes merged with company fundamentals
//! - Historical OHLCV series (daily, weekly, monthly, intraday)
//! - A fixed error taxonomy for every upstream failure mode
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |   Transport      | --> | MarketDataService|  (validate, orchestrate)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    Provider      |  (one HTTP call per operation)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   Classifier     |  (proceed or GatewayError)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   Normalizer     |  (canonical shapes)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`MarketDataService`] - Transport-agnostic gateway operations
//! - [`SearchResult`], [`Quote`], [`HistoricalBar`] - Normalized results
//! - [`Period`] - Historical series granularity
//! - [`GatewayError`] / [`ErrorKind`] - Error taxonomy

pub mod errors;
pub mod models;
pub mod normalizer;
pub mod provider;
pub mod service;

pub use errors::{ErrorKind, GatewayError};
pub use models::{HistoricalBar, HistoricalSeries, Period, Quote, SearchResult, NOT_AVAILABLE};
pub use provider::alpha_vantage::AlphaVantageProvider;
pub use provider::{MarketDataProvider, ProviderConfig, QuoteOutcome};
pub use service::MarketDataService;
