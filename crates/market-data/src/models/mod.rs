//! Market data models
//!
//! This module contains the canonical, provider-independent result shapes:
//! - `search` - Symbol search result (SearchResult)
//! - `quote` - Real-time quote merged with company overview fields (Quote)
//! - `history` - Historical OHLCV bar (HistoricalBar)
//! - `period` - Historical series granularity (Period)

mod history;
mod period;
mod quote;
mod search;

pub use history::{HistoricalBar, HistoricalSeries};
pub use period::Period;
pub use quote::{Quote, NOT_AVAILABLE};
pub use search::SearchResult;
