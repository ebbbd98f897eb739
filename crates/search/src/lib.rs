//! Client-side symbol search for MarketLens.
//!
//! - [`spawn_search_coordinator`] runs the debounced, stale-safe search state
//!   machine behind a [`SearchHandle`]
//! - [`GatewayClient`] calls the gateway's HTTP endpoints
//! - [`SymbolSearch`] is the backend seam; both the client and the in-process
//!   `MarketDataService` implement it

pub mod backend;
pub mod client;
pub mod coordinator;
pub mod errors;

pub use backend::SymbolSearch;
pub use client::{GatewayClient, SymbolSnapshot};
pub use coordinator::{
    spawn_search_coordinator, Phase, RequestToken, SearchEvent, SearchHandle, SearchView,
};
pub use errors::ClientError;
