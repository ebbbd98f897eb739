//! Errors returned by search backends.

use marketlens_market_data::GatewayError;
use thiserror::Error;

/// Failure of a gateway call made from the client side.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The gateway answered with an `{error}` envelope.
    #[error("{message}")]
    Gateway { status: u16, message: String },

    /// An in-process gateway operation failed.
    #[error(transparent)]
    Service(#[from] GatewayError),

    /// The gateway base URL could not be joined with an endpoint path.
    #[error("Invalid gateway URL: {0}")]
    InvalidUrl(String),

    /// Connection or body read failure.
    #[error("Failed to reach gateway: {0}")]
    Request(#[from] reqwest::Error),

    /// A success body did not match the expected shape.
    #[error("Failed to parse gateway response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status reported by the gateway, if the failure came from an envelope.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Gateway { status, .. } => Some(*status),
            _ => None,
        }
    }
}
