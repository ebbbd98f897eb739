/// Provider-independent error taxonomy.
///
/// # Behavior Summary
///
/// | Kind | Whose fault | HTTP status | Transient? |
/// |------|-------------|-------------|------------|
/// | `InvalidInput` | Caller | 400 | No |
/// | `UpstreamUnconfigured` | Operator | 500 | No |
/// | `UpstreamRateLimited` | Provider quota | 500 | Yes |
/// | `UpstreamError` | Request/symbol rejected by provider | 500 | No |
/// | `NoData` | Nobody, provider has nothing | 500 | No |
/// | `TransportFailure` | Network or decoding | 500 | Yes |
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// Missing or malformed request parameter.
    InvalidInput,

    /// The provider credential is absent.
    UpstreamUnconfigured,

    /// The provider signalled throttling. Retry later.
    UpstreamRateLimited,

    /// The provider signalled an explicit error.
    UpstreamError,

    /// The provider returned no data for a valid request.
    NoData,

    /// The provider could not be reached or its response could not be read.
    TransportFailure,
}

impl ErrorKind {
    /// Whether retrying the same request later can succeed.
    pub fn is_transient(self) -> bool {
        matches!(self, Self::UpstreamRateLimited | Self::TransportFailure)
    }

    /// Whether the caller is at fault.
    pub fn is_client_error(self) -> bool {
        matches!(self, Self::InvalidInput)
    }
}
