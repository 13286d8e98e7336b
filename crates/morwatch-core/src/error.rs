use thiserror::Error;

/// Failure of a single router API call, carried as data.
///
/// Transport never panics and never loses the distinction between "the base
/// URL was never configured", "the network failed", "the router answered
/// with a non-2xx status", and "the call ran out of time". Decode failures
/// on a successful response are not errors at all; they surface as absent
/// data on the call's `Ok` side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No usable target URL could be built; no network attempt was made.
    #[error("Proxy Router base URL is not configured.")]
    NotConfigured,

    /// The underlying request failed before a response arrived.
    #[error("{0}")]
    Network(String),

    /// The router answered outside the 2xx range. The message is the
    /// response body text, or a synthesized description when the body was
    /// empty.
    #[error("{message}")]
    Status {
        /// HTTP status code of the response.
        status: u16,
        /// Response body text or `Request failed (<status>)`.
        message: String,
    },

    /// The call exceeded its timeout budget and the in-flight request was
    /// aborted.
    #[error("Request timed out")]
    Timeout,
}

impl ApiError {
    /// HTTP status code, when the failure carries one.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

/// Result alias used by every router API call.
pub type ApiResult<T> = Result<T, ApiError>;
