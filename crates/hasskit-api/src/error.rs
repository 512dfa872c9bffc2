use thiserror::Error;

/// Top-level error type for the `hasskit-api` crate.
///
/// Four kinds matter to callers: a local precondition was violated
/// ([`InvalidArgument`](Self::InvalidArgument)), the server could not be
/// reached ([`Transport`](Self::Transport)), the server answered with a
/// non-2xx status ([`RequestFailed`](Self::RequestFailed)), or the caller
/// cancelled ([`Cancelled`](Self::Cancelled)). The rest cover client
/// construction and the JSON codec.
#[derive(Debug, Error)]
pub enum Error {
    // ── Local preconditions ─────────────────────────────────────────
    /// An argument failed validation before any network call was made.
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or HTTP client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Server responses ────────────────────────────────────────────
    /// The server was reached and answered with a non-2xx status.
    #[error("{method} {path} failed (HTTP {status}): {body}")]
    RequestFailed {
        method: &'static str,
        path: String,
        status: u16,
        body: String,
    },

    // ── Cancellation ────────────────────────────────────────────────
    /// The caller's cancellation token fired while the request was in flight.
    #[error("Request cancelled")]
    Cancelled,

    // ── Data ────────────────────────────────────────────────────────
    /// A payload could not be encoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// HTTP status code of a [`RequestFailed`](Self::RequestFailed) error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if the server rejected the bearer credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Returns `true` if this is a transient error a caller may choose to retry.
    ///
    /// The client itself never retries.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::RequestFailed { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }
}
