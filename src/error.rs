//! Crate-level error types.
//!
//! [`FlowscopeError`] unifies every error source (configuration, HTTP,
//! JSON, amount parsing) behind a single enum so callers can match on the
//! variant they care about while still using the `?` operator for easy
//! propagation.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FlowscopeError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum FlowscopeError {
    /// An environment variable was missing, malformed, or out of range.
    #[error("configuration error: {0}")]
    Config(String),

    /// An HTTP request to the explorer backend failed in transport.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Terminal or filesystem I/O failed.
    #[error("io error: {0}")]
    Io(String),

    /// An amount was not a whole, finite number of smallest units.
    #[error("malformed amount: {0}")]
    MalformedAmount(String),

    /// The backend answered with a non-success status or an error body.
    #[error("backend error: {0}")]
    Api(String),

    /// A backend request did not complete within the client timeout.
    #[error("request timed out: {0}")]
    Timeout(String),
}

impl FlowscopeError {
    /// Returns `true` for failures worth retrying by the user (network,
    /// timeout, backend status) as opposed to malformed data.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Api(_) | Self::Timeout(_))
    }
}
