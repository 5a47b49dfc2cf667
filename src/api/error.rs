use thiserror::Error;

/// Failures talking to the vulnerability backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Backend refused a non-success status other than 409.
    #[error("backend returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// The record changed since the client last observed it. Surfaced as
    /// "refresh and retry", never merged silently.
    #[error("record was modified by someone else, refresh and retry")]
    Conflict,

    /// The record does not exist (or is not visible to this token).
    #[error("vulnerability {0} not found")]
    NotFound(u64),

    /// Request timed out. The user may retry; the client never does so on
    /// its own.
    #[error("request timed out")]
    Timeout,

    /// Transport-level failure (connection refused, DNS, TLS).
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The response body did not match the expected envelope.
    #[error("failed to parse backend response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Http(err)
        }
    }
}
