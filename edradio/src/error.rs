//! Error types for station metadata sources

/// Result type alias for metadata operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while fetching or decoding station metadata
///
/// None of these leave a station adapter: the scheduler turns every one of
/// them into an absent song.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error status
    #[error("API error: {0}")]
    ApiError(String),

    /// Upstream payload lacks a field the adapter needs
    #[error("Missing field in upstream payload: {0}")]
    MissingField(&'static str),

    /// Upstream timestamp could not be understood
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
