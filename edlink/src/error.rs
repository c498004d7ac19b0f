//! Error types for the companion link

use tokio_tungstenite::tungstenite;

/// Result type alias for companion link operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the companion server
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// WebSocket handshake or read failed
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Server answered with a non-success status
    #[error("API error: {0}")]
    ApiError(String),

    /// The challenge probe came back with a different token
    #[error("Challenge mismatch: sent {sent:?}, received {received:?}")]
    ChallengeMismatch { sent: String, received: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an API error
    pub fn api_error(msg: impl Into<String>) -> Self {
        Self::ApiError(msg.into())
    }
}
