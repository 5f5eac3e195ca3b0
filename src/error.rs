//! Error types for the scrape viewer.

use thiserror::Error;

/// Result type for viewer operations.
pub type Result<T> = std::result::Result<T, ViewerError>;

/// Viewer errors.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Input rejected before any request was sent (empty URL)
    #[error("{0}")]
    Validation(String),

    /// Network failure, non-2xx status or malformed response body
    #[error("{0}")]
    Transport(String),

    /// Platform clipboard failure. Logged, never shown as an error message.
    #[error("Failed to copy text: {0}")]
    Clipboard(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid server URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
