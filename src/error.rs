//! Error types for feed loading.

use thiserror::Error;

/// Errors raised while fetching a page of older messages.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The request could not be sent or the connection failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The response body was not a valid page payload.
    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The server answered with a non-success status.
    #[error("Page request rejected ({status})")]
    Status {
        /// HTTP status code.
        status: u16,
    },
}

/// Result type alias for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;
