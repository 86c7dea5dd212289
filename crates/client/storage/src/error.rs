//! Error types for content store operations.

use thiserror::Error;

/// Errors that can occur while storing or retrieving content.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Upload of {path} failed with status {status}: {reason}")]
    UploadRejected {
        path: String,
        status: u16,
        reason: String,
    },

    #[error("Download of {url} failed with status {status}")]
    FetchFailed { url: String, status: u16 },

    #[error("Content not found: {0}")]
    NotFound(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Stream for {0} was never finished")]
    StreamNotFinished(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
