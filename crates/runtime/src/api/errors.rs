//! Unified error types surfaced by the runtime API.
//!
//! Each pipeline stage has its own error so callers can tell a failed upload
//! from a rejected batch; [`PipelineError`] wraps them for the client façade.
use client_blockchain_core::{ContentHash, SocialAddress, TransportError};
use client_storage::StoreError;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::announcement::InvalidAnnouncement;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("no signing key for actor {0}")]
    UnknownActor(SocialAddress),

    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("signature verification failed for actor {0}")]
    VerificationFailed(SocialAddress),

    #[error("key store unavailable")]
    KeyStoreUnavailable,
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to fetch batch {url}")]
    Fetch {
        url: String,
        #[source]
        source: StoreError,
    },

    #[error("batch {url} hash mismatch: expected {expected}, got {actual}")]
    Integrity {
        url: String,
        expected: ContentHash,
        actual: ContentHash,
    },

    #[error("batch header is missing or malformed")]
    BadHeader,

    #[error("unsupported batch format version {0}")]
    UnsupportedVersion(u8),

    #[error("failed to encode batch row")]
    Encode(#[source] bincode::Error),

    #[error("failed to decode batch row {index}")]
    Decode {
        index: usize,
        #[source]
        source: bincode::Error,
    },
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to upload batch file")]
    Upload(#[from] StoreError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("publication log rejected batch")]
    Transport(#[from] TransportError),
}

/// Failure of a single row; siblings are unaffected.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("undecodable batch row")]
    Undecodable(#[from] BatchError),

    #[error("invalid announcement row")]
    InvalidRow(#[from] InvalidAnnouncement),

    #[error("failed to fetch content {url}")]
    Fetch {
        url: String,
        #[source]
        source: StoreError,
    },

    #[error("content at {url} does not match hash {expected} (got {actual})")]
    ContentMismatch {
        url: String,
        expected: ContentHash,
        actual: ContentHash,
    },

    #[error("content at {url} is not valid activity content")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("state sink unavailable")]
    SinkClosed,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to serialize activity content")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to store activity content")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("state worker command channel closed")]
    CommandChannelClosed,

    #[error("state worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("state worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires {0} to be configured before building")]
    MissingComponent(&'static str),
}
