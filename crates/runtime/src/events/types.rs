//! Event types for different topics.

use client_blockchain_core::{BlockNumber, ContentHash, Profile};
use serde::{Deserialize, Serialize};

use crate::feed::FeedItem;

/// Feed mutations applied by the state worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FeedEvent {
    FeedItemAdded(Box<FeedItem>),

    /// All feed items were dropped ahead of a re-sync
    FeedCleared { cleared: usize },
}

/// Profile cache mutations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProfileEvent {
    ProfileUpserted(Profile),
}

/// Ingestion failures that were skipped rather than surfaced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DiagnosticEvent {
    /// A single announcement row was skipped; its batch siblings continue.
    RowSkipped {
        batch_url: String,
        block_number: BlockNumber,
        row: usize,
        error: String,
    },

    /// A whole batch was discarded.
    BatchRejected {
        batch_url: String,
        file_hash: ContentHash,
        block_number: BlockNumber,
        error: String,
    },
}
