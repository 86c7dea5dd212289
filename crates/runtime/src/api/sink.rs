//! Destination of normalized feed and profile mutations.

use async_trait::async_trait;
use client_blockchain_core::Profile;

use super::errors::Result;
use crate::feed::FeedItem;

#[async_trait]
pub trait StateSink: Send + Sync {
    async fn add_feed_item(&self, item: FeedItem) -> Result<()>;

    /// Insert or replace the profile keyed by its social address.
    async fn upsert_profile(&self, profile: Profile) -> Result<()>;

    async fn clear_feed_items(&self) -> Result<()>;
}
