//! Cloneable façade over the state worker.
//!
//! [`StateHandle`] hides channel plumbing and offers async helpers for
//! mutating and querying feed state or streaming events from specific topics.
use async_trait::async_trait;
use client_blockchain_core::{Profile, SocialAddress};
use tokio::sync::{broadcast, mpsc, oneshot};

use super::errors::{PipelineError, Result};
use super::sink::StateSink;
use crate::events::{Event, EventBus, Topic};
use crate::feed::{FeedItem, FeedState};
use crate::workers::Command;

#[derive(Clone)]
pub struct StateHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl StateHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| PipelineError::CommandChannelClosed)
    }

    /// Ask the state worker to stop once queued commands are applied.
    pub(crate) async fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown).await
    }

    /// Query a read-only snapshot of the feed and profile cache
    pub async fn query_state(&self) -> Result<FeedState> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::QueryState { reply: reply_tx }).await?;
        reply_rx.await.map_err(PipelineError::ReplyChannelClosed)
    }

    pub async fn feed(&self) -> Result<Vec<FeedItem>> {
        Ok(self.query_state().await?.feed)
    }

    /// Cached profile for `address`, if any
    pub async fn profile(&self, address: &SocialAddress) -> Result<Option<Profile>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::QueryProfile {
            address: address.clone(),
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(PipelineError::ReplyChannelClosed)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Feed` - Feed items added and re-sync clears
    /// - `Topic::Profile` - Profile upserts
    /// - `Topic::Diagnostics` - Skipped rows and rejected batches
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}

#[async_trait]
impl StateSink for StateHandle {
    async fn add_feed_item(&self, item: FeedItem) -> Result<()> {
        self.send(Command::AddFeedItem(Box::new(item))).await
    }

    async fn upsert_profile(&self, profile: Profile) -> Result<()> {
        self.send(Command::UpsertProfile(profile)).await
    }

    async fn clear_feed_items(&self) -> Result<()> {
        self.send(Command::ClearFeedItems).await
    }
}
