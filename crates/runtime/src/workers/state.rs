//! State worker that owns the authoritative [`FeedState`].
//!
//! Receives one command per mutation from [`StateHandle`], applies it, and
//! publishes the matching event to the EventBus. Being the only writer, each
//! mutation is atomic with respect to every reader.
//!
//! [`StateHandle`]: crate::api::StateHandle

use client_blockchain_core::{Profile, SocialAddress};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::events::{Event, EventBus, FeedEvent, ProfileEvent};
use crate::feed::{FeedItem, FeedState};

/// Commands that can be sent to the state worker
pub enum Command {
    AddFeedItem(Box<FeedItem>),
    UpsertProfile(Profile),
    ClearFeedItems,
    /// Query a snapshot of the whole state (read-only).
    QueryState {
        reply: oneshot::Sender<FeedState>,
    },
    QueryProfile {
        address: SocialAddress,
        reply: oneshot::Sender<Option<Profile>>,
    },
    /// Stop the worker after the commands already queued.
    Shutdown,
}

pub struct StateWorker {
    state: FeedState,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl StateWorker {
    pub fn new(state: FeedState, command_rx: mpsc::Receiver<Command>, event_bus: EventBus) -> Self {
        Self {
            state,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop. Ends on [`Command::Shutdown`] or once every handle
    /// is dropped.
    pub async fn run(mut self) {
        while let Some(cmd) = self.command_rx.recv().await {
            if matches!(cmd, Command::Shutdown) {
                break;
            }
            self.handle_command(cmd);
        }
        self.command_rx.close();
        debug!("State worker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Shutdown => {}
            Command::AddFeedItem(item) => {
                self.state.add_feed_item((*item).clone());
                self.event_bus
                    .publish(Event::Feed(FeedEvent::FeedItemAdded(item)));
            }
            Command::UpsertProfile(profile) => {
                self.state.upsert_profile(profile.clone());
                self.event_bus
                    .publish(Event::Profile(ProfileEvent::ProfileUpserted(profile)));
            }
            Command::ClearFeedItems => {
                let cleared = self.state.clear_feed_items();
                debug!("Cleared {} feed items", cleared);
                self.event_bus
                    .publish(Event::Feed(FeedEvent::FeedCleared { cleared }));
            }
            Command::QueryState { reply } => {
                if reply.send(self.state.clone()).is_err() {
                    debug!("QueryState reply channel closed (caller dropped)");
                }
            }
            Command::QueryProfile { address, reply } => {
                if reply.send(self.state.profile(&address).cloned()).is_err() {
                    debug!("QueryProfile reply channel closed (caller dropped)");
                }
            }
        }
    }
}
