//! Topic-based event bus implementation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{DiagnosticEvent, FeedEvent, ProfileEvent};

pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 100;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Feed item additions and re-sync clears
    Feed,
    /// Profile cache updates
    Profile,
    /// Skipped rows and rejected batches
    Diagnostics,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Feed(FeedEvent),
    Profile(ProfileEvent),
    Diagnostics(DiagnosticEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Feed(_) => Topic::Feed,
            Event::Profile(_) => Topic::Profile,
            Event::Diagnostics(_) => Topic::Diagnostics,
        }
    }
}

/// Topic-based event bus
///
/// Consumers subscribe to the topics they care about. Publishing is
/// best-effort: an event with no subscribers is dropped.
#[derive(Clone)]
pub struct EventBus {
    feed: broadcast::Sender<Event>,
    profile: broadcast::Sender<Event>,
    diagnostics: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_BUS_CAPACITY)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            feed: broadcast::channel(capacity).0,
            profile: broadcast::channel(capacity).0,
            diagnostics: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Feed => &self.feed,
            Topic::Profile => &self.profile,
            Topic::Diagnostics => &self.diagnostics,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_reach_only_their_topic() {
        let bus = EventBus::with_capacity(4);
        let mut feed = bus.subscribe(Topic::Feed);
        let mut diagnostics = bus.subscribe(Topic::Diagnostics);

        bus.publish(Event::Feed(FeedEvent::FeedCleared { cleared: 2 }));

        match feed.recv().await.unwrap() {
            Event::Feed(FeedEvent::FeedCleared { cleared }) => assert_eq!(cleared, 2),
            other => panic!("unexpected event {other:?}"),
        }
        assert!(diagnostics.try_recv().is_err());
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(Event::Feed(FeedEvent::FeedCleared { cleared: 0 }));
    }
}
