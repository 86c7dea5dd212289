//! Topic-based event bus for pipeline events.
//!
//! State mutations and skipped ingestion work are published to topics;
//! consumers subscribe only to the topics they need.

mod bus;
mod types;

pub use bus::{DEFAULT_EVENT_BUS_CAPACITY, Event, EventBus, Topic};
pub use types::{DiagnosticEvent, FeedEvent, ProfileEvent};
