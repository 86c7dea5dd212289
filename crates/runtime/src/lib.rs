//! Announcement pipeline for the decentralized social client.
//!
//! This crate wires together content addressing, announcement signing, batch
//! files, and the chain boundary into one client API. Consumers embed
//! [`SocialClient`] to publish posts and profiles, follow the feed, and read
//! the resulting state through [`StateHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the client orchestrator and builder
//! - [`api`] exposes the error, sink, and handle types downstream code uses
//! - [`announcement`] and [`publisher`] cover the outbound path
//! - [`listener`], [`batch`], and [`dispatcher`] cover the inbound path
//! - [`events`] provides topic-based event bus for flexible event routing
//! - `workers` keeps background tasks internal to the crate
pub mod activity;
pub mod announcement;
pub mod api;
pub mod batch;
pub mod dispatcher;
pub mod events;
pub mod feed;
pub mod listener;
pub mod publisher;
pub mod runtime;
pub mod utils;

mod workers;

pub use activity::{ActivityContent, Link, Note, ProfileContent};
pub use announcement::{
    Announcement, AnnouncementBuilder, AnnouncementKind, AnnouncementRow, AnnouncementSigner,
    DraftPost, DraftProfile, KeyringSigner, Signature, announcement_uri,
};
pub use api::{
    BatchError, DispatchError, PipelineError, PublishError, Result, SigningError, StateHandle,
    StateSink,
};
pub use batch::{BatchReader, BatchResolver, BatchWriter};
pub use dispatcher::{BatchReport, DispatchConfig, Dispatcher, Mutation};
pub use events::{DiagnosticEvent, Event, EventBus, FeedEvent, ProfileEvent, Topic};
pub use feed::{FeedItem, FeedState};
pub use listener::SubscriptionListener;
pub use publisher::PublisherClient;
pub use runtime::{RuntimeConfig, SocialClient, SocialClientBuilder};
