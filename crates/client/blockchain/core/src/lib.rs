//! Chain boundary for the social client.
//!
//! This crate describes what the announcement pipeline needs from the
//! social-protocol SDK and the chain behind it.
//!
//! # Architecture
//!
//! ```text
//! PublicationLog      publish batch pointers
//! BatchSubscriber     stream batch-publication events
//! IdentityDirectory   wallet → social identity, graph, profile
//! ```
//!
//! [`LocalChain`] implements all three in memory.

pub mod local;
pub mod traits;
pub mod types;

pub use local::LocalChain;

pub use traits::{
    BatchSubscriber, IdentityDirectory, PublicationLog, PublicationStream, TransportError,
};

pub use types::{
    AnnouncementType, BatchPublication, BlockNumber, ContentHash, Graph, InvalidContentHash,
    Profile, ProfileFields, Publication, SocialAddress, TransactionId, WalletAddress,
};
