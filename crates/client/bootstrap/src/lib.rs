//! Shared bootstrap utilities for client front-ends.
//!
//! Provides configuration loading, wallet provider selection, connection
//! lookups, and client setup that can be reused by the CLI or other
//! front-end crates.
pub mod builder;
pub mod config;
pub mod connections;
pub mod provider;

pub use builder::{ClientBuilder, ClientSetup};
pub use config::{ClientConfig, ConfigError};
pub use connections::{Connections, ConnectionsService, not_following};
pub use provider::{ProviderHandle, WalletProviders, WalletType, setup_provider};
