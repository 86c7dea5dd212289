//! Chain boundary traits.
//!
//! This module defines the contract the announcement pipeline requires of the
//! social-protocol SDK:
//! - [`PublicationLog`]: submit batch pointers on chain
//! - [`BatchSubscriber`]: observe batch-publication events
//! - [`IdentityDirectory`]: read-only identity, graph and profile lookups

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::types::{
    BatchPublication, BlockNumber, Graph, Profile, Publication, SocialAddress, TransactionId,
    WalletAddress,
};

// ============================================================================
// Error Types
// ============================================================================

/// Transport layer errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Invalid social identity address: {0}")]
    InvalidSocialIdentity(SocialAddress),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Backend-specific error: {0}")]
    BackendError(String),
}

/// Receiving end of a batch-publication subscription.
///
/// Dropping the receiver revokes the subscription; providers prune senders
/// whose receiver is gone.
pub type PublicationStream = mpsc::UnboundedReceiver<BatchPublication>;

// ============================================================================
// Publication
// ============================================================================

/// On-chain publication log.
#[async_trait]
pub trait PublicationLog: Send + Sync {
    /// Publish one or more batch pointers in a single transaction.
    async fn publish(&self, publications: Vec<Publication>) -> Result<TransactionId, TransportError>;
}

/// Batch-publication event source.
#[async_trait]
pub trait BatchSubscriber: Send + Sync {
    /// Subscribe to batch publications at or after `from_block`.
    ///
    /// Events are delivered in on-chain emission order.
    async fn subscribe_to_batch_publications(
        &self,
        from_block: BlockNumber,
    ) -> Result<PublicationStream, TransportError>;
}

// ============================================================================
// Identity
// ============================================================================

/// Read-only identity, graph and profile lookups.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Social identity registered for a wallet, if any.
    async fn find_social_identity(
        &self,
        wallet: &WalletAddress,
    ) -> Result<Option<SocialAddress>, TransportError>;

    /// Register a new social identity for a wallet.
    async fn create_social_identity(
        &self,
        wallet: &WalletAddress,
    ) -> Result<SocialAddress, TransportError>;

    async fn find_graph(&self, address: &SocialAddress) -> Result<Option<Graph>, TransportError>;

    async fn find_profile(&self, address: &SocialAddress)
    -> Result<Option<Profile>, TransportError>;

    /// Social identity for a wallet, creating one when none exists.
    async fn social_identity(
        &self,
        wallet: &WalletAddress,
    ) -> Result<SocialAddress, TransportError> {
        match self.find_social_identity(wallet).await? {
            Some(address) => Ok(address),
            None => {
                tracing::info!("No social identity for wallet {}, creating one", wallet);
                self.create_social_identity(wallet).await
            }
        }
    }

    async fn graph(&self, address: &SocialAddress) -> Result<Graph, TransportError> {
        self.find_graph(address)
            .await?
            .ok_or_else(|| TransportError::InvalidSocialIdentity(address.clone()))
    }

    async fn profile(&self, address: &SocialAddress) -> Result<Profile, TransportError> {
        self.find_profile(address)
            .await?
            .ok_or_else(|| TransportError::InvalidSocialIdentity(address.clone()))
    }
}
