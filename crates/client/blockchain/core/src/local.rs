//! In-process publication chain.
//!
//! Simulates the publication log, batch subscriptions and identity registry
//! in memory. Used by the `social` binary's local mode and by tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::traits::{
    BatchSubscriber, IdentityDirectory, PublicationLog, PublicationStream, TransportError,
};
use crate::types::{
    BatchPublication, BlockNumber, Graph, Profile, Publication, SocialAddress, TransactionId,
    WalletAddress,
};

#[derive(Default)]
struct ChainState {
    block_number: BlockNumber,
    history: Vec<BatchPublication>,
    subscribers: Vec<mpsc::UnboundedSender<BatchPublication>>,
    identities: HashMap<WalletAddress, SocialAddress>,
    graphs: HashMap<SocialAddress, Graph>,
    profiles: HashMap<SocialAddress, Profile>,
    rejected_publishes: u32,
}

/// In-memory chain that mines one block per publish call.
#[derive(Clone, Default)]
pub struct LocalChain {
    state: Arc<Mutex<ChainState>>,
}

impl LocalChain {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, ChainState>, TransportError> {
        self.state
            .lock()
            .map_err(|_| TransportError::BackendError("local chain lock poisoned".to_string()))
    }

    /// Current head block.
    pub fn block_number(&self) -> BlockNumber {
        self.lock().map(|s| s.block_number).unwrap_or_default()
    }

    /// All publications recorded so far, in block order.
    pub fn publications(&self) -> Vec<BatchPublication> {
        self.lock().map(|s| s.history.clone()).unwrap_or_default()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.lock()
            .map(|mut s| {
                s.subscribers.retain(|tx| !tx.is_closed());
                s.subscribers.len()
            })
            .unwrap_or_default()
    }

    /// Reject the next `count` publish calls with a transaction failure.
    pub fn reject_next_publishes(&self, count: u32) {
        if let Ok(mut state) = self.lock() {
            state.rejected_publishes = count;
        }
    }

    /// Record a batch publication that did not go through [`PublicationLog`].
    ///
    /// Lets tests inject pointers to arbitrary batch files.
    pub fn inject(&self, publication: Publication) -> BatchPublication {
        let Ok(mut state) = self.lock() else {
            return BatchPublication::new(publication, 0);
        };
        state.block_number += 1;
        let event = BatchPublication::new(publication, state.block_number);
        Self::emit(&mut state, event.clone());
        event
    }

    pub fn register_identity(&self, wallet: WalletAddress, address: SocialAddress) {
        if let Ok(mut state) = self.lock() {
            state.identities.insert(wallet, address);
        }
    }

    pub fn register_graph(&self, graph: Graph) {
        if let Ok(mut state) = self.lock() {
            state.graphs.insert(graph.social_address.clone(), graph);
        }
    }

    pub fn register_profile(&self, profile: Profile) {
        if let Ok(mut state) = self.lock() {
            state.profiles.insert(profile.social_address.clone(), profile);
        }
    }

    fn emit(state: &mut ChainState, event: BatchPublication) {
        state.history.push(event.clone());
        state
            .subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[async_trait]
impl PublicationLog for LocalChain {
    async fn publish(&self, publications: Vec<Publication>) -> Result<TransactionId, TransportError> {
        let mut state = self.lock()?;

        if state.rejected_publishes > 0 {
            state.rejected_publishes -= 1;
            return Err(TransportError::TransactionFailed(
                "publication rejected by local chain".to_string(),
            ));
        }

        state.block_number += 1;
        let block_number = state.block_number;

        for publication in publications {
            tracing::debug!(
                "Local chain block {}: {:?} batch {}",
                block_number,
                publication.announcement_type,
                publication.file_url
            );
            Self::emit(&mut state, BatchPublication::new(publication, block_number));
        }

        Ok(TransactionId::from_bytes(block_number.to_le_bytes().to_vec()))
    }
}

#[async_trait]
impl BatchSubscriber for LocalChain {
    async fn subscribe_to_batch_publications(
        &self,
        from_block: BlockNumber,
    ) -> Result<PublicationStream, TransportError> {
        let mut state = self.lock()?;
        let (tx, rx) = mpsc::unbounded_channel();

        // Replay history before registering so ordering is preserved
        for event in state.history.iter().filter(|e| e.block_number >= from_block) {
            if tx.send(event.clone()).is_err() {
                break;
            }
        }

        state.subscribers.push(tx);
        Ok(rx)
    }
}

#[async_trait]
impl IdentityDirectory for LocalChain {
    async fn find_social_identity(
        &self,
        wallet: &WalletAddress,
    ) -> Result<Option<SocialAddress>, TransportError> {
        Ok(self.lock()?.identities.get(wallet).cloned())
    }

    async fn create_social_identity(
        &self,
        wallet: &WalletAddress,
    ) -> Result<SocialAddress, TransportError> {
        let mut state = self.lock()?;
        let address = SocialAddress::new(format!("0x{:016x}", state.identities.len() + 1));
        state.identities.insert(wallet.clone(), address.clone());
        state.graphs.insert(
            address.clone(),
            Graph {
                social_address: address.clone(),
                ..Graph::default()
            },
        );
        Ok(address)
    }

    async fn find_graph(&self, address: &SocialAddress) -> Result<Option<Graph>, TransportError> {
        Ok(self.lock()?.graphs.get(address).cloned())
    }

    async fn find_profile(
        &self,
        address: &SocialAddress,
    ) -> Result<Option<Profile>, TransportError> {
        Ok(self.lock()?.profiles.get(address).cloned())
    }
}
