//! High-level client orchestrator.
//!
//! [`SocialClient`] owns the state worker and the subscription listener,
//! wires up command/event channels, and exposes a builder-based API for
//! publishing announcements and ingesting the feed.

use std::sync::Arc;

use client_blockchain_core::{
    BatchSubscriber, BlockNumber, Graph, IdentityDirectory, Profile, ProfileFields,
    PublicationLog, SocialAddress, TransactionId, WalletAddress,
};
use client_storage::{ContentFetcher, ContentStore};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::activity::ActivityContent;
use crate::announcement::{
    AnnouncementBuilder, AnnouncementKind, AnnouncementSigner, DraftPost, DraftProfile,
};
use crate::api::{PipelineError, Result, StateHandle, StateSink};
use crate::dispatcher::{DEFAULT_MAX_CONCURRENT_FETCHES, DispatchConfig, Dispatcher};
use crate::events::{DEFAULT_EVENT_BUS_CAPACITY, Event, EventBus, Topic};
use crate::feed::FeedState;
use crate::listener::SubscriptionListener;
use crate::publisher::PublisherClient;
use crate::workers::{Command, StateWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    pub max_concurrent_fetches: usize,
    pub verify_content_hash: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: DEFAULT_EVENT_BUS_CAPACITY,
            command_buffer_size: 32,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            verify_content_hash: true,
        }
    }
}

impl RuntimeConfig {
    fn dispatch(&self) -> DispatchConfig {
        DispatchConfig {
            max_concurrent_fetches: self.max_concurrent_fetches,
            verify_content_hash: self.verify_content_hash,
        }
    }
}

/// Social client: outbound publishing plus inbound feed ingestion.
///
/// [`StateHandle`] provides a cloneable view of the resulting state.
pub struct SocialClient {
    handle: StateHandle,
    directory: Arc<dyn IdentityDirectory>,
    builder: AnnouncementBuilder,
    publisher: PublisherClient,
    listener: SubscriptionListener,
    state_worker_handle: JoinHandle<()>,
}

impl SocialClient {
    pub fn builder() -> SocialClientBuilder {
        SocialClientBuilder::new()
    }

    /// Get a cloneable handle to the feed state
    pub fn handle(&self) -> StateHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    pub async fn query_state(&self) -> Result<FeedState> {
        self.handle.query_state().await
    }

    pub fn build_post(&self, text: &str, references: &[String], actor: SocialAddress) -> DraftPost {
        self.builder.build_post(text, references, actor)
    }

    pub fn build_profile(&self, fields: ProfileFields, actor: SocialAddress) -> DraftProfile {
        self.builder.build_profile(fields, actor)
    }

    /// Publish a post. A draft without content publishes nothing.
    pub async fn send_post(&self, draft: DraftPost) -> Result<Option<TransactionId>> {
        let Some(note) = draft.content else {
            debug!("Empty post from {}, nothing to publish", draft.from_address);
            return Ok(None);
        };
        self.announce(
            ActivityContent::Note(note),
            &draft.from_address,
            AnnouncementKind::Broadcast,
        )
        .await
    }

    /// Publish a reply to the announcement identified by `in_reply_to`.
    ///
    /// A draft without content or a blank target publishes nothing.
    pub async fn send_reply(
        &self,
        draft: DraftPost,
        in_reply_to: &str,
    ) -> Result<Option<TransactionId>> {
        let Some(note) = draft.content else {
            debug!("Empty reply from {}, nothing to publish", draft.from_address);
            return Ok(None);
        };
        if in_reply_to.trim().is_empty() {
            debug!("Reply from {} has no target, nothing to publish", draft.from_address);
            return Ok(None);
        }
        self.announce(
            ActivityContent::Note(note),
            &draft.from_address,
            AnnouncementKind::Reply(in_reply_to.to_string()),
        )
        .await
    }

    pub async fn send_profile(&self, draft: DraftProfile) -> Result<Option<TransactionId>> {
        self.announce(
            ActivityContent::Profile(draft.content),
            &draft.from_address,
            AnnouncementKind::Profile,
        )
        .await
    }

    async fn announce(
        &self,
        content: ActivityContent,
        actor: &SocialAddress,
        kind: AnnouncementKind,
    ) -> Result<Option<TransactionId>> {
        let hash = self.builder.store_activity_content(&content).await?;
        let Some(announcement) = self.builder.build_and_sign(hash, actor, kind).await? else {
            return Ok(None);
        };
        let tx = self.publisher.publish(&announcement).await?;
        Ok(Some(tx))
    }

    /// Clear the feed and re-sync it from `from_block`.
    pub async fn start_post_subscription(&mut self, from_block: BlockNumber) -> Result<()> {
        self.listener.start(from_block).await
    }

    pub async fn stop_post_subscription(&mut self) {
        self.listener.stop().await;
    }

    pub fn is_subscribed(&self) -> bool {
        self.listener.is_running()
    }

    /// Social identity for `wallet`, created when the wallet has none.
    pub async fn social_identity(&self, wallet: &WalletAddress) -> Result<SocialAddress> {
        Ok(self.directory.social_identity(wallet).await?)
    }

    pub async fn graph(&self, address: &SocialAddress) -> Result<Graph> {
        Ok(self.directory.graph(address).await?)
    }

    pub async fn profile(&self, address: &SocialAddress) -> Result<Profile> {
        Ok(self.directory.profile(address).await?)
    }

    pub fn directory(&self) -> Arc<dyn IdentityDirectory> {
        self.directory.clone()
    }

    /// Stop ingestion and wait for the state worker to drain.
    ///
    /// Outstanding [`StateHandle`] clones fail with
    /// [`PipelineError::CommandChannelClosed`] afterwards.
    pub async fn shutdown(self) -> Result<()> {
        let Self {
            handle,
            mut listener,
            builder,
            publisher,
            directory,
            state_worker_handle,
        } = self;

        listener.stop().await;
        // Handle clones held elsewhere keep the channel open
        if let Err(err) = handle.shutdown().await {
            debug!("State worker already stopped: {}", err);
        }
        drop((listener, handle, builder, publisher, directory));

        state_worker_handle
            .await
            .map_err(PipelineError::WorkerJoin)
    }
}

/// Builder for [`SocialClient`] with flexible configuration.
pub struct SocialClientBuilder {
    config: RuntimeConfig,
    store: Option<Arc<dyn ContentStore>>,
    fetcher: Option<Arc<dyn ContentFetcher>>,
    publication_log: Option<Arc<dyn PublicationLog>>,
    subscriber: Option<Arc<dyn BatchSubscriber>>,
    directory: Option<Arc<dyn IdentityDirectory>>,
    signer: Option<Arc<dyn AnnouncementSigner>>,
    initial_state: FeedState,
}

impl SocialClientBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            store: None,
            fetcher: None,
            publication_log: None,
            subscriber: None,
            directory: None,
            signer: None,
            initial_state: FeedState::default(),
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Use one content backend for both uploads and retrieval
    pub fn storage<S>(mut self, storage: S) -> Self
    where
        S: ContentStore + ContentFetcher + 'static,
    {
        let storage = Arc::new(storage);
        self.store = Some(storage.clone());
        self.fetcher = Some(storage);
        self
    }

    pub fn content_store(mut self, store: Arc<dyn ContentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn content_fetcher(mut self, fetcher: Arc<dyn ContentFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Use one chain backend for publishing, subscriptions, and identities
    pub fn chain<C>(mut self, chain: C) -> Self
    where
        C: PublicationLog + BatchSubscriber + IdentityDirectory + 'static,
    {
        let chain = Arc::new(chain);
        self.publication_log = Some(chain.clone());
        self.subscriber = Some(chain.clone());
        self.directory = Some(chain);
        self
    }

    pub fn publication_log(mut self, log: Arc<dyn PublicationLog>) -> Self {
        self.publication_log = Some(log);
        self
    }

    pub fn subscriber(mut self, subscriber: Arc<dyn BatchSubscriber>) -> Self {
        self.subscriber = Some(subscriber);
        self
    }

    pub fn directory(mut self, directory: Arc<dyn IdentityDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn signer(mut self, signer: Arc<dyn AnnouncementSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Seed the profile cache and feed (e.g. from a previous session)
    pub fn initial_state(mut self, state: FeedState) -> Self {
        self.initial_state = state;
        self
    }

    /// Build the client and spawn its state worker
    pub fn build(self) -> Result<SocialClient> {
        let store = self
            .store
            .ok_or(PipelineError::MissingComponent("a content store"))?;
        let fetcher = self
            .fetcher
            .ok_or(PipelineError::MissingComponent("a content fetcher"))?;
        let publication_log = self
            .publication_log
            .ok_or(PipelineError::MissingComponent("a publication log"))?;
        let subscriber = self
            .subscriber
            .ok_or(PipelineError::MissingComponent("a batch subscriber"))?;
        let directory = self
            .directory
            .ok_or(PipelineError::MissingComponent("an identity directory"))?;
        let signer = self
            .signer
            .ok_or(PipelineError::MissingComponent("an announcement signer"))?;

        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let handle = StateHandle::new(command_tx, event_bus.clone());

        let state_worker = StateWorker::new(self.initial_state, command_rx, event_bus.clone());
        let state_worker_handle = tokio::spawn(async move {
            state_worker.run().await;
        });

        let sink: Arc<dyn StateSink> = Arc::new(handle.clone());
        let dispatcher = Dispatcher::new(fetcher, sink.clone(), event_bus, self.config.dispatch());

        Ok(SocialClient {
            handle,
            directory,
            builder: AnnouncementBuilder::new(store.clone(), signer),
            publisher: PublisherClient::new(store, publication_log),
            listener: SubscriptionListener::new(subscriber, sink, dispatcher),
            state_worker_handle,
        })
    }
}
