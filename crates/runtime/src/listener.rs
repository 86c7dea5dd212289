//! Subscription to on-chain batch publications.
//!
//! A session owns the subscription stream and every batch it has started.
//! Batches are processed concurrently and independently. Stopping aborts the
//! session task and waits for it, so once [`SubscriptionListener::stop`]
//! returns nothing from that session can reach the state sink.

use std::sync::Arc;

use client_blockchain_core::{BatchSubscriber, BlockNumber, PublicationStream};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{Result, StateSink};
use crate::dispatcher::Dispatcher;

pub struct SubscriptionListener {
    subscriber: Arc<dyn BatchSubscriber>,
    sink: Arc<dyn StateSink>,
    dispatcher: Dispatcher,
    session: Option<JoinHandle<()>>,
}

impl SubscriptionListener {
    pub fn new(
        subscriber: Arc<dyn BatchSubscriber>,
        sink: Arc<dyn StateSink>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            subscriber,
            sink,
            dispatcher,
            session: None,
        }
    }

    /// Re-sync from `from_block`.
    ///
    /// Stops any running session, clears all feed items, then subscribes.
    pub async fn start(&mut self, from_block: BlockNumber) -> Result<()> {
        self.stop().await;
        self.sink.clear_feed_items().await?;

        let stream = self
            .subscriber
            .subscribe_to_batch_publications(from_block)
            .await?;
        info!("Subscribed to batch publications from block {}", from_block);

        self.session = Some(tokio::spawn(run_session(stream, self.dispatcher.clone())));
        Ok(())
    }

    /// Unsubscribe and cancel in-flight batch work.
    pub async fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        session.abort();
        match session.await {
            Ok(()) => {}
            Err(err) if err.is_cancelled() => {}
            Err(err) => warn!("Subscription session failed: {}", err),
        }
        info!("Subscription stopped");
    }

    pub fn is_running(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| !session.is_finished())
    }
}

impl Drop for SubscriptionListener {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.abort();
        }
    }
}

async fn run_session(mut stream: PublicationStream, dispatcher: Dispatcher) {
    let mut in_flight = FuturesUnordered::new();

    loop {
        tokio::select! {
            event = stream.recv() => {
                let Some(event) = event else {
                    break;
                };
                debug!(
                    "Batch {:?} at block {}: {}",
                    event.announcement_type, event.block_number, event.file_url
                );
                let dispatcher = dispatcher.clone();
                in_flight.push(async move { dispatcher.handle_batch(&event).await });
            }
            Some(_report) = in_flight.next(), if !in_flight.is_empty() => {}
        }
    }

    // Publication stream closed by the provider; finish what was started
    while in_flight.next().await.is_some() {}
    debug!("Subscription session ended");
}
