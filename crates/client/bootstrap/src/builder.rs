//! Builds the social client, provider, and config bundle used by front-ends.
use std::sync::Arc;

use anyhow::{Context, Result};
use client_blockchain_core::{
    BatchSubscriber, IdentityDirectory, LocalChain, PublicationLog, SocialAddress,
};
use client_storage::{ContentFetcher, ContentStore, HttpContentStore, StoreConfig};
use social_runtime::{KeyringSigner, SocialClient};

use crate::config::ClientConfig;
use crate::connections::ConnectionsService;
use crate::provider::{ProviderHandle, WalletProviders, setup_provider};

struct Chain {
    log: Arc<dyn PublicationLog>,
    subscriber: Arc<dyn BatchSubscriber>,
    directory: Arc<dyn IdentityDirectory>,
}

/// Builder that assembles the client, its backends, and configuration.
///
/// Defaults to the HTTP content store at the configured upload host and an
/// in-process [`LocalChain`].
pub struct ClientBuilder {
    config: ClientConfig,
    providers: WalletProviders,
    storage: Option<(Arc<dyn ContentStore>, Arc<dyn ContentFetcher>)>,
    chain: Option<Chain>,
    signer: Arc<KeyringSigner>,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        let providers = WalletProviders::discover(config.provider_rpc_url.as_deref());
        Self {
            config,
            providers,
            storage: None,
            chain: None,
            signer: Arc::new(KeyringSigner::new()),
        }
    }

    pub fn wallet_providers(mut self, providers: WalletProviders) -> Self {
        self.providers = providers;
        self
    }

    /// Replace the HTTP content store (e.g. with an in-memory one).
    pub fn storage<S>(mut self, storage: S) -> Self
    where
        S: ContentStore + ContentFetcher + 'static,
    {
        let storage = Arc::new(storage);
        self.storage = Some((storage.clone(), storage));
        self
    }

    pub fn chain<C>(mut self, chain: C) -> Self
    where
        C: PublicationLog + BatchSubscriber + IdentityDirectory + 'static,
    {
        let chain = Arc::new(chain);
        self.chain = Some(Chain {
            log: chain.clone(),
            subscriber: chain.clone(),
            directory: chain,
        });
        self
    }

    pub fn signer(mut self, signer: Arc<KeyringSigner>) -> Self {
        self.signer = signer;
        self
    }

    pub async fn build(self) -> Result<ClientSetup> {
        let provider = setup_provider(self.config.wallet_type, &self.providers)?;

        let (store, fetcher) = match self.storage {
            Some(storage) => storage,
            None => {
                let store_config = StoreConfig::new(self.config.upload_host.clone())
                    .with_request_timeout(self.config.request_timeout);
                let store = Arc::new(
                    HttpContentStore::new(store_config)
                        .context("failed to create HTTP content store")?,
                );
                (store.clone() as Arc<dyn ContentStore>, store as Arc<dyn ContentFetcher>)
            }
        };

        let chain = self.chain.unwrap_or_else(|| {
            tracing::info!("No chain configured, using in-process local chain");
            let chain = Arc::new(LocalChain::new());
            Chain {
                log: chain.clone(),
                subscriber: chain.clone(),
                directory: chain,
            }
        });

        let client = SocialClient::builder()
            .config(self.config.runtime.clone())
            .content_store(store)
            .content_fetcher(fetcher)
            .publication_log(chain.log)
            .subscriber(chain.subscriber)
            .directory(chain.directory)
            .signer(self.signer.clone())
            .build()?;

        let actor = match &self.config.wallet_address {
            Some(wallet) => {
                let actor = client
                    .social_identity(wallet)
                    .await
                    .with_context(|| format!("failed to resolve social identity for {wallet}"))?;
                if !self.signer.has_key(&actor) {
                    self.signer.generate_key(actor.clone())?;
                }
                tracing::info!("Posting as {} (wallet {})", actor, wallet);
                Some(actor)
            }
            None => None,
        };

        let connections = ConnectionsService::new(client.directory(), client.handle());

        Ok(ClientSetup {
            config: self.config,
            provider,
            actor,
            signer: self.signer,
            connections,
            client,
        })
    }
}

pub struct ClientSetup {
    pub config: ClientConfig,
    pub provider: ProviderHandle,
    /// Social identity of the configured wallet, if any
    pub actor: Option<SocialAddress>,
    pub signer: Arc<KeyringSigner>,
    pub connections: ConnectionsService,
    pub client: SocialClient,
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_blockchain_core::WalletAddress;
    use client_storage::{MemoryContentStore, Url};

    fn config() -> ClientConfig {
        let mut config = ClientConfig::new(Url::parse("http://uploads.local").unwrap());
        config.provider_rpc_url = Some("http://localhost:8545".to_string());
        config
    }

    #[tokio::test]
    async fn wallet_gets_identity_and_key() {
        let mut config = config();
        config.wallet_address = Some(WalletAddress::new("0xwallet"));

        let setup = ClientBuilder::new(config)
            .storage(MemoryContentStore::new(
                Url::parse("http://uploads.local").unwrap(),
            ))
            .chain(LocalChain::new())
            .build()
            .await
            .unwrap();

        let actor = setup.actor.clone().unwrap();
        assert!(setup.signer.has_key(&actor));

        let draft = setup.client.build_post("hello", &[], actor);
        assert!(setup.client.send_post(draft).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn shutdown_completes_while_connections_are_alive() {
        let mut config = config();
        config.wallet_address = Some(WalletAddress::new("0xwallet"));

        let ClientSetup {
            client,
            connections,
            actor,
            ..
        } = ClientBuilder::new(config)
            .storage(MemoryContentStore::new(
                Url::parse("http://uploads.local").unwrap(),
            ))
            .chain(LocalChain::new())
            .build()
            .await
            .unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(2), client.shutdown())
            .await
            .expect("shutdown should not wait on outstanding handles")
            .unwrap();

        assert!(connections.post_count(&actor.unwrap()).await.is_err());
    }

    #[tokio::test]
    async fn missing_provider_fails_setup() {
        let mut config = config();
        config.provider_rpc_url = None;

        let result = ClientBuilder::new(config).chain(LocalChain::new()).build().await;
        assert!(result.is_err());
    }
}
