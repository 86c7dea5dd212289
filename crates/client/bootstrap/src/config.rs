//! Client configuration structures and loaders.
use std::env;
use std::time::Duration;

use client_blockchain_core::{BlockNumber, WalletAddress};
use client_storage::{DEFAULT_REQUEST_TIMEOUT, Url};
use social_runtime::RuntimeConfig;

use crate::provider::WalletType;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("UPLOAD_HOST is not set")]
    MissingUploadHost,

    #[error("UPLOAD_HOST {value:?} is not a valid URL: {reason}")]
    InvalidUploadHost { value: String, reason: String },

    #[error("unknown wallet type {0:?} (expected metamask or torus)")]
    UnknownWalletType(String),

    #[error("no injected wallet provider available (set PROVIDER_RPC_URL)")]
    MissingInjectedProvider,

    #[error("torus wallet provider is not available")]
    TorusUnavailable,
}

/// Configuration required to bootstrap a social client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub upload_host: Url,
    pub wallet_type: WalletType,
    pub provider_rpc_url: Option<String>,
    pub request_timeout: Duration,
    pub subscription_from_block: BlockNumber,
    pub wallet_address: Option<WalletAddress>,
    pub runtime: RuntimeConfig,
}

impl ClientConfig {
    pub fn new(upload_host: Url) -> Self {
        Self {
            upload_host,
            wallet_type: WalletType::default(),
            provider_rpc_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            subscription_from_block: 0,
            wallet_address: None,
            runtime: RuntimeConfig::default(),
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `UPLOAD_HOST` - Content upload host (required)
    /// - `WALLET_TYPE` - `metamask` or `torus` (default: metamask)
    /// - `PROVIDER_RPC_URL` - Injected wallet provider endpoint
    /// - `REQUEST_TIMEOUT_SECS` - Per-request HTTP timeout (default: 30)
    /// - `SUBSCRIPTION_FROM_BLOCK` - First block to ingest (default: 0)
    /// - `MAX_CONCURRENT_FETCHES` - Content fetches in flight per batch (default: 8)
    /// - `EVENT_BUS_CAPACITY` - Buffered events per topic (default: 100)
    /// - `VERIFY_CONTENT_HASH` - Check fetched content against its hash (default: true)
    /// - `SOCIAL_WALLET_ADDRESS` - Wallet whose social identity posts
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("UPLOAD_HOST").ok_or(ConfigError::MissingUploadHost)?;
        let upload_host = Url::parse(&host).map_err(|e| ConfigError::InvalidUploadHost {
            value: host.clone(),
            reason: e.to_string(),
        })?;

        let mut config = Self::new(upload_host);

        if let Some(wallet_type) = lookup("WALLET_TYPE") {
            config.wallet_type = wallet_type.parse()?;
        }

        config.provider_rpc_url = lookup("PROVIDER_RPC_URL").filter(|url| !url.is_empty());

        if let Some(secs) = read_env::<u64>(&lookup, "REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs.max(1));
        }

        if let Some(block) = read_env::<BlockNumber>(&lookup, "SUBSCRIPTION_FROM_BLOCK") {
            config.subscription_from_block = block;
        }

        if let Some(limit) = read_env::<usize>(&lookup, "MAX_CONCURRENT_FETCHES") {
            config.runtime.max_concurrent_fetches = limit.max(1);
        }

        if let Some(capacity) = read_env::<usize>(&lookup, "EVENT_BUS_CAPACITY") {
            config.runtime.event_buffer_size = capacity.max(1);
        }

        if let Some(verify) = read_env::<bool>(&lookup, "VERIFY_CONTENT_HASH") {
            config.runtime.verify_content_hash = verify;
        }

        config.wallet_address = lookup("SOCIAL_WALLET_ADDRESS")
            .filter(|address| !address.is_empty())
            .map(WalletAddress::new);

        Ok(config)
    }
}

fn read_env<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    let value = lookup(key)?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("Ignoring invalid value {:?} for {}", value, key);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = ClientConfig::from_lookup(lookup(&[("UPLOAD_HOST", "http://up.local")]))
            .unwrap();
        assert_eq!(config.wallet_type, WalletType::Metamask);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.subscription_from_block, 0);
        assert_eq!(config.runtime.max_concurrent_fetches, 8);
        assert_eq!(config.runtime.event_buffer_size, 100);
        assert!(config.runtime.verify_content_hash);
        assert!(config.wallet_address.is_none());
    }

    #[test]
    fn overrides_are_read() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("UPLOAD_HOST", "http://up.local"),
            ("WALLET_TYPE", "torus"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("SUBSCRIPTION_FROM_BLOCK", "12"),
            ("MAX_CONCURRENT_FETCHES", "0"),
            ("VERIFY_CONTENT_HASH", "false"),
            ("SOCIAL_WALLET_ADDRESS", "0xwallet"),
        ]))
        .unwrap();

        assert_eq!(config.wallet_type, WalletType::Torus);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.subscription_from_block, 12);
        assert_eq!(config.runtime.max_concurrent_fetches, 1);
        assert!(!config.runtime.verify_content_hash);
        assert_eq!(config.wallet_address, Some(WalletAddress::new("0xwallet")));
    }

    #[test]
    fn upload_host_is_required() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[])),
            Err(ConfigError::MissingUploadHost)
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("UPLOAD_HOST", "not a url")])),
            Err(ConfigError::InvalidUploadHost { .. })
        ));
    }

    #[test]
    fn unknown_wallet_type_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("UPLOAD_HOST", "http://up.local"),
            ("WALLET_TYPE", "ledger"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownWalletType(t) if t == "ledger"));
    }
}
