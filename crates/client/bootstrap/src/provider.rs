//! Wallet provider selection.
//!
//! The provider is passed around as an explicit [`ProviderHandle`]; a wallet
//! type whose provider is missing fails at setup with a [`ConfigError`].
use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

pub const TORUS_DEFAULT_NETWORK: &str = "mainnet";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WalletType {
    #[default]
    Metamask,
    Torus,
}

impl fmt::Display for WalletType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WalletType::Metamask => "metamask",
            WalletType::Torus => "torus",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for WalletType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metamask" => Ok(WalletType::Metamask),
            "torus" => Ok(WalletType::Torus),
            _ => Err(ConfigError::UnknownWalletType(s.to_string())),
        }
    }
}

/// Connected wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderHandle {
    pub wallet_type: WalletType,
    /// RPC endpoint for the injected provider, network name for Torus
    pub endpoint: String,
}

/// Providers available in this environment.
#[derive(Debug, Clone, Default)]
pub struct WalletProviders {
    pub injected: Option<String>,
    pub torus: Option<String>,
}

impl WalletProviders {
    /// Injected provider at `rpc_url` (if any) plus Torus on its default network.
    pub fn discover(rpc_url: Option<&str>) -> Self {
        Self {
            injected: rpc_url.map(str::to_string),
            torus: Some(TORUS_DEFAULT_NETWORK.to_string()),
        }
    }
}

pub fn setup_provider(
    wallet_type: WalletType,
    providers: &WalletProviders,
) -> Result<ProviderHandle, ConfigError> {
    let endpoint = match wallet_type {
        WalletType::Metamask => providers
            .injected
            .clone()
            .ok_or(ConfigError::MissingInjectedProvider)?,
        WalletType::Torus => providers
            .torus
            .clone()
            .ok_or(ConfigError::TorusUnavailable)?,
    };

    tracing::info!("Using {} wallet provider at {}", wallet_type, endpoint);
    Ok(ProviderHandle {
        wallet_type,
        endpoint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_type_parses_case_insensitively() {
        assert_eq!("MetaMask".parse::<WalletType>().unwrap(), WalletType::Metamask);
        assert_eq!("torus".parse::<WalletType>().unwrap(), WalletType::Torus);
        assert!(matches!(
            "walletconnect".parse::<WalletType>(),
            Err(ConfigError::UnknownWalletType(_))
        ));
    }

    #[test]
    fn metamask_needs_injected_provider() {
        let providers = WalletProviders::discover(None);
        assert!(matches!(
            setup_provider(WalletType::Metamask, &providers),
            Err(ConfigError::MissingInjectedProvider)
        ));

        let handle = setup_provider(WalletType::Torus, &providers).unwrap();
        assert_eq!(handle.endpoint, TORUS_DEFAULT_NETWORK);
    }

    #[test]
    fn torus_can_be_missing() {
        let providers = WalletProviders {
            injected: Some("http://localhost:8545".to_string()),
            torus: None,
        };
        assert!(matches!(
            setup_provider(WalletType::Torus, &providers),
            Err(ConfigError::TorusUnavailable)
        ));
        let handle = setup_provider(WalletType::Metamask, &providers).unwrap();
        assert_eq!(handle.endpoint, "http://localhost:8545");
    }
}
