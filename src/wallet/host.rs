//! Wallet detection in the host environment

use crate::config::{RpcEndpoint, WalletConfig, WalletSource};
use crate::wallet::{Approval, KeyWallet, NodeWallet, WalletProvider};
use crate::Result;
use std::sync::Arc;

/// Environment a wallet provider may be injected into
pub trait WalletHost {
    /// The injected provider, if one is installed
    fn injected_provider(&self) -> Option<Arc<dyn WalletProvider>>;
}

impl WalletHost for Option<Arc<dyn WalletProvider>> {
    fn injected_provider(&self) -> Option<Arc<dyn WalletProvider>> {
        self.clone()
    }
}

/// Host whose wallet is chosen by configuration
pub struct ConfiguredHost {
    provider: Option<Arc<dyn WalletProvider>>,
}

impl ConfiguredHost {
    /// Resolve the configured wallet source
    ///
    /// A key source whose environment variable is unset counts as no wallet.
    pub async fn resolve(config: &WalletConfig, endpoint: &RpcEndpoint) -> Result<Self> {
        Self::resolve_with(config, endpoint, Approval::new(config.approval)).await
    }

    /// Resolve the configured wallet source, answering requests with `approval`
    pub async fn resolve_with(
        config: &WalletConfig,
        endpoint: &RpcEndpoint,
        approval: Approval,
    ) -> Result<Self> {
        let provider: Option<Arc<dyn WalletProvider>> = match config.source {
            WalletSource::Key => match KeyWallet::from_env(&config.key_env, approval)? {
                Some(wallet) => {
                    tracing::debug!(address = %wallet.address(), "Loaded key wallet");
                    let wallet = if config.pre_authorized {
                        wallet.pre_authorized()
                    } else {
                        wallet
                    };
                    Some(Arc::new(wallet))
                }
                None => {
                    tracing::debug!(var = %config.key_env, "Wallet key not set");
                    None
                }
            },
            WalletSource::Node => {
                let wallet = NodeWallet::connect(endpoint.clone(), approval)?;
                if config.pre_authorized {
                    wallet.pre_authorize().await?;
                }
                Some(Arc::new(wallet))
            }
            WalletSource::None => None,
        };
        Ok(Self { provider })
    }
}

impl WalletHost for ConfiguredHost {
    fn injected_provider(&self) -> Option<Arc<dyn WalletProvider>> {
        self.provider.clone()
    }
}
