//! Node-managed accounts
//!
//! EIP-1193 style wallet backed by a development node's JSON-RPC. Account
//! discovery uses `eth_accounts`; transactions are handed to the node with
//! `from` set and signed there.

use crate::config::RpcEndpoint;
use crate::wallet::{AccountId, Approval, Signer, WalletProvider};
use crate::{Error, Result};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Wallet whose keys live in the node behind the RPC endpoint
pub struct NodeWallet {
    endpoint: RpcEndpoint,
    provider: DynProvider,
    approval: Approval,
    /// Accounts the page has been granted
    granted: RwLock<Vec<AccountId>>,
}

impl NodeWallet {
    pub fn connect(endpoint: RpcEndpoint, approval: Approval) -> Result<Self> {
        let provider = ProviderBuilder::new()
            .connect_http(endpoint.url()?)
            .erased();
        Ok(Self {
            endpoint,
            provider,
            approval,
            granted: RwLock::new(Vec::new()),
        })
    }

    /// Mark the node's first account as already granted
    pub async fn pre_authorize(&self) -> Result<()> {
        let accounts = self.node_accounts().await?;
        *self.granted.write().await = accounts.into_iter().take(1).collect();
        Ok(())
    }

    async fn node_accounts(&self) -> Result<Vec<AccountId>> {
        let accounts = self.provider.get_accounts().await.map_err(|e| {
            Error::Signer(format!("eth_accounts failed on {}: {}", self.endpoint, e))
        })?;
        Ok(accounts.into_iter().map(AccountId::from).collect())
    }
}

#[async_trait]
impl WalletProvider for NodeWallet {
    fn name(&self) -> &str {
        "node-wallet"
    }

    async fn accounts(&self) -> Result<Vec<AccountId>> {
        Ok(self.granted.read().await.clone())
    }

    async fn request_accounts(&self) -> Result<Vec<AccountId>> {
        let granted = self.granted.read().await.clone();
        if !granted.is_empty() {
            return Ok(granted);
        }

        let Some(account) = self.node_accounts().await?.into_iter().next() else {
            return Err(Error::EmptyAccountList);
        };

        if !self.approval.approve(self.name(), &account).await {
            return Err(Error::AuthorizationDenied(format!(
                "user rejected access to {}",
                account
            )));
        }

        let granted = vec![account];
        *self.granted.write().await = granted.clone();
        Ok(granted)
    }

    fn signer(&self, account: &AccountId) -> Result<Signer> {
        account.address()?;
        Ok(Signer::provider(account.clone()))
    }
}

impl std::fmt::Debug for NodeWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeWallet")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApprovalMode;
    use crate::wallet::SignerKind;

    #[test]
    fn test_rejects_invalid_endpoint() {
        let err = NodeWallet::connect(
            RpcEndpoint::new("::not a url::"),
            Approval::new(ApprovalMode::Auto),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_nothing_granted_initially() {
        let wallet = NodeWallet::connect(
            RpcEndpoint::new("http://127.0.0.1:8545"),
            Approval::new(ApprovalMode::Auto),
        )
        .unwrap();
        assert!(wallet.accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_signer_is_provider_managed() {
        let wallet = NodeWallet::connect(
            RpcEndpoint::new("http://127.0.0.1:8545"),
            Approval::new(ApprovalMode::Auto),
        )
        .unwrap();
        let account = AccountId::new("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
        let signer = wallet.signer(&account).unwrap();
        assert!(matches!(signer.kind(), SignerKind::Provider));
        assert_eq!(signer.account(), &account);
    }
}
