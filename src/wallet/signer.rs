//! Key-backed wallet
//!
//! SECURITY: the private key lives only here.
//! - Key text arrives wrapped in `SecretString` and is dropped after parsing
//! - The key is held in alloy's PrivateKeySigner
//! - Keys are never serialized, logged, or shown in Debug output

use crate::wallet::{AccountId, Approval, Signer, WalletProvider};
use crate::{Error, Result};
use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;

/// Single-account wallet holding a local private key
pub struct KeyWallet {
    /// Public address (safe to expose)
    address: Address,
    /// Ethereum wallet for alloy integration
    wallet: EthereumWallet,
    approval: Approval,
    /// Whether the page has been granted the account
    authorized: RwLock<bool>,
}

impl KeyWallet {
    /// Create a wallet from an environment variable
    ///
    /// Returns `Ok(None)` when the variable is not set.
    pub fn from_env(var_name: &str, approval: Approval) -> Result<Option<Self>> {
        match std::env::var(var_name) {
            Ok(key_hex) => Self::from_secret(&SecretString::from(key_hex), approval).map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Create a wallet from a hex-encoded private key
    pub fn from_secret(key_hex: &SecretString, approval: Approval) -> Result<Self> {
        let key_hex = key_hex.expose_secret();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| Error::Signer(format!("Invalid private key: {}", e)))?;

        let address = signer.address();
        Ok(Self {
            address,
            wallet: EthereumWallet::from(signer),
            approval,
            authorized: RwLock::new(false),
        })
    }

    /// Start out already authorised for this page
    pub fn pre_authorized(self) -> Self {
        Self {
            authorized: RwLock::new(true),
            ..self
        }
    }

    /// Get the public address (safe to share)
    pub fn address(&self) -> Address {
        self.address
    }

    fn account(&self) -> AccountId {
        AccountId::from(self.address)
    }
}

#[async_trait]
impl WalletProvider for KeyWallet {
    fn name(&self) -> &str {
        "key-wallet"
    }

    async fn accounts(&self) -> Result<Vec<AccountId>> {
        if *self.authorized.read().await {
            Ok(vec![self.account()])
        } else {
            Ok(Vec::new())
        }
    }

    async fn request_accounts(&self) -> Result<Vec<AccountId>> {
        let account = self.account();
        if *self.authorized.read().await {
            return Ok(vec![account]);
        }

        if !self.approval.approve(self.name(), &account).await {
            return Err(Error::AuthorizationDenied(format!(
                "user rejected access to {}",
                account
            )));
        }

        *self.authorized.write().await = true;
        tracing::debug!(account = %account, "Account authorised");
        Ok(vec![account])
    }

    fn signer(&self, account: &AccountId) -> Result<Signer> {
        if account.address()? != self.address {
            return Err(Error::Signer(format!(
                "{} is not managed by this wallet",
                account
            )));
        }
        Ok(Signer::local(account.clone(), self.wallet.clone()))
    }
}

// Implement Debug manually to avoid exposing the signer
impl std::fmt::Debug for KeyWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyWallet")
            .field("address", &self.address)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}
