//! Wallet providers
//!
//! A wallet provider brokers account identity and transaction signing. The
//! controller only ever sees the [`WalletProvider`] trait; private keys stay
//! inside the provider that owns them.

mod approval;
mod host;
mod node;
mod signer;

pub use approval::{is_yes, Approval, Prompter, TerminalPrompter};
pub use host::{ConfiguredHost, WalletHost};
pub use node::NodeWallet;
pub use signer::KeyWallet;

use crate::Result;
use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account identifier as reported by a wallet provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse as an EVM address
    pub fn address(&self) -> Result<Address> {
        Address::from_str(&self.0)
            .map_err(|e| crate::Error::Signer(format!("Invalid account {}: {}", self.0, e)))
    }
}

impl From<Address> for AccountId {
    fn from(address: Address) -> Self {
        Self(address.to_checksum(None))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How transactions for an account get signed
#[derive(Clone)]
pub enum SignerKind {
    /// Signed in-process by the wallet's key
    Local(EthereumWallet),
    /// Signed by the provider behind the RPC endpoint (`eth_sendTransaction`)
    Provider,
}

/// Signing capability bound to one account
///
/// Opaque to the controller; consumed by a contract gateway.
#[derive(Clone)]
pub struct Signer {
    account: AccountId,
    kind: SignerKind,
}

impl Signer {
    pub fn local(account: AccountId, wallet: EthereumWallet) -> Self {
        Self {
            account,
            kind: SignerKind::Local(wallet),
        }
    }

    pub fn provider(account: AccountId) -> Self {
        Self {
            account,
            kind: SignerKind::Provider,
        }
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn kind(&self) -> &SignerKind {
        &self.kind
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            SignerKind::Local(_) => "local",
            SignerKind::Provider => "provider",
        };
        f.debug_struct("Signer")
            .field("account", &self.account)
            .field("kind", &kind)
            .finish()
    }
}

/// Injected wallet capability
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Accounts this page is already authorised for. Never prompts.
    async fn accounts(&self) -> Result<Vec<AccountId>>;

    /// Ask the user to authorise an account for this page.
    ///
    /// A rejected prompt is [`crate::Error::AuthorizationDenied`].
    async fn request_accounts(&self) -> Result<Vec<AccountId>>;

    /// Signing capability for a previously returned account
    fn signer(&self, account: &AccountId) -> Result<Signer>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn account_from_address_is_checksummed() {
        let account = AccountId::from(address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"));
        assert_eq!(
            account.as_str(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
        assert!(account.address().is_ok());
    }

    #[test]
    fn non_address_account_fails_to_parse() {
        let err = AccountId::new("0xABC").address().unwrap_err();
        assert!(matches!(err, crate::Error::Signer(_)));
    }

    #[test]
    fn signer_debug_hides_wallet() {
        let signer = Signer::provider(AccountId::new("0xABC"));
        let debug_str = format!("{:?}", signer);
        assert!(debug_str.contains("0xABC"));
        assert!(debug_str.contains("provider"));
    }
}
