//! Configuration for the Range ATM front end

pub mod rpc;

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use rpc::RpcEndpoint;

use crate::{Error, Result};

/// Address the ATM contract lands at on a fresh local node
pub const DEFAULT_CONTRACT_ADDRESS: Address =
    address!("5FbDB2315678afecb367f032d93F642f64180aa3");

/// Environment variable holding the wallet's private key
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// Where the wallet provider comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WalletSource {
    /// Local private key read from the environment
    #[default]
    Key,
    /// Accounts managed by the node behind the RPC endpoint
    Node,
    /// No wallet installed
    None,
}

/// How account authorization requests are answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalMode {
    /// Ask on the terminal
    #[default]
    Prompt,
    /// Approve every request
    Auto,
    /// Reject every request
    Deny,
}

/// Wallet settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    #[serde(default)]
    pub source: WalletSource,
    /// Environment variable holding the private key (key source only)
    #[serde(default = "default_key_env")]
    pub key_env: String,
    #[serde(default)]
    pub approval: ApprovalMode,
    /// Treat the account as already authorised for this page
    #[serde(default)]
    pub pre_authorized: bool,
}

fn default_key_env() -> String {
    PRIVATE_KEY_ENV.to_string()
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            source: WalletSource::default(),
            key_env: default_key_env(),
            approval: ApprovalMode::default(),
            pre_authorized: false,
        }
    }
}

/// Deployed contract settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Deployment address
    #[serde(default = "default_contract_address")]
    pub address: Address,
    /// Hardhat artifact overriding the bundled interface
    #[serde(default)]
    pub artifact: Option<PathBuf>,
}

fn default_contract_address() -> Address {
    DEFAULT_CONTRACT_ADDRESS
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_CONTRACT_ADDRESS,
            artifact: None,
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub contract: ContractConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    /// RPC endpoint; resolved from the environment when absent
    #[serde(default)]
    pub rpc: Option<RpcEndpoint>,
    /// Placeholder shown until the first balance read
    #[serde(default = "default_initial_balance")]
    pub initial_balance: i64,
}

fn default_initial_balance() -> i64 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            contract: ContractConfig::default(),
            wallet: WalletConfig::default(),
            rpc: None,
            initial_balance: default_initial_balance(),
        }
    }
}

impl Config {
    /// Load a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// The configured endpoint, or the one resolved from the environment
    pub fn rpc_endpoint(&self) -> RpcEndpoint {
        self.rpc.clone().unwrap_or_else(RpcEndpoint::from_env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let parsed: Config = serde_json::from_value(serde_json::json!({})).expect("parse config");
        assert_eq!(parsed.contract.address, DEFAULT_CONTRACT_ADDRESS);
        assert!(parsed.contract.artifact.is_none());
        assert_eq!(parsed.wallet.source, WalletSource::Key);
        assert_eq!(parsed.wallet.key_env, "PRIVATE_KEY");
        assert_eq!(parsed.wallet.approval, ApprovalMode::Prompt);
        assert!(!parsed.wallet.pre_authorized);
        assert_eq!(parsed.initial_balance, 1);
        assert!(parsed.rpc.is_none());
    }

    #[test]
    fn explicit_config() {
        let value = serde_json::json!({
            "contract": {
                "address": "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512",
                "artifact": "artifacts/Other.json"
            },
            "wallet": {
                "source": "node",
                "approval": "auto",
                "pre_authorized": true
            },
            "rpc": "http://localhost:9545",
            "initial_balance": 0
        });
        let parsed: Config = serde_json::from_value(value).expect("parse config");
        assert_eq!(
            parsed.contract.address,
            address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512")
        );
        assert_eq!(
            parsed.contract.artifact.as_deref(),
            Some(Path::new("artifacts/Other.json"))
        );
        assert_eq!(parsed.wallet.source, WalletSource::Node);
        assert_eq!(parsed.wallet.approval, ApprovalMode::Auto);
        assert!(parsed.wallet.pre_authorized);
        assert_eq!(parsed.rpc_endpoint().as_str(), "http://localhost:9545");
        assert_eq!(parsed.initial_balance, 0);
    }

    #[test]
    fn unknown_wallet_source_is_rejected() {
        let value = serde_json::json!({ "wallet": { "source": "ledger" } });
        assert!(serde_json::from_value::<Config>(value).is_err());
    }

    #[test]
    fn from_file_reports_missing_path() {
        let err = Config::from_file(Path::new("/nonexistent/atm.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
