//! RPC endpoint configuration
//!
//! Resolution order:
//! 1. `ATM_RPC_URL` - endpoint dedicated to the ATM
//! 2. `ETH_RPC_URL` - the usual Ethereum tooling variable
//! 3. Local development node (`http://127.0.0.1:8545`)
//!
//! ```bash
//! export ATM_RPC_URL="http://127.0.0.1:8545"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Environment variable names
mod env_vars {
    pub const ATM_RPC_URL: &str = "ATM_RPC_URL";
    pub const ETH_RPC_URL: &str = "ETH_RPC_URL";
}

/// Hardhat / anvil default listen address
pub const LOCAL_NODE_URL: &str = "http://127.0.0.1:8545";

/// JSON-RPC endpoint of the chain the ATM is deployed on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RpcEndpoint(String);

impl RpcEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Resolve the endpoint from environment variables
    pub fn from_env() -> Self {
        Self::resolve(|name| std::env::var(name).ok())
    }

    fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(env_vars::ATM_RPC_URL) {
            tracing::debug!("Using ATM_RPC_URL");
            return Self(url);
        }
        if let Some(url) = lookup(env_vars::ETH_RPC_URL) {
            tracing::debug!("Using ETH_RPC_URL");
            return Self(url);
        }
        tracing::info!(url = LOCAL_NODE_URL, "No RPC configured, using local node");
        Self(LOCAL_NODE_URL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into a URL usable by an HTTP transport
    pub fn url(&self) -> Result<url::Url> {
        self.0
            .parse()
            .map_err(|e| Error::Config(format!("Invalid RPC URL {}: {}", self.0, e)))
    }
}

impl Default for RpcEndpoint {
    fn default() -> Self {
        Self::from_env()
    }
}

impl fmt::Display for RpcEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
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
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_atm_url_takes_priority() {
        let endpoint = RpcEndpoint::resolve(lookup(&[
            ("ATM_RPC_URL", "http://atm.rpc"),
            ("ETH_RPC_URL", "http://eth.rpc"),
        ]));
        assert_eq!(endpoint.as_str(), "http://atm.rpc");
    }

    #[test]
    fn test_eth_url_fallback() {
        let endpoint = RpcEndpoint::resolve(lookup(&[("ETH_RPC_URL", "http://eth.rpc")]));
        assert_eq!(endpoint.as_str(), "http://eth.rpc");
    }

    #[test]
    fn test_local_node_fallback() {
        let endpoint = RpcEndpoint::resolve(lookup(&[]));
        assert_eq!(endpoint.as_str(), LOCAL_NODE_URL);
        assert!(endpoint.url().is_ok());
    }

    #[test]
    fn test_invalid_url() {
        let err = RpcEndpoint::new("not a url").url().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
