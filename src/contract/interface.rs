//! ATM contract interface description
//!
//! The interface is the `abi` section of a Hardhat build artifact. The ATM's
//! own artifact is embedded at compile time; another one can be loaded from
//! disk as long as it exposes the same three entry points.

use crate::{Error, Result};
use alloy::json_abi::JsonAbi;
use serde::Deserialize;
use std::path::Path;

const BUNDLED_ARTIFACT: &str = include_str!("../../artifacts/Assessment.json");

/// `(name, inputs, outputs)` every ATM interface must provide
const REQUIRED_FUNCTIONS: [(&str, usize, usize); 3] =
    [("getBalance", 0, 1), ("deposit", 1, 0), ("withdraw", 1, 0)];

#[derive(Deserialize)]
struct Artifact {
    #[serde(rename = "contractName", default)]
    contract_name: Option<String>,
    abi: JsonAbi,
}

/// Validated ABI of the ATM contract
#[derive(Debug, Clone)]
pub struct ContractInterface {
    name: String,
    abi: JsonAbi,
}

impl ContractInterface {
    /// The interface compiled into the binary
    pub fn bundled() -> Result<Self> {
        Self::from_artifact_json(BUNDLED_ARTIFACT)
    }

    /// Bundled interface, or the artifact at `path` when given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_artifact_file(path),
            None => Self::bundled(),
        }
    }

    pub fn from_artifact_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Interface(format!("{}: {}", path.display(), e)))?;
        Self::from_artifact_json(&content)
    }

    pub fn from_artifact_json(json: &str) -> Result<Self> {
        let artifact: Artifact = serde_json::from_str(json)
            .map_err(|e| Error::Interface(format!("Malformed artifact: {}", e)))?;
        Self::from_abi(
            artifact.contract_name.unwrap_or_else(|| "Contract".to_string()),
            artifact.abi,
        )
    }

    pub fn from_abi(name: impl Into<String>, abi: JsonAbi) -> Result<Self> {
        for (function, inputs, outputs) in REQUIRED_FUNCTIONS {
            let found = abi
                .function(function)
                .map(|overloads| {
                    overloads
                        .iter()
                        .any(|f| f.inputs.len() == inputs && f.outputs.len() == outputs)
                })
                .unwrap_or(false);
            if !found {
                return Err(Error::Interface(format!(
                    "missing {}({} inputs) -> {} outputs",
                    function, inputs, outputs
                )));
            }
        }
        Ok(Self {
            name: name.into(),
            abi,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_bundled_interface() {
        let interface = ContractInterface::bundled().unwrap();
        assert_eq!(interface.name(), "Assessment");
        assert!(interface.abi().function("getBalance").is_some());
    }

    #[test]
    fn test_missing_withdraw_is_rejected() {
        let json = serde_json::json!({
            "abi": [
                {
                    "type": "function", "name": "getBalance", "stateMutability": "view",
                    "inputs": [],
                    "outputs": [{ "name": "", "type": "uint256" }]
                },
                {
                    "type": "function", "name": "deposit", "stateMutability": "payable",
                    "inputs": [{ "name": "_amount", "type": "uint256" }],
                    "outputs": []
                }
            ]
        });
        let err = ContractInterface::from_artifact_json(&json.to_string()).unwrap_err();
        assert!(err.to_string().contains("withdraw"));
    }

    #[test]
    fn test_malformed_artifact() {
        let err = ContractInterface::from_artifact_json("{\"bytecode\": \"0x\"}").unwrap_err();
        assert!(matches!(err, Error::Interface(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BUNDLED_ARTIFACT.as_bytes()).unwrap();

        let interface = ContractInterface::load(Some(file.path())).unwrap();
        assert_eq!(interface.name(), "Assessment");
    }

    #[test]
    fn test_load_missing_file() {
        let err = ContractInterface::load(Some(Path::new("/nonexistent/Atm.json"))).unwrap_err();
        assert!(matches!(err, Error::Interface(_)));
    }
}
