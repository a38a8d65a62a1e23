//! Contract gateway over an alloy HTTP provider
//!
//! Local signers get a wallet filler and sign in-process; provider-managed
//! signers leave signing to the node (`eth_sendTransaction`).

use crate::config::RpcEndpoint;
use crate::contract::{ContractGateway, ContractHandle, ContractInterface, PendingTx};
use crate::wallet::{Signer, SignerKind};
use crate::{Error, Result};
use alloy::contract::{ContractInstance, Interface};
use alloy::dyn_abi::DynSolValue;
use alloy::hex;
use alloy::network::{Ethereum, ReceiptResponse};
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use async_trait::async_trait;

/// Selector of the standard `Error(string)` revert payload
const ERROR_STRING_SELECTOR: &str = "08c379a0";

/// Gateway connecting to the ATM through a JSON-RPC endpoint
#[derive(Debug, Clone)]
pub struct AlloyGateway {
    endpoint: RpcEndpoint,
}

impl AlloyGateway {
    pub fn new(endpoint: RpcEndpoint) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &RpcEndpoint {
        &self.endpoint
    }
}

#[async_trait]
impl ContractGateway for AlloyGateway {
    async fn connect(
        &self,
        address: Address,
        interface: &ContractInterface,
        signer: Signer,
    ) -> Result<Box<dyn ContractHandle>> {
        let url = self.endpoint.url()?;
        let from = signer.account().address()?;

        let provider = match signer.kind() {
            SignerKind::Local(wallet) => ProviderBuilder::new()
                .wallet(wallet.clone())
                .connect_http(url)
                .erased(),
            SignerKind::Provider => ProviderBuilder::new().connect_http(url).erased(),
        };

        tracing::debug!(
            contract = %address,
            from = %from,
            interface = interface.name(),
            "Built contract handle"
        );

        let instance =
            ContractInstance::new(address, provider, Interface::new(interface.abi().clone()));
        Ok(Box::new(AlloyContract { instance, from }))
    }
}

struct AlloyContract {
    instance: ContractInstance<DynProvider, Ethereum>,
    from: Address,
}

impl AlloyContract {
    async fn submit(&self, function: &str, amount: U256) -> Result<Box<dyn PendingTx>> {
        let call = self
            .instance
            .function(function, &[DynSolValue::Uint(amount, 256)])
            .map_err(|e| Error::Contract(format!("{}: {}", function, e)))?;

        let pending = call.from(self.from).send().await.map_err(|e| {
            let message = e.to_string();
            if message.contains("revert") {
                Error::Reverted(parse_revert_reason(&message))
            } else {
                Error::Contract(format!("{}: {}", function, message))
            }
        })?;

        tracing::info!(
            function,
            amount = %amount,
            tx_hash = %pending.tx_hash(),
            "Transaction submitted"
        );
        Ok(Box::new(AlloyPendingTx { inner: pending }))
    }
}

#[async_trait]
impl ContractHandle for AlloyContract {
    fn address(&self) -> Address {
        *self.instance.address()
    }

    async fn get_balance(&self) -> Result<U256> {
        let values = self
            .instance
            .function("getBalance", &[])
            .map_err(|e| Error::Contract(format!("getBalance: {}", e)))?
            .from(self.from)
            .call()
            .await
            .map_err(|e| Error::Contract(format!("getBalance: {}", e)))?;

        match values.first() {
            Some(DynSolValue::Uint(balance, _)) => Ok(*balance),
            other => Err(Error::Contract(format!(
                "getBalance returned {:?}, expected uint256",
                other
            ))),
        }
    }

    async fn deposit(&self, amount: U256) -> Result<Box<dyn PendingTx>> {
        self.submit("deposit", amount).await
    }

    async fn withdraw(&self, amount: U256) -> Result<Box<dyn PendingTx>> {
        self.submit("withdraw", amount).await
    }
}

struct AlloyPendingTx {
    inner: PendingTransactionBuilder<Ethereum>,
}

#[async_trait]
impl PendingTx for AlloyPendingTx {
    fn tx_hash(&self) -> TxHash {
        *self.inner.tx_hash()
    }

    async fn wait(self: Box<Self>) -> Result<()> {
        let tx_hash = self.tx_hash();
        let receipt = self
            .inner
            .get_receipt()
            .await
            .map_err(|e| Error::Contract(format!("waiting for {}: {}", tx_hash, e)))?;

        if !ReceiptResponse::status(&receipt) {
            return Err(Error::Reverted(format!("{} failed on-chain", tx_hash)));
        }

        tracing::debug!(
            tx_hash = %tx_hash,
            block = ?ReceiptResponse::block_number(&receipt),
            "Transaction included"
        );
        Ok(())
    }
}

/// Reduce an RPC error message to the revert reason it carries
fn parse_revert_reason(error: &str) -> String {
    // Hardhat node formats
    for marker in [
        "reverted with reason string '",
        "reverted with custom error '",
    ] {
        if let Some(start) = error.find(marker) {
            let reason = &error[start + marker.len()..];
            return reason.split('\'').next().unwrap_or(reason).to_string();
        }
    }

    // Geth / anvil: "execution reverted: <reason>, data: ..."
    if let Some(start) = error.find("execution reverted: ") {
        let reason = &error[start + "execution reverted: ".len()..];
        let reason = reason.split([',', '"']).next().unwrap_or(reason).trim();
        if !reason.is_empty() {
            return reason.to_string();
        }
    }

    // Raw Error(string) payload
    if let Some(start) = error.find(&format!("0x{}", ERROR_STRING_SELECTOR)) {
        let payload = &error[start + 2..];
        let end = payload
            .find(|c: char| !c.is_ascii_hexdigit())
            .unwrap_or(payload.len());
        if let Ok(bytes) = hex::decode(&payload[..end]) {
            if let Some(reason) = alloy::sol_types::decode_revert_reason(&bytes) {
                return reason;
            }
        }
        return format!("Reverted with data: 0x{}", &payload[..end]);
    }

    if error.contains("execution reverted") {
        return "execution reverted".to_string();
    }

    error.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::AccountId;
    use alloy::sol_types::{Revert, SolError};

    #[test]
    fn test_parse_hardhat_reason_string() {
        let error = "VM Exception while processing transaction: reverted with reason string 'You are not the owner of this account'";
        assert_eq!(
            parse_revert_reason(error),
            "You are not the owner of this account"
        );
    }

    #[test]
    fn test_parse_hardhat_custom_error() {
        let error = "reverted with custom error 'InsufficientBalance(1, 30)'";
        assert_eq!(parse_revert_reason(error), "InsufficientBalance(1, 30)");
    }

    #[test]
    fn test_parse_execution_reverted() {
        let error = "server returned an error response: error code 3: execution reverted: Insufficient balance, data: \"0x\"";
        assert_eq!(parse_revert_reason(error), "Insufficient balance");

        assert_eq!(
            parse_revert_reason("execution reverted"),
            "execution reverted"
        );
        assert_eq!(parse_revert_reason("connection refused"), "connection refused");
    }

    #[test]
    fn test_parse_error_string_payload() {
        let payload = Revert {
            reason: "Insufficient balance".to_string(),
        }
        .abi_encode();
        let error = format!("reverted, data: \"0x{}\"", hex::encode(payload));
        assert!(parse_revert_reason(&error).contains("Insufficient balance"));
    }

    #[tokio::test]
    async fn test_connect_binds_address() {
        let gateway = AlloyGateway::new(RpcEndpoint::new("http://127.0.0.1:8545"));
        let interface = ContractInterface::bundled().unwrap();
        let address = crate::config::DEFAULT_CONTRACT_ADDRESS;
        let signer = Signer::provider(AccountId::new(
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
        ));

        let handle = gateway.connect(address, &interface, signer).await.unwrap();
        assert_eq!(handle.address(), address);
    }

    #[tokio::test]
    async fn test_connect_rejects_unparseable_account() {
        let gateway = AlloyGateway::new(RpcEndpoint::new("http://127.0.0.1:8545"));
        let interface = ContractInterface::bundled().unwrap();
        let signer = Signer::provider(AccountId::new("0xABC"));

        let result = gateway
            .connect(crate::config::DEFAULT_CONTRACT_ADDRESS, &interface, signer)
            .await;
        assert!(matches!(result, Err(Error::Signer(_))));
    }
}
