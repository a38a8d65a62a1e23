//! Contract gateway
//!
//! A gateway turns a deployment address, an interface description and a
//! signer into a callable handle on the ATM contract.

mod gateway;
mod interface;

pub use gateway::AlloyGateway;
pub use interface::ContractInterface;

use crate::wallet::Signer;
use crate::Result;
use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

/// Factory for contract handles
#[async_trait]
pub trait ContractGateway: Send + Sync {
    async fn connect(
        &self,
        address: Address,
        interface: &ContractInterface,
        signer: Signer,
    ) -> Result<Box<dyn ContractHandle>>;
}

/// Signer-bound handle on a deployed ATM contract
#[async_trait]
pub trait ContractHandle: Send + Sync {
    /// Deployment address the handle is bound to
    fn address(&self) -> Address;

    /// `getBalance()` read call
    async fn get_balance(&self) -> Result<U256>;

    /// Submit `deposit(amount)`
    async fn deposit(&self, amount: U256) -> Result<Box<dyn PendingTx>>;

    /// Submit `withdraw(amount)`
    async fn withdraw(&self, amount: U256) -> Result<Box<dyn PendingTx>>;
}

/// Submitted transaction awaiting inclusion
#[async_trait]
pub trait PendingTx: Send {
    fn tx_hash(&self) -> TxHash;

    /// Resolves once the transaction is included
    async fn wait(self: Box<Self>) -> Result<()>;
}
