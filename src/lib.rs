//! Range ATM
//!
//! Wallet-connected front end for the ATM contract:
//! - Detects a wallet provider and connects an account
//! - Binds a signer-backed handle to the deployed contract
//! - Reads the balance and submits deposits and withdrawals
//!
//! # Security Model
//!
//! - Private keys stay inside the wallet provider that owns them
//! - The controller only handles account identifiers and opaque signers

pub mod config;
pub mod contract;
pub mod controller;
pub mod page;
pub mod session;
pub mod wallet;

mod error;

// Re-export commonly used types
pub use config::{Config, RpcEndpoint};
pub use controller::{ConnectionController, ConnectionState, Deployment};
pub use error::{Error, Result};
pub use page::{Action, View};
