//! Error types for the Range ATM front end

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("A wallet provider is required to use this ATM. Install one and try again.")]
    WalletAbsent,

    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("Wallet returned no accounts")]
    EmptyAccountList,

    #[error("Signer error: {0}")]
    Signer(String),

    #[error("Contract call failed: {0}")]
    Contract(String),

    #[error("Transaction reverted: {0}")]
    Reverted(String),

    #[error("Invalid contract interface: {0}")]
    Interface(String),

    #[error("Balance does not fit in the local mirror: {0}")]
    BalanceOverflow(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
