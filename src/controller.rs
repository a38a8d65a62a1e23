//! Connection controller
//!
//! Owns the page's session state and moves it through
//! `NoWallet -> WalletDetected -> AccountConnected -> ContractReady`.
//!
//! # Failure handling
//!
//! - A missing wallet is terminal and the only failure reported to the user.
//! - Rejected authorization and empty account lists are logged and swallowed.
//!   The user has to invoke [`ConnectionController::request_connect`] again.
//! - Balance reads and transactions attempted before `ContractReady` are
//!   silent no-ops returning `Ok(None)`.
//!
//! # Balance mirror
//!
//! After a deposit or withdrawal is included, the mirrored balance is
//! adjusted locally by the submitted amount. It is not re-read from the
//! contract, so it can drift from the on-chain value until the next
//! [`ConnectionController::refresh_balance`].

use crate::contract::{ContractGateway, ContractHandle, ContractInterface};
use crate::wallet::{AccountId, WalletHost, WalletProvider};
use crate::{Error, Result};
use alloy::primitives::{Address, U256};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle position of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConnectionState {
    NoWallet,
    WalletDetected,
    AccountConnected,
    ContractReady,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::NoWallet => "no wallet",
            ConnectionState::WalletDetected => "wallet detected",
            ConnectionState::AccountConnected => "account connected",
            ConnectionState::ContractReady => "contract ready",
        };
        f.write_str(name)
    }
}

/// The fixed contract the page talks to
#[derive(Debug, Clone)]
pub struct Deployment {
    pub address: Address,
    pub interface: ContractInterface,
}

/// Session state, exposed only through the controller's transitions
struct Session {
    /// `Some(None)` once detection found nothing
    wallet: Option<Option<Arc<dyn WalletProvider>>>,
    account: Option<AccountId>,
    contract: Option<Box<dyn ContractHandle>>,
    balance: i128,
    show_address: bool,
}

pub struct ConnectionController {
    deployment: Deployment,
    gateway: Arc<dyn ContractGateway>,
    session: Session,
}

impl ConnectionController {
    pub fn new(
        deployment: Deployment,
        gateway: Arc<dyn ContractGateway>,
        initial_balance: i128,
    ) -> Self {
        Self {
            deployment,
            gateway,
            session: Session {
                wallet: None,
                account: None,
                contract: None,
                balance: initial_balance,
                show_address: false,
            },
        }
    }

    pub fn state(&self) -> ConnectionState {
        if self.session.contract.is_some() {
            ConnectionState::ContractReady
        } else if self.session.account.is_some() {
            ConnectionState::AccountConnected
        } else if self.wallet().is_some() {
            ConnectionState::WalletDetected
        } else {
            ConnectionState::NoWallet
        }
    }

    pub fn wallet_present(&self) -> bool {
        self.wallet().is_some()
    }

    pub fn account(&self) -> Option<&AccountId> {
        self.session.account.as_ref()
    }

    pub fn balance(&self) -> i128 {
        self.session.balance
    }

    pub fn has_contract(&self) -> bool {
        self.session.contract.is_some()
    }

    /// Address the contract handle is bound to, once built
    pub fn contract_address(&self) -> Option<Address> {
        self.session.contract.as_ref().map(|c| c.address())
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    pub fn address_visible(&self) -> bool {
        self.session.show_address
    }

    fn wallet(&self) -> Option<&Arc<dyn WalletProvider>> {
        self.session.wallet.as_ref().and_then(|w| w.as_ref())
    }

    /// Look for an injected wallet. Only the first call has any effect.
    pub fn detect_wallet(&mut self, host: &dyn WalletHost) -> ConnectionState {
        if self.session.wallet.is_some() {
            return self.state();
        }

        let provider = host.injected_provider();
        match &provider {
            Some(wallet) => info!(wallet = wallet.name(), "Wallet detected"),
            None => warn!("No wallet provider installed"),
        }
        self.session.wallet = Some(provider);
        self.state()
    }

    /// Pick up an account the wallet already authorised, without prompting
    pub async fn query_accounts(&mut self) -> Result<ConnectionState> {
        if self.state() != ConnectionState::WalletDetected {
            return Ok(self.state());
        }
        let Some(wallet) = self.wallet().cloned() else {
            return Ok(self.state());
        };

        let accounts = wallet.accounts().await?;
        self.handle_accounts(accounts);
        Ok(self.state())
    }

    /// Startup hook: detection followed by a silent account query
    pub async fn startup(&mut self, host: &dyn WalletHost) -> Result<ConnectionState> {
        self.detect_wallet(host);
        self.query_accounts().await
    }

    /// Ask the wallet for an account, then build the contract handle
    pub async fn request_connect(&mut self) -> Result<ConnectionState> {
        let Some(wallet) = self.wallet().cloned() else {
            return Err(Error::WalletAbsent);
        };

        match wallet.request_accounts().await {
            Ok(accounts) => self.handle_accounts(accounts),
            Err(e @ (Error::AuthorizationDenied(_) | Error::EmptyAccountList)) => {
                warn!(error = %e, "Account connection rejected");
                return Ok(self.state());
            }
            Err(e) => return Err(e),
        }

        Ok(self.build_contract_handle().await)
    }

    /// Record the first granted account. A connected account is never replaced.
    fn handle_accounts(&mut self, accounts: Vec<AccountId>) {
        let Some(account) = accounts.into_iter().next() else {
            warn!("No account found");
            return;
        };

        match &self.session.account {
            Some(current) if *current != account => {
                warn!(current = %current, granted = %account, "Keeping connected account");
            }
            Some(_) => debug!(account = %account, "Account already connected"),
            None => {
                info!(account = %account, "Account connected");
                self.session.account = Some(account);
            }
        }
    }

    /// Bind a contract handle to the connected account's signer.
    ///
    /// Failures are logged and leave the handle unset.
    pub async fn build_contract_handle(&mut self) -> ConnectionState {
        if self.session.contract.is_some() {
            return self.state();
        }
        let (Some(wallet), Some(account)) = (self.wallet().cloned(), self.session.account.clone())
        else {
            return self.state();
        };

        let signer = match wallet.signer(&account) {
            Ok(signer) => signer,
            Err(e) => {
                warn!(account = %account, error = %e, "Could not build signer");
                return self.state();
            }
        };

        match self
            .gateway
            .connect(self.deployment.address, &self.deployment.interface, signer)
            .await
        {
            Ok(contract) => {
                debug!(contract = %contract.address(), "Contract ready");
                self.session.contract = Some(contract);
            }
            Err(e) => warn!(error = %e, "Could not connect to contract"),
        }
        self.state()
    }

    /// Replace the balance mirror with the contract's `getBalance()`
    pub async fn refresh_balance(&mut self) -> Result<Option<i128>> {
        let Some(contract) = self.session.contract.as_ref() else {
            return Ok(None);
        };

        let balance = to_mirror(contract.get_balance().await?)?;
        self.session.balance = balance;
        Ok(Some(balance))
    }

    /// Deposit `amount`, then add it to the balance mirror on inclusion
    pub async fn deposit(&mut self, amount: u64) -> Result<Option<i128>> {
        let Some(contract) = self.session.contract.as_ref() else {
            return Ok(None);
        };

        contract.deposit(U256::from(amount)).await?.wait().await?;
        self.session.balance = self.session.balance.saturating_add(i128::from(amount));
        info!(amount, balance = %self.session.balance, "Deposit included");
        Ok(Some(self.session.balance))
    }

    /// Withdraw `amount`, then subtract it from the balance mirror on inclusion
    pub async fn withdraw(&mut self, amount: u64) -> Result<Option<i128>> {
        let Some(contract) = self.session.contract.as_ref() else {
            return Ok(None);
        };

        contract.withdraw(U256::from(amount)).await?.wait().await?;
        self.session.balance = self.session.balance.saturating_sub(i128::from(amount));
        info!(amount, balance = %self.session.balance, "Withdrawal included");
        Ok(Some(self.session.balance))
    }

    /// Flip account visibility
    pub fn toggle_address(&mut self) -> bool {
        self.session.show_address = !self.session.show_address;
        self.session.show_address
    }
}

fn to_mirror(balance: U256) -> Result<i128> {
    i128::try_from(balance).map_err(|_| Error::BalanceOverflow(balance.to_string()))
}
