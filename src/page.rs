//! What the ATM page shows for a given session state

use crate::controller::ConnectionController;
use crate::{Error, Result};
use std::fmt;

/// Placeholder shown while the account is hidden
pub const MASKED_ACCOUNT: &str = "************";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// No wallet in the host environment
    InstallWallet,
    /// Wallet present, no account yet
    ConnectPrompt,
    Dashboard {
        account: String,
        address_visible: bool,
        balance: i128,
    },
}

impl View {
    pub fn render(controller: &ConnectionController) -> Self {
        if !controller.wallet_present() {
            return View::InstallWallet;
        }
        let Some(account) = controller.account() else {
            return View::ConnectPrompt;
        };

        let address_visible = controller.address_visible();
        View::Dashboard {
            account: if address_visible {
                account.to_string()
            } else {
                MASKED_ACCOUNT.to_string()
            },
            address_visible,
            balance: controller.balance(),
        }
    }
}

/// Buttons and inputs of the page, as typed in an interactive session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Connect,
    Balance,
    Deposit(u64),
    Withdraw(u64),
    ToggleAddress,
    Status,
    Help,
    Quit,
}

impl Action {
    pub const HELP: &'static str = "commands: connect | balance | deposit <n> | withdraw <n> | toggle | status | help | quit";

    /// Parse one input line.
    ///
    /// Blank lines and a deposit or withdrawal with an empty amount are
    /// `Ok(None)`, like pressing a button next to an empty amount field.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(None);
        };

        let action = match command.to_ascii_lowercase().as_str() {
            "connect" => Action::Connect,
            "balance" => Action::Balance,
            "deposit" => match parse_amount(words.next())? {
                Some(amount) => Action::Deposit(amount),
                None => return Ok(None),
            },
            "withdraw" => match parse_amount(words.next())? {
                Some(amount) => Action::Withdraw(amount),
                None => return Ok(None),
            },
            "toggle" => Action::ToggleAddress,
            "status" => Action::Status,
            "help" | "?" => Action::Help,
            "quit" | "exit" => Action::Quit,
            other => {
                return Err(Error::InvalidArgument(format!(
                    "unknown command '{}'",
                    other
                )))
            }
        };

        if let Some(extra) = words.next() {
            return Err(Error::InvalidArgument(format!(
                "unexpected argument '{}'",
                extra
            )));
        }
        Ok(Some(action))
    }
}

fn parse_amount(input: Option<&str>) -> Result<Option<u64>> {
    let Some(input) = input else {
        return Ok(None);
    };
    input
        .parse()
        .map(Some)
        .map_err(|_| Error::InvalidArgument(format!("'{}' is not a whole amount", input)))
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Welcome to the Range ATM!")?;
        match self {
            View::InstallWallet => {
                write!(f, "Please install a wallet in order to use this ATM.")
            }
            View::ConnectPrompt => write!(f, "Please connect your wallet (type `connect`)."),
            View::Dashboard {
                account,
                address_visible,
                balance,
            } => {
                writeln!(f, "Your Account: {}", account)?;
                writeln!(f, "Your Balance: {}", balance)?;
                let toggle = if *address_visible {
                    "Hide Address"
                } else {
                    "Show Address"
                };
                write!(f, "[toggle] {}  [deposit <n>]  [withdraw <n>]", toggle)
            }
        }
    }
}
