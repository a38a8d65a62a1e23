//! Terminal front end driving the connection controller
//!
//! An interactive session reads commands line by line. Prompt-mode wallet
//! approvals read their answer from the same [`LineInput`], so a piped
//! script answers them in order with the commands around it.

use crate::controller::ConnectionController;
use crate::page::{Action, View};
use crate::wallet::{is_yes, Prompter};
use crate::{Error, Result};
use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::Mutex;

/// Line source shared by the command loop and approval prompts
pub struct LineInput<R> {
    lines: Arc<Mutex<Lines<R>>>,
}

impl<R> Clone for LineInput<R> {
    fn clone(&self) -> Self {
        Self {
            lines: self.lines.clone(),
        }
    }
}

impl<R: AsyncBufRead + Unpin + Send> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: Arc::new(Mutex::new(reader.lines())),
        }
    }

    /// Next input line, `None` at end of input
    pub async fn next_line(&self) -> Result<Option<String>> {
        Ok(self.lines.lock().await.next_line().await?)
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send + 'static> Prompter for LineInput<R> {
    async fn confirm(&self, question: &str) -> bool {
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "{}", question).and_then(|_| stderr.flush());

        match self.next_line().await {
            Ok(Some(answer)) => is_yes(&answer),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read approval answer");
                false
            }
        }
    }
}

/// Run commands from `input` until `quit` or end of input
pub async fn run_session<R, W>(
    controller: &mut ConnectionController,
    input: &LineInput<R>,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write,
{
    writeln!(out, "{}", View::render(controller))?;
    writeln!(out, "{}", Action::HELP)?;

    while let Some(line) = input.next_line().await? {
        let action = match Action::parse(&line) {
            Ok(Some(action)) => action,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "{}", e)?;
                continue;
            }
        };

        match action {
            Action::Quit => break,
            Action::Help => {
                writeln!(out, "{}", Action::HELP)?;
                continue;
            }
            Action::Status => {
                writeln!(out, "state: {}", controller.state())?;
                continue;
            }
            _ => {}
        }

        match apply(controller, action).await {
            Ok(()) => writeln!(out, "{}", View::render(controller))?,
            // The page has nothing else to offer without a wallet
            Err(e @ Error::WalletAbsent) => writeln!(out, "{}", e)?,
            Err(e) => tracing::error!(error = %e, "Operation failed"),
        }
    }

    Ok(())
}

/// Connect, run a single action and print the resulting page
///
/// Without a wallet the install prompt is printed and nothing else runs.
pub async fn run_once<W: Write>(
    controller: &mut ConnectionController,
    action: Action,
    out: &mut W,
) -> Result<()> {
    match controller.request_connect().await {
        Ok(_) => {}
        Err(Error::WalletAbsent) => {
            writeln!(out, "{}", View::render(controller))?;
            return Ok(());
        }
        Err(e) => return Err(e),
    }

    apply(controller, action).await?;
    writeln!(out, "{}", View::render(controller))?;
    Ok(())
}

async fn apply(controller: &mut ConnectionController, action: Action) -> Result<()> {
    let outcome = match action {
        Action::Connect => {
            controller.request_connect().await?;
            return Ok(());
        }
        Action::ToggleAddress => {
            controller.toggle_address();
            return Ok(());
        }
        Action::Balance => controller.refresh_balance().await?,
        Action::Deposit(amount) => controller.deposit(amount).await?,
        Action::Withdraw(amount) => controller.withdraw(amount).await?,
        Action::Status | Action::Help | Action::Quit => return Ok(()),
    };

    if outcome.is_none() {
        tracing::debug!(state = %controller.state(), "Contract not ready, nothing done");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApprovalMode, RpcEndpoint, DEFAULT_CONTRACT_ADDRESS};
    use crate::contract::{AlloyGateway, ContractInterface};
    use crate::controller::{ConnectionState, Deployment};
    use crate::wallet::{Approval, KeyWallet, WalletProvider};
    use secrecy::SecretString;
    use tokio::io::BufReader;

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    type Script = BufReader<&'static [u8]>;

    fn script(text: &'static str) -> LineInput<Script> {
        LineInput::new(BufReader::new(text.as_bytes()))
    }

    fn controller() -> ConnectionController {
        let deployment = Deployment {
            address: DEFAULT_CONTRACT_ADDRESS,
            interface: ContractInterface::bundled().unwrap(),
        };
        let gateway = AlloyGateway::new(RpcEndpoint::new("http://127.0.0.1:8545"));
        ConnectionController::new(deployment, Arc::new(gateway), 1)
    }

    /// Controller with a prompting key wallet answered from `input`
    fn prompting_controller(input: &LineInput<Script>) -> ConnectionController {
        let approval = Approval::new(ApprovalMode::Prompt).with_prompter(Arc::new(input.clone()));
        let wallet =
            KeyWallet::from_secret(&SecretString::from(TEST_KEY.to_string()), approval).unwrap();
        let host: Option<Arc<dyn WalletProvider>> = Some(Arc::new(wallet));

        let mut c = controller();
        c.detect_wallet(&host);
        c
    }

    fn text(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_once_without_wallet_prints_install_prompt() {
        let mut c = controller();
        let none: Option<Arc<dyn WalletProvider>> = None;
        c.detect_wallet(&none);

        let mut out = Vec::new();
        run_once(&mut c, Action::Balance, &mut out).await.unwrap();

        let out = text(out);
        assert!(out.contains("Please install a wallet in order to use this ATM."));
        assert_eq!(c.state(), ConnectionState::NoWallet);
    }

    #[tokio::test]
    async fn test_session_reads_approval_from_input() {
        let input = script("connect\ny\nstatus\nquit\n");
        let mut c = prompting_controller(&input);

        let mut out = Vec::new();
        run_session(&mut c, &input, &mut out).await.unwrap();

        let out = text(out);
        assert_eq!(c.state(), ConnectionState::ContractReady);
        assert!(out.contains("state: contract ready"));
        assert!(!out.contains("unknown command"));
    }

    #[tokio::test]
    async fn test_session_rejected_approval_is_not_a_command() {
        let input = script("connect\nn\nstatus\nquit\n");
        let mut c = prompting_controller(&input);

        let mut out = Vec::new();
        run_session(&mut c, &input, &mut out).await.unwrap();

        let out = text(out);
        assert_eq!(c.state(), ConnectionState::WalletDetected);
        assert!(out.contains("state: wallet detected"));
        assert!(!out.contains("unknown command"));
    }

    #[tokio::test]
    async fn test_session_without_wallet() {
        let input = script("deposit 5\nconnect\nfly\n");
        let mut c = controller();
        let none: Option<Arc<dyn WalletProvider>> = None;
        c.detect_wallet(&none);

        let mut out = Vec::new();
        run_session(&mut c, &input, &mut out).await.unwrap();

        let out = text(out);
        assert!(out.contains("Please install a wallet"));
        assert!(out.contains("A wallet provider is required"));
        assert!(out.contains("unknown command 'fly'"));
        assert_eq!(c.state(), ConnectionState::NoWallet);
    }
}
