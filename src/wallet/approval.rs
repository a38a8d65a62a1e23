//! Authorization prompts for account requests

use crate::config::ApprovalMode;
use crate::wallet::AccountId;
use async_trait::async_trait;
use std::fmt;
use std::io::{BufRead, Write};
use std::sync::Arc;

/// Source of yes/no answers for prompt-mode approval
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Ask `question` and report whether the answer was yes
    async fn confirm(&self, question: &str) -> bool;
}

/// Asks on stderr and reads the answer from the process's stdin
///
/// Only for callers that do not read stdin themselves. An interactive
/// session hands its own line reader to [`Approval::with_prompter`].
pub struct TerminalPrompter;

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn confirm(&self, question: &str) -> bool {
        let question = question.to_string();
        tokio::task::spawn_blocking(move || prompt_stdin(&question))
            .await
            .unwrap_or(false)
    }
}

/// Answers `request_accounts` prompts
#[derive(Clone)]
pub struct Approval {
    mode: ApprovalMode,
    prompter: Arc<dyn Prompter>,
}

impl Approval {
    pub fn new(mode: ApprovalMode) -> Self {
        Self {
            mode,
            prompter: Arc::new(TerminalPrompter),
        }
    }

    /// Route prompt-mode questions to `prompter`
    pub fn with_prompter(mut self, prompter: Arc<dyn Prompter>) -> Self {
        self.prompter = prompter;
        self
    }

    pub fn mode(&self) -> ApprovalMode {
        self.mode
    }

    /// Decide whether `account` may be revealed to the page
    pub async fn approve(&self, wallet: &str, account: &AccountId) -> bool {
        match self.mode {
            ApprovalMode::Auto => true,
            ApprovalMode::Deny => false,
            ApprovalMode::Prompt => {
                let question = format!(
                    "{} wants to connect account {}. Allow? [y/N] ",
                    wallet, account
                );
                self.prompter.confirm(&question).await
            }
        }
    }
}

impl fmt::Debug for Approval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Approval").field("mode", &self.mode).finish()
    }
}

fn prompt_stdin(question: &str) -> bool {
    let mut stderr = std::io::stderr();
    if write!(stderr, "{}", question).and_then(|_| stderr.flush()).is_err() {
        return false;
    }
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(_) => is_yes(&line),
        Err(_) => false,
    }
}

/// Whether a typed answer grants the request
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
