//! Range ATM CLI
//!
//! Command-line front end for the ATM contract.

use clap::{Parser, Subcommand};
use range_atm::contract::{AlloyGateway, ContractInterface};
use range_atm::session::{self, LineInput};
use range_atm::wallet::{Approval, ConfiguredHost};
use range_atm::{Action, Config, ConnectionController, Deployment, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "atm")]
#[command(about = "Wallet-connected front end for the Range ATM contract")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open an interactive ATM session
    Session,

    /// Connect and print the on-chain balance
    Balance,

    /// Connect and deposit
    Deposit {
        /// Amount to deposit
        #[arg(short, long)]
        amount: u64,
    },

    /// Connect and withdraw
    Withdraw {
        /// Amount to withdraw
        #[arg(short, long)]
        amount: u64,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = match cli.config {
        Some(path) => Config::from_file(&path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Session => run_session(&config).await?,
        Commands::Balance => run_once(&config, Action::Balance).await?,
        Commands::Deposit { amount } => run_once(&config, Action::Deposit(amount)).await?,
        Commands::Withdraw { amount } => run_once(&config, Action::Withdraw(amount)).await?,
        Commands::Config => {
            let effective = Config {
                rpc: Some(config.rpc_endpoint()),
                ..config
            };
            println!("{}", serde_json::to_string_pretty(&effective)?);
        }
    }

    Ok(())
}

/// Build the controller and run the startup hook
async fn open(config: &Config, approval: Approval) -> Result<ConnectionController> {
    let endpoint = config.rpc_endpoint();
    let interface = ContractInterface::load(config.contract.artifact.as_deref())?;
    let deployment = Deployment {
        address: config.contract.address,
        interface,
    };

    tracing::info!(
        contract = %deployment.address,
        rpc = %endpoint,
        wallet = ?config.wallet.source,
        "Opening ATM"
    );

    let gateway = Arc::new(AlloyGateway::new(endpoint.clone()));
    let initial_balance = i128::from(config.initial_balance);
    let mut controller = ConnectionController::new(deployment, gateway, initial_balance);

    let host = ConfiguredHost::resolve_with(&config.wallet, &endpoint, approval).await?;
    controller.startup(&host).await?;
    Ok(controller)
}

async fn run_once(config: &Config, action: Action) -> Result<()> {
    let mut controller = open(config, Approval::new(config.wallet.approval)).await?;
    session::run_once(&mut controller, action, &mut std::io::stdout()).await
}

async fn run_session(config: &Config) -> Result<()> {
    // Approval prompts share the command reader so piped answers stay in order
    let input = LineInput::new(BufReader::new(tokio::io::stdin()));
    let approval = Approval::new(config.wallet.approval).with_prompter(Arc::new(input.clone()));

    let mut controller = open(config, approval).await?;
    session::run_session(&mut controller, &input, &mut std::io::stdout()).await
}
