//! CardVault CLI - Card registry deployment and queries
//!
//! Configuration comes from the environment (a `.env` file is honoured) or
//! from a JSON file passed with `--config`.
//!
//! # Quick Start
//!
//! ```bash
//! export ENTRYPOINT_ADDR=0x...
//! export COMMUNITY_ENTRYPOINT_ADDR=0x...
//! export CARDVAULT_DEPLOYER=0x...
//!
//! cardvault deploy
//! cardvault hash --serial 123
//! cardvault address --serial 123
//! cardvault demo
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod display;

use commands::{demo, deploy, query};

/// CardVault CLI - Access-controlled card custody
#[derive(Parser)]
#[command(name = "cardvault")]
#[command(author = "CardVault Contributors")]
#[command(version)]
#[command(about = "Registry of access-controlled custody cards", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// JSON config file (defaults to environment variables)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON instead of formatted output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Instantiate a registry from config and print its summary
    Deploy,

    /// Print the card identifier for a serial
    Hash {
        /// Card serial number
        #[arg(short, long)]
        serial: u64,
    },

    /// Print where the card for a serial lives
    Address {
        /// Card serial number
        #[arg(short, long)]
        serial: u64,
    },

    /// Run the end-to-end custody scenario against an in-memory ledger
    Demo,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Deploy => deploy::run(config_path, cli.json).await?,
        Commands::Hash { serial } => query::hash(config_path, serial, cli.json)?,
        Commands::Address { serial } => query::address(config_path, serial, cli.json)?,
        Commands::Demo => demo::run().await?,
    }

    Ok(())
}
