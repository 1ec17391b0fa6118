//! # tokenflow - Main Entrypoint
//!
//! Parses the command line, loads the configuration, builds the network
//! clients and runs one workflow to completion.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tokenflow::{
    config::Config,
    core::{api::ApiClient, gateway::GatewayClient, retry::TokioSleeper},
    engine::{read_receivers, Engine},
    wallet::discover_wallets,
};

#[derive(Debug, Parser)]
#[command(name = "tokenflow", version, about = "Issue, distribute and rank fungible tokens")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "tokenflow.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Issue fungible tokens from every wallet.
    Issue,
    /// Distribute each wallet's tokens to the receivers file.
    Transfer,
    /// Call the claim contract from every wallet.
    Claim,
    /// Print every wallet's transaction history.
    Transactions {
        /// Also write the collected history as JSON.
        #[arg(long)]
        save: bool,
    },
    /// Build the token holder leaderboard.
    Leaderboard {
        /// Serve holders from the cache file when it exists.
        #[arg(long, conflicts_with = "refresh")]
        use_cache: bool,
        /// Ignore any cache and fetch from the API.
        #[arg(long)]
        refresh: bool,
    },
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    info!("🚀 Initializing tokenflow...");

    let config = Config::load(&cli.config);
    config.validate().context("Invalid configuration")?;

    let gateway = Arc::new(GatewayClient::new(&config.network)?);
    let api = ApiClient::new(&config.network)?;
    let wallets_dir = config.paths.wallets_dir.clone();
    let receivers_file = config.paths.receivers_file.clone();
    let receivers_count = config.transfer.receivers_count;
    let engine = Engine::new(config, gateway, Arc::new(TokioSleeper));

    match cli.command {
        Command::Issue => {
            let wallets = discover_wallets(&wallets_dir)?;
            engine.issue(&wallets).await;
        }
        Command::Transfer => {
            let wallets = discover_wallets(&wallets_dir)?;
            let receivers = read_receivers(&receivers_file, receivers_count)?;
            engine.transfer(&wallets, &receivers).await;
        }
        Command::Claim => {
            let wallets = discover_wallets(&wallets_dir)?;
            engine.claim(&wallets).await;
        }
        Command::Transactions { save } => {
            let wallets = discover_wallets(&wallets_dir)?;
            engine.transactions(&api, &wallets, save).await;
        }
        Command::Leaderboard { use_cache, refresh } => {
            engine.leaderboard(&api, use_cache && !refresh).await?;
        }
    }

    info!("✅ Done.");
    Ok(())
}
