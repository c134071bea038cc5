//! HTLC CLI — Command-line interface for the HTLC escrow node.
//!
//! Subcommands: secret, hash-lock, create, claim, refund, query, balance, status.

mod commands;

use clap::{Parser, Subcommand};

/// HTLC — hashed time-locked escrow.
#[derive(Parser, Debug)]
#[command(name = "htlc", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a random secret and its hash lock.
    Secret(commands::secret::SecretArgs),
    /// Compute the hash lock of a known secret.
    HashLock(commands::hash_lock::HashLockArgs),
    /// Lock funds in a new HTLC.
    Create(commands::create::CreateArgs),
    /// Claim an HTLC by revealing its secret.
    Claim(commands::claim::ClaimArgs),
    /// Refund an expired HTLC to its sender.
    Refund(commands::refund::RefundArgs),
    /// Show an HTLC by hash lock.
    Query(commands::query::QueryArgs),
    /// Show an account balance.
    Balance(commands::balance::BalanceArgs),
    /// Query the status of a running node.
    Status(commands::status::StatusArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Secret(args) => commands::secret::run(args),
        Commands::HashLock(args) => commands::hash_lock::run(args),
        Commands::Create(args) => commands::create::run(args).await,
        Commands::Claim(args) => commands::claim::run(args).await,
        Commands::Refund(args) => commands::refund::run(args).await,
        Commands::Query(args) => commands::query::run(args).await,
        Commands::Balance(args) => commands::balance::run(args).await,
        Commands::Status(args) => commands::status::run(args).await,
    }
}
