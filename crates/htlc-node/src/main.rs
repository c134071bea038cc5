//! HTLC Node — entry point.
//!
//! Starts the HTLC escrow node with configuration from a TOML file or defaults.

mod api;
mod commands;
mod config;
mod node;
mod state;
mod storage;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::{HtlcConfig, LoggingConfig};
use node::HtlcNode;

/// HTLC Node
#[derive(Parser, Debug)]
#[command(name = "htlc-node", version, about = "HTLC escrow node")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "htlc.toml")]
    config: PathBuf,

    /// Override the API port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Generate a default config file and exit.
    #[arg(long)]
    init: bool,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if args.init {
        HtlcConfig::default()
    } else {
        HtlcConfig::load(&args.config)?
    };

    // Apply CLI overrides
    if let Some(api_port) = args.api_port {
        config.api.port = api_port;
    }
    if let Some(ref data_dir) = args.data_dir {
        config.storage.data_dir = data_dir.clone();
    }
    if let Some(log_level) = args.log_level {
        config.logging.level = log_level;
    }

    init_tracing(&config.logging);

    // Handle --init flag
    if args.init {
        config.save(&args.config)?;
        tracing::info!(path = %args.config.display(), "wrote default config");
        return Ok(());
    }

    tracing::info!("HTLC Node v{}", env!("CARGO_PKG_VERSION"));

    // Create and start the node
    let mut node = HtlcNode::new(config)?;
    node.start().await?;

    // Set up graceful shutdown on SIGINT/SIGTERM
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
        tracing::info!("received shutdown signal");
    };

    let outcome = tokio::select! {
        result = node.run() => {
            if let Err(ref e) = result {
                tracing::error!(error = %e, "block producer stopped");
            }
            result
        }
        _ = shutdown => {
            tracing::info!("initiating graceful shutdown");
            Ok(())
        }
    };

    node.shutdown().await?;
    outcome?;
    tracing::info!("HTLC node exited cleanly");
    Ok(())
}
