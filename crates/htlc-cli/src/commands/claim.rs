//! `htlc claim` — Claim an HTLC by revealing its secret.

use clap::Args;

use htlc_core::msgs::ClaimHtlcMsg;
use htlc_core::types::Address;

use super::{print_tx, submit_tx, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct ClaimArgs {
    /// Account submitting the claim. Funds always go to the HTLC receiver.
    #[arg(long)]
    pub sender: String,

    /// Hex-encoded 32-byte secret.
    #[arg(short, long)]
    pub secret: String,

    /// Hex-encoded 32-byte hash lock.
    #[arg(long)]
    pub hash_lock: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &ClaimArgs) -> anyhow::Result<()> {
    let msg = ClaimHtlcMsg {
        sender: Address::new(args.sender.clone()),
        secret: args.secret.clone(),
        hash_lock: args.hash_lock.clone(),
    };
    msg.validate_basic()?;

    println!("Claiming HTLC {}...", msg.hash_lock);
    let resp = submit_tx(&args.endpoint, "/api/v1/htlcs/claim", &msg, "claim").await?;
    println!("HTLC claimed!");
    print_tx(&resp)
}
