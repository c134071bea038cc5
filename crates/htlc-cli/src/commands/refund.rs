//! `htlc refund` — Refund an expired HTLC to its sender.

use clap::Args;

use htlc_core::msgs::RefundHtlcMsg;
use htlc_core::types::Address;

use super::{print_tx, submit_tx, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct RefundArgs {
    /// Original sender of the HTLC.
    #[arg(long)]
    pub sender: String,

    /// Hex-encoded 32-byte hash lock.
    #[arg(long)]
    pub hash_lock: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &RefundArgs) -> anyhow::Result<()> {
    let msg = RefundHtlcMsg {
        sender: Address::new(args.sender.clone()),
        hash_lock: args.hash_lock.clone(),
    };
    msg.validate_basic()?;

    println!("Refunding HTLC {}...", msg.hash_lock);
    let resp = submit_tx(&args.endpoint, "/api/v1/htlcs/refund", &msg, "refund").await?;
    println!("HTLC refunded!");
    print_tx(&resp)
}
