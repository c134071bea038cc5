//! `htlc create` — Lock funds in a new HTLC.

use clap::Args;

use htlc_core::msgs::{validate_hash_lock, CreateHtlcMsg};
use htlc_core::types::{Address, Amount};

use super::{print_tx, submit_tx, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Account the funds are locked from.
    #[arg(long)]
    pub sender: String,

    /// Account paid on a successful claim.
    #[arg(short, long)]
    pub receiver: String,

    /// Amount to lock, e.g. `100stake`.
    #[arg(short, long)]
    pub amount: Amount,

    /// Hex-encoded 32-byte hash lock.
    #[arg(long)]
    pub hash_lock: String,

    /// Blocks until the contract expires.
    #[arg(long)]
    pub time_lock: u64,

    /// Timestamp the hash lock was built with.
    #[arg(long, default_value_t = 0)]
    pub timestamp: u64,

    /// Hex-encoded receiver address on the counterparty chain.
    #[arg(long, default_value = "")]
    pub receiver_on_other_chain: String,

    /// Amount expected on the counterparty chain.
    #[arg(long, default_value_t = 0)]
    pub in_amount: u64,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub fn build_msg(args: &CreateArgs) -> anyhow::Result<CreateHtlcMsg> {
    validate_hash_lock(&args.hash_lock)?;
    let receiver_on_other_chain = hex::decode(&args.receiver_on_other_chain)
        .map_err(|e| anyhow::anyhow!("invalid receiver-on-other-chain: {}", e))?;

    Ok(CreateHtlcMsg {
        sender: Address::new(args.sender.clone()),
        receiver: Address::new(args.receiver.clone()),
        receiver_on_other_chain,
        out_amount: args.amount.clone(),
        in_amount: args.in_amount,
        hash_lock: args.hash_lock.to_lowercase(),
        timestamp: args.timestamp,
        time_lock: args.time_lock,
    })
}

pub async fn run(args: &CreateArgs) -> anyhow::Result<()> {
    let msg = build_msg(args)?;

    println!("Creating HTLC...");
    println!("  From:       {}", msg.sender);
    println!("  To:         {}", msg.receiver);
    println!("  Amount:     {}", msg.out_amount);
    println!("  Time lock:  {} blocks", msg.time_lock);
    println!();

    let resp = submit_tx(&args.endpoint, "/api/v1/htlcs", &msg, "create").await?;
    println!("HTLC created!");
    print_tx(&resp)
}
