//! `htlc query` — Show an HTLC by hash lock.

use clap::Args;

use htlc_core::msgs::validate_hash_lock;

use super::{get_json, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Hex-encoded 32-byte hash lock.
    pub hash_lock: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &QueryArgs) -> anyhow::Result<()> {
    let hash_lock = validate_hash_lock(&args.hash_lock)?;
    let path = format!("/api/v1/htlcs/{}", hash_lock.to_hex());
    let htlc = get_json(&args.endpoint, &path, "query").await?;
    println!("{}", serde_json::to_string_pretty(&htlc)?);
    Ok(())
}
