//! `htlc balance` — Show an account balance.

use clap::Args;

use super::{get_json, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct BalanceArgs {
    /// Account address.
    pub address: String,

    /// Denomination, e.g. `stake`.
    pub denom: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &BalanceArgs) -> anyhow::Result<()> {
    let path = format!("/api/v1/balances/{}/{}", args.address, args.denom);
    let balance = get_json(&args.endpoint, &path, "balance").await?;
    println!("{}{}", balance["value"], args.denom);
    Ok(())
}
