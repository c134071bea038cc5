//! `htlc status` — Query the status of a running HTLC node.

use clap::Args;

use super::{get_json, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &StatusArgs) -> anyhow::Result<()> {
    println!("Querying node status at {}...", args.endpoint);
    println!();

    let status = get_json(&args.endpoint, "/api/v1/status", "status").await?;
    println!("Node Status:");
    println!("  Version:   {}", status["version"].as_str().unwrap_or("unknown"));
    println!("  Height:    {}", status["height"]);
    println!("  HTLCs:     {}", status["htlc_count"]);
    println!("  Mempool:   {}", status["mempool_size"]);
    println!("  Uptime:    {}s", status["uptime_secs"]);

    Ok(())
}
