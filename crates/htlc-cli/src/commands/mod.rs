pub mod balance;
pub mod claim;
pub mod create;
pub mod hash_lock;
pub mod query;
pub mod refund;
pub mod secret;
pub mod status;

use serde::{Deserialize, Serialize};

/// Default API endpoint of a local node.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:26657";

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
    kind: String,
}

/// Response to a transaction once its block is committed.
#[derive(Deserialize)]
pub struct TxResponse {
    pub tx_id: String,
    pub height: u64,
    pub events: Vec<serde_json::Value>,
}

async fn error_for(resp: reqwest::Response, what: &str) -> anyhow::Error {
    let status = resp.status();
    match resp.json::<ErrorResponse>().await {
        Ok(err) => anyhow::anyhow!("{} failed (HTTP {}, {}): {}", what, status, err.kind, err.error),
        Err(_) => anyhow::anyhow!("{} failed (HTTP {})", what, status),
    }
}

fn node_unreachable(endpoint: &str, e: reqwest::Error) -> anyhow::Error {
    anyhow::anyhow!(
        "could not reach node at {}: {}\nIs the node running? Start it with: htlc-node",
        endpoint,
        e
    )
}

/// POST a transaction and wait for the block that includes it.
pub async fn submit_tx<T: Serialize>(
    endpoint: &str,
    path: &str,
    body: &T,
    what: &str,
) -> anyhow::Result<TxResponse> {
    let url = format!("{}{}", endpoint.trim_end_matches('/'), path);
    let resp = reqwest::Client::new()
        .post(&url)
        .json(body)
        .send()
        .await
        .map_err(|e| node_unreachable(endpoint, e))?;

    if !resp.status().is_success() {
        return Err(error_for(resp, what).await);
    }
    Ok(resp.json().await?)
}

/// GET a JSON document from the node.
pub async fn get_json(endpoint: &str, path: &str, what: &str) -> anyhow::Result<serde_json::Value> {
    let url = format!("{}{}", endpoint.trim_end_matches('/'), path);
    let resp = reqwest::get(&url)
        .await
        .map_err(|e| node_unreachable(endpoint, e))?;

    if !resp.status().is_success() {
        return Err(error_for(resp, what).await);
    }
    Ok(resp.json().await?)
}

/// Print a committed transaction and its events.
pub fn print_tx(resp: &TxResponse) -> anyhow::Result<()> {
    println!("  Tx ID:    {}", resp.tx_id);
    println!("  Height:   {}", resp.height);
    for event in &resp.events {
        println!("  Event:    {}", serde_json::to_string(event)?);
    }
    Ok(())
}
