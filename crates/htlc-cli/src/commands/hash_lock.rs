//! `htlc hash-lock` — Compute the hash lock of a known secret.

use clap::Args;

use htlc_core::msgs::validate_secret;
use htlc_core::types::HashLock;

#[derive(Args, Debug)]
pub struct HashLockArgs {
    /// Hex-encoded 32-byte secret.
    #[arg(short, long)]
    pub secret: String,

    /// Timestamp the hash lock was created with.
    #[arg(short, long, default_value_t = 0)]
    pub timestamp: u64,
}

pub fn compute(args: &HashLockArgs) -> anyhow::Result<HashLock> {
    let secret = validate_secret(&args.secret)?;
    Ok(htlc_crypto::compute_hash_lock(&secret, args.timestamp))
}

pub fn run(args: &HashLockArgs) -> anyhow::Result<()> {
    println!("{}", compute(args)?.to_hex());
    Ok(())
}
