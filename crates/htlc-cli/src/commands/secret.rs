//! `htlc secret` — Generate a random secret and its hash lock.

use clap::Args;

#[derive(Args, Debug)]
pub struct SecretArgs {
    /// Timestamp mixed into the hash lock (0 for a plain SHA-256 lock).
    #[arg(short, long, default_value_t = 0)]
    pub timestamp: u64,
}

pub fn run(args: &SecretArgs) -> anyhow::Result<()> {
    let secret = htlc_crypto::generate_secret();
    let hash_lock = htlc_crypto::compute_hash_lock(&secret, args.timestamp);

    println!("Secret:     {}", secret.to_hex());
    println!("Timestamp:  {}", args.timestamp);
    println!("Hash lock:  {}", hash_lock.to_hex());
    println!();
    println!("Keep the secret private until you claim.");

    Ok(())
}
