use htlc_core::types::{HashLock, Secret, HASH_LENGTH};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// SHA-256 digest (32 bytes).
pub type Hash = [u8; HASH_LENGTH];

/// Hash arbitrary data using SHA-256.
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Compute the commitment a contract is locked under.
///
/// With a non-zero `timestamp` the lock is `SHA-256(secret ‖ timestamp)`, the
/// timestamp encoded as 8 big-endian bytes. A zero timestamp yields
/// `SHA-256(secret)`, the form used by plain Bitcoin-style swaps.
pub fn compute_hash_lock(secret: &Secret, timestamp: u64) -> HashLock {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    if timestamp > 0 {
        hasher.update(timestamp.to_be_bytes());
    }
    HashLock::new(hasher.finalize().into())
}

/// Whether `secret` (with the contract's `timestamp`) opens `hash_lock`.
pub fn verify_secret(secret: &Secret, timestamp: u64, hash_lock: &HashLock) -> bool {
    compute_hash_lock(secret, timestamp) == *hash_lock
}

/// Draw a fresh 32-byte secret from OS entropy.
pub fn generate_secret() -> Secret {
    let mut bytes = [0u8; HASH_LENGTH];
    OsRng.fill_bytes(&mut bytes);
    Secret::new(bytes)
}
