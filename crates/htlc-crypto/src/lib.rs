pub mod hashing;

pub use hashing::{compute_hash_lock, generate_secret, sha256, verify_secret, Hash};
