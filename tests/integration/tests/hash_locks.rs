//! Integration test: hash-lock construction shared by the CLI and the engine.

use htlc_core::msgs::{validate_hash_lock, validate_secret};
use htlc_integration_tests::{claim_msg, create_msg, Chain};

#[test]
fn test_generated_secret_opens_its_lock() {
    let chain = Chain::new(1, &[("alice", 100)]);
    let secret = htlc_crypto::generate_secret();
    let hash_lock = htlc_crypto::compute_hash_lock(&secret, 1_600_000_000);

    chain
        .deliver(&create_msg("alice", "bob", 100, &hash_lock, 1_600_000_000, 50))
        .unwrap();
    chain.deliver(&claim_msg("bob", &secret, &hash_lock)).unwrap();
    assert_eq!(chain.balance("bob"), 100);
}

#[test]
fn test_timestamp_changes_the_lock() {
    let secret = htlc_crypto::generate_secret();
    let plain = htlc_crypto::compute_hash_lock(&secret, 0);
    let stamped = htlc_crypto::compute_hash_lock(&secret, 1);

    assert_ne!(plain, stamped);
    assert_eq!(plain.as_bytes(), &htlc_crypto::sha256(secret.as_bytes()));
    assert_eq!(stamped, htlc_crypto::compute_hash_lock(&secret, 1));
}

#[test]
fn test_hex_round_trip_through_messages() {
    let secret = htlc_crypto::generate_secret();
    let hash_lock = htlc_crypto::compute_hash_lock(&secret, 0);

    assert_eq!(validate_secret(&secret.to_hex()).unwrap(), secret);
    assert_eq!(validate_hash_lock(&hash_lock.to_hex()).unwrap(), hash_lock);
    assert_eq!(
        validate_hash_lock(&hash_lock.to_hex().to_uppercase()).unwrap(),
        hash_lock
    );
}
