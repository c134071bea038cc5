//! Integration test: escrow invariants over many contracts and blocks.
//!
//! Conservation of value, hash-lock uniqueness, sweep monotonicity, and the
//! time-lock range boundaries.

use htlc_core::params::{MAX_TIME_LOCK, MIN_TIME_LOCK};
use htlc_core::types::{HashLock, HtlcState};
use htlc_core::ValidationError;
use htlc_engine::{ErrorKind, HtlcError};
use htlc_integration_tests::{claim_msg, create_msg, refund_msg, secret, Chain};

fn lock(seed: u8) -> HashLock {
    htlc_crypto::compute_hash_lock(&secret(seed), 0)
}

/// Escrow always holds exactly the sum of open and expired contracts.
fn locked_in_contracts(chain: &Chain, locks: &[HashLock]) -> u128 {
    locks
        .iter()
        .map(|l| chain.htlc(l))
        .filter(|h| matches!(h.state, HtlcState::Open | HtlcState::Expired))
        .map(|h| h.out_amount.value)
        .sum()
}

#[test]
fn test_value_is_conserved_across_a_mixed_workload() {
    let chain = Chain::new(100, &[("alice", 10_000), ("carol", 5_000)]);
    let supply = chain.total_supply();

    let locks: Vec<HashLock> = (1..=6).map(lock).collect();
    for (i, hash_lock) in locks.iter().enumerate() {
        let sender = if i % 2 == 0 { "alice" } else { "carol" };
        let time_lock = MIN_TIME_LOCK + i as u64 * 10;
        chain
            .deliver(&create_msg(sender, "bob", 100 * (i as u128 + 1), hash_lock, 0, time_lock))
            .unwrap();
        assert_eq!(chain.escrow_balance(), locked_in_contracts(&chain, &locks[..=i]));
    }
    assert_eq!(chain.total_supply(), supply);

    // Claim two of them.
    chain.set_height(120);
    chain.deliver(&claim_msg("bob", &secret(1), &locks[0])).unwrap();
    chain.deliver(&claim_msg("dave", &secret(4), &locks[3])).unwrap();
    assert_eq!(chain.escrow_balance(), locked_in_contracts(&chain, &locks));

    // Expire everything still open, block by block.
    for height in 121..=200 {
        chain.set_height(height);
        chain.end_block();
        assert_eq!(chain.escrow_balance(), locked_in_contracts(&chain, &locks));
    }
    for hash_lock in &locks {
        let state = chain.htlc(hash_lock).state;
        assert!(matches!(state, HtlcState::Completed | HtlcState::Expired));
    }

    // Refund the expired ones to their senders.
    chain.set_height(201);
    for (i, hash_lock) in locks.iter().enumerate() {
        if chain.htlc(hash_lock).state == HtlcState::Expired {
            let sender = if i % 2 == 0 { "alice" } else { "carol" };
            chain.deliver(&refund_msg(sender, hash_lock)).unwrap();
        }
    }

    assert_eq!(chain.escrow_balance(), 0);
    assert_eq!(chain.balance("bob"), 100 + 400);
    assert_eq!(chain.total_supply(), supply);
    assert_eq!(
        chain.balance("alice") + chain.balance("carol") + chain.balance("bob"),
        supply
    );
}

#[test]
fn test_failed_create_leaves_no_trace() {
    let chain = Chain::new(1, &[("alice", 50)]);
    let err = chain
        .deliver(&create_msg("alice", "bob", 51, &lock(1), 0, 100))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceFailure);
    assert!(matches!(
        chain.handler.query(&lock(1).to_hex()),
        Err(HtlcError::NotFound(_))
    ));
    assert_eq!(chain.balance("alice"), 50);
    assert_eq!(chain.escrow_balance(), 0);

    // The same hash lock is still available afterwards.
    assert!(chain
        .deliver(&create_msg("alice", "bob", 50, &lock(1), 0, 100))
        .is_ok());
}

#[test]
fn test_escrow_account_cannot_receive_a_contract() {
    let chain = Chain::new(1000, &[("alice", 500)]);
    let err = chain
        .deliver(&create_msg("alice", "module/htlc", 100, &lock(1), 0, 50))
        .unwrap_err();
    assert!(matches!(
        err,
        HtlcError::Validation(ValidationError::InvalidAddress(_))
    ));

    // A claim has nothing to release, so no value is stranded in escrow.
    chain.set_height(1010);
    assert!(matches!(
        chain.deliver(&claim_msg("alice", &secret(1), &lock(1))),
        Err(HtlcError::NotFound(_))
    ));
    assert_eq!(chain.escrow_balance(), 0);
    assert_eq!(chain.balance("alice"), 500);
}

#[test]
fn test_hash_lock_unique_across_senders() {
    let chain = Chain::new(1, &[("alice", 100), ("carol", 100)]);
    chain
        .deliver(&create_msg("alice", "bob", 10, &lock(7), 0, 60))
        .unwrap();

    let err = chain
        .deliver(&create_msg("carol", "bob", 10, &lock(7), 0, 60))
        .unwrap_err();
    assert_eq!(err, HtlcError::AlreadyExists(lock(7)));
    assert_eq!(chain.balance("carol"), 100);
}

#[test]
fn test_sweep_is_monotonic_and_idempotent() {
    let chain = Chain::new(0, &[("alice", 1_000)]);
    for (seed, time_lock) in [(1u8, 50u64), (2, 51), (3, 50), (4, 80)] {
        chain
            .deliver(&create_msg("alice", "bob", 10, &lock(seed), 0, time_lock))
            .unwrap();
    }

    chain.set_height(49);
    assert!(chain.end_block().is_empty());

    chain.set_height(50);
    let expired = chain.end_block();
    assert_eq!(expired.len(), 2);
    assert!(chain.end_block().is_empty());

    // Skipping heights still catches every overdue contract.
    chain.set_height(100);
    assert_eq!(chain.end_block().len(), 2);
    assert!(chain.end_block().is_empty());

    for seed in 1..=4 {
        assert_eq!(chain.htlc(&lock(seed)).state, HtlcState::Expired);
    }
}

#[test]
fn test_time_lock_boundaries() {
    let chain = Chain::new(500, &[("alice", 1_000)]);

    for (seed, time_lock) in [(1u8, MIN_TIME_LOCK), (2, MAX_TIME_LOCK)] {
        let result = chain.deliver(&create_msg("alice", "bob", 1, &lock(seed), 0, time_lock));
        assert!(result.is_ok(), "time lock {} rejected", time_lock);
        assert_eq!(chain.htlc(&lock(seed)).expiration_height, 500 + time_lock);
    }

    for (seed, time_lock) in [(3u8, MIN_TIME_LOCK - 1), (4, MAX_TIME_LOCK + 1)] {
        let err = chain
            .deliver(&create_msg("alice", "bob", 1, &lock(seed), 0, time_lock))
            .unwrap_err();
        assert!(matches!(
            err,
            HtlcError::Validation(ValidationError::InvalidTimeLock { .. })
        ));
    }
    assert_eq!(chain.escrow_balance(), 2);
}

#[test]
fn test_zero_amount_rejected_before_state() {
    let chain = Chain::new(1, &[("alice", 1_000)]);
    let err = chain
        .deliver(&create_msg("alice", "bob", 0, &lock(1), 0, 60))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(matches!(
        chain.handler.query(&lock(1).to_hex()),
        Err(HtlcError::NotFound(_))
    ));
}
