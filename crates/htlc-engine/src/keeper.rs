use htlc_core::msgs::{escrow_party, ClaimHtlcMsg, CreateHtlcMsg, RefundHtlcMsg};
use htlc_core::types::{HashLock, Htlc, HtlcState};
use htlc_core::{CoreError, HtlcEvent, HtlcStateMachine, HtlcTransition, Params, ValidationError};

use crate::custody::EscrowCustody;
use crate::error::HtlcError;
use crate::store::HtlcStore;
use crate::sweeper::ExpirySweeper;
use crate::traits::AccountLedger;

/// Applies HTLC transactions against the contract store and escrow custody.
///
/// Every operation either commits completely or leaves store and balances
/// untouched: all recoverable checks run before custody moves funds, and a
/// store write that fails afterwards puts the funds back before returning.
pub struct Keeper<S, L> {
    store: S,
    custody: EscrowCustody<L>,
    params: Params,
}

impl<S: HtlcStore, L: AccountLedger> Keeper<S, L> {
    pub fn new(store: S, ledger: L, params: Params) -> Result<Self, CoreError> {
        params.validate()?;
        let custody = EscrowCustody::new(ledger, &params.escrow_module);
        Ok(Self {
            store,
            custody,
            params,
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn custody(&self) -> &EscrowCustody<L> {
        &self.custody
    }

    /// Lock `out_amount` from the sender and open a new contract expiring at
    /// `current_height + time_lock`.
    pub fn create(&self, msg: &CreateHtlcMsg, current_height: u64) -> Result<HtlcEvent, HtlcError> {
        let hash_lock = msg.hash_lock()?;

        let escrow = self.custody.escrow_address();
        if msg.sender == *escrow || msg.receiver == *escrow {
            return Err(escrow_party(escrow).into());
        }

        // Hash locks are permanent keys, terminal contracts included.
        if self.store.contains(&hash_lock)? {
            return Err(HtlcError::AlreadyExists(hash_lock));
        }

        let expiration_height = current_height.checked_add(msg.time_lock).ok_or(
            ValidationError::InvalidTimeLock {
                time_lock: msg.time_lock,
                min: self.params.min_time_lock,
                max: self.params.max_time_lock,
            },
        )?;

        let htlc = Htlc {
            sender: msg.sender.clone(),
            receiver: msg.receiver.clone(),
            receiver_on_other_chain: msg.receiver_on_other_chain.clone(),
            out_amount: msg.out_amount.clone(),
            in_amount: msg.in_amount,
            hash_lock,
            timestamp: msg.timestamp,
            expiration_height,
            state: HtlcState::Open,
            secret: None,
        };

        self.custody.lock(&htlc.sender, &htlc.out_amount)?;

        if let Err(e) = self.store.put(&htlc) {
            tracing::error!(%hash_lock, error = %e, "failed to store htlc, returning escrow");
            self.custody.release(&htlc.sender, &htlc.out_amount)?;
            return Err(e.into());
        }

        tracing::info!(
            %hash_lock,
            sender = %htlc.sender,
            receiver = %htlc.receiver,
            amount = %htlc.out_amount,
            expiration_height,
            "HTLC created"
        );

        Ok(HtlcEvent::Created {
            hash_lock,
            sender: htlc.sender,
            receiver: htlc.receiver,
            amount: htlc.out_amount,
        })
    }

    /// Pay an open contract out to its receiver on proof of the secret.
    ///
    /// Anyone holding the secret may submit the claim. The height is checked
    /// against the deadline directly, so a contract past its deadline is
    /// rejected even before the sweeper has marked it expired.
    pub fn claim(&self, msg: &ClaimHtlcMsg, current_height: u64) -> Result<HtlcEvent, HtlcError> {
        let hash_lock = msg.hash_lock()?;
        let secret = msg.secret()?;

        let mut htlc = self.store.get(&hash_lock)?;

        if htlc.state != HtlcState::Open {
            return Err(HtlcError::InvalidState {
                hash_lock,
                state: htlc.state,
            });
        }

        if current_height >= htlc.expiration_height {
            return Err(HtlcError::Expired {
                hash_lock,
                expiration_height: htlc.expiration_height,
                current_height,
            });
        }

        if !htlc_crypto::verify_secret(&secret, htlc.timestamp, &hash_lock) {
            return Err(HtlcError::SecretMismatch(hash_lock));
        }

        let next = HtlcStateMachine::transition(htlc.state, HtlcTransition::Claim)
            .map_err(HtlcError::Transition)?;

        self.custody.release(&htlc.receiver, &htlc.out_amount)?;

        htlc.secret = Some(secret);
        htlc.state = next;
        if let Err(e) = self.store.update(&htlc) {
            tracing::error!(%hash_lock, error = %e, "failed to store claim, re-locking escrow");
            self.custody.lock(&htlc.receiver, &htlc.out_amount)?;
            return Err(e.into());
        }

        tracing::info!(
            %hash_lock,
            submitter = %msg.sender,
            receiver = %htlc.receiver,
            amount = %htlc.out_amount,
            "HTLC claimed"
        );

        Ok(HtlcEvent::Claimed { hash_lock, secret })
    }

    /// Return the funds of an expired contract to its original sender.
    pub fn refund(&self, msg: &RefundHtlcMsg, current_height: u64) -> Result<HtlcEvent, HtlcError> {
        let hash_lock = msg.hash_lock()?;
        let mut htlc = self.store.get(&hash_lock)?;

        if htlc.state != HtlcState::Expired {
            return Err(HtlcError::InvalidState {
                hash_lock,
                state: htlc.state,
            });
        }

        if msg.sender != htlc.sender {
            return Err(HtlcError::Unauthorized {
                hash_lock,
                sender: msg.sender.clone(),
            });
        }

        let next = HtlcStateMachine::transition(htlc.state, HtlcTransition::Refund)
            .map_err(HtlcError::Transition)?;

        self.custody.release(&htlc.sender, &htlc.out_amount)?;

        htlc.state = next;
        if let Err(e) = self.store.update(&htlc) {
            tracing::error!(%hash_lock, error = %e, "failed to store refund, re-locking escrow");
            self.custody.lock(&htlc.sender, &htlc.out_amount)?;
            return Err(e.into());
        }

        tracing::info!(
            %hash_lock,
            sender = %htlc.sender,
            amount = %htlc.out_amount,
            current_height,
            "HTLC refunded"
        );

        Ok(HtlcEvent::Refunded { hash_lock })
    }

    /// Mark every open contract whose deadline is at or below
    /// `current_height` as expired.
    pub fn sweep_expirations(&self, current_height: u64) -> Result<Vec<HtlcEvent>, HtlcError> {
        ExpirySweeper::sweep(&self.store, current_height)
    }

    /// Fetch a contract by hash lock.
    pub fn get_htlc(&self, hash_lock: &HashLock) -> Result<Htlc, HtlcError> {
        Ok(self.store.get(hash_lock)?)
    }
}
