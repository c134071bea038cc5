//! Shared fixtures for the HTLC integration tests: an in-memory chain with a
//! manual height and helpers to build transactions.

use std::sync::Arc;

use htlc_core::msgs::{ClaimHtlcMsg, CreateHtlcMsg, RefundHtlcMsg};
use htlc_core::types::{Address, Amount, HashLock, Htlc, Secret};
use htlc_core::{HtlcEvent, HtlcMsg, Params};
use htlc_engine::{
    AccountLedger, HtlcError, HtlcHandler, ManualHeight, MemoryLedger, MemoryStore, TxResult,
};

pub const DENOM: &str = "stake";

pub type TestHandler = HtlcHandler<Arc<MemoryStore>, Arc<MemoryLedger>, Arc<ManualHeight>>;

/// A single-module chain driven block by block from a test.
pub struct Chain {
    pub handler: TestHandler,
    pub ledger: Arc<MemoryLedger>,
    pub height: Arc<ManualHeight>,
}

impl Chain {
    /// Start at `height` with the given `(account, balance)` allocations.
    pub fn new(height: u64, balances: &[(&str, u128)]) -> Self {
        let ledger = Arc::new(MemoryLedger::new());
        for (account, value) in balances {
            ledger
                .mint(&Address::new(*account), &Amount::new(*value, DENOM))
                .expect("genesis mint");
        }
        let height = Arc::new(ManualHeight::new(height));
        let handler = HtlcHandler::new(
            Arc::new(MemoryStore::new()),
            ledger.clone(),
            height.clone(),
            Params::default(),
        )
        .expect("default params are valid");
        Self {
            handler,
            ledger,
            height,
        }
    }

    /// Move to `height` without running end-block.
    pub fn set_height(&self, height: u64) {
        self.height.set(height);
    }

    pub fn deliver(&self, msg: &HtlcMsg) -> Result<TxResult, HtlcError> {
        self.handler.deliver(msg)
    }

    pub fn end_block(&self) -> Vec<HtlcEvent> {
        self.handler.end_block().expect("end block")
    }

    pub fn htlc(&self, hash_lock: &HashLock) -> Htlc {
        self.handler
            .query(&hash_lock.to_hex())
            .expect("htlc should exist")
    }

    pub fn balance(&self, account: &str) -> u128 {
        self.ledger
            .balance_of(&Address::new(account), DENOM)
            .expect("balance")
    }

    pub fn escrow_balance(&self) -> u128 {
        self.handler
            .keeper()
            .custody()
            .escrow_balance(DENOM)
            .expect("escrow balance")
    }

    pub fn total_supply(&self) -> u128 {
        self.ledger.total_supply(DENOM)
    }
}

/// Deterministic secret for tests.
pub fn secret(seed: u8) -> Secret {
    Secret::new([seed; 32])
}

pub fn create_msg(
    sender: &str,
    receiver: &str,
    amount: u128,
    hash_lock: &HashLock,
    timestamp: u64,
    time_lock: u64,
) -> HtlcMsg {
    HtlcMsg::Create(CreateHtlcMsg {
        sender: Address::new(sender),
        receiver: Address::new(receiver),
        receiver_on_other_chain: Vec::new(),
        out_amount: Amount::new(amount, DENOM),
        in_amount: 0,
        hash_lock: hash_lock.to_hex(),
        timestamp,
        time_lock,
    })
}

pub fn claim_msg(sender: &str, secret: &Secret, hash_lock: &HashLock) -> HtlcMsg {
    HtlcMsg::Claim(ClaimHtlcMsg {
        sender: Address::new(sender),
        secret: secret.to_hex(),
        hash_lock: hash_lock.to_hex(),
    })
}

pub fn refund_msg(sender: &str, hash_lock: &HashLock) -> HtlcMsg {
    HtlcMsg::Refund(RefundHtlcMsg {
        sender: Address::new(sender),
        hash_lock: hash_lock.to_hex(),
    })
}
