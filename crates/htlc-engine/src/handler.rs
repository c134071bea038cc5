use serde::Serialize;

use htlc_core::msgs::{validate_hash_lock, HtlcMsg};
use htlc_core::types::Htlc;
use htlc_core::{CoreError, HtlcEvent, Params};

use crate::error::HtlcError;
use crate::keeper::Keeper;
use crate::store::HtlcStore;
use crate::traits::{AccountLedger, HeightOracle};

/// Outcome of a delivered transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxResult {
    /// Height the transaction was applied at.
    pub height: u64,
    pub events: Vec<HtlcEvent>,
}

/// Host-facing entry point of the HTLC module.
///
/// The host delivers each transaction of a block in order, then calls
/// [`HtlcHandler::end_block`] once before committing.
pub struct HtlcHandler<S, L, H> {
    keeper: Keeper<S, L>,
    oracle: H,
}

impl<S, L, H> HtlcHandler<S, L, H>
where
    S: HtlcStore,
    L: AccountLedger,
    H: HeightOracle,
{
    pub fn new(store: S, ledger: L, oracle: H, params: Params) -> Result<Self, CoreError> {
        Ok(Self {
            keeper: Keeper::new(store, ledger, params)?,
            oracle,
        })
    }

    pub fn keeper(&self) -> &Keeper<S, L> {
        &self.keeper
    }

    pub fn oracle(&self) -> &H {
        &self.oracle
    }

    /// Validate and apply one transaction at the current height.
    pub fn deliver(&self, msg: &HtlcMsg) -> Result<TxResult, HtlcError> {
        let height = self.oracle.current_height();

        let result = msg
            .validate_basic(self.keeper.params())
            .map_err(HtlcError::from)
            .and_then(|()| match msg {
                HtlcMsg::Create(create) => self.keeper.create(create, height),
                HtlcMsg::Claim(claim) => self.keeper.claim(claim, height),
                HtlcMsg::Refund(refund) => self.keeper.refund(refund, height),
            });

        match result {
            Ok(event) => Ok(TxResult {
                height,
                events: vec![event],
            }),
            Err(e) => {
                if e.is_fatal() {
                    tracing::error!(msg_type = msg.msg_type(), height, error = %e, "fatal error delivering tx");
                } else {
                    tracing::warn!(
                        msg_type = msg.msg_type(),
                        signer = %msg.signer(),
                        height,
                        error = %e,
                        "tx rejected"
                    );
                }
                Err(e)
            }
        }
    }

    /// End-of-block hook: expire every contract due at the current height.
    pub fn end_block(&self) -> Result<Vec<HtlcEvent>, HtlcError> {
        self.keeper.sweep_expirations(self.oracle.current_height())
    }

    /// Fetch a contract by its hex-encoded hash lock.
    pub fn query(&self, hash_lock: &str) -> Result<Htlc, HtlcError> {
        let hash_lock = validate_hash_lock(hash_lock)?;
        self.keeper.get_htlc(&hash_lock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ManualHeight, MemoryLedger};
    use crate::error::ErrorKind;
    use crate::store::MemoryStore;
    use htlc_core::msgs::{ClaimHtlcMsg, CreateHtlcMsg, RefundHtlcMsg};
    use htlc_core::types::{Address, Amount, HtlcState, Secret};
    use htlc_core::ValidationError;

    type TestHandler = HtlcHandler<MemoryStore, MemoryLedger, ManualHeight>;

    fn secret() -> Secret {
        Secret::new([7; 32])
    }

    fn lock_hex() -> String {
        htlc_crypto::compute_hash_lock(&secret(), 0).to_hex()
    }

    fn handler() -> TestHandler {
        let ledger = MemoryLedger::new();
        ledger
            .mint(&Address::new("alice"), &Amount::new(500, "stake"))
            .unwrap();
        HtlcHandler::new(
            MemoryStore::new(),
            ledger,
            ManualHeight::new(1000),
            Params::default(),
        )
        .unwrap()
    }

    fn create(time_lock: u64) -> HtlcMsg {
        HtlcMsg::Create(CreateHtlcMsg {
            sender: "alice".into(),
            receiver: "bob".into(),
            receiver_on_other_chain: Vec::new(),
            out_amount: Amount::new(100, "stake"),
            in_amount: 0,
            hash_lock: lock_hex(),
            timestamp: 0,
            time_lock,
        })
    }

    #[test]
    fn test_deliver_create() {
        let handler = handler();
        let result = handler.deliver(&create(50)).unwrap();
        assert_eq!(result.height, 1000);
        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].kind(), "htlc_created");

        let htlc = handler.query(&lock_hex()).unwrap();
        assert_eq!(htlc.expiration_height, 1050);
    }

    #[test]
    fn test_deliver_rejects_invalid_time_lock_without_state_change() {
        let handler = handler();
        let err = handler.deliver(&create(49)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(matches!(
            err,
            HtlcError::Validation(ValidationError::InvalidTimeLock { .. })
        ));
        assert!(matches!(
            handler.query(&lock_hex()),
            Err(HtlcError::NotFound(_))
        ));
    }

    #[test]
    fn test_end_block_then_refund() {
        let handler = handler();
        handler.deliver(&create(50)).unwrap();

        handler.oracle().set(1049);
        assert!(handler.end_block().unwrap().is_empty());

        handler.oracle().set(1050);
        let events = handler.end_block().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), "htlc_expired");

        handler.oracle().advance();
        let refund = HtlcMsg::Refund(RefundHtlcMsg {
            sender: "alice".into(),
            hash_lock: lock_hex(),
        });
        let result = handler.deliver(&refund).unwrap();
        assert_eq!(result.height, 1051);
        assert_eq!(handler.query(&lock_hex()).unwrap().state, HtlcState::Refunded);
    }

    #[test]
    fn test_deliver_claim() {
        let handler = handler();
        handler.deliver(&create(100)).unwrap();
        handler.oracle().advance();

        let claim = HtlcMsg::Claim(ClaimHtlcMsg {
            sender: "bob".into(),
            secret: secret().to_hex(),
            hash_lock: lock_hex(),
        });
        let result = handler.deliver(&claim).unwrap();
        assert_eq!(result.events[0].kind(), "htlc_claimed");
        assert_eq!(
            handler
                .keeper()
                .custody()
                .ledger()
                .balance_of(&Address::new("bob"), "stake")
                .unwrap(),
            100
        );
    }

    #[test]
    fn test_query_bad_hex() {
        let handler = handler();
        assert!(matches!(
            handler.query("zz"),
            Err(HtlcError::Validation(ValidationError::InvalidHashLock(_)))
        ));
    }
}
