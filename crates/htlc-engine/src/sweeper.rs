use htlc_core::types::Htlc;
use htlc_core::{HtlcEvent, HtlcStateMachine, HtlcTransition};

use crate::error::HtlcError;
use crate::store::HtlcStore;

/// End-of-block pass that expires open contracts whose deadline has been
/// reached.
pub struct ExpirySweeper;

impl ExpirySweeper {
    /// Move every open contract with `expiration_height <= current_height`
    /// to `Expired` and return one event per contract, in deadline order.
    ///
    /// No funds move here; expired contracts wait for an explicit refund.
    /// Running the sweep twice at the same height is a no-op the second time.
    pub fn sweep<S: HtlcStore + ?Sized>(
        store: &S,
        current_height: u64,
    ) -> Result<Vec<HtlcEvent>, HtlcError> {
        // Collect first: the index is ordered, so stop at the first future deadline.
        let mut due: Vec<Htlc> = Vec::new();
        for entry in store.open_by_expiration()? {
            let htlc = entry?;
            if htlc.expiration_height > current_height {
                break;
            }
            due.push(htlc);
        }

        let mut events = Vec::with_capacity(due.len());
        for mut htlc in due {
            htlc.state = HtlcStateMachine::transition(htlc.state, HtlcTransition::Expire)
                .map_err(HtlcError::Transition)?;
            store.update(&htlc)?;

            tracing::info!(
                hash_lock = %htlc.hash_lock,
                expiration_height = htlc.expiration_height,
                current_height,
                "HTLC expired"
            );
            events.push(HtlcEvent::Expired {
                hash_lock: htlc.hash_lock,
            });
        }

        if !events.is_empty() {
            tracing::debug!(count = events.len(), current_height, "expiry sweep finished");
        }
        Ok(events)
    }
}
