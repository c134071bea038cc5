use std::fmt;

use crate::error::CoreError;
use crate::types::HtlcState;

/// Triggers that move an HTLC between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum HtlcTransition {
    /// The secret was revealed before the deadline.
    Claim,
    /// The deadline height was reached without a claim.
    Expire,
    /// The sender reclaimed the funds of an expired contract.
    Refund,
}

impl fmt::Display for HtlcTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Claim => write!(f, "claim"),
            Self::Expire => write!(f, "expire"),
            Self::Refund => write!(f, "refund"),
        }
    }
}

/// The HTLC transition graph.
///
/// Valid transitions:
/// - Open → Completed (Claim)
/// - Open → Expired (Expire)
/// - Expired → Refunded (Refund)
///
/// Completed and Refunded are terminal.
pub struct HtlcStateMachine;

impl HtlcStateMachine {
    /// Returns the state reached by applying `transition` to `current`, or
    /// an error if the edge does not exist.
    pub fn transition(
        current: HtlcState,
        transition: HtlcTransition,
    ) -> Result<HtlcState, CoreError> {
        let next = match (current, transition) {
            (HtlcState::Open, HtlcTransition::Claim) => HtlcState::Completed,
            (HtlcState::Open, HtlcTransition::Expire) => HtlcState::Expired,
            (HtlcState::Expired, HtlcTransition::Refund) => HtlcState::Refunded,
            _ => {
                return Err(CoreError::InvalidStateTransition {
                    from: current,
                    transition,
                })
            }
        };

        tracing::debug!(
            from = %current,
            to = %next,
            transition = %transition,
            "htlc state transition"
        );

        Ok(next)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: HtlcState, transition: HtlcTransition) -> bool {
        Self::transition(current, transition).is_ok()
    }
}
