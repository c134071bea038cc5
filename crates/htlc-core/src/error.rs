use crate::state_machine::HtlcTransition;
use crate::types::HtlcState;

/// Stateless request validation failures.
///
/// Each variant names the offending field; the payload is a human-readable
/// reason suitable for returning to the submitter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid hash lock: {0}")]
    InvalidHashLock(String),

    #[error("invalid secret: {0}")]
    InvalidSecret(String),

    #[error("invalid time lock {time_lock}: must be between [{min},{max}]")]
    InvalidTimeLock { time_lock: u64, min: u64, max: u64 },
}

/// Core protocol errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("invalid HTLC state transition: cannot {transition} from {from}")]
    InvalidStateTransition {
        from: HtlcState,
        transition: HtlcTransition,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid params: {0}")]
    InvalidParams(String),
}
