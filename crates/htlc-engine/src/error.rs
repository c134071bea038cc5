use htlc_core::types::{Address, HashLock, HtlcState};
use htlc_core::{CoreError, ValidationError};

/// Contract store errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("htlc not found: {0}")]
    NotFound(HashLock),

    #[error("htlc already exists: {0}")]
    AlreadyExists(HashLock),

    #[error("store backend failure: {0}")]
    Backend(String),

    #[error("store corrupted: {0}")]
    Corrupted(String),
}

/// Account ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("insufficient balance for {account}: available {available}{denom}, required {required}{denom}")]
    InsufficientBalance {
        account: Address,
        denom: String,
        available: u128,
        required: u128,
    },

    #[error("balance overflow for {account} in {denom}")]
    Overflow { account: Address, denom: String },

    #[error("ledger backend failure: {0}")]
    Backend(String),
}

/// Coarse classification of [`HtlcError`], used by hosts to decide how to
/// report a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed request, rejected before touching state.
    Validation,
    /// Request conflicts with the stored contract.
    StateConflict,
    /// The sender cannot fund the contract.
    ResourceFailure,
    /// Store or escrow corruption. The host must stop.
    Fatal,
}

/// Errors returned by the HTLC engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HtlcError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("htlc not found: {0}")]
    NotFound(HashLock),

    #[error("htlc already exists: {0}")]
    AlreadyExists(HashLock),

    #[error("htlc {hash_lock} is {state}")]
    InvalidState { hash_lock: HashLock, state: HtlcState },

    #[error("htlc {hash_lock} expired at height {expiration_height} (current height {current_height})")]
    Expired {
        hash_lock: HashLock,
        expiration_height: u64,
        current_height: u64,
    },

    #[error("secret does not match hash lock {0}")]
    SecretMismatch(HashLock),

    #[error("{sender} is not the sender of htlc {hash_lock}")]
    Unauthorized { hash_lock: HashLock, sender: Address },

    #[error("insufficient funds in {account}: available {available}, required {required}")]
    InsufficientFunds {
        account: Address,
        available: u128,
        required: u128,
    },

    #[error("invalid state transition: {0}")]
    Transition(CoreError),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl HtlcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_)
            | Self::AlreadyExists(_)
            | Self::InvalidState { .. }
            | Self::Expired { .. }
            | Self::SecretMismatch(_)
            | Self::Unauthorized { .. }
            | Self::Transition(_) => ErrorKind::StateConflict,
            Self::InsufficientFunds { .. } => ErrorKind::ResourceFailure,
            Self::Store(_) | Self::Ledger(_) => ErrorKind::Fatal,
        }
    }

    /// Whether the host must stop processing blocks.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Fatal
    }
}

impl From<StoreError> for HtlcError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(hash_lock) => Self::NotFound(hash_lock),
            StoreError::AlreadyExists(hash_lock) => Self::AlreadyExists(hash_lock),
            other => Self::Store(other),
        }
    }
}
