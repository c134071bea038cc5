use serde::Serialize;

use crate::types::{Address, Amount, HashLock, Secret};

/// Events emitted by the HTLC module, one per state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum HtlcEvent {
    /// Funds were locked and a new contract opened.
    #[serde(rename = "htlc_created")]
    Created {
        hash_lock: HashLock,
        sender: Address,
        receiver: Address,
        amount: Amount,
    },
    /// The secret was revealed and the receiver paid.
    #[serde(rename = "htlc_claimed")]
    Claimed { hash_lock: HashLock, secret: Secret },
    /// The sender recovered the funds of an expired contract.
    #[serde(rename = "htlc_refunded")]
    Refunded { hash_lock: HashLock },
    /// The sweeper moved an open contract past its deadline.
    #[serde(rename = "htlc_expired")]
    Expired { hash_lock: HashLock },
}

impl HtlcEvent {
    /// Event type string as exposed to the host.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created { .. } => "htlc_created",
            Self::Claimed { .. } => "htlc_claimed",
            Self::Refunded { .. } => "htlc_refunded",
            Self::Expired { .. } => "htlc_expired",
        }
    }

    pub fn hash_lock(&self) -> &HashLock {
        match self {
            Self::Created { hash_lock, .. }
            | Self::Claimed { hash_lock, .. }
            | Self::Refunded { hash_lock }
            | Self::Expired { hash_lock } => hash_lock,
        }
    }
}
