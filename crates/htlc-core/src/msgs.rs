//! Transaction messages accepted by the HTLC module and their stateless
//! validation.
//!
//! `validate_basic` performs structural and range checks only. Whether a
//! secret actually opens a hash lock depends on the stored contract and is
//! checked by the keeper.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::params::Params;
use crate::types::{hex_bytes, Address, Amount, HashLock, Secret};

pub const TYPE_MSG_CREATE_HTLC: &str = "create_htlc";
pub const TYPE_MSG_CLAIM_HTLC: &str = "claim_htlc";
pub const TYPE_MSG_REFUND_HTLC: &str = "refund_htlc";

/// Request to lock `out_amount` from `sender` under `hash_lock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateHtlcMsg {
    pub sender: Address,
    pub receiver: Address,
    #[serde(with = "hex_bytes", default)]
    pub receiver_on_other_chain: Vec<u8>,
    pub out_amount: Amount,
    #[serde(default)]
    pub in_amount: u64,
    /// Hex-encoded 32-byte commitment.
    pub hash_lock: String,
    #[serde(default)]
    pub timestamp: u64,
    /// Blocks until the contract may expire.
    pub time_lock: u64,
}

impl CreateHtlcMsg {
    pub fn validate_basic(&self, params: &Params) -> Result<(), ValidationError> {
        validate_sender(&self.sender)?;

        if self.receiver.is_empty() {
            return Err(ValidationError::InvalidAddress(
                "the receiver address must be specified".into(),
            ));
        }

        let escrow = params.escrow_address();
        if self.sender == escrow || self.receiver == escrow {
            return Err(escrow_party(&escrow));
        }

        if self.receiver_on_other_chain.len() > params.max_other_chain_address_len {
            return Err(ValidationError::InvalidAddress(format!(
                "the length of the receiver on other chain must be between [0,{}]",
                params.max_other_chain_address_len
            )));
        }

        if !self.out_amount.is_positive() {
            return Err(ValidationError::InvalidAmount(format!(
                "the transferred amount must be positive, got '{}'",
                self.out_amount
            )));
        }

        validate_hash_lock(&self.hash_lock)?;

        if !params.time_lock_in_range(self.time_lock) {
            return Err(ValidationError::InvalidTimeLock {
                time_lock: self.time_lock,
                min: params.min_time_lock,
                max: params.max_time_lock,
            });
        }

        Ok(())
    }

    /// Decoded hash lock.
    pub fn hash_lock(&self) -> Result<HashLock, ValidationError> {
        validate_hash_lock(&self.hash_lock)
    }
}

/// Request to claim an open contract by revealing its secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimHtlcMsg {
    /// Submitter. Not necessarily the receiver; funds always go to the
    /// receiver recorded at creation.
    pub sender: Address,
    /// Hex-encoded 32-byte preimage.
    pub secret: String,
    /// Hex-encoded 32-byte commitment.
    pub hash_lock: String,
}

impl ClaimHtlcMsg {
    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        validate_sender(&self.sender)?;
        validate_secret(&self.secret)?;
        validate_hash_lock(&self.hash_lock)?;
        Ok(())
    }

    pub fn hash_lock(&self) -> Result<HashLock, ValidationError> {
        validate_hash_lock(&self.hash_lock)
    }

    pub fn secret(&self) -> Result<Secret, ValidationError> {
        validate_secret(&self.secret)
    }
}

/// Request to return the funds of an expired contract to its sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundHtlcMsg {
    pub sender: Address,
    /// Hex-encoded 32-byte commitment.
    pub hash_lock: String,
}

impl RefundHtlcMsg {
    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        validate_sender(&self.sender)?;
        validate_hash_lock(&self.hash_lock)?;
        Ok(())
    }

    pub fn hash_lock(&self) -> Result<HashLock, ValidationError> {
        validate_hash_lock(&self.hash_lock)
    }
}

/// Any message routed to the HTLC module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HtlcMsg {
    #[serde(rename = "create_htlc")]
    Create(CreateHtlcMsg),
    #[serde(rename = "claim_htlc")]
    Claim(ClaimHtlcMsg),
    #[serde(rename = "refund_htlc")]
    Refund(RefundHtlcMsg),
}

impl HtlcMsg {
    pub fn msg_type(&self) -> &'static str {
        match self {
            Self::Create(_) => TYPE_MSG_CREATE_HTLC,
            Self::Claim(_) => TYPE_MSG_CLAIM_HTLC,
            Self::Refund(_) => TYPE_MSG_REFUND_HTLC,
        }
    }

    /// The account the host must have verified a signature for.
    pub fn signer(&self) -> &Address {
        match self {
            Self::Create(msg) => &msg.sender,
            Self::Claim(msg) => &msg.sender,
            Self::Refund(msg) => &msg.sender,
        }
    }

    pub fn validate_basic(&self, params: &Params) -> Result<(), ValidationError> {
        match self {
            Self::Create(msg) => msg.validate_basic(params),
            Self::Claim(msg) => msg.validate_basic(),
            Self::Refund(msg) => msg.validate_basic(),
        }
    }
}

fn validate_sender(sender: &Address) -> Result<(), ValidationError> {
    if sender.is_empty() {
        return Err(ValidationError::InvalidAddress(
            "the sender address must be specified".into(),
        ));
    }
    Ok(())
}

/// The escrow account can be neither side of a contract: funds it locks or
/// releases to itself never leave custody.
pub fn escrow_party(escrow: &Address) -> ValidationError {
    ValidationError::InvalidAddress(format!(
        "the escrow account {} cannot be a party to a contract",
        escrow
    ))
}

/// Check that `hash_lock` is hex encoding exactly 32 bytes.
pub fn validate_hash_lock(hash_lock: &str) -> Result<HashLock, ValidationError> {
    HashLock::from_hex(hash_lock)
}

/// Check that `secret` is hex encoding exactly 32 bytes.
pub fn validate_secret(secret: &str) -> Result<Secret, ValidationError> {
    Secret::from_hex(secret)
}
