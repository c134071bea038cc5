use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Address;

/// Minimal number of blocks between creation and expiration.
pub const MIN_TIME_LOCK: u64 = 50;
/// Maximal number of blocks between creation and expiration.
pub const MAX_TIME_LOCK: u64 = 25480;
/// Maximal length in bytes of the receiver address on the counter-chain.
pub const MAX_OTHER_CHAIN_ADDRESS_LEN: usize = 32;
/// Name of the module account that holds escrowed funds.
pub const ESCROW_MODULE: &str = "htlc";

/// Host-defined parameters of the HTLC module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Shortest accepted time lock, in blocks.
    #[serde(default = "default_min_time_lock")]
    pub min_time_lock: u64,
    /// Longest accepted time lock, in blocks.
    #[serde(default = "default_max_time_lock")]
    pub max_time_lock: u64,
    /// Upper bound on `receiver_on_other_chain`.
    #[serde(default = "default_max_other_chain_address_len")]
    pub max_other_chain_address_len: usize,
    /// Module account name for the escrow.
    #[serde(default = "default_escrow_module")]
    pub escrow_module: String,
}

fn default_min_time_lock() -> u64 {
    MIN_TIME_LOCK
}
fn default_max_time_lock() -> u64 {
    MAX_TIME_LOCK
}
fn default_max_other_chain_address_len() -> usize {
    MAX_OTHER_CHAIN_ADDRESS_LEN
}
fn default_escrow_module() -> String {
    ESCROW_MODULE.into()
}

impl Default for Params {
    fn default() -> Self {
        Self {
            min_time_lock: MIN_TIME_LOCK,
            max_time_lock: MAX_TIME_LOCK,
            max_other_chain_address_len: MAX_OTHER_CHAIN_ADDRESS_LEN,
            escrow_module: ESCROW_MODULE.into(),
        }
    }
}

impl Params {
    /// Reject parameter sets that would make every create request invalid
    /// or allow contracts that expire in the block that created them.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.min_time_lock == 0 {
            return Err(CoreError::InvalidParams(
                "min_time_lock must be positive".into(),
            ));
        }
        if self.min_time_lock > self.max_time_lock {
            return Err(CoreError::InvalidParams(format!(
                "min_time_lock {} exceeds max_time_lock {}",
                self.min_time_lock, self.max_time_lock
            )));
        }
        if self.escrow_module.trim().is_empty() {
            return Err(CoreError::InvalidParams(
                "escrow_module must be set".into(),
            ));
        }
        Ok(())
    }

    /// Account that holds escrowed funds.
    pub fn escrow_address(&self) -> Address {
        Address::module(&self.escrow_module)
    }

    /// Whether `time_lock` falls within `[min_time_lock, max_time_lock]`.
    pub fn time_lock_in_range(&self, time_lock: u64) -> bool {
        (self.min_time_lock..=self.max_time_lock).contains(&time_lock)
    }
}
