use std::sync::Arc;

use htlc_core::types::{Address, Amount};

use crate::error::LedgerError;

/// Account ledger the engine moves escrowed value through.
///
/// Owned by the host. Implementations must make `transfer` atomic: either
/// `from` is debited and `to` credited, or neither balance changes.
pub trait AccountLedger: Send + Sync {
    /// Move `amount` from `from` to `to`.
    fn transfer(&self, from: &Address, to: &Address, amount: &Amount) -> Result<(), LedgerError>;

    /// Current balance of `account` in `denom`.
    fn balance_of(&self, account: &Address, denom: &str) -> Result<u128, LedgerError>;
}

/// Source of the block height the engine compares deadlines against.
pub trait HeightOracle: Send + Sync {
    /// Height of the block currently being processed.
    fn current_height(&self) -> u64;
}

impl<T: AccountLedger + ?Sized> AccountLedger for Arc<T> {
    fn transfer(&self, from: &Address, to: &Address, amount: &Amount) -> Result<(), LedgerError> {
        (**self).transfer(from, to, amount)
    }

    fn balance_of(&self, account: &Address, denom: &str) -> Result<u128, LedgerError> {
        (**self).balance_of(account, denom)
    }
}

impl<T: HeightOracle + ?Sized> HeightOracle for Arc<T> {
    fn current_height(&self) -> u64 {
        (**self).current_height()
    }
}
