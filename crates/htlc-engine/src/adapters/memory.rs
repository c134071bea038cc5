use dashmap::DashMap;
use htlc_core::types::{Address, Amount};

use crate::error::LedgerError;
use crate::traits::AccountLedger;

/// In-memory account ledger.
///
/// Balances are keyed by `(account, denom)`. Useful for tests and for hosts
/// that embed the engine without an account module of their own.
#[derive(Default)]
pub struct MemoryLedger {
    balances: DashMap<(Address, String), u128>,
}

impl MemoryLedger {
    /// Create a new ledger with no balances.
    pub fn new() -> Self {
        Self {
            balances: DashMap::new(),
        }
    }

    fn key(account: &Address, denom: &str) -> (Address, String) {
        (account.clone(), denom.to_string())
    }

    /// Credit `account` out of thin air (genesis allocation, faucets, tests).
    pub fn mint(&self, account: &Address, amount: &Amount) -> Result<(), LedgerError> {
        self.credit(account, amount)
    }

    /// Sum of all balances in `denom`.
    pub fn total_supply(&self, denom: &str) -> u128 {
        self.balances
            .iter()
            .filter(|entry| entry.key().1 == denom)
            .map(|entry| *entry.value())
            .sum()
    }

    fn credit(&self, account: &Address, amount: &Amount) -> Result<(), LedgerError> {
        let mut balance = self
            .balances
            .entry(Self::key(account, &amount.denom))
            .or_insert(0);
        *balance = balance
            .checked_add(amount.value)
            .ok_or_else(|| LedgerError::Overflow {
                account: account.clone(),
                denom: amount.denom.clone(),
            })?;
        Ok(())
    }

    fn debit(&self, account: &Address, amount: &Amount) -> Result<(), LedgerError> {
        let insufficient = |available| LedgerError::InsufficientBalance {
            account: account.clone(),
            denom: amount.denom.clone(),
            available,
            required: amount.value,
        };
        let mut balance = self
            .balances
            .get_mut(&Self::key(account, &amount.denom))
            .ok_or_else(|| insufficient(0))?;
        if *balance < amount.value {
            return Err(insufficient(*balance));
        }
        *balance -= amount.value;
        Ok(())
    }
}

impl AccountLedger for MemoryLedger {
    fn transfer(&self, from: &Address, to: &Address, amount: &Amount) -> Result<(), LedgerError> {
        self.debit(from, amount)?;
        if let Err(e) = self.credit(to, amount) {
            // Put the debited value back so the transfer leaves no trace.
            self.credit(from, amount)?;
            return Err(e);
        }
        tracing::trace!(%from, %to, %amount, "ledger transfer");
        Ok(())
    }

    fn balance_of(&self, account: &Address, denom: &str) -> Result<u128, LedgerError> {
        Ok(self
            .balances
            .get(&Self::key(account, denom))
            .map(|b| *b)
            .unwrap_or(0))
    }
}
