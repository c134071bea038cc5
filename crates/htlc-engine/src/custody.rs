use htlc_core::types::{Address, Amount};

use crate::error::{HtlcError, LedgerError};
use crate::traits::AccountLedger;

/// Moves value between accounts and the module-owned escrow account.
///
/// Custody never looks at contract state; the keeper decides when to lock
/// and release.
pub struct EscrowCustody<L> {
    ledger: L,
    escrow: Address,
}

impl<L: AccountLedger> EscrowCustody<L> {
    /// Custody over the escrow account of module `escrow_module`.
    pub fn new(ledger: L, escrow_module: &str) -> Self {
        Self {
            ledger,
            escrow: Address::module(escrow_module),
        }
    }

    /// Address of the escrow account.
    pub fn escrow_address(&self) -> &Address {
        &self.escrow
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Debit `from` and credit the escrow account.
    pub fn lock(&self, from: &Address, amount: &Amount) -> Result<(), HtlcError> {
        self.ledger
            .transfer(from, &self.escrow, amount)
            .map_err(|e| match e {
                LedgerError::InsufficientBalance {
                    account,
                    available,
                    required,
                    ..
                } => HtlcError::InsufficientFunds {
                    account,
                    available,
                    required,
                },
                other => HtlcError::Ledger(other),
            })?;
        tracing::debug!(%from, %amount, "escrow locked");
        Ok(())
    }

    /// Debit the escrow account and credit `to`.
    ///
    /// The escrow always holds what open contracts locked, so any failure
    /// here means the ledger and the contract store disagree.
    pub fn release(&self, to: &Address, amount: &Amount) -> Result<(), HtlcError> {
        self.ledger.transfer(&self.escrow, to, amount).map_err(|e| {
            tracing::error!(%to, %amount, error = %e, "escrow release failed");
            HtlcError::Ledger(e)
        })?;
        tracing::debug!(%to, %amount, "escrow released");
        Ok(())
    }

    /// Escrow balance in `denom`.
    pub fn escrow_balance(&self, denom: &str) -> Result<u128, HtlcError> {
        Ok(self.ledger.balance_of(&self.escrow, denom)?)
    }
}
