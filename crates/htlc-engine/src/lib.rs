//! HTLC Escrow Engine
//!
//! Locks value under a hash lock and a deadline height, releasing it to the
//! receiver on proof of the secret or back to the sender after expiry. The
//! engine is driven by a host chain through [`HtlcHandler`]: transactions
//! are delivered one at a time and [`HtlcHandler::end_block`] runs the
//! expiry sweep once per block.

pub mod error;
pub mod traits;
pub mod store;
pub mod custody;
pub mod keeper;
pub mod sweeper;
pub mod handler;
pub mod adapters;

pub use error::{ErrorKind, HtlcError, LedgerError, StoreError};
pub use traits::{AccountLedger, HeightOracle};
pub use store::{HtlcStore, MemoryStore};
pub use custody::EscrowCustody;
pub use keeper::Keeper;
pub use sweeper::ExpirySweeper;
pub use handler::{HtlcHandler, TxResult};
pub use adapters::{ManualHeight, MemoryLedger};
