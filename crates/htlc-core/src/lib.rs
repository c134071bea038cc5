pub mod error;
pub mod types;
pub mod params;
pub mod msgs;
pub mod events;
pub mod state_machine;

pub use error::{CoreError, ValidationError};
pub use events::HtlcEvent;
pub use msgs::{ClaimHtlcMsg, CreateHtlcMsg, HtlcMsg, RefundHtlcMsg};
pub use params::Params;
pub use state_machine::{HtlcStateMachine, HtlcTransition};
pub use types::{Address, Amount, HashLock, Htlc, HtlcState, Secret};
