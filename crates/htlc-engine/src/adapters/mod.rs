pub mod height;
pub mod memory;

pub use height::ManualHeight;
pub use memory::MemoryLedger;
