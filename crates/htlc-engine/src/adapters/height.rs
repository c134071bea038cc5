use std::sync::atomic::{AtomicU64, Ordering};

use crate::traits::HeightOracle;

/// Height oracle advanced explicitly by the host, one block at a time.
#[derive(Debug, Default)]
pub struct ManualHeight {
    height: AtomicU64,
}

impl ManualHeight {
    pub fn new(height: u64) -> Self {
        Self {
            height: AtomicU64::new(height),
        }
    }

    pub fn set(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }

    /// Move to the next block and return its height.
    pub fn advance(&self) -> u64 {
        self.height.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl HeightOracle for ManualHeight {
    fn current_height(&self) -> u64 {
        self.height.load(Ordering::SeqCst)
    }
}
