//! Shared node state for cross-task communication.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use htlc_core::Params;
use htlc_engine::adapters::ManualHeight;
use htlc_engine::HeightOracle;

use crate::commands::NodeCommand;
use crate::storage::Storage;

/// Shared state for the running node, accessible from HTTP handlers.
///
/// Handlers only read through `storage`; every write goes through
/// `command_tx` to the block producer.
pub struct NodeState {
    /// When the node started.
    pub start_time: Instant,
    /// Wall-clock start time, reported by the status endpoint.
    pub started_at: DateTime<Utc>,
    /// Contract store and account ledger.
    pub storage: Arc<Storage>,
    /// Module parameters, for validating requests before they are queued.
    pub params: Params,
    /// Height of the last produced block.
    height: Arc<ManualHeight>,
    /// Transactions waiting for the next block (updated by the producer).
    mempool_len: AtomicUsize,
    /// Channel to send commands to the block producer.
    pub command_tx: mpsc::Sender<NodeCommand>,
}

impl NodeState {
    pub fn new(
        storage: Arc<Storage>,
        params: Params,
        height: Arc<ManualHeight>,
        command_tx: mpsc::Sender<NodeCommand>,
    ) -> Self {
        Self {
            start_time: Instant::now(),
            started_at: Utc::now(),
            storage,
            params,
            height,
            mempool_len: AtomicUsize::new(0),
            command_tx,
        }
    }

    pub fn height(&self) -> u64 {
        self.height.current_height()
    }

    pub fn mempool_len(&self) -> usize {
        self.mempool_len.load(Ordering::Relaxed)
    }

    pub fn set_mempool_len(&self, len: usize) {
        self.mempool_len.store(len, Ordering::Relaxed);
    }
}
