//! The HTLC node orchestrator.
//!
//! Owns storage and the HTLC handler, runs the HTTP API in a background task,
//! and produces blocks on a fixed interval. The block producer is the only
//! writer: it applies queued transactions in arrival order, runs the
//! end-block expiry sweep, then commits the new height.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use htlc_core::HtlcMsg;
use htlc_engine::adapters::ManualHeight;
use htlc_engine::{HeightOracle, HtlcHandler};

use crate::commands::{NodeCommand, SubmitError, TxReply, TxResponse};
use crate::config::HtlcConfig;
use crate::state::NodeState;
use crate::storage::Storage;

type NodeHandler = HtlcHandler<Arc<Storage>, Arc<Storage>, Arc<ManualHeight>>;

/// A transaction waiting for the next block.
pub struct PendingTx {
    pub tx_id: String,
    pub msg: HtlcMsg,
    pub reply: TxReply,
}

/// Summary of a committed block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSummary {
    pub height: u64,
    pub applied: usize,
    pub rejected: usize,
    pub expired: usize,
}

/// The HTLC node.
pub struct HtlcNode {
    /// Node configuration.
    config: HtlcConfig,
    /// Persistent storage (None until opened).
    storage: Option<Arc<Storage>>,
    /// HTLC module entry point.
    handler: Option<NodeHandler>,
    /// Shared state accessible from HTTP handlers.
    node_state: Option<Arc<NodeState>>,
    /// Receives commands from the HTTP API.
    command_rx: Option<mpsc::Receiver<NodeCommand>>,
}

impl HtlcNode {
    /// Create a new node with the given config.
    pub fn new(config: HtlcConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            min_time_lock = config.params.min_time_lock,
            max_time_lock = config.params.max_time_lock,
            "HTLC node created"
        );
        Ok(Self {
            config,
            storage: None,
            handler: None,
            node_state: None,
            command_rx: None,
        })
    }

    /// Open storage, apply genesis, and build the handler and command channel.
    pub fn open(&mut self) -> Result<()> {
        let storage = Arc::new(Storage::open(&self.config.storage.data_dir)?);
        tracing::info!(path = %self.config.storage.data_dir.display(), "storage initialized");

        let accounts: Vec<_> = self
            .config
            .genesis
            .accounts
            .iter()
            .map(|a| (a.address(), a.amount()))
            .collect();
        if storage.apply_genesis(&accounts)? {
            tracing::info!(accounts = accounts.len(), "genesis balances minted");
        }

        let height = Arc::new(ManualHeight::new(storage.height()?));
        let handler = HtlcHandler::new(
            storage.clone(),
            storage.clone(),
            height.clone(),
            self.config.params.clone(),
        )?;
        tracing::info!(height = height.current_height(), "resuming block production");

        let (command_tx, command_rx) =
            mpsc::channel::<NodeCommand>(self.config.chain.mempool_capacity);
        let node_state = Arc::new(NodeState::new(
            storage.clone(),
            self.config.params.clone(),
            height.clone(),
            command_tx,
        ));

        self.storage = Some(storage);
        self.handler = Some(handler);
        self.node_state = Some(node_state);
        self.command_rx = Some(command_rx);
        Ok(())
    }

    /// Open the node and start the HTTP API.
    pub async fn start(&mut self) -> Result<()> {
        tracing::info!("starting HTLC node");
        self.open()?;

        let api_addr: SocketAddr = self.config.api_addr().parse()?;
        let api_state = self.state()?;
        tokio::spawn(async move {
            if let Err(e) = crate::api::start_api_server(api_addr, api_state).await {
                tracing::error!(error = %e, "HTTP API server error");
            }
        });

        Ok(())
    }

    /// Run the block producer until the command channel closes or a fatal
    /// error stops it.
    pub async fn run(&mut self) -> Result<()> {
        let mut command_rx = self
            .command_rx
            .take()
            .ok_or_else(|| anyhow::anyhow!("node not started"))?;

        let capacity = self.config.chain.mempool_capacity;
        let mut mempool: Vec<PendingTx> = Vec::with_capacity(capacity);
        let mut interval =
            tokio::time::interval(Duration::from_millis(self.config.chain.block_interval_ms));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        tracing::info!(
            block_interval_ms = self.config.chain.block_interval_ms,
            "entering block production loop"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let pending = std::mem::take(&mut mempool);
                    self.produce_block(pending)?;
                    self.state()?.set_mempool_len(0);
                }
                cmd = command_rx.recv() => {
                    match cmd {
                        Some(NodeCommand::SubmitTx { msg, reply }) => {
                            if mempool.len() >= capacity {
                                tracing::warn!(pending = mempool.len(), "mempool full, dropping tx");
                                let _ = reply.send(Err(SubmitError::MempoolFull(mempool.len())));
                                continue;
                            }
                            let tx_id = uuid::Uuid::now_v7().to_string();
                            tracing::debug!(%tx_id, msg_type = msg.msg_type(), "tx queued");
                            mempool.push(PendingTx { tx_id, msg, reply });
                            self.state()?.set_mempool_len(mempool.len());
                        }
                        None => {
                            tracing::info!("API command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Advance the height, apply `pending` in order, sweep expirations, and
    /// commit the height.
    ///
    /// Each transaction is written to storage as it is applied; there is no
    /// block-wide batch. A fatal engine error stops the block at that
    /// transaction and returns it. Transactions applied before it stay
    /// written, later ones are dropped unanswered, and the height is not
    /// committed. Within one transaction the custody transfer and the
    /// contract write are separate RocksDB batches, so a crash between them
    /// is not rolled back.
    pub fn produce_block(&self, pending: Vec<PendingTx>) -> Result<BlockSummary> {
        let handler = self
            .handler
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("node not started"))?;
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("node not started"))?;
        let height = handler.oracle().advance();

        let mut summary = BlockSummary {
            height,
            applied: 0,
            rejected: 0,
            expired: 0,
        };

        for tx in pending {
            match handler.deliver(&tx.msg) {
                Ok(result) => {
                    summary.applied += 1;
                    for event in &result.events {
                        tracing::debug!(
                            tx_id = %tx.tx_id,
                            event = event.kind(),
                            hash_lock = %event.hash_lock(),
                            "event emitted"
                        );
                    }
                    let _ = tx.reply.send(Ok(TxResponse {
                        tx_id: tx.tx_id,
                        height: result.height,
                        events: result.events,
                    }));
                }
                Err(e) if e.is_fatal() => {
                    tracing::error!(tx_id = %tx.tx_id, height, error = %e, "fatal error, halting block production");
                    let _ = tx.reply.send(Err(SubmitError::Rejected(e.clone())));
                    return Err(e.into());
                }
                Err(e) => {
                    summary.rejected += 1;
                    let _ = tx.reply.send(Err(SubmitError::Rejected(e)));
                }
            }
        }

        summary.expired = handler.end_block()?.len();
        storage.set_height(height)?;

        if summary.applied + summary.rejected + summary.expired > 0 {
            tracing::info!(
                height,
                applied = summary.applied,
                rejected = summary.rejected,
                expired = summary.expired,
                "block committed"
            );
        } else {
            tracing::trace!(height, "empty block committed");
        }
        Ok(summary)
    }

    /// Shared state for HTTP handlers.
    pub fn state(&self) -> Result<Arc<NodeState>> {
        self.node_state
            .clone()
            .ok_or_else(|| anyhow::anyhow!("node not started"))
    }

    /// Gracefully shut down the node.
    pub async fn shutdown(&mut self) -> Result<()> {
        tracing::info!("shutting down HTLC node");

        self.node_state = None;
        self.handler = None;

        if let Some(storage) = self.storage.take() {
            drop(storage);
            tracing::info!("storage closed");
        }

        tracing::info!("HTLC node shut down");
        Ok(())
    }
}
