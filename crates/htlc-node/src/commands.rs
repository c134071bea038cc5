//! Commands dispatched from the HTTP API to the block producer.

use serde::Serialize;
use tokio::sync::oneshot;

use htlc_core::{HtlcEvent, HtlcMsg};
use htlc_engine::HtlcError;

/// Reply channel for a submitted transaction.
pub type TxReply = oneshot::Sender<Result<TxResponse, SubmitError>>;

/// A command sent from the HTTP API to the node's block producer.
pub enum NodeCommand {
    /// Queue a transaction for the next block.
    SubmitTx { msg: HtlcMsg, reply: TxReply },
}

/// Response returned once a transaction has been applied in a block.
#[derive(Debug, Clone, Serialize)]
pub struct TxResponse {
    pub tx_id: String,
    pub height: u64,
    pub events: Vec<HtlcEvent>,
}

/// Why a submitted transaction did not make it into a block.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Rejected(#[from] HtlcError),

    #[error("mempool is full ({0} pending transactions)")]
    MempoolFull(usize),
}
