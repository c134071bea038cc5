//! HTTP API server for the HTLC node.
//!
//! Queries read storage directly. Transactions are forwarded to the block
//! producer and answered once the block that includes them is committed.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

use htlc_core::msgs::{validate_hash_lock, ClaimHtlcMsg, CreateHtlcMsg, RefundHtlcMsg};
use htlc_core::types::{Address, Htlc};
use htlc_core::HtlcMsg;
use htlc_engine::{AccountLedger, ErrorKind, HtlcError, HtlcStore};

use crate::commands::{NodeCommand, SubmitError, TxResponse};
use crate::state::NodeState;

// --- Response types ---

#[derive(Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub height: u64,
    pub htlc_count: usize,
    pub mempool_size: usize,
    pub uptime_secs: u64,
    pub started_at: String,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub address: String,
    pub denom: String,
    pub value: u128,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, kind: ErrorKind, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            kind,
        }),
    )
}

/// HTTP status for an engine rejection.
pub fn status_for(err: &HtlcError) -> StatusCode {
    if let HtlcError::NotFound(_) = err {
        return StatusCode::NOT_FOUND;
    }
    match err.kind() {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::StateConflict => StatusCode::CONFLICT,
        ErrorKind::ResourceFailure => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Fatal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn engine_error(err: HtlcError) -> ApiError {
    api_error(status_for(&err), err.kind(), err.to_string())
}

fn submit_error(err: SubmitError) -> ApiError {
    match err {
        SubmitError::Rejected(e) => engine_error(e),
        full @ SubmitError::MempoolFull(_) => api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::ResourceFailure,
            full.to_string(),
        ),
    }
}

// --- Handlers ---

async fn handle_status(
    State(state): State<Arc<NodeState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let htlc_count = state
        .storage
        .len()
        .map_err(|e| engine_error(e.into()))?;
    Ok(Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        height: state.height(),
        htlc_count,
        mempool_size: state.mempool_len(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        started_at: state.started_at.to_rfc3339(),
    }))
}

async fn handle_get_htlc(
    State(state): State<Arc<NodeState>>,
    Path(hash_lock): Path<String>,
) -> Result<Json<Htlc>, ApiError> {
    let hash_lock = validate_hash_lock(&hash_lock).map_err(|e| engine_error(e.into()))?;
    let htlc = HtlcStore::get(state.storage.as_ref(), &hash_lock)
        .map_err(|e| engine_error(e.into()))?;
    Ok(Json(htlc))
}

async fn handle_balance(
    State(state): State<Arc<NodeState>>,
    Path((address, denom)): Path<(String, String)>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let value = state
        .storage
        .balance_of(&Address::new(address.clone()), &denom)
        .map_err(|e| engine_error(e.into()))?;
    Ok(Json(BalanceResponse {
        address,
        denom,
        value,
    }))
}

async fn handle_create(
    State(state): State<Arc<NodeState>>,
    Json(msg): Json<CreateHtlcMsg>,
) -> Result<Json<TxResponse>, ApiError> {
    submit(&state, HtlcMsg::Create(msg)).await
}

async fn handle_claim(
    State(state): State<Arc<NodeState>>,
    Json(msg): Json<ClaimHtlcMsg>,
) -> Result<Json<TxResponse>, ApiError> {
    submit(&state, HtlcMsg::Claim(msg)).await
}

async fn handle_refund(
    State(state): State<Arc<NodeState>>,
    Json(msg): Json<RefundHtlcMsg>,
) -> Result<Json<TxResponse>, ApiError> {
    submit(&state, HtlcMsg::Refund(msg)).await
}

async fn submit(state: &NodeState, msg: HtlcMsg) -> Result<Json<TxResponse>, ApiError> {
    // Reject malformed requests without waiting for a block.
    msg.validate_basic(&state.params)
        .map_err(|e| engine_error(e.into()))?;

    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();

    let cmd = NodeCommand::SubmitTx {
        msg,
        reply: reply_tx,
    };

    state.command_tx.send(cmd).await.map_err(|_| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Fatal,
            "block producer not running",
        )
    })?;

    match reply_rx.await {
        Ok(Ok(resp)) => Ok(Json(resp)),
        Ok(Err(e)) => Err(submit_error(e)),
        Err(_) => Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Fatal,
            "block producer dropped the reply channel",
        )),
    }
}

// --- Server ---

pub fn build_router(state: Arc<NodeState>) -> Router {
    Router::new()
        .route("/api/v1/status", get(handle_status))
        .route("/api/v1/htlcs", post(handle_create))
        .route("/api/v1/htlcs/claim", post(handle_claim))
        .route("/api/v1/htlcs/refund", post(handle_refund))
        .route("/api/v1/htlcs/{hash_lock}", get(handle_get_htlc))
        .route("/api/v1/balances/{address}/{denom}", get(handle_balance))
        .with_state(state)
}

pub async fn start_api_server(
    listen_addr: SocketAddr,
    state: Arc<NodeState>,
) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app).await?;
    Ok(())
}
