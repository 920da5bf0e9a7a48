//! Transfer route: moving funds between two user accounts.

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::accounts::TransactionResponse;
use crate::{error::ApiError, AppState};
use tally_core::ledger::{LedgerService, TransferInput};
use tally_db::LedgerRepository;

/// Creates the transfer routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/transfers", post(transfer))
}

/// Request body for a transfer.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Account debited.
    pub source_account_id: Uuid,
    /// Account credited.
    pub dest_account_id: Uuid,
    /// Amount in minor currency units.
    pub amount: i64,
    /// Expected currency, checked against the source account when present.
    pub currency: Option<String>,
    /// Idempotency key; omit to opt out of idempotency.
    pub idempotency_key: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

/// POST `/transfers` - Transfer between two user accounts.
async fn transfer(
    State(state): State<AppState>,
    Json(payload): Json<TransferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = LedgerService::transfer(TransferInput {
        source_account_id: payload.source_account_id,
        dest_account_id: payload.dest_account_id,
        amount: payload.amount,
        currency: payload.currency,
        idempotency_key: payload.idempotency_key,
        description: payload.description,
    })?;

    let repo = LedgerRepository::new((*state.db).clone());
    let result = repo.execute_double_entry(&cmd).await?;

    info!(
        source_account_id = %payload.source_account_id,
        dest_account_id = %payload.dest_account_id,
        transaction_id = %result.transaction.id,
        amount = result.transaction.amount,
        "Transfer executed"
    );

    Ok((StatusCode::CREATED, Json(TransactionResponse::from(result))))
}
