//! Reconciliation route: proves or refutes that cached balances match
//! the balances derived from the immutable entry log.

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tracing::error;

use crate::{error::ApiError, AppState};
use tally_core::ledger::AccountReconciliation;
use tally_db::LedgerRepository;

/// Creates the reconciliation routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/reconciliation", get(reconcile))
}

/// Response for the reconciliation endpoint.
#[derive(Debug, Serialize)]
pub struct ReconciliationResponse {
    /// Per-account cached vs derived balances.
    pub accounts: Vec<AccountReconciliation>,
    /// True if every account is consistent.
    pub all_consistent: bool,
    /// True if global debits equal global credits.
    pub ledger_balanced: bool,
    /// Sum of all debit amounts.
    pub total_debits: i64,
    /// Sum of all credit amounts.
    pub total_credits: i64,
}

/// GET `/reconciliation` - Full reconciliation report.
async fn reconcile(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let repo = LedgerRepository::new((*state.db).clone());

    let accounts = repo.accounts_for_reconciliation().await?;
    let totals = repo.ledger_totals().await?;

    let mut all_consistent = true;
    for row in &accounts {
        if !row.is_consistent {
            all_consistent = false;
            error!(
                account_id = %row.account_id,
                cached = row.cached_balance,
                derived = row.derived_balance,
                "Reconciliation mismatch detected"
            );
        }
    }

    Ok(Json(ReconciliationResponse {
        all_consistent,
        ledger_balanced: totals.is_balanced(),
        total_debits: totals.total_debits,
        total_credits: totals.total_credits,
        accounts,
    }))
}
