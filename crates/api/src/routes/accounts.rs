//! Account routes: creation, lookup, funding operations, balance, and
//! transaction history.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{error::ApiError, AppState};
use tally_core::ledger::{
    AccountType, CreateAccountInput, DepositInput, EntryType, LedgerService, TransactionType,
    WithdrawInput,
};
use tally_db::entities::accounts;
use tally_db::{LedgerRepository, TransactionWithEntries};
use tally_shared::PageRequest;

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(create_account))
        .route("/accounts/{id}", get(get_account))
        .route("/accounts/{id}/deposit", post(deposit))
        .route("/accounts/{id}/withdraw", post(withdraw))
        .route("/accounts/{id}/balance", get(get_balance))
        .route("/accounts/{id}/transactions", get(get_transactions))
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Account name.
    pub name: String,
    /// Currency code; defaults to USD.
    pub currency: Option<String>,
}

/// Request body for a deposit or withdrawal.
#[derive(Debug, Deserialize)]
pub struct FundingRequest {
    /// Amount in minor currency units.
    pub amount: i64,
    /// Expected currency, checked against the account when present.
    pub currency: Option<String>,
    /// Idempotency key; omit to opt out of idempotency.
    pub idempotency_key: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

/// Response for an account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Account name.
    pub name: String,
    /// USER or SYSTEM.
    pub account_type: String,
    /// Currency code.
    pub currency: String,
    /// Cached balance in minor currency units.
    pub balance: i64,
    /// Mutation counter.
    pub version: i64,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
}

impl From<accounts::Model> for AccountResponse {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            account_type: AccountType::from(model.account_type).to_string(),
            currency: model.currency,
            balance: model.balance,
            version: model.version,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

/// Response for a transaction with its two entries.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Idempotency key, if one was supplied.
    pub idempotency_key: Option<String>,
    /// DEPOSIT, WITHDRAWAL, or TRANSFER.
    pub transaction_type: String,
    /// Amount in minor currency units.
    pub amount: i64,
    /// Currency code.
    pub currency: String,
    /// Free-text description.
    pub description: Option<String>,
    /// The DEBIT and CREDIT entries.
    pub entries: Vec<LedgerEntryResponse>,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
}

/// Response for a single ledger entry.
#[derive(Debug, Serialize)]
pub struct LedgerEntryResponse {
    /// Entry ID.
    pub id: Uuid,
    /// Account the entry applies to.
    pub account_id: Uuid,
    /// DEBIT or CREDIT.
    pub entry_type: String,
    /// Amount in minor currency units.
    pub amount: i64,
    /// Account balance immediately after this entry.
    pub balance_after: i64,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
}

impl From<TransactionWithEntries> for TransactionResponse {
    fn from(result: TransactionWithEntries) -> Self {
        let entries = result
            .entries
            .into_iter()
            .map(|entry| LedgerEntryResponse {
                id: entry.id,
                account_id: entry.account_id,
                entry_type: EntryType::from(entry.entry_type).to_string(),
                amount: entry.amount,
                balance_after: entry.balance_after,
                created_at: entry.created_at.to_rfc3339(),
            })
            .collect();

        let transaction = result.transaction;
        Self {
            id: transaction.id,
            idempotency_key: transaction.idempotency_key,
            transaction_type: TransactionType::from(transaction.transaction_type).to_string(),
            amount: transaction.amount,
            currency: transaction.currency,
            description: transaction.description,
            entries,
            created_at: transaction.created_at.to_rfc3339(),
        }
    }
}

/// Response for the balance endpoint.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Account ID.
    pub account_id: Uuid,
    /// Balance column on the account row.
    pub cached_balance: i64,
    /// Sum of credits minus debits over the entry log.
    pub derived_balance: i64,
    /// Currency code.
    pub currency: String,
    /// Whether the two balances agree.
    pub is_consistent: bool,
}

/// POST `/accounts` - Create a user account.
async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let account = LedgerService::create_account(CreateAccountInput {
        name: payload.name,
        currency: payload.currency,
    })?;

    let repo = LedgerRepository::new((*state.db).clone());
    let created = repo.create_account(account).await?;

    info!(account_id = %created.id, name = %created.name, "Account created");

    Ok((StatusCode::CREATED, Json(AccountResponse::from(created))))
}

/// GET `/accounts/{id}` - Fetch an account.
async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = LedgerRepository::new((*state.db).clone());
    let account = repo.find_account_by_id(id).await?;

    Ok(Json(AccountResponse::from(account)))
}

/// POST `/accounts/{id}/deposit` - Deposit from the external funding
/// source.
async fn deposit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FundingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = LedgerService::deposit(DepositInput {
        account_id: id,
        amount: payload.amount,
        currency: payload.currency,
        idempotency_key: payload.idempotency_key,
        description: payload.description,
    })?;

    let repo = LedgerRepository::new((*state.db).clone());
    let result = repo.execute_double_entry(&cmd).await?;

    info!(
        account_id = %id,
        transaction_id = %result.transaction.id,
        amount = result.transaction.amount,
        "Deposit executed"
    );

    Ok((StatusCode::CREATED, Json(TransactionResponse::from(result))))
}

/// POST `/accounts/{id}/withdraw` - Withdraw to the external funding
/// source.
async fn withdraw(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FundingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = LedgerService::withdraw(WithdrawInput {
        account_id: id,
        amount: payload.amount,
        currency: payload.currency,
        idempotency_key: payload.idempotency_key,
        description: payload.description,
    })?;

    let repo = LedgerRepository::new((*state.db).clone());
    let result = repo.execute_double_entry(&cmd).await?;

    info!(
        account_id = %id,
        transaction_id = %result.transaction.id,
        amount = result.transaction.amount,
        "Withdrawal executed"
    );

    Ok((StatusCode::CREATED, Json(TransactionResponse::from(result))))
}

/// GET `/accounts/{id}/balance` - Cached and derived balance in one
/// consistent snapshot.
async fn get_balance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = LedgerRepository::new((*state.db).clone());
    let snapshot = repo.balance_snapshot(id).await?;

    let is_consistent = snapshot.is_consistent();
    Ok(Json(BalanceResponse {
        account_id: snapshot.account_id,
        cached_balance: snapshot.cached_balance,
        derived_balance: snapshot.derived_balance,
        currency: snapshot.currency,
        is_consistent,
    }))
}

/// GET `/accounts/{id}/transactions` - Transaction history, newest first.
async fn get_transactions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = LedgerRepository::new((*state.db).clone());

    // Verify existence so an unknown account is a 404, not an empty list
    repo.find_account_by_id(id).await?;

    let transactions = repo.transactions_by_account(id, page).await?;
    let response: Vec<TransactionResponse> = transactions
        .into_iter()
        .map(TransactionResponse::from)
        .collect();

    Ok(Json(json!({ "transactions": response })))
}
