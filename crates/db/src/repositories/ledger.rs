//! Ledger repository: the double-entry engine and its read paths.
//!
//! `execute_double_entry` runs entirely inside one database transaction.
//! Correctness under concurrency rests on two rules that must not be
//! reordered:
//!
//! 1. Account rows are locked with `FOR UPDATE` in global id order, so
//!    two mutations sharing an account serialize and the ABBA deadlock
//!    between opposite-direction transfers cannot occur.
//! 2. The idempotency key is resolved only after the locks are held.
//!    Concurrent callers with the same key serialize through the account
//!    locks, so a replay observes the committed transaction instead of
//!    racing the unique index into an aborted-transaction state.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, DbErr, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Set,
    SqlErr, Statement, TransactionTrait,
};
use uuid::Uuid;

use tally_core::ledger::{
    balance, AccountReconciliation, AccountType, BalanceSnapshot, DoubleEntryCommand, LedgerError,
    LedgerTotals, NewAccount,
};
use tally_shared::PageRequest;

use crate::entities::{accounts, ledger_entries, sea_orm_active_enums, transactions};

/// A transaction with its two ledger entries attached.
#[derive(Debug, Clone)]
pub struct TransactionWithEntries {
    /// Transaction header.
    pub transaction: transactions::Model,
    /// The DEBIT and CREDIT entries, in insertion order.
    pub entries: Vec<ledger_entries::Model>,
}

/// Ledger repository over a pooled database connection.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a USER account with zero balance.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` on a unique-constraint violation, `Database`
    /// on any other storage failure.
    pub async fn create_account(&self, account: NewAccount) -> Result<accounts::Model, LedgerError> {
        let now = Utc::now().into();

        let model = accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(account.name),
            account_type: Set(sea_orm_active_enums::AccountType::User),
            currency: Set(account.currency),
            balance: Set(0),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model.insert(&self.db).await.map_err(|err| {
            if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                LedgerError::Conflict("account already exists".to_string())
            } else {
                db_err(err)
            }
        })
    }

    /// Fetches an account by id.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no row exists.
    pub async fn find_account_by_id(&self, id: Uuid) -> Result<accounts::Model, LedgerError> {
        accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::AccountNotFound(id))
    }

    /// Executes a double-entry command inside one database transaction.
    ///
    /// The sequence is: lock both accounts in global id order, resolve the
    /// idempotency key, validate currencies, check solvency, insert the
    /// transaction and its DEBIT/CREDIT entries, update both cached
    /// balances, commit. Any failure rolls the whole transaction back;
    /// no partial state is ever visible.
    ///
    /// # Errors
    ///
    /// Returns the domain error detected at the failing step, or
    /// `Database` for storage failures.
    pub async fn execute_double_entry(
        &self,
        cmd: &DoubleEntryCommand,
    ) -> Result<TransactionWithEntries, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        // Dropping `txn` without commit rolls the transaction back, so
        // every early return below leaves no trace.
        let result = Self::execute_in_txn(&txn, cmd).await?;

        txn.commit().await.map_err(db_err)?;
        Ok(result)
    }

    async fn execute_in_txn(
        txn: &DatabaseTransaction,
        cmd: &DoubleEntryCommand,
    ) -> Result<TransactionWithEntries, LedgerError> {
        let mut locked = HashMap::with_capacity(2);
        for id in cmd.lock_order() {
            let account = accounts::Entity::find_by_id(id)
                .lock_exclusive()
                .one(txn)
                .await
                .map_err(db_err)?
                .ok_or(LedgerError::AccountNotFound(id))?;
            locked.insert(id, account);
        }

        if let Some(key) = cmd.idempotency_key.as_deref() {
            if let Some(existing) = transactions::Entity::find()
                .filter(transactions::Column::IdempotencyKey.eq(key))
                .one(txn)
                .await
                .map_err(db_err)?
            {
                return Self::replay_existing(txn, existing, cmd).await;
            }
        }

        let source = locked
            .remove(&cmd.source_account_id)
            .ok_or_else(|| LedgerError::Internal("source account missing after lock".to_string()))?;
        let dest = locked.remove(&cmd.dest_account_id).ok_or_else(|| {
            LedgerError::Internal("destination account missing after lock".to_string())
        })?;

        if source.currency != dest.currency {
            return Err(LedgerError::CurrencyMismatch {
                expected: source.currency,
                actual: dest.currency,
            });
        }
        if let Some(code) = cmd.currency.as_deref() {
            if code != source.currency {
                return Err(LedgerError::CurrencyMismatch {
                    expected: source.currency,
                    actual: code.to_string(),
                });
            }
        }

        let source_type = AccountType::from(source.account_type.clone());
        if !balance::has_sufficient_funds(source_type, source.balance, cmd.amount) {
            return Err(LedgerError::InsufficientFunds {
                account_id: source.id,
                balance: source.balance,
                requested: cmd.amount,
            });
        }

        let source_after = balance::balance_after_debit(source.balance, cmd.amount)
            .ok_or_else(|| LedgerError::Internal("source balance overflow".to_string()))?;
        let dest_after = balance::balance_after_credit(dest.balance, cmd.amount)
            .ok_or_else(|| LedgerError::Internal("destination balance overflow".to_string()))?;

        let now = Utc::now().into();

        let transaction = transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            idempotency_key: Set(cmd.idempotency_key.clone()),
            transaction_type: Set(cmd.transaction_type.into()),
            amount: Set(cmd.amount),
            currency: Set(source.currency.clone()),
            description: Set(cmd.description.clone()),
            created_at: Set(now),
        }
        .insert(txn)
        .await
        .map_err(db_err)?;

        let debit = ledger_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            transaction_id: Set(transaction.id),
            account_id: Set(source.id),
            entry_type: Set(sea_orm_active_enums::EntryType::Debit),
            amount: Set(cmd.amount),
            balance_after: Set(source_after),
            created_at: Set(now),
        }
        .insert(txn)
        .await
        .map_err(db_err)?;

        let credit = ledger_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            transaction_id: Set(transaction.id),
            account_id: Set(dest.id),
            entry_type: Set(sea_orm_active_enums::EntryType::Credit),
            amount: Set(cmd.amount),
            balance_after: Set(dest_after),
            created_at: Set(now),
        }
        .insert(txn)
        .await
        .map_err(db_err)?;

        Self::apply_balance(txn, source, source_after, now).await?;
        Self::apply_balance(txn, dest, dest_after, now).await?;

        Ok(TransactionWithEntries {
            transaction,
            entries: vec![debit, credit],
        })
    }

    /// Returns the already-committed transaction for a replayed key, or
    /// `IdempotencyConflict` when the stored transaction disagrees with
    /// the request on amount or type.
    async fn replay_existing(
        txn: &DatabaseTransaction,
        existing: transactions::Model,
        cmd: &DoubleEntryCommand,
    ) -> Result<TransactionWithEntries, LedgerError> {
        let requested: sea_orm_active_enums::TransactionType = cmd.transaction_type.into();
        if existing.amount != cmd.amount || existing.transaction_type != requested {
            return Err(LedgerError::IdempotencyConflict);
        }

        let entries = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::TransactionId.eq(existing.id))
            .order_by_asc(ledger_entries::Column::CreatedAt)
            .all(txn)
            .await
            .map_err(db_err)?;

        Ok(TransactionWithEntries {
            transaction: existing,
            entries,
        })
    }

    async fn apply_balance(
        txn: &DatabaseTransaction,
        account: accounts::Model,
        new_balance: i64,
        now: DateTimeWithTimeZone,
    ) -> Result<(), LedgerError> {
        let version = account.version + 1;

        let mut active: accounts::ActiveModel = account.into();
        active.balance = Set(new_balance);
        active.version = Set(version);
        active.updated_at = Set(now);
        active.update(txn).await.map_err(db_err)?;

        Ok(())
    }

    /// Returns the transactions that touch `account_id`, newest first,
    /// each with its two entries attached.
    ///
    /// The transaction set is resolved through a semi-join on
    /// `ledger_entries`, so a transaction appears once even though both
    /// of its entries could match.
    ///
    /// # Errors
    ///
    /// Returns `Database` on storage failures.
    pub async fn transactions_by_account(
        &self,
        account_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<TransactionWithEntries>, LedgerError> {
        let page = page.clamped();

        let touching = Query::select()
            .column(ledger_entries::Column::TransactionId)
            .distinct()
            .from(ledger_entries::Entity)
            .and_where(ledger_entries::Column::AccountId.eq(account_id))
            .to_owned();

        let txns = transactions::Entity::find()
            .filter(transactions::Column::Id.in_subquery(touching))
            .order_by_desc(transactions::Column::CreatedAt)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        if txns.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = txns.iter().map(|t| t.id).collect();
        let mut entries_by_txn: HashMap<Uuid, Vec<ledger_entries::Model>> = HashMap::new();
        let entries = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::TransactionId.is_in(ids))
            .order_by_asc(ledger_entries::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        for entry in entries {
            entries_by_txn
                .entry(entry.transaction_id)
                .or_default()
                .push(entry);
        }

        Ok(txns
            .into_iter()
            .map(|transaction| {
                let entries = entries_by_txn.remove(&transaction.id).unwrap_or_default();
                TransactionWithEntries {
                    transaction,
                    entries,
                }
            })
            .collect())
    }

    /// Reads the cached and derived balances of one account inside a
    /// single read transaction, so the pair is internally consistent even
    /// against a concurrent mutation.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no row exists, `Database` on storage
    /// failures.
    pub async fn balance_snapshot(&self, account_id: Uuid) -> Result<BalanceSnapshot, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let account = accounts::Entity::find_by_id(account_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        let derived = derived_balance_in(&txn, account_id).await?;

        txn.commit().await.map_err(db_err)?;

        Ok(BalanceSnapshot {
            account_id: account.id,
            cached_balance: account.balance,
            derived_balance: derived,
            currency: account.currency,
        })
    }

    /// Returns every account with its cached and derived balance, from a
    /// single grouped aggregation.
    ///
    /// # Errors
    ///
    /// Returns `Database` on storage failures, `Internal` if a stored
    /// enum value cannot be read back.
    pub async fn accounts_for_reconciliation(
        &self,
    ) -> Result<Vec<AccountReconciliation>, LedgerError> {
        #[derive(Debug, FromQueryResult)]
        struct Row {
            account_id: Uuid,
            account_name: String,
            account_type: String,
            cached_balance: i64,
            derived_balance: i64,
        }

        let rows = Row::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            r"SELECT a.id AS account_id,
                     a.name AS account_name,
                     a.account_type::TEXT AS account_type,
                     a.balance AS cached_balance,
                     (COALESCE(SUM(CASE WHEN le.entry_type = 'CREDIT' THEN le.amount ELSE 0 END), 0)
                      - COALESCE(SUM(CASE WHEN le.entry_type = 'DEBIT' THEN le.amount ELSE 0 END), 0))::BIGINT
                         AS derived_balance
              FROM accounts a
              LEFT JOIN ledger_entries le ON le.account_id = a.id
              GROUP BY a.id, a.name, a.account_type, a.balance
              ORDER BY a.id",
        ))
        .all(&self.db)
        .await
        .map_err(db_err)?;

        rows.into_iter()
            .map(|row| {
                let account_type = row
                    .account_type
                    .parse::<AccountType>()
                    .map_err(LedgerError::Internal)?;
                Ok(AccountReconciliation::new(
                    row.account_id,
                    row.account_name,
                    account_type,
                    row.cached_balance,
                    row.derived_balance,
                ))
            })
            .collect()
    }

    /// Returns the global debit and credit sums over the entry log.
    ///
    /// # Errors
    ///
    /// Returns `Database` on storage failures.
    pub async fn ledger_totals(&self) -> Result<LedgerTotals, LedgerError> {
        #[derive(Debug, FromQueryResult)]
        struct Row {
            total_debits: i64,
            total_credits: i64,
        }

        let row = Row::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            r"SELECT COALESCE(SUM(CASE WHEN entry_type = 'DEBIT' THEN amount ELSE 0 END), 0)::BIGINT
                         AS total_debits,
                     COALESCE(SUM(CASE WHEN entry_type = 'CREDIT' THEN amount ELSE 0 END), 0)::BIGINT
                         AS total_credits
              FROM ledger_entries",
        ))
        .one(&self.db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| LedgerError::Internal("ledger totals query returned no row".to_string()))?;

        Ok(LedgerTotals {
            total_debits: row.total_debits,
            total_credits: row.total_credits,
        })
    }
}

async fn derived_balance_in<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
) -> Result<i64, LedgerError> {
    #[derive(Debug, FromQueryResult)]
    struct Row {
        total_credits: i64,
        total_debits: i64,
    }

    let row = Row::find_by_statement(Statement::from_sql_and_values(
        DbBackend::Postgres,
        r"SELECT COALESCE(SUM(CASE WHEN entry_type = 'CREDIT' THEN amount ELSE 0 END), 0)::BIGINT
                     AS total_credits,
                 COALESCE(SUM(CASE WHEN entry_type = 'DEBIT' THEN amount ELSE 0 END), 0)::BIGINT
                     AS total_debits
          FROM ledger_entries
          WHERE account_id = $1",
        [account_id.into()],
    ))
    .one(conn)
    .await
    .map_err(db_err)?
    .ok_or_else(|| LedgerError::Internal("derived balance query returned no row".to_string()))?;

    Ok(balance::derived_balance(row.total_credits, row.total_debits))
}

fn db_err(err: DbErr) -> LedgerError {
    LedgerError::Database(err.to_string())
}
