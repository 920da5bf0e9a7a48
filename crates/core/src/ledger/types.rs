//! Ledger domain types for double-entry commands and read models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The well-known identifier of the single system account
/// (`00000000-0000-0000-0000-000000000001`), the external funding source
/// that acts as counterparty for deposits and withdrawals.
pub const SYSTEM_ACCOUNT_ID: Uuid = Uuid::from_u128(1);

/// Currency assigned to accounts that do not specify one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    /// Customer-facing account. Its balance may never go below zero.
    User,
    /// The external funding source. The only account allowed to hold a
    /// negative balance.
    System,
}

impl AccountType {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::System => "SYSTEM",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "SYSTEM" => Ok(Self::System),
            other => Err(format!("unknown account type: {other}")),
        }
    }
}

/// Product operation that produced a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Funds entering from the external funding source.
    Deposit,
    /// Funds leaving to the external funding source.
    Withdrawal,
    /// Funds moving between two user accounts.
    Transfer,
}

impl TransactionType {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdrawal => "WITHDRAWAL",
            Self::Transfer => "TRANSFER",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEPOSIT" => Ok(Self::Deposit),
            "WITHDRAWAL" => Ok(Self::Withdrawal),
            "TRANSFER" => Ok(Self::Transfer),
            other => Err(format!("unknown transaction type: {other}")),
        }
    }
}

/// Side of a ledger entry.
///
/// A debit subtracts from the subject account, a credit adds to it. Every
/// transaction carries exactly one of each, with equal amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryType {
    /// Subtracts from the account.
    Debit,
    /// Adds to the account.
    Credit,
}

impl EntryType {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "DEBIT",
            Self::Credit => "CREDIT",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully validated double-entry mutation, ready for the ledger engine.
///
/// Commands are built by [`super::service::LedgerService`]; the engine
/// executes them inside a single storage transaction.
#[derive(Debug, Clone)]
pub struct DoubleEntryCommand {
    /// Account debited by the transaction.
    pub source_account_id: Uuid,
    /// Account credited by the transaction.
    pub dest_account_id: Uuid,
    /// Amount in minor currency units. Always positive.
    pub amount: i64,
    /// Expected currency; validated against the source account when present.
    pub currency: Option<String>,
    /// Operation that produced this command.
    pub transaction_type: TransactionType,
    /// Client-chosen key making the mutation at-most-once when present.
    pub idempotency_key: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

impl DoubleEntryCommand {
    /// Returns the two endpoint accounts in global lock order.
    ///
    /// The order is independent of which account is source and which is
    /// destination, which rules out the ABBA deadlock when two transfers
    /// between the same pair race in opposite directions.
    #[must_use]
    pub fn lock_order(&self) -> [Uuid; 2] {
        let mut ids = [self.source_account_id, self.dest_account_id];
        ids.sort_unstable();
        ids
    }
}

/// Input for creating a user account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Human-readable account label.
    pub name: String,
    /// Currency code; defaults to [`DEFAULT_CURRENCY`] when absent.
    pub currency: Option<String>,
}

/// A validated account creation, ready for persistence.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Human-readable account label.
    pub name: String,
    /// Resolved currency code.
    pub currency: String,
}

/// Input for a deposit from the external funding source.
#[derive(Debug, Clone)]
pub struct DepositInput {
    /// Account receiving the funds.
    pub account_id: Uuid,
    /// Amount in minor currency units.
    pub amount: i64,
    /// Expected currency, if the caller wants it checked.
    pub currency: Option<String>,
    /// Idempotency key.
    pub idempotency_key: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

/// Input for a withdrawal to the external funding source.
#[derive(Debug, Clone)]
pub struct WithdrawInput {
    /// Account the funds leave from.
    pub account_id: Uuid,
    /// Amount in minor currency units.
    pub amount: i64,
    /// Expected currency, if the caller wants it checked.
    pub currency: Option<String>,
    /// Idempotency key.
    pub idempotency_key: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

/// Input for a transfer between two user accounts.
#[derive(Debug, Clone)]
pub struct TransferInput {
    /// Account debited.
    pub source_account_id: Uuid,
    /// Account credited.
    pub dest_account_id: Uuid,
    /// Amount in minor currency units.
    pub amount: i64,
    /// Expected currency, if the caller wants it checked.
    pub currency: Option<String>,
    /// Idempotency key.
    pub idempotency_key: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

/// Cached and derived balances read within a single storage transaction.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSnapshot {
    /// The account the snapshot belongs to.
    pub account_id: Uuid,
    /// Balance column on the account row.
    pub cached_balance: i64,
    /// Sum of credits minus debits over the entry log.
    pub derived_balance: i64,
    /// Account currency.
    pub currency: String,
}

impl BalanceSnapshot {
    /// Returns true if the cached balance matches the derived balance.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.cached_balance == self.derived_balance
    }
}

/// Per-account reconciliation result.
#[derive(Debug, Clone, Serialize)]
pub struct AccountReconciliation {
    /// The account id.
    pub account_id: Uuid,
    /// The account name.
    pub account_name: String,
    /// USER or SYSTEM.
    pub account_type: AccountType,
    /// Balance column on the account row.
    pub cached_balance: i64,
    /// Sum of credits minus debits over the entry log.
    pub derived_balance: i64,
    /// Whether the two balances agree.
    pub is_consistent: bool,
}

impl AccountReconciliation {
    /// Creates a reconciliation row, labeling consistency.
    #[must_use]
    pub fn new(
        account_id: Uuid,
        account_name: String,
        account_type: AccountType,
        cached_balance: i64,
        derived_balance: i64,
    ) -> Self {
        Self {
            account_id,
            account_name,
            account_type,
            cached_balance,
            derived_balance,
            is_consistent: cached_balance == derived_balance,
        }
    }
}

/// Global debit and credit sums over the entire entry log.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LedgerTotals {
    /// Sum of all debit amounts.
    pub total_debits: i64,
    /// Sum of all credit amounts.
    pub total_credits: i64,
}

impl LedgerTotals {
    /// Returns true if the ledger is globally balanced.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debits == self.total_credits
    }
}
