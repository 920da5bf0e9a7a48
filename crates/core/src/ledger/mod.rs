//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger vocabulary:
//! - Domain types for accounts, transactions, and entries
//! - The double-entry command and its lock ordering
//! - Precondition validation for the product operations
//! - Balance arithmetic and the solvency rule
//! - Error types for ledger operations

pub mod balance;
pub mod error;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;

pub use error::LedgerError;
pub use service::LedgerService;
pub use types::{
    AccountReconciliation, AccountType, BalanceSnapshot, CreateAccountInput, DepositInput,
    DoubleEntryCommand, EntryType, LedgerTotals, NewAccount, TransactionType, TransferInput,
    WithdrawInput, DEFAULT_CURRENCY, SYSTEM_ACCOUNT_ID,
};
