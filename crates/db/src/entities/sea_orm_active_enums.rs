//! `SeaORM` Active Enums backed by PostgreSQL enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account classification (`account_type` enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    /// Customer-facing account.
    #[sea_orm(string_value = "USER")]
    User,
    /// The external funding source.
    #[sea_orm(string_value = "SYSTEM")]
    System,
}

/// Product operation that produced a transaction (`transaction_type` enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
pub enum TransactionType {
    /// Funds entering from the external funding source.
    #[sea_orm(string_value = "DEPOSIT")]
    Deposit,
    /// Funds leaving to the external funding source.
    #[sea_orm(string_value = "WITHDRAWAL")]
    Withdrawal,
    /// Funds moving between two user accounts.
    #[sea_orm(string_value = "TRANSFER")]
    Transfer,
}

/// Side of a ledger entry (`entry_type` enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_type")]
pub enum EntryType {
    /// Subtracts from the account.
    #[sea_orm(string_value = "DEBIT")]
    Debit,
    /// Adds to the account.
    #[sea_orm(string_value = "CREDIT")]
    Credit,
}

impl From<tally_core::ledger::AccountType> for AccountType {
    fn from(value: tally_core::ledger::AccountType) -> Self {
        match value {
            tally_core::ledger::AccountType::User => Self::User,
            tally_core::ledger::AccountType::System => Self::System,
        }
    }
}

impl From<AccountType> for tally_core::ledger::AccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::User => Self::User,
            AccountType::System => Self::System,
        }
    }
}

impl From<tally_core::ledger::TransactionType> for TransactionType {
    fn from(value: tally_core::ledger::TransactionType) -> Self {
        match value {
            tally_core::ledger::TransactionType::Deposit => Self::Deposit,
            tally_core::ledger::TransactionType::Withdrawal => Self::Withdrawal,
            tally_core::ledger::TransactionType::Transfer => Self::Transfer,
        }
    }
}

impl From<TransactionType> for tally_core::ledger::TransactionType {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Deposit => Self::Deposit,
            TransactionType::Withdrawal => Self::Withdrawal,
            TransactionType::Transfer => Self::Transfer,
        }
    }
}

impl From<tally_core::ledger::EntryType> for EntryType {
    fn from(value: tally_core::ledger::EntryType) -> Self {
        match value {
            tally_core::ledger::EntryType::Debit => Self::Debit,
            tally_core::ledger::EntryType::Credit => Self::Credit,
        }
    }
}

impl From<EntryType> for tally_core::ledger::EntryType {
    fn from(value: EntryType) -> Self {
        match value {
            EntryType::Debit => Self::Debit,
            EntryType::Credit => Self::Credit,
        }
    }
}
