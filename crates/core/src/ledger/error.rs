//! Ledger error types.
//!
//! A single sum type covers every domain error the ledger can produce,
//! plus two arms for infrastructure failures. Domain errors travel
//! unchanged from the point of detection to the API boundary, where
//! [`LedgerError::http_status_code`] maps them exactly once.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No account exists for the given id.
    #[error("account not found: {0}")]
    AccountNotFound(Uuid),

    /// A USER source account would go below zero.
    #[error("insufficient funds in account {account_id}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// The source account.
        account_id: Uuid,
        /// Its balance at check time.
        balance: i64,
        /// The requested amount.
        requested: i64,
    },

    /// Endpoint currencies differ, or a supplied currency disagrees with
    /// the source account's currency.
    #[error("currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch {
        /// Currency of the source account.
        expected: String,
        /// Currency that disagreed.
        actual: String,
    },

    /// Source equals destination in a transfer.
    #[error("cannot transfer to the same account")]
    SelfTransfer,

    /// Amount is zero or negative.
    #[error("amount must be greater than zero")]
    InvalidAmount,

    /// The idempotency key was already used with a different amount or
    /// transaction type.
    #[error("idempotency key already used with different parameters")]
    IdempotencyConflict,

    /// A user-level operation targets the system account.
    #[error("operations on the system account are not allowed")]
    SystemAccountForbidden,

    /// A precondition failed before any storage interaction.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A unique constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The storage layer failed.
    #[error("database error: {0}")]
    Database(String),

    /// An invariant the engine relies on was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::SelfTransfer => "SELF_TRANSFER",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::IdempotencyConflict => "IDEMPOTENCY_CONFLICT",
            Self::SystemAccountForbidden => "SYSTEM_ACCOUNT_FORBIDDEN",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InsufficientFunds { .. }
            | Self::CurrencyMismatch { .. }
            | Self::SelfTransfer
            | Self::InvalidAmount
            | Self::SystemAccountForbidden
            | Self::InvalidRequest(_) => 400,

            Self::AccountNotFound(_) => 404,

            Self::IdempotencyConflict | Self::Conflict(_) => 409,

            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns true if this error must not leak detail to callers.
    #[must_use]
    pub const fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::AccountNotFound(Uuid::nil()).error_code(),
            "ACCOUNT_NOT_FOUND"
        );
        assert_eq!(
            LedgerError::InsufficientFunds {
                account_id: Uuid::nil(),
                balance: 5000,
                requested: 10000,
            }
            .error_code(),
            "INSUFFICIENT_FUNDS"
        );
        assert_eq!(
            LedgerError::IdempotencyConflict.error_code(),
            "IDEMPOTENCY_CONFLICT"
        );
        assert_eq!(
            LedgerError::SystemAccountForbidden.error_code(),
            "SYSTEM_ACCOUNT_FORBIDDEN"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::AccountNotFound(Uuid::nil()).http_status_code(), 404);
        assert_eq!(LedgerError::SelfTransfer.http_status_code(), 400);
        assert_eq!(LedgerError::InvalidAmount.http_status_code(), 400);
        assert_eq!(LedgerError::IdempotencyConflict.http_status_code(), 409);
        assert_eq!(
            LedgerError::Conflict("account already exists".to_string()).http_status_code(),
            409
        );
        assert_eq!(
            LedgerError::Database("connection refused".to_string()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_infrastructure_errors_are_flagged() {
        assert!(LedgerError::Database("x".to_string()).is_infrastructure());
        assert!(LedgerError::Internal("x".to_string()).is_infrastructure());
        assert!(!LedgerError::SelfTransfer.is_infrastructure());
        assert!(!LedgerError::AccountNotFound(Uuid::nil()).is_infrastructure());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::CurrencyMismatch {
            expected: "USD".to_string(),
            actual: "EUR".to_string(),
        };
        assert_eq!(err.to_string(), "currency mismatch: expected USD, got EUR");

        let err = LedgerError::InsufficientFunds {
            account_id: Uuid::nil(),
            balance: 5000,
            requested: 10000,
        };
        assert!(err.to_string().contains("balance 5000"));
        assert!(err.to_string().contains("requested 10000"));
    }
}
