//! Precondition validation for ledger operations.
//!
//! These checks are independent of storage state and run before any lock
//! is acquired. Failures produce typed errors and no side effects.

use uuid::Uuid;

use super::error::LedgerError;

/// Maximum length of an account name.
pub const MAX_NAME_LENGTH: usize = 255;
/// Maximum length of a transaction description.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
/// Maximum length of an idempotency key.
pub const MAX_IDEMPOTENCY_KEY_LENGTH: usize = 255;

/// Validates an account name: non-empty, at most 255 characters.
///
/// # Errors
///
/// Returns `InvalidRequest` on violation.
pub fn validate_account_name(name: &str) -> Result<(), LedgerError> {
    if name.is_empty() {
        return Err(LedgerError::InvalidRequest(
            "account name cannot be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(LedgerError::InvalidRequest(format!(
            "account name cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validates a currency code: exactly three ASCII uppercase letters.
///
/// Normalization (trimming, uppercasing) is the outer shell's concern;
/// the core only checks shape.
///
/// # Errors
///
/// Returns `InvalidRequest` on violation.
pub fn validate_currency_code(code: &str) -> Result<(), LedgerError> {
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(LedgerError::InvalidRequest(
            "currency must be a three-letter uppercase code".to_string(),
        ));
    }
    Ok(())
}

/// Validates a monetary amount: strictly positive.
///
/// # Errors
///
/// Returns `InvalidAmount` on violation.
pub fn validate_amount(amount: i64) -> Result<(), LedgerError> {
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount);
    }
    Ok(())
}

/// Validates an account id: the nil UUID never names a real account.
///
/// # Errors
///
/// Returns `InvalidRequest` on violation.
pub fn validate_account_id(id: Uuid) -> Result<(), LedgerError> {
    if id.is_nil() {
        return Err(LedgerError::InvalidRequest(
            "account id cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates an optional description: at most 500 characters.
///
/// # Errors
///
/// Returns `InvalidRequest` on violation.
pub fn validate_description(description: Option<&str>) -> Result<(), LedgerError> {
    if let Some(text) = description {
        if text.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(LedgerError::InvalidRequest(format!(
                "description cannot exceed {MAX_DESCRIPTION_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/// Validates an optional idempotency key: non-empty and at most 255
/// characters when present. Callers that want no idempotency omit the key
/// entirely.
///
/// # Errors
///
/// Returns `InvalidRequest` on violation.
pub fn validate_idempotency_key(key: Option<&str>) -> Result<(), LedgerError> {
    if let Some(key) = key {
        if key.is_empty() {
            return Err(LedgerError::InvalidRequest(
                "idempotency key cannot be empty".to_string(),
            ));
        }
        if key.chars().count() > MAX_IDEMPOTENCY_KEY_LENGTH {
            return Err(LedgerError::InvalidRequest(format!(
                "idempotency key cannot exceed {MAX_IDEMPOTENCY_KEY_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_account_name() {
        assert!(validate_account_name("Alice").is_ok());
        assert!(validate_account_name(&"x".repeat(255)).is_ok());
        assert!(validate_account_name("").is_err());
        assert!(validate_account_name(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_validate_currency_code() {
        assert!(validate_currency_code("USD").is_ok());
        assert!(validate_currency_code("IDR").is_ok());
        assert!(validate_currency_code("usd").is_err());
        assert!(validate_currency_code("US").is_err());
        assert!(validate_currency_code("USDX").is_err());
        assert!(validate_currency_code("U$D").is_err());
        assert!(validate_currency_code("").is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(1).is_ok());
        assert!(validate_amount(10_000).is_ok());
        assert!(matches!(
            validate_amount(0),
            Err(LedgerError::InvalidAmount)
        ));
        assert!(matches!(
            validate_amount(-500),
            Err(LedgerError::InvalidAmount)
        ));
    }

    #[test]
    fn test_validate_account_id() {
        assert!(validate_account_id(Uuid::from_u128(42)).is_ok());
        assert!(validate_account_id(Uuid::nil()).is_err());
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description(None).is_ok());
        assert!(validate_description(Some("monthly rent")).is_ok());
        assert!(validate_description(Some(&"x".repeat(500))).is_ok());
        assert!(validate_description(Some(&"x".repeat(501))).is_err());
    }

    #[test]
    fn test_validate_idempotency_key() {
        assert!(validate_idempotency_key(None).is_ok());
        assert!(validate_idempotency_key(Some("dep-1")).is_ok());
        assert!(validate_idempotency_key(Some("")).is_err());
        assert!(validate_idempotency_key(Some(&"k".repeat(256))).is_err());
    }
}
