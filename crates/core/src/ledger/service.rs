//! Ledger service: turns product operations into double-entry commands.
//!
//! This service contains pure business logic with no database
//! dependencies. It validates every precondition that is independent of
//! storage state, then wires the correct source and destination accounts
//! for each of the three product mutations. The resulting
//! [`DoubleEntryCommand`] is executed by the ledger engine.

use super::error::LedgerError;
use super::types::{
    CreateAccountInput, DepositInput, DoubleEntryCommand, NewAccount, TransactionType,
    TransferInput, WithdrawInput, DEFAULT_CURRENCY, SYSTEM_ACCOUNT_ID,
};
use super::validation::{
    validate_account_id, validate_account_name, validate_amount, validate_currency_code,
    validate_description, validate_idempotency_key,
};
use uuid::Uuid;

/// Ledger service for command construction and precondition validation.
pub struct LedgerService;

impl LedgerService {
    /// Validates an account creation request and resolves its currency.
    ///
    /// Caller-supplied ids are never accepted; the engine assigns one at
    /// insert time.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the name or currency is malformed.
    pub fn create_account(input: CreateAccountInput) -> Result<NewAccount, LedgerError> {
        validate_account_name(&input.name)?;

        let currency = match input.currency.as_deref() {
            Some(code) => {
                validate_currency_code(code)?;
                code.to_string()
            }
            None => DEFAULT_CURRENCY.to_string(),
        };

        Ok(NewAccount {
            name: input.name,
            currency,
        })
    }

    /// Builds the command for a deposit from the external funding source.
    ///
    /// # Errors
    ///
    /// Returns `SystemAccountForbidden` if the target is the system
    /// account, `InvalidAmount` for a non-positive amount, or
    /// `InvalidRequest` for malformed fields.
    pub fn deposit(input: DepositInput) -> Result<DoubleEntryCommand, LedgerError> {
        Self::validate_endpoint(input.account_id)?;
        Self::validate_mutation_fields(
            input.amount,
            input.currency.as_deref(),
            input.idempotency_key.as_deref(),
            input.description.as_deref(),
        )?;

        Ok(DoubleEntryCommand {
            source_account_id: SYSTEM_ACCOUNT_ID,
            dest_account_id: input.account_id,
            amount: input.amount,
            currency: input.currency,
            transaction_type: TransactionType::Deposit,
            idempotency_key: input.idempotency_key,
            description: input.description,
        })
    }

    /// Builds the command for a withdrawal to the external funding source.
    ///
    /// # Errors
    ///
    /// Same error set as [`Self::deposit`].
    pub fn withdraw(input: WithdrawInput) -> Result<DoubleEntryCommand, LedgerError> {
        Self::validate_endpoint(input.account_id)?;
        Self::validate_mutation_fields(
            input.amount,
            input.currency.as_deref(),
            input.idempotency_key.as_deref(),
            input.description.as_deref(),
        )?;

        Ok(DoubleEntryCommand {
            source_account_id: input.account_id,
            dest_account_id: SYSTEM_ACCOUNT_ID,
            amount: input.amount,
            currency: input.currency,
            transaction_type: TransactionType::Withdrawal,
            idempotency_key: input.idempotency_key,
            description: input.description,
        })
    }

    /// Builds the command for a transfer between two user accounts.
    ///
    /// # Errors
    ///
    /// Returns `SelfTransfer` when source equals destination,
    /// `SystemAccountForbidden` when either endpoint is the system
    /// account, and otherwise the error set of [`Self::deposit`].
    pub fn transfer(input: TransferInput) -> Result<DoubleEntryCommand, LedgerError> {
        validate_account_id(input.source_account_id)?;
        validate_account_id(input.dest_account_id)?;

        if input.source_account_id == input.dest_account_id {
            return Err(LedgerError::SelfTransfer);
        }
        if input.source_account_id == SYSTEM_ACCOUNT_ID
            || input.dest_account_id == SYSTEM_ACCOUNT_ID
        {
            return Err(LedgerError::SystemAccountForbidden);
        }

        Self::validate_mutation_fields(
            input.amount,
            input.currency.as_deref(),
            input.idempotency_key.as_deref(),
            input.description.as_deref(),
        )?;

        Ok(DoubleEntryCommand {
            source_account_id: input.source_account_id,
            dest_account_id: input.dest_account_id,
            amount: input.amount,
            currency: input.currency,
            transaction_type: TransactionType::Transfer,
            idempotency_key: input.idempotency_key,
            description: input.description,
        })
    }

    fn validate_endpoint(account_id: Uuid) -> Result<(), LedgerError> {
        validate_account_id(account_id)?;
        if account_id == SYSTEM_ACCOUNT_ID {
            return Err(LedgerError::SystemAccountForbidden);
        }
        Ok(())
    }

    fn validate_mutation_fields(
        amount: i64,
        currency: Option<&str>,
        idempotency_key: Option<&str>,
        description: Option<&str>,
    ) -> Result<(), LedgerError> {
        validate_amount(amount)?;
        if let Some(code) = currency {
            validate_currency_code(code)?;
        }
        validate_idempotency_key(idempotency_key)?;
        validate_description(description)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account_id() -> Uuid {
        Uuid::from_u128(0xA11CE)
    }

    fn deposit_input() -> DepositInput {
        DepositInput {
            account_id: account_id(),
            amount: 10_000,
            currency: None,
            idempotency_key: Some("dep-1".to_string()),
            description: Some("test deposit".to_string()),
        }
    }

    #[test]
    fn test_create_account_defaults_currency() {
        let account = LedgerService::create_account(CreateAccountInput {
            name: "Alice".to_string(),
            currency: None,
        })
        .unwrap();

        assert_eq!(account.name, "Alice");
        assert_eq!(account.currency, "USD");
    }

    #[test]
    fn test_create_account_keeps_explicit_currency() {
        let account = LedgerService::create_account(CreateAccountInput {
            name: "Bob".to_string(),
            currency: Some("EUR".to_string()),
        })
        .unwrap();

        assert_eq!(account.currency, "EUR");
    }

    #[test]
    fn test_create_account_rejects_empty_name() {
        let result = LedgerService::create_account(CreateAccountInput {
            name: String::new(),
            currency: None,
        });
        assert!(matches!(result, Err(LedgerError::InvalidRequest(_))));
    }

    #[test]
    fn test_create_account_rejects_malformed_currency() {
        let result = LedgerService::create_account(CreateAccountInput {
            name: "Alice".to_string(),
            currency: Some("usd".to_string()),
        });
        assert!(matches!(result, Err(LedgerError::InvalidRequest(_))));
    }

    #[test]
    fn test_deposit_wires_system_as_source() {
        let cmd = LedgerService::deposit(deposit_input()).unwrap();

        assert_eq!(cmd.source_account_id, SYSTEM_ACCOUNT_ID);
        assert_eq!(cmd.dest_account_id, account_id());
        assert_eq!(cmd.transaction_type, TransactionType::Deposit);
        assert_eq!(cmd.amount, 10_000);
        assert_eq!(cmd.idempotency_key.as_deref(), Some("dep-1"));
    }

    #[test]
    fn test_withdraw_wires_system_as_dest() {
        let cmd = LedgerService::withdraw(WithdrawInput {
            account_id: account_id(),
            amount: 2_500,
            currency: None,
            idempotency_key: Some("wd-1".to_string()),
            description: None,
        })
        .unwrap();

        assert_eq!(cmd.source_account_id, account_id());
        assert_eq!(cmd.dest_account_id, SYSTEM_ACCOUNT_ID);
        assert_eq!(cmd.transaction_type, TransactionType::Withdrawal);
    }

    #[test]
    fn test_deposit_rejects_system_account() {
        let result = LedgerService::deposit(DepositInput {
            account_id: SYSTEM_ACCOUNT_ID,
            ..deposit_input()
        });
        assert!(matches!(result, Err(LedgerError::SystemAccountForbidden)));
    }

    #[test]
    fn test_withdraw_rejects_system_account() {
        let result = LedgerService::withdraw(WithdrawInput {
            account_id: SYSTEM_ACCOUNT_ID,
            amount: 100,
            currency: None,
            idempotency_key: None,
            description: None,
        });
        assert!(matches!(result, Err(LedgerError::SystemAccountForbidden)));
    }

    #[test]
    fn test_deposit_rejects_non_positive_amount() {
        for amount in [0, -1, -10_000] {
            let result = LedgerService::deposit(DepositInput {
                amount,
                ..deposit_input()
            });
            assert!(matches!(result, Err(LedgerError::InvalidAmount)));
        }
    }

    #[test]
    fn test_deposit_rejects_nil_account() {
        let result = LedgerService::deposit(DepositInput {
            account_id: Uuid::nil(),
            ..deposit_input()
        });
        assert!(matches!(result, Err(LedgerError::InvalidRequest(_))));
    }

    #[test]
    fn test_transfer_builds_command() {
        let source = Uuid::from_u128(0xAAAA);
        let dest = Uuid::from_u128(0xBBBB);

        let cmd = LedgerService::transfer(TransferInput {
            source_account_id: source,
            dest_account_id: dest,
            amount: 4_000,
            currency: Some("USD".to_string()),
            idempotency_key: Some("xfr-1".to_string()),
            description: None,
        })
        .unwrap();

        assert_eq!(cmd.source_account_id, source);
        assert_eq!(cmd.dest_account_id, dest);
        assert_eq!(cmd.transaction_type, TransactionType::Transfer);
        assert_eq!(cmd.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn test_transfer_rejects_self_transfer() {
        let id = account_id();
        let result = LedgerService::transfer(TransferInput {
            source_account_id: id,
            dest_account_id: id,
            amount: 100,
            currency: None,
            idempotency_key: None,
            description: None,
        });
        assert!(matches!(result, Err(LedgerError::SelfTransfer)));
    }

    #[test]
    fn test_transfer_rejects_system_account_endpoints() {
        let other = account_id();

        let as_source = LedgerService::transfer(TransferInput {
            source_account_id: SYSTEM_ACCOUNT_ID,
            dest_account_id: other,
            amount: 100,
            currency: None,
            idempotency_key: None,
            description: None,
        });
        assert!(matches!(as_source, Err(LedgerError::SystemAccountForbidden)));

        let as_dest = LedgerService::transfer(TransferInput {
            source_account_id: other,
            dest_account_id: SYSTEM_ACCOUNT_ID,
            amount: 100,
            currency: None,
            idempotency_key: None,
            description: None,
        });
        assert!(matches!(as_dest, Err(LedgerError::SystemAccountForbidden)));
    }

    #[test]
    fn test_empty_idempotency_key_is_rejected() {
        let result = LedgerService::deposit(DepositInput {
            idempotency_key: Some(String::new()),
            ..deposit_input()
        });
        assert!(matches!(result, Err(LedgerError::InvalidRequest(_))));
    }

    #[test]
    fn test_absent_idempotency_key_is_allowed() {
        let cmd = LedgerService::deposit(DepositInput {
            idempotency_key: None,
            ..deposit_input()
        })
        .unwrap();
        assert!(cmd.idempotency_key.is_none());
    }

    #[test]
    fn test_overlong_description_is_rejected() {
        let result = LedgerService::deposit(DepositInput {
            description: Some("x".repeat(501)),
            ..deposit_input()
        });
        assert!(matches!(result, Err(LedgerError::InvalidRequest(_))));
    }
}
