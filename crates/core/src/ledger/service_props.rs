//! Property tests for command construction and lock ordering.

use proptest::prelude::*;
use uuid::Uuid;

use super::error::LedgerError;
use super::service::LedgerService;
use super::types::{
    DepositInput, DoubleEntryCommand, TransactionType, TransferInput, WithdrawInput,
    SYSTEM_ACCOUNT_ID,
};

fn uuid_strategy() -> impl Strategy<Value = Uuid> {
    // Offset past the reserved low range so generated ids never collide
    // with the system account.
    (2u128..u128::MAX).prop_map(Uuid::from_u128)
}

fn amount_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000
}

fn command(source: Uuid, dest: Uuid) -> DoubleEntryCommand {
    DoubleEntryCommand {
        source_account_id: source,
        dest_account_id: dest,
        amount: 100,
        currency: None,
        transaction_type: TransactionType::Transfer,
        idempotency_key: None,
        description: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Deposits always debit the system account and credit the target.
    #[test]
    fn prop_deposit_wiring(account in uuid_strategy(), amount in amount_strategy()) {
        let cmd = LedgerService::deposit(DepositInput {
            account_id: account,
            amount,
            currency: None,
            idempotency_key: None,
            description: None,
        })
        .unwrap();

        prop_assert_eq!(cmd.source_account_id, SYSTEM_ACCOUNT_ID);
        prop_assert_eq!(cmd.dest_account_id, account);
        prop_assert_eq!(cmd.amount, amount);
    }

    /// Withdrawals always debit the target and credit the system account.
    #[test]
    fn prop_withdraw_wiring(account in uuid_strategy(), amount in amount_strategy()) {
        let cmd = LedgerService::withdraw(WithdrawInput {
            account_id: account,
            amount,
            currency: None,
            idempotency_key: None,
            description: None,
        })
        .unwrap();

        prop_assert_eq!(cmd.source_account_id, account);
        prop_assert_eq!(cmd.dest_account_id, SYSTEM_ACCOUNT_ID);
    }

    /// Non-positive amounts are rejected for every mutation.
    #[test]
    fn prop_non_positive_amounts_rejected(
        account in uuid_strategy(),
        other in uuid_strategy(),
        amount in -1_000_000i64..=0,
    ) {
        prop_assume!(account != other);

        let deposit = LedgerService::deposit(DepositInput {
            account_id: account,
            amount,
            currency: None,
            idempotency_key: None,
            description: None,
        });
        prop_assert!(matches!(deposit, Err(LedgerError::InvalidAmount)));

        let withdraw = LedgerService::withdraw(WithdrawInput {
            account_id: account,
            amount,
            currency: None,
            idempotency_key: None,
            description: None,
        });
        prop_assert!(matches!(withdraw, Err(LedgerError::InvalidAmount)));

        let transfer = LedgerService::transfer(TransferInput {
            source_account_id: account,
            dest_account_id: other,
            amount,
            currency: None,
            idempotency_key: None,
            description: None,
        });
        prop_assert!(matches!(transfer, Err(LedgerError::InvalidAmount)));
    }

    /// A transfer from an account to itself is always rejected.
    #[test]
    fn prop_self_transfer_rejected(account in uuid_strategy(), amount in amount_strategy()) {
        let result = LedgerService::transfer(TransferInput {
            source_account_id: account,
            dest_account_id: account,
            amount,
            currency: None,
            idempotency_key: None,
            description: None,
        });
        prop_assert!(matches!(result, Err(LedgerError::SelfTransfer)));
    }

    /// The lock order is invariant under swapping source and destination.
    #[test]
    fn prop_lock_order_argument_invariant(a in uuid_strategy(), b in uuid_strategy()) {
        prop_assert_eq!(command(a, b).lock_order(), command(b, a).lock_order());
    }

    /// The lock order is sorted.
    #[test]
    fn prop_lock_order_sorted(a in uuid_strategy(), b in uuid_strategy()) {
        let [first, second] = command(a, b).lock_order();
        prop_assert!(first <= second);
    }

    /// UUID ordering agrees with lexicographic ordering of the canonical
    /// hyphenated form, so the lock order is the global string order the
    /// protocol prescribes.
    #[test]
    fn prop_lock_order_matches_string_order(a in uuid_strategy(), b in uuid_strategy()) {
        let [first, second] = command(a, b).lock_order();
        prop_assert!(first.to_string() <= second.to_string());
    }
}
