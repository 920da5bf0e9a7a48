//! Balance arithmetic in minor currency units.
//!
//! All monetary values are signed 64-bit integers; no floating point
//! anywhere. Arithmetic is checked so that an overflow aborts the
//! surrounding storage transaction instead of wrapping.

use super::types::AccountType;

/// Balance of an account after a debit of `amount` is applied.
///
/// Returns `None` on i64 overflow.
#[must_use]
pub fn balance_after_debit(balance: i64, amount: i64) -> Option<i64> {
    balance.checked_sub(amount)
}

/// Balance of an account after a credit of `amount` is applied.
///
/// Returns `None` on i64 overflow.
#[must_use]
pub fn balance_after_credit(balance: i64, amount: i64) -> Option<i64> {
    balance.checked_add(amount)
}

/// Solvency rule for the debited account.
///
/// USER accounts may not go below zero; draining to exactly zero is
/// allowed. The system account is exempt because it represents net flow
/// to the outside world.
#[must_use]
pub fn has_sufficient_funds(account_type: AccountType, balance: i64, amount: i64) -> bool {
    match account_type {
        AccountType::System => true,
        AccountType::User => balance >= amount,
    }
}

/// Derived balance from entry totals: credits add, debits subtract.
#[must_use]
pub fn derived_balance(total_credits: i64, total_debits: i64) -> i64 {
    total_credits - total_debits
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn amount_strategy() -> impl Strategy<Value = i64> {
        1i64..1_000_000_000
    }

    fn balance_strategy() -> impl Strategy<Value = i64> {
        -1_000_000_000i64..1_000_000_000
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A credit followed by a debit of the same amount restores the
        /// starting balance.
        #[test]
        fn prop_credit_then_debit_round_trips(
            balance in balance_strategy(),
            amount in amount_strategy(),
        ) {
            let credited = balance_after_credit(balance, amount).unwrap();
            let restored = balance_after_debit(credited, amount).unwrap();
            prop_assert_eq!(restored, balance);
        }

        /// A user account is solvent exactly when the balance covers the
        /// amount.
        #[test]
        fn prop_user_solvency_matches_comparison(
            balance in 0i64..1_000_000_000,
            amount in amount_strategy(),
        ) {
            prop_assert_eq!(
                has_sufficient_funds(AccountType::User, balance, amount),
                balance >= amount
            );
        }

        /// The system account is always solvent, even when already negative.
        #[test]
        fn prop_system_always_solvent(
            balance in balance_strategy(),
            amount in amount_strategy(),
        ) {
            prop_assert!(has_sufficient_funds(AccountType::System, balance, amount));
        }

        /// One debit and one credit of the same amount net to zero in the
        /// derived balance.
        #[test]
        fn prop_entry_pair_nets_to_zero(amount in amount_strategy()) {
            prop_assert_eq!(derived_balance(amount, amount), 0);
        }
    }

    #[test]
    fn test_balance_after_debit() {
        assert_eq!(balance_after_debit(10_000, 4_000), Some(6_000));
        assert_eq!(balance_after_debit(0, 4_000), Some(-4_000));
        assert_eq!(balance_after_debit(i64::MIN, 1), None);
    }

    #[test]
    fn test_balance_after_credit() {
        assert_eq!(balance_after_credit(6_000, 4_000), Some(10_000));
        assert_eq!(balance_after_credit(i64::MAX, 1), None);
    }

    #[test]
    fn test_draining_to_zero_is_allowed() {
        assert!(has_sufficient_funds(AccountType::User, 5_000, 5_000));
        assert!(!has_sufficient_funds(AccountType::User, 5_000, 5_001));
    }

    #[test]
    fn test_derived_balance() {
        assert_eq!(derived_balance(10_000, 4_000), 6_000);
        assert_eq!(derived_balance(0, 4_000), -4_000);
    }
}
