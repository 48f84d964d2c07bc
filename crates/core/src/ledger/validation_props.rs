//! Property-based tests for ledger validation rules.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rpbank_shared::types::{AccountId, Currency};

use super::error::LedgerError;
use super::number::AccountNumber;
use super::types::{Account, AccountKind, Destination, ResolvedDestination};
use super::validation::{
    check_funds, resolve_destination, validate_adjustment_amount, validate_transfer_amount,
};

/// Strategy to generate a positive amount (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a zero or negative amount.
fn non_positive_amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

/// Strategy to generate sixteen digit strings.
fn digits() -> impl Strategy<Value = String> {
    "[0-9]{16}"
}

fn account_with(number: &AccountNumber, balance: Decimal) -> Account {
    let mut acc = Account::open("Prop", AccountKind::Personal, number.clone(), Currency::Eur);
    acc.balance = balance;
    acc
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Zero and negative transfer amounts are always rejected.
    #[test]
    fn prop_non_positive_transfer_rejected(value in non_positive_amount()) {
        let result = validate_transfer_amount(value);
        prop_assert!(
            matches!(result, Err(LedgerError::InvalidAmount(v)) if v == value),
            "expected InvalidAmount, got {:?}",
            result
        );
    }

    /// Positive amounts pass and adjustments accept either sign.
    #[test]
    fn prop_nonzero_amounts_accepted(value in positive_amount()) {
        prop_assert!(validate_transfer_amount(value).is_ok());
        prop_assert!(validate_adjustment_amount(value).is_ok());
        prop_assert!(validate_adjustment_amount(-value).is_ok());
    }

    /// A balance covers exactly the amounts up to itself.
    #[test]
    fn prop_funds_check_matches_comparison(
        balance in positive_amount(),
        requested in positive_amount(),
    ) {
        let number = AccountNumber::parse("1234 5678 1234 5678").unwrap();
        let acc = account_with(&number, balance);
        prop_assert_eq!(check_funds(&acc, requested).is_ok(), requested <= balance);
    }

    /// Any sixteen digits parse and re-render in four groups.
    #[test]
    fn prop_account_number_canonical_form(raw in digits()) {
        let number = AccountNumber::parse(&raw).unwrap();
        prop_assert_eq!(number.as_str().replace(' ', ""), raw.clone());
        prop_assert_eq!(number.as_str().len(), 19);
        prop_assert!(number.matches(&raw));
    }

    /// Numbers match a local account however they are spaced; unknown numbers
    /// fall through to an external destination.
    #[test]
    fn prop_number_resolution(local in digits(), other in digits()) {
        prop_assume!(local != other);

        let source = account_with(&AccountNumber::parse("0000 0000 0000 0001").unwrap(), Decimal::ZERO);
        let target = account_with(&AccountNumber::parse(&local).unwrap(), Decimal::ZERO);
        let target_id = target.id;
        prop_assume!(source.account_number != target.account_number);
        let accounts = vec![source.clone(), target];

        let resolved = resolve_destination(
            &accounts,
            source.id,
            &Destination::ByNumber(local.clone()),
            true,
        );
        prop_assert_eq!(resolved.unwrap(), ResolvedDestination::InternalAccount(target_id));

        prop_assume!(other != source.account_number.as_str().replace(' ', ""));
        let external = resolve_destination(
            &accounts,
            source.id,
            &Destination::ByNumber(other.clone()),
            true,
        );
        prop_assert_eq!(external.unwrap(), ResolvedDestination::Unmatched(other));

        let unknown_id = resolve_destination(
            &accounts,
            source.id,
            &Destination::Internal(AccountId::new()),
            true,
        );
        prop_assert!(matches!(unknown_id, Err(LedgerError::DestinationUnresolvable(_))), "unexpected {:?}", unknown_id);
    }
}
