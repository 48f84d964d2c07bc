//! Balance reconciliation.
//!
//! An account is reconciled when its recorded balance equals the sum of its
//! transaction log. Administrative balance overrides break that equality on
//! purpose; this module reports the gap.

use rust_decimal::Decimal;
use serde::Serialize;
use rpbank_shared::types::AccountId;

use super::error::LedgerError;
use super::types::Account;

/// Gap between an account's recorded balance and its log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDrift {
    /// The account.
    pub account_id: AccountId,
    /// Account label at the time of the audit.
    pub display_name: String,
    /// Balance as stored.
    pub recorded_balance: Decimal,
    /// Sum of the transaction log.
    pub ledger_balance: Decimal,
}

impl BalanceDrift {
    /// Measures the drift of one account.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::BalanceOverflow`] if the log does not sum to a
    /// representable amount.
    pub fn measure(account: &Account) -> Result<Self, LedgerError> {
        let ledger_balance = account
            .ledger_balance()
            .ok_or(LedgerError::BalanceOverflow { account_id: account.id })?;
        Ok(Self {
            account_id: account.id,
            display_name: account.display_name.clone(),
            recorded_balance: account.balance,
            ledger_balance,
        })
    }

    /// `recorded - ledger`. Positive when the balance was raised by override.
    ///
    /// `None` when the gap itself is out of range.
    #[must_use]
    pub fn difference(&self) -> Option<Decimal> {
        self.recorded_balance.checked_sub(self.ledger_balance)
    }

    /// Returns true if there is no gap.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.recorded_balance == self.ledger_balance
    }
}

/// Lists every account whose balance disagrees with its log.
///
/// # Errors
///
/// Returns [`LedgerError::BalanceOverflow`] for the first account whose log
/// cannot be summed.
pub fn audit(accounts: &[Account]) -> Result<Vec<BalanceDrift>, LedgerError> {
    let mut report = Vec::new();
    for account in accounts {
        let drift = BalanceDrift::measure(account)?;
        if !drift.is_zero() {
            report.push(drift);
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::number::AccountNumber;
    use crate::ledger::types::{AccountKind, Transaction};
    use chrono::Utc;
    use rpbank_shared::types::{Currency, PostingLeg, TransactionId};
    use rust_decimal_macros::dec;

    fn account(name: &str, number: &str) -> Account {
        Account::open(
            name,
            AccountKind::Personal,
            AccountNumber::parse(number).unwrap(),
            Currency::Eur,
        )
    }

    fn seed(amount: Decimal) -> Transaction {
        Transaction::new(
            TransactionId::single(PostingLeg::Adjustment),
            amount,
            "seed",
            None,
            Utc::now(),
        )
    }

    #[test]
    fn test_drift_difference() {
        let mut acc = account("Main", "1000 1000 1000 1000");
        acc.post(seed(dec!(50))).unwrap();
        acc.balance = dec!(80);

        let drift = BalanceDrift::measure(&acc).unwrap();
        assert_eq!(drift.recorded_balance, dec!(80));
        assert_eq!(drift.ledger_balance, dec!(50));
        assert_eq!(drift.difference(), Some(dec!(30)));
        assert!(!drift.is_zero());
    }

    #[test]
    fn test_audit_reports_only_drifting_accounts() {
        let clean = account("Clean", "1000 1000 1000 1000");
        let mut dirty = account("Dirty", "2000 2000 2000 2000");
        dirty.balance = dec!(-5);

        let report = audit(&[clean, dirty.clone()]).unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report[0].account_id, dirty.id);
        assert_eq!(report[0].difference(), Some(dec!(-5)));
    }

    #[test]
    fn test_drift_at_the_edges_of_the_range() {
        let mut acc = account("Edge", "3000 3000 3000 3000");
        acc.post(seed(Decimal::MIN)).unwrap();
        acc.balance = Decimal::MAX;

        let drift = BalanceDrift::measure(&acc).unwrap();
        assert!(!drift.is_zero());
        assert_eq!(drift.difference(), None);

        acc.transactions.push(seed(Decimal::MIN));
        let err = audit(&[acc]).unwrap_err();
        assert!(matches!(err, LedgerError::BalanceOverflow { .. }));
    }
}
