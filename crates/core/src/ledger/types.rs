//! Ledger domain types.
//!
//! An [`Account`] owns its transaction log. The balance is kept alongside the
//! log and must equal the sum of the log's amounts after every ledger
//! operation; the only sanctioned exception is an administrative
//! balance override.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use rpbank_shared::types::{AccountId, Currency, Money, TransactionId};

use super::error::LedgerError;
use super::number::AccountNumber;

/// Account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Everyday personal account.
    Personal,
    /// Business account.
    Business,
    /// Placeholder shown on the admin dashboard. Never takes part in transfers.
    AdministrativeView,
}

impl AccountKind {
    /// Returns true if the account may be a transfer source or destination.
    #[must_use]
    pub const fn is_transferable(self) -> bool {
        !matches!(self, Self::AdministrativeView)
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Personal => write!(f, "personal"),
            Self::Business => write!(f, "business"),
            Self::AdministrativeView => write!(f, "administrative_view"),
        }
    }
}

/// Dashboard a list of accounts is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountView {
    /// Personal accounts.
    Personal,
    /// Business accounts.
    Business,
    /// Administrative view accounts.
    Admin,
}

impl AccountView {
    /// Returns true if accounts of `kind` belong on this dashboard.
    #[must_use]
    pub const fn includes(self, kind: AccountKind) -> bool {
        matches!(
            (self, kind),
            (Self::Personal, AccountKind::Personal)
                | (Self::Business, AccountKind::Business)
                | (Self::Admin, AccountKind::AdministrativeView)
        )
    }
}

/// Direction of a transaction, redundant with the sign of its amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money in (`amount > 0`).
    Credit,
    /// Money out (`amount <= 0`).
    Debit,
}

impl TransactionKind {
    /// Kind implied by a signed amount.
    #[must_use]
    pub fn for_amount(amount: Decimal) -> Self {
        if amount > Decimal::ZERO {
            Self::Credit
        } else {
            Self::Debit
        }
    }
}

/// Display-only classification tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionCategory {
    /// Leg of a transfer.
    Transfer,
    /// Administrative adjustment.
    Adjustment,
}

/// One entry of an account's transaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique within the owning account.
    pub id: TransactionId,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Free text, user supplied or generated.
    pub description: String,
    /// Signed amount: positive credits, negative debits.
    pub amount: Decimal,
    /// Credit or debit.
    pub kind: TransactionKind,
    /// Optional classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<TransactionCategory>,
}

impl Transaction {
    /// Creates a transaction whose kind follows the sign of `amount`.
    #[must_use]
    pub fn new(
        id: TransactionId,
        amount: Decimal,
        description: impl Into<String>,
        category: Option<TransactionCategory>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            timestamp,
            description: description.into(),
            amount,
            kind: TransactionKind::for_amount(amount),
            category,
        }
    }

    /// Returns true if `kind` agrees with the sign of `amount`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.kind == TransactionKind::for_amount(self.amount)
    }
}

/// A bank account together with its transaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Immutable identity.
    pub id: AccountId,
    /// Alternate lookup key for transfers, unique within the owner's accounts.
    pub account_number: AccountNumber,
    /// Free text label.
    pub display_name: String,
    /// Current balance.
    pub balance: Decimal,
    /// Currency the balance is held in.
    pub currency: Currency,
    /// Account classification.
    pub kind: AccountKind,
    /// Log, newest first.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Account {
    /// Opens an empty account with a zero balance.
    #[must_use]
    pub fn open(
        display_name: impl Into<String>,
        kind: AccountKind,
        account_number: AccountNumber,
        currency: Currency,
    ) -> Self {
        Self {
            id: AccountId::new(),
            account_number,
            display_name: display_name.into(),
            balance: Decimal::ZERO,
            currency,
            kind,
            transactions: Vec::new(),
        }
    }

    /// Prepends a transaction to the log and applies it to the balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::BalanceOverflow`] if the new balance is out of
    /// range. The account is left untouched.
    pub fn post(&mut self, transaction: Transaction) -> Result<(), LedgerError> {
        self.balance = self
            .balance
            .checked_add(transaction.amount)
            .ok_or(LedgerError::BalanceOverflow { account_id: self.id })?;
        self.transactions.insert(0, transaction);
        Ok(())
    }

    /// Removes a transaction and reverses its effect on the balance.
    ///
    /// Returns `Ok(None)` when the log holds no such id.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::BalanceOverflow`] if reversing the amount puts
    /// the balance out of range. The account is left untouched.
    pub fn remove_transaction(
        &mut self,
        id: &TransactionId,
    ) -> Result<Option<Transaction>, LedgerError> {
        let Some(index) = self.transactions.iter().position(|tx| &tx.id == id) else {
            return Ok(None);
        };
        self.balance = self
            .balance
            .checked_sub(self.transactions[index].amount)
            .ok_or(LedgerError::BalanceOverflow { account_id: self.id })?;
        Ok(Some(self.transactions.remove(index)))
    }

    /// Looks up a transaction in the log.
    #[must_use]
    pub fn transaction(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| &tx.id == id)
    }

    /// Sum of every amount in the log, or `None` if it does not fit a `Decimal`.
    #[must_use]
    pub fn ledger_balance(&self) -> Option<Decimal> {
        self.transactions
            .iter()
            .try_fold(Decimal::ZERO, |sum, tx| sum.checked_add(tx.amount))
    }

    /// Returns true if the balance equals the log sum.
    #[must_use]
    pub fn is_reconciled(&self) -> bool {
        self.ledger_balance() == Some(self.balance)
    }

    /// Balance with its currency.
    #[must_use]
    pub fn balance_money(&self) -> Money {
        Money::new(self.balance, self.currency)
    }
}

/// Where a transfer should go, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Another account of the same user, by id.
    Internal(AccountId),
    /// A literal account number: one of the user's own accounts if it matches,
    /// otherwise an account outside the bank.
    ByNumber(String),
}

/// A destination after resolution against the user's accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedDestination {
    /// One of the user's own accounts.
    InternalAccount(AccountId),
    /// No local account matched; the money leaves the bank.
    Unmatched(String),
}

impl ResolvedDestination {
    /// Returns true for internal transfers.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::InternalAccount(_))
    }
}

/// Parameters of a transfer.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// Account to debit.
    pub from_account_id: AccountId,
    /// Where the money goes.
    pub destination: Destination,
    /// Positive amount to move.
    pub amount: Decimal,
    /// Optional description used on both legs.
    pub description: Option<String>,
}

/// Outcome of a completed transfer.
#[derive(Debug, Clone)]
pub struct TransferReceipt {
    /// Debit posted on the source account.
    pub debit: Transaction,
    /// Credit posted on the destination, for internal transfers only.
    pub credit: Option<Transaction>,
    /// Resolved destination.
    pub destination: ResolvedDestination,
    /// Source balance after the transfer.
    pub source_balance: Decimal,
    /// Destination balance after the transfer, for internal transfers only.
    pub destination_balance: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpbank_shared::types::PostingLeg;
    use rust_decimal_macros::dec;

    fn number() -> AccountNumber {
        AccountNumber::parse("1111 2222 3333 4444").unwrap()
    }

    fn tx(amount: Decimal) -> Transaction {
        Transaction::new(
            TransactionId::single(PostingLeg::Adjustment),
            amount,
            "test",
            None,
            Utc::now(),
        )
    }

    #[test]
    fn test_transaction_kind_follows_sign() {
        assert_eq!(TransactionKind::for_amount(dec!(0.01)), TransactionKind::Credit);
        assert_eq!(TransactionKind::for_amount(dec!(-5)), TransactionKind::Debit);
        assert!(tx(dec!(12)).is_consistent());
        assert_eq!(tx(dec!(-12)).kind, TransactionKind::Debit);
    }

    #[test]
    fn test_post_prepends_and_updates_balance() {
        let mut account = Account::open("Main", AccountKind::Personal, number(), Currency::Eur);
        let first = tx(dec!(100));
        let second = tx(dec!(-40));

        account.post(first.clone()).unwrap();
        account.post(second.clone()).unwrap();

        assert_eq!(account.balance, dec!(60));
        assert_eq!(account.transactions[0], second);
        assert_eq!(account.transactions[1], first);
        assert!(account.is_reconciled());
    }

    #[test]
    fn test_remove_transaction_reverses_amount() {
        let mut account = Account::open("Main", AccountKind::Personal, number(), Currency::Eur);
        let debit = tx(dec!(-40));
        account.post(tx(dec!(100))).unwrap();
        account.post(debit.clone()).unwrap();

        let removed = account.remove_transaction(&debit.id).unwrap().unwrap();

        assert_eq!(removed, debit);
        assert_eq!(account.balance, dec!(100));
        assert_eq!(account.transactions.len(), 1);
        assert!(account.remove_transaction(&debit.id).unwrap().is_none());
    }

    #[test]
    fn test_reconciliation_detects_override() {
        let mut account = Account::open("Main", AccountKind::Business, number(), Currency::Eur);
        account.post(tx(dec!(10))).unwrap();
        account.balance = dec!(500);

        assert!(!account.is_reconciled());
        assert_eq!(account.ledger_balance(), Some(dec!(10)));
    }

    #[test]
    fn test_post_rejects_balance_out_of_range() {
        let mut account = Account::open("Main", AccountKind::Personal, number(), Currency::Eur);
        account.balance = Decimal::MAX;

        let err = account.post(tx(dec!(1))).unwrap_err();

        assert!(matches!(err, LedgerError::BalanceOverflow { account_id } if account_id == account.id));
        assert_eq!(account.balance, Decimal::MAX);
        assert!(account.transactions.is_empty());
    }

    #[test]
    fn test_remove_transaction_rejects_balance_out_of_range() {
        let mut account = Account::open("Main", AccountKind::Personal, number(), Currency::Eur);
        let credit = tx(dec!(5));
        account.post(credit.clone()).unwrap();
        account.balance = Decimal::MIN;

        let err = account.remove_transaction(&credit.id).unwrap_err();

        assert!(matches!(err, LedgerError::BalanceOverflow { .. }));
        assert_eq!(account.balance, Decimal::MIN);
        assert_eq!(account.transactions, vec![credit]);
    }

    #[test]
    fn test_ledger_balance_out_of_range_is_none() {
        let mut account = Account::open("Main", AccountKind::Business, number(), Currency::Eur);
        account.transactions = vec![tx(Decimal::MAX), tx(Decimal::MAX)];

        assert_eq!(account.ledger_balance(), None);
        assert!(!account.is_reconciled());
    }

    #[test]
    fn test_account_view_filters() {
        assert!(AccountView::Personal.includes(AccountKind::Personal));
        assert!(!AccountView::Personal.includes(AccountKind::Business));
        assert!(AccountView::Business.includes(AccountKind::Business));
        assert!(AccountView::Admin.includes(AccountKind::AdministrativeView));
        assert!(!AccountKind::AdministrativeView.is_transferable());
        assert!(AccountKind::Business.is_transferable());
    }

    #[test]
    fn test_account_json_shape() {
        let mut account = Account::open("Main", AccountKind::Personal, number(), Currency::Eur);
        account.post(tx(dec!(25.50))).unwrap();

        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["accountNumber"], "1111 2222 3333 4444");
        assert_eq!(json["displayName"], "Main");
        assert_eq!(json["kind"], "personal");
        assert_eq!(json["currency"], "EUR");
        assert_eq!(json["transactions"][0]["kind"], "credit");

        let back: Account = serde_json::from_value(json).unwrap();
        assert_eq!(back, account);
    }
}
