//! The ledger engine.
//!
//! Owns every mutation of account collections: opening accounts, transfers
//! and administrative corrections. Each operation validates first, then
//! mutates a loaded copy, then saves it in one write, all while holding the
//! user's lock. A rejected operation never reaches `save`.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};
use rpbank_shared::config::BankConfig;
use rpbank_shared::types::{AccountId, Currency, PostingLeg, TransactionId, UserId};

use super::balance::{self, BalanceDrift};
use super::error::LedgerError;
use super::locks::UserLocks;
use super::number::AccountNumber;
use super::types::{
    Account, AccountKind, AccountView, ResolvedDestination, Transaction, TransactionCategory,
    TransferReceipt, TransferRequest,
};
use super::validation::{
    check_funds, find_source, normalize_display_name, resolve_destination,
    validate_adjustment_amount, validate_transfer_amount,
};
use crate::auth::Actor;
use crate::store::AccountStore;

/// Draws before a colliding account number is accepted as is.
const MAX_NUMBER_ATTEMPTS: usize = 32;

const ADJUSTMENT_DESCRIPTION: &str = "Balance adjustment";

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Currency every new account is held in.
    pub currency: Currency,
    /// Whether unmatched account numbers are debited as money leaving the bank.
    pub allow_external_transfers: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            currency: Currency::Eur,
            allow_external_transfers: true,
        }
    }
}

impl From<&BankConfig> for LedgerConfig {
    fn from(config: &BankConfig) -> Self {
        Self {
            currency: config.currency,
            allow_external_transfers: config.allow_external_transfers,
        }
    }
}

/// Executes ledger operations against an [`AccountStore`].
#[derive(Clone)]
pub struct LedgerEngine {
    store: Arc<dyn AccountStore>,
    locks: UserLocks,
    config: LedgerConfig,
}

impl std::fmt::Debug for LedgerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LedgerEngine {
    /// Creates an engine over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn AccountStore>, config: LedgerConfig) -> Self {
        Self {
            store,
            locks: UserLocks::new(),
            config,
        }
    }

    /// Returns the engine settings.
    #[must_use]
    pub const fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ========== Reads ==========

    /// Lists a user's accounts, optionally only those of one dashboard view.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] if the store fails.
    pub async fn list_accounts(
        &self,
        user_id: UserId,
        view: Option<AccountView>,
    ) -> Result<Vec<Account>, LedgerError> {
        let accounts = self.store.load(user_id).await?;
        Ok(match view {
            Some(view) => accounts
                .into_iter()
                .filter(|acc| view.includes(acc.kind))
                .collect(),
            None => accounts,
        })
    }

    /// Fetches one account.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AccountNotFound`] if the user has no such account.
    pub async fn get_account(
        &self,
        user_id: UserId,
        account_id: AccountId,
    ) -> Result<Account, LedgerError> {
        self.store
            .load(user_id)
            .await?
            .into_iter()
            .find(|acc| acc.id == account_id)
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    /// Accounts that may be debited by a transfer.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Store`] if the store fails.
    pub async fn transfer_sources(&self, user_id: UserId) -> Result<Vec<Account>, LedgerError> {
        let accounts = self.store.load(user_id).await?;
        Ok(accounts
            .into_iter()
            .filter(|acc| acc.kind.is_transferable())
            .collect())
    }

    /// Reports every account of the user whose balance disagrees with its log.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::BalanceOverflow`] if a log does not sum to a representable amount
    /// - [`LedgerError::Store`] if the store fails
    pub async fn audit(&self, user_id: UserId) -> Result<Vec<BalanceDrift>, LedgerError> {
        let accounts = self.store.load(user_id).await?;
        balance::audit(&accounts)
    }

    // ========== Account lifecycle ==========

    /// Opens a new empty account.
    ///
    /// The account number is redrawn while it collides with one of the user's
    /// existing numbers.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidDisplayName`] for blank names
    /// - [`LedgerError::Store`] if the store fails
    #[instrument(skip_all, fields(user_id = %user_id, kind = %kind))]
    pub async fn open_account(
        &self,
        user_id: UserId,
        display_name: &str,
        kind: AccountKind,
    ) -> Result<Account, LedgerError> {
        let display_name = normalize_display_name(display_name)?;

        let _guard = self.locks.acquire(user_id).await;
        let mut accounts = self.store.load(user_id).await?;

        let account = Account::open(
            display_name,
            kind,
            unused_number(&accounts),
            self.config.currency,
        );
        accounts.push(account.clone());
        self.store.save(user_id, accounts).await?;

        info!(account_id = %account.id, kind = %account.kind, "Account opened");
        Ok(account)
    }

    /// Changes an account's display name.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidDisplayName`] for blank names
    /// - [`LedgerError::AccountNotFound`] if the user has no such account
    /// - [`LedgerError::Store`] if the store fails
    #[instrument(skip_all, fields(user_id = %user_id, account_id = %account_id))]
    pub async fn rename_account(
        &self,
        user_id: UserId,
        account_id: AccountId,
        display_name: &str,
    ) -> Result<Account, LedgerError> {
        let display_name = normalize_display_name(display_name)?;

        let _guard = self.locks.acquire(user_id).await;
        let mut accounts = self.store.load(user_id).await?;
        let idx = account_index(&accounts, account_id)?;

        accounts[idx].display_name = display_name;
        let account = accounts[idx].clone();
        self.store.save(user_id, accounts).await?;

        info!("Account renamed");
        Ok(account)
    }

    // ========== Transfers ==========

    /// Moves money out of one of the user's accounts.
    ///
    /// Checks run in order: amount, source, funds, destination. An internal
    /// destination receives a matching credit; an unmatched account number
    /// only produces the debit.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] unless `amount > 0`
    /// - [`LedgerError::SourceNotFound`] if the source is not a transferable
    ///   account of the user
    /// - [`LedgerError::InsufficientFunds`] if the source balance is too low
    /// - [`LedgerError::DestinationUnresolvable`] or [`LedgerError::SameAccount`]
    ///   from destination resolution
    /// - [`LedgerError::BalanceOverflow`] if a balance would leave the representable range
    /// - [`LedgerError::Store`] if the store fails
    #[instrument(
        skip_all,
        fields(user_id = %user_id, from = %request.from_account_id, amount = %request.amount)
    )]
    pub async fn transfer(
        &self,
        user_id: UserId,
        request: TransferRequest,
    ) -> Result<TransferReceipt, LedgerError> {
        self.execute_transfer(user_id, request)
            .await
            .inspect(|receipt| {
                info!(
                    debit = %receipt.debit.id,
                    internal = receipt.destination.is_internal(),
                    "Transfer completed"
                );
            })
            .inspect_err(|e| warn!(error = %e, "Transfer rejected"))
    }

    async fn execute_transfer(
        &self,
        user_id: UserId,
        request: TransferRequest,
    ) -> Result<TransferReceipt, LedgerError> {
        let amount = request.amount;
        validate_transfer_amount(amount)?;

        let _guard = self.locks.acquire(user_id).await;
        let mut accounts = self.store.load(user_id).await?;

        let source_idx = find_source(&accounts, request.from_account_id)?;
        check_funds(&accounts[source_idx], amount)?;
        let destination = resolve_destination(
            &accounts,
            request.from_account_id,
            &request.destination,
            self.config.allow_external_transfers,
        )?;

        let explicit = request
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        let now = Utc::now();

        let receipt = match &destination {
            ResolvedDestination::InternalAccount(dest_id) => {
                let dest_idx = accounts
                    .iter()
                    .position(|acc| acc.id == *dest_id)
                    .ok_or_else(|| LedgerError::DestinationUnresolvable(dest_id.to_string()))?;
                let source_name = accounts[source_idx].display_name.clone();
                let dest_name = accounts[dest_idx].display_name.clone();
                let (out_id, in_id) = TransactionId::transfer_pair();

                let debit = Transaction::new(
                    out_id,
                    -amount,
                    explicit
                        .clone()
                        .unwrap_or_else(|| format!("Transfer to {dest_name}")),
                    Some(TransactionCategory::Transfer),
                    now,
                );
                let credit = Transaction::new(
                    in_id,
                    amount,
                    explicit.unwrap_or_else(|| format!("Transfer from {source_name}")),
                    Some(TransactionCategory::Transfer),
                    now,
                );

                accounts[source_idx].post(debit.clone())?;
                accounts[dest_idx].post(credit.clone())?;

                TransferReceipt {
                    debit,
                    credit: Some(credit),
                    destination: destination.clone(),
                    source_balance: accounts[source_idx].balance,
                    destination_balance: Some(accounts[dest_idx].balance),
                }
            }
            ResolvedDestination::Unmatched(number) => {
                let debit = Transaction::new(
                    TransactionId::single(PostingLeg::Outgoing),
                    -amount,
                    explicit.unwrap_or_else(|| format!("External transfer to {number}")),
                    Some(TransactionCategory::Transfer),
                    now,
                );
                accounts[source_idx].post(debit.clone())?;

                TransferReceipt {
                    debit,
                    credit: None,
                    destination: destination.clone(),
                    source_balance: accounts[source_idx].balance,
                    destination_balance: None,
                }
            }
        };

        self.store.save(user_id, accounts).await?;
        Ok(receipt)
    }

    // ========== Administrative corrections ==========

    /// Overwrites an account balance without touching its log.
    ///
    /// The account stays out of reconciliation until [`Self::reconcile`] runs
    /// or the offending entries are edited.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] unless `actor` is an administrator
    /// - [`LedgerError::AccountNotFound`] if the user has no such account
    /// - [`LedgerError::Store`] if the store fails
    #[instrument(skip_all, fields(actor = %actor.user_id, user_id = %user_id, account_id = %account_id))]
    pub async fn set_balance(
        &self,
        actor: Actor,
        user_id: UserId,
        account_id: AccountId,
        new_balance: Decimal,
    ) -> Result<Account, LedgerError> {
        authorize(actor)?;

        let _guard = self.locks.acquire(user_id).await;
        let mut accounts = self.store.load(user_id).await?;
        let idx = account_index(&accounts, account_id)?;

        let previous = accounts[idx].balance;
        accounts[idx].balance = new_balance;
        let account = accounts[idx].clone();
        self.store.save(user_id, accounts).await?;

        warn!(%previous, %new_balance, "Balance overridden without a transaction");
        Ok(account)
    }

    /// Deletes an account and its log.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] unless `actor` is an administrator
    /// - [`LedgerError::AccountNotFound`] if the user has no such account
    /// - [`LedgerError::Store`] if the store fails
    #[instrument(skip_all, fields(actor = %actor.user_id, user_id = %user_id, account_id = %account_id))]
    pub async fn delete_account(
        &self,
        actor: Actor,
        user_id: UserId,
        account_id: AccountId,
    ) -> Result<Account, LedgerError> {
        authorize(actor)?;

        let _guard = self.locks.acquire(user_id).await;
        let mut accounts = self.store.load(user_id).await?;
        let idx = account_index(&accounts, account_id)?;

        let removed = accounts.remove(idx);
        self.store.save(user_id, accounts).await?;

        info!(transactions = removed.transactions.len(), "Account deleted");
        Ok(removed)
    }

    /// Deletes one transaction and subtracts its amount from the balance.
    ///
    /// The other half of an internal transfer is left as is.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] unless `actor` is an administrator
    /// - [`LedgerError::AccountNotFound`] if the user has no such account
    /// - [`LedgerError::TransactionNotFound`] if the log has no such entry
    /// - [`LedgerError::BalanceOverflow`] if a balance would leave the representable range
    /// - [`LedgerError::Store`] if the store fails
    #[instrument(skip_all, fields(actor = %actor.user_id, user_id = %user_id, account_id = %account_id))]
    pub async fn delete_transaction(
        &self,
        actor: Actor,
        user_id: UserId,
        account_id: AccountId,
        transaction_id: &TransactionId,
    ) -> Result<Transaction, LedgerError> {
        authorize(actor)?;

        let _guard = self.locks.acquire(user_id).await;
        let mut accounts = self.store.load(user_id).await?;
        let idx = account_index(&accounts, account_id)?;

        let removed = accounts[idx]
            .remove_transaction(transaction_id)?
            .ok_or_else(|| LedgerError::TransactionNotFound {
                account_id,
                transaction_id: transaction_id.clone(),
            })?;
        let balance = accounts[idx].balance;
        self.store.save(user_id, accounts).await?;

        info!(transaction_id = %removed.id, %balance, "Transaction deleted");
        Ok(removed)
    }

    /// Posts a signed adjustment entry and moves the balance with it.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] unless `actor` is an administrator
    /// - [`LedgerError::InvalidAmount`] for a zero amount
    /// - [`LedgerError::AccountNotFound`] if the user has no such account
    /// - [`LedgerError::BalanceOverflow`] if a balance would leave the representable range
    /// - [`LedgerError::Store`] if the store fails
    #[instrument(skip_all, fields(actor = %actor.user_id, user_id = %user_id, account_id = %account_id))]
    pub async fn post_adjustment(
        &self,
        actor: Actor,
        user_id: UserId,
        account_id: AccountId,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<Transaction, LedgerError> {
        authorize(actor)?;
        validate_adjustment_amount(amount)?;

        let _guard = self.locks.acquire(user_id).await;
        let mut accounts = self.store.load(user_id).await?;
        let idx = account_index(&accounts, account_id)?;

        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| ADJUSTMENT_DESCRIPTION.to_string());
        let entry = Transaction::new(
            TransactionId::single(PostingLeg::Adjustment),
            amount,
            description,
            Some(TransactionCategory::Adjustment),
            Utc::now(),
        );
        accounts[idx].post(entry.clone())?;
        self.store.save(user_id, accounts).await?;

        info!(transaction_id = %entry.id, %amount, "Adjustment posted");
        Ok(entry)
    }

    /// Resets an account's balance to the sum of its log.
    ///
    /// Returns the drift measured before the reset. Nothing is written when
    /// the account is already reconciled.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] unless `actor` is an administrator
    /// - [`LedgerError::AccountNotFound`] if the user has no such account
    /// - [`LedgerError::BalanceOverflow`] if a balance would leave the representable range
    /// - [`LedgerError::Store`] if the store fails
    #[instrument(skip_all, fields(actor = %actor.user_id, user_id = %user_id, account_id = %account_id))]
    pub async fn reconcile(
        &self,
        actor: Actor,
        user_id: UserId,
        account_id: AccountId,
    ) -> Result<BalanceDrift, LedgerError> {
        authorize(actor)?;

        let _guard = self.locks.acquire(user_id).await;
        let mut accounts = self.store.load(user_id).await?;
        let idx = account_index(&accounts, account_id)?;

        let drift = BalanceDrift::measure(&accounts[idx])?;
        if drift.is_zero() {
            return Ok(drift);
        }

        accounts[idx].balance = drift.ledger_balance;
        self.store.save(user_id, accounts).await?;

        warn!(difference = ?drift.difference(), "Balance reconciled with log");
        Ok(drift)
    }
}

fn authorize(actor: Actor) -> Result<(), LedgerError> {
    if actor.is_administrator() {
        Ok(())
    } else {
        warn!(user_id = %actor.user_id, "Administrative operation refused");
        Err(LedgerError::Unauthorized {
            user_id: actor.user_id,
        })
    }
}

fn account_index(accounts: &[Account], account_id: AccountId) -> Result<usize, LedgerError> {
    accounts
        .iter()
        .position(|acc| acc.id == account_id)
        .ok_or(LedgerError::AccountNotFound(account_id))
}

/// Draws a number not yet used by `accounts`.
///
/// After [`MAX_NUMBER_ATTEMPTS`] collisions the last draw is kept; numbers are
/// a lookup aid, not an identity.
fn unused_number(accounts: &[Account]) -> AccountNumber {
    let mut rng = rand::rng();
    draw_unused(&mut rng, accounts)
}

fn draw_unused<R: Rng>(rng: &mut R, accounts: &[Account]) -> AccountNumber {
    let mut number = AccountNumber::random(rng);
    for _ in 1..MAX_NUMBER_ATTEMPTS {
        if !accounts.iter().any(|acc| acc.account_number == number) {
            break;
        }
        number = AccountNumber::random(rng);
    }
    number
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_draw_unused_skips_taken_numbers() {
        let mut seeded = StdRng::seed_from_u64(42);
        let taken = AccountNumber::random(&mut seeded);
        let existing = vec![Account::open(
            "Existing",
            AccountKind::Personal,
            taken.clone(),
            Currency::Eur,
        )];

        // Same seed: the first draw collides, the second must not.
        let mut rng = StdRng::seed_from_u64(42);
        let number = draw_unused(&mut rng, &existing);

        assert_ne!(number, taken);
    }

    #[test]
    fn test_ledger_config_from_bank_config() {
        let bank = BankConfig {
            currency: Currency::Gbp,
            allow_external_transfers: false,
        };
        let config = LedgerConfig::from(&bank);
        assert_eq!(config.currency, Currency::Gbp);
        assert!(!config.allow_external_transfers);
        assert!(LedgerConfig::default().allow_external_transfers);
    }
}
