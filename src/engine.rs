// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Double-entry ledger engine.
//!
//! The [`Engine`] owns every account and the chronological transaction log.
//! Each transfer debits one account and credits another by the same amount
//! in the same currency, so the per-currency sum of all balances never
//! changes.
//!
//! # Thread Safety
//!
//! Both collections sit behind a single [`RwLock`]. Account creation and
//! transaction recording take the write lock for their whole critical
//! section; balance, history, and audit queries share the read lock. The lock
//! is never held across I/O or `.await`, and the engine never re-enters
//! itself while holding it.

use crate::account::{Account, NewAccount};
use crate::base::AccountId;
use crate::currency::CurrencyValidator;
use crate::error::LedgerError;
use crate::money::Money;
use crate::transaction::{NewTransaction, Transaction};
use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tracing::{error, info, warn};

#[derive(Debug, Default)]
struct LedgerState {
    accounts: HashMap<AccountId, Account>,
    /// Append order is commit order.
    transactions: Vec<Transaction>,
}

/// Running balance total of one currency.
///
/// Positive and negative balances are summed apart, so whether the total
/// overflows does not depend on account iteration order.
#[derive(Debug, Default)]
struct CurrencyTotal {
    positive: Decimal,
    negative: Decimal,
    overflowed: bool,
}

impl CurrencyTotal {
    fn add(&mut self, amount: Decimal) {
        let part = if amount.is_sign_negative() {
            &mut self.negative
        } else {
            &mut self.positive
        };
        match part.checked_add(amount) {
            Some(sum) => *part = sum,
            None => self.overflowed = true,
        }
    }

    /// `None` if either part left the `Decimal` range.
    fn sum(&self) -> Option<Decimal> {
        if self.overflowed {
            return None;
        }
        self.positive.checked_add(self.negative)
    }
}

/// In-memory double-entry bookkeeping engine.
///
/// # Invariants
///
/// - Account identifiers are unique; transaction identifiers are not checked.
/// - An account's balance currency always equals its account currency.
/// - A recorded transaction conserves value: the debit account loses exactly
///   what the credit account gains.
/// - No reader ever observes a half-applied transfer.
pub struct Engine {
    state: RwLock<LedgerState>,
    currencies: Box<dyn CurrencyValidator>,
}

impl Engine {
    /// Creates an empty ledger that checks account currencies with `currencies`.
    pub fn new(currencies: impl CurrencyValidator + 'static) -> Self {
        Engine {
            state: RwLock::new(LedgerState::default()),
            currencies: Box::new(currencies),
        }
    }

    /// Opens a new account.
    ///
    /// The creation timestamp is set to the current UTC time. A zero opening
    /// balance is stored in the account currency regardless of the currency
    /// it was supplied in.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::DuplicateAccount`] - An account with this ID exists.
    /// - [`LedgerError::InvalidCurrency`] - The currency validator rejects the code.
    /// - [`LedgerError::CurrencyMismatch`] - Non-zero opening balance in another currency.
    pub fn create_account(&self, new: NewAccount) -> Result<(), LedgerError> {
        let mut state = self.state.write();

        if state.accounts.contains_key(&new.id) {
            warn!(account_id = %new.id, "account already exists");
            return Err(LedgerError::DuplicateAccount(new.id));
        }

        if !self.currencies.is_valid(&new.currency) {
            warn!(account_id = %new.id, currency = %new.currency, "currency is not valid");
            return Err(LedgerError::InvalidCurrency(new.currency));
        }

        let account = Account::open(new, Utc::now()).inspect_err(|err| {
            warn!(error = %err, "opening balance rejected");
        })?;

        info!(
            account_id = %account.id(),
            currency = account.currency(),
            datetime = %account.created_at(),
            "account created"
        );
        state.accounts.insert(account.id().clone(), account);
        Ok(())
    }

    /// Records a transfer from `debit_account` to `credit_account`.
    ///
    /// Validation, both balance updates, the conservation check, and the log
    /// append happen inside one write-lock critical section.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    ///
    /// - [`LedgerError::AccountNotFound`] - Debit account, then credit account, is unknown.
    /// - [`LedgerError::CurrencyMismatch`] - Transaction currency differs from either account.
    /// - [`LedgerError::InsufficientFunds`] - Debit balance is below the amount.
    /// - [`LedgerError::UnbalancedTransaction`] - Net change was not zero, or a
    ///   balance update left the `Decimal` range; both balances are restored
    ///   before returning.
    pub fn record_transaction(&self, new: NewTransaction) -> Result<(), LedgerError> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        let debit = state.accounts.get(&new.debit_account).ok_or_else(|| {
            warn!(account_id = %new.debit_account, "debit account not found");
            LedgerError::AccountNotFound(new.debit_account.clone())
        })?;
        let credit = state.accounts.get(&new.credit_account).ok_or_else(|| {
            warn!(account_id = %new.credit_account, "credit account not found");
            LedgerError::AccountNotFound(new.credit_account.clone())
        })?;

        for account in [debit, credit] {
            if account.currency() != new.amount.currency {
                warn!(
                    account_id = %account.id(),
                    account_currency = account.currency(),
                    tx_currency = %new.amount.currency,
                    "currency mismatch"
                );
                return Err(LedgerError::CurrencyMismatch {
                    expected: account.currency().to_owned(),
                    found: new.amount.currency.clone(),
                });
            }
        }

        if debit.balance().amount < new.amount.amount {
            warn!(account_id = %new.debit_account, "insufficient funds in debit account");
            return Err(LedgerError::InsufficientFunds(new.debit_account.clone()));
        }

        let amount = new.amount.amount;
        let debit_before = debit.balance().amount;
        let credit_before = credit.balance().amount;

        let applied = Self::account_mut(&mut state.accounts, &new.debit_account)?
            .debit(amount)
            .is_some()
            && Self::account_mut(&mut state.accounts, &new.credit_account)?
                .credit(amount)
                .is_some();

        // Read back only after both updates so a self-transfer nets to zero.
        let debit_after = Self::balance_of(&state.accounts, &new.debit_account)?;
        let credit_after = Self::balance_of(&state.accounts, &new.credit_account)?;
        let net_change = if applied {
            let outflow = debit_before.checked_sub(debit_after);
            let inflow = credit_after.checked_sub(credit_before);
            outflow.zip(inflow).and_then(|(out, inn)| out.checked_sub(inn))
        } else {
            None
        };

        if net_change != Some(Decimal::ZERO) {
            Self::account_mut(&mut state.accounts, &new.debit_account)?.restore(debit_before);
            Self::account_mut(&mut state.accounts, &new.credit_account)?.restore(credit_before);
            // An out-of-range update is reported as the full amount going missing.
            let difference = net_change.unwrap_or(amount);
            error!(
                tx_id = %new.id,
                difference = %difference,
                currency = %new.amount.currency,
                overflow = net_change.is_none(),
                "transaction failed: books could not be balanced"
            );
            return Err(LedgerError::UnbalancedTransaction {
                difference,
                currency: new.amount.currency,
            });
        }

        let transaction = Transaction::commit(new, Utc::now());
        info!(
            tx_id = %transaction.id,
            datetime = %transaction.timestamp,
            "transaction recorded"
        );
        state.transactions.push(transaction);
        Ok(())
    }

    /// Returns a copy of an account's current balance.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AccountNotFound`] if no account has this ID.
    pub fn account_balance(&self, account_id: &AccountId) -> Result<Money, LedgerError> {
        let state = self.state.read();
        state
            .accounts
            .get(account_id)
            .map(|account| account.balance().clone())
            .ok_or_else(|| {
                warn!(account_id = %account_id, "account not found");
                LedgerError::AccountNotFound(account_id.clone())
            })
    }

    /// Returns every transaction in which the account is the debit or credit
    /// party, in commit order.
    ///
    /// Unknown accounts simply have an empty history.
    pub fn transaction_history(&self, account_id: &AccountId) -> Vec<Transaction> {
        let state = self.state.read();
        state
            .transactions
            .iter()
            .filter(|tx| tx.involves(account_id))
            .cloned()
            .collect()
    }

    /// Checks that the balances of each currency sum to exactly zero.
    ///
    /// # Errors
    ///
    /// The first offending currency, in code order, is reported as:
    ///
    /// - [`LedgerError::LedgerUnbalanced`] - Its total is not zero.
    /// - [`LedgerError::LedgerTotalOverflow`] - Its positive or its negative
    ///   balances sum outside the `Decimal` range.
    pub fn verify_ledger_balance(&self) -> Result<(), LedgerError> {
        let unbalanced = {
            let state = self.state.read();
            let mut totals: BTreeMap<&str, CurrencyTotal> = BTreeMap::new();
            for account in state.accounts.values() {
                totals
                    .entry(account.currency())
                    .or_default()
                    .add(account.balance().amount);
            }
            totals
                .into_iter()
                .map(|(currency, total)| (currency, total.sum()))
                .find(|(_, total)| *total != Some(Decimal::ZERO))
                .map(|(currency, total)| (currency.to_owned(), total))
        };

        match unbalanced {
            None => Ok(()),
            Some((currency, Some(total))) => {
                error!(currency = %currency, total = %total, "currency total is unbalanced");
                Err(LedgerError::LedgerUnbalanced { currency, total })
            }
            Some((currency, None)) => {
                error!(currency = %currency, "currency total overflows");
                Err(LedgerError::LedgerTotalOverflow { currency })
            }
        }
    }

    /// Returns a snapshot of an account, or `None` if it does not exist.
    pub fn get_account(&self, account_id: &AccountId) -> Option<Account> {
        self.state.read().accounts.get(account_id).cloned()
    }

    pub fn account_count(&self) -> usize {
        self.state.read().accounts.len()
    }

    pub fn transaction_count(&self) -> usize {
        self.state.read().transactions.len()
    }

    fn balance_of(
        accounts: &HashMap<AccountId, Account>,
        account_id: &AccountId,
    ) -> Result<Decimal, LedgerError> {
        accounts
            .get(account_id)
            .map(|account| account.balance().amount)
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.clone()))
    }

    fn account_mut<'a>(
        accounts: &'a mut HashMap<AccountId, Account>,
        account_id: &AccountId,
    ) -> Result<&'a mut Account, LedgerError> {
        accounts
            .get_mut(account_id)
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.clone()))
    }
}
