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

//! Account management.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use double_entry_ledger::{Account, Money, NewAccount};
//! use rust_decimal_macros::dec;
//!
//! let new = NewAccount::new("1001", "Cash", "asset", "USD");
//! let account = Account::open(new, Utc::now()).unwrap();
//! assert_eq!(account.balance(), &Money::new(dec!(0), "USD"));
//! ```

use crate::base::AccountId;
use crate::error::LedgerError;
use crate::money::Money;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Caller-supplied fields of an account that has not been created yet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewAccount {
    pub id: AccountId,
    pub name: String,
    /// Free-form classification (asset, liability, equity, revenue, expense).
    #[serde(rename = "type")]
    pub account_type: String,
    pub currency: String,
    /// Opening balance. Any zero amount means "no opening balance".
    #[serde(default = "no_opening_balance")]
    pub balance: Money,
}

impl NewAccount {
    /// An account proposal with no opening balance.
    pub fn new(
        id: impl Into<AccountId>,
        name: impl Into<String>,
        account_type: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            account_type: account_type.into(),
            currency: currency.into(),
            balance: no_opening_balance(),
        }
    }

    pub fn with_balance(mut self, balance: Money) -> Self {
        self.balance = balance;
        self
    }
}

/// Placeholder for an omitted opening balance.
fn no_opening_balance() -> Money {
    Money::zero("")
}

/// Ledger account.
///
/// The balance currency always equals the account currency. Both are fixed
/// when the account is opened and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    id: AccountId,
    name: String,
    #[serde(rename = "type")]
    account_type: String,
    currency: String,
    balance: Money,
    #[serde(rename = "datetime")]
    created_at: DateTime<Utc>,
}

impl Account {
    /// Opens an account from a proposal, normalizing the opening balance.
    ///
    /// A zero opening balance is reassigned to the account currency whatever
    /// currency it was tagged with.
    ///
    /// # Errors
    ///
    /// [`LedgerError::CurrencyMismatch`] if a non-zero opening balance is in a
    /// different currency than the account.
    pub fn open(new: NewAccount, created_at: DateTime<Utc>) -> Result<Self, LedgerError> {
        let NewAccount {
            id,
            name,
            account_type,
            currency,
            balance,
        } = new;

        let balance = if balance.is_zero() {
            Money::zero(currency.clone())
        } else if balance.currency != currency {
            return Err(LedgerError::CurrencyMismatch {
                expected: currency,
                found: balance.currency,
            });
        } else {
            balance
        };

        let account = Self {
            id,
            name,
            account_type,
            currency,
            balance,
            created_at,
        };
        account.assert_invariants();
        Ok(account)
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn account_type(&self) -> &str {
        &self.account_type
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn balance(&self) -> &Money {
        &self.balance
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Decreases the balance and returns the new amount.
    ///
    /// Returns `None` and leaves the balance untouched if the result is out of
    /// `Decimal` range.
    #[must_use]
    pub(crate) fn debit(&mut self, amount: Decimal) -> Option<Decimal> {
        let updated = self.balance.amount.checked_sub(amount)?;
        self.balance.amount = updated;
        self.assert_invariants();
        Some(updated)
    }

    /// Increases the balance and returns the new amount, or `None` on overflow.
    #[must_use]
    pub(crate) fn credit(&mut self, amount: Decimal) -> Option<Decimal> {
        let updated = self.balance.amount.checked_add(amount)?;
        self.balance.amount = updated;
        self.assert_invariants();
        Some(updated)
    }

    /// Restores a balance amount captured before a failed transfer.
    pub(crate) fn restore(&mut self, amount: Decimal) {
        self.balance.amount = amount;
        self.assert_invariants();
    }

    fn assert_invariants(&self) {
        debug_assert_eq!(
            self.balance.currency, self.currency,
            "Invariant violated: balance currency differs from account {} currency",
            self.id
        );
    }
}
