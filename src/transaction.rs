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

//! Transactions.
//!
//! A transaction moves an amount from its debit account to its credit account.
//! Once committed it is immutable; corrections are recorded as new transactions.

use crate::base::{AccountId, TransactionId};
use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller-supplied fields of a transfer that has not been recorded yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub id: TransactionId,
    #[serde(default)]
    pub description: String,
    pub debit_account: AccountId,
    pub credit_account: AccountId,
    pub amount: Money,
}

impl NewTransaction {
    pub fn new(
        id: impl Into<TransactionId>,
        debit_account: impl Into<AccountId>,
        credit_account: impl Into<AccountId>,
        amount: Money,
    ) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            debit_account: debit_account.into(),
            credit_account: credit_account.into(),
            amount,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A committed transaction as stored in the ledger log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Commit time, assigned by the engine.
    #[serde(rename = "datetime")]
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub debit_account: AccountId,
    pub credit_account: AccountId,
    pub amount: Money,
}

impl Transaction {
    pub(crate) fn commit(new: NewTransaction, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: new.id,
            timestamp,
            description: new.description,
            debit_account: new.debit_account,
            credit_account: new.credit_account,
            amount: new.amount,
        }
    }

    /// Returns `true` if `account` is the debit or credit party.
    pub fn involves(&self, account: &AccountId) -> bool {
        &self.debit_account == account || &self.credit_account == account
    }
}
