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

//! Error types for ledger operations.

use crate::base::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Ledger operation errors.
///
/// Every error is returned synchronously to the caller of the failing
/// operation. None are retried by the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// An account with this identifier already exists
    #[error("account {0} already exists")]
    DuplicateAccount(AccountId),

    /// Currency code rejected by the currency validator
    #[error("invalid currency code: {0}")]
    InvalidCurrency(String),

    /// Balance, account, or transaction currencies disagree
    #[error("currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch { expected: String, found: String },

    /// Referenced account does not exist
    #[error("account {0} does not exist")]
    AccountNotFound(AccountId),

    /// Debit account balance is lower than the transaction amount
    #[error("insufficient funds in debit account {0}")]
    InsufficientFunds(AccountId),

    /// Net change of a transfer was not zero; balances were rolled back
    #[error("transaction failed: books would be unbalanced by {difference} {currency}")]
    UnbalancedTransaction { difference: Decimal, currency: String },

    /// Sum of all balances in a currency is not zero
    #[error("ledger is unbalanced for {currency}: total balance is {total}")]
    LedgerUnbalanced { currency: String, total: Decimal },

    /// Positive or negative balances of a currency sum outside the `Decimal` range
    #[error("ledger is unbalanced for {currency}: total balance overflows")]
    LedgerTotalOverflow { currency: String },
}

impl LedgerError {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateAccount(_) => "DUPLICATE_ACCOUNT",
            Self::InvalidCurrency(_) => "INVALID_CURRENCY",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::InsufficientFunds(_) => "INSUFFICIENT_FUNDS",
            Self::UnbalancedTransaction { .. } => "UNBALANCED_TRANSACTION",
            Self::LedgerUnbalanced { .. } => "LEDGER_UNBALANCED",
            Self::LedgerTotalOverflow { .. } => "LEDGER_TOTAL_OVERFLOW",
        }
    }
}
