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

//! # Double-Entry Ledger
//!
//! This library provides an in-memory double-entry bookkeeping engine: a set
//! of accounts, a chronological transaction log, and a background auditor
//! that checks every currency still nets to zero.
//!
//! ## Core Components
//!
//! - [`Engine`]: Owns accounts and transactions, records transfers atomically
//! - [`Account`]: Ledger account with a balance fixed to one currency
//! - [`Transaction`]: Committed transfer from a debit to a credit account
//! - [`Auditor`]: Periodic background balance check
//! - [`LedgerError`]: Error types for ledger operations
//! - [`api`]: axum router exposing the engine over HTTP
//!
//! ## Example
//!
//! ```
//! use double_entry_ledger::{AccountId, CurrencyTable, Engine, Money, NewAccount, NewTransaction};
//! use rust_decimal_macros::dec;
//!
//! let engine = Engine::new(CurrencyTable::common());
//! engine
//!     .create_account(
//!         NewAccount::new("1001", "Cash", "asset", "USD")
//!             .with_balance(Money::new(dec!(500), "USD")),
//!     )
//!     .unwrap();
//! engine
//!     .create_account(
//!         NewAccount::new("3001", "Capital", "equity", "USD")
//!             .with_balance(Money::new(dec!(-500), "USD")),
//!     )
//!     .unwrap();
//!
//! let tx = NewTransaction::new("t1", "1001", "3001", Money::new(dec!(200.00), "USD"));
//! engine.record_transaction(tx).unwrap();
//!
//! let balance = engine.account_balance(&AccountId::from("1001")).unwrap();
//! assert_eq!(balance, Money::new(dec!(300.00), "USD"));
//! assert_eq!(engine.transaction_history(&AccountId::from("3001")).len(), 1);
//! assert!(engine.verify_ledger_balance().is_ok());
//! ```
//!
//! ## Thread Safety
//!
//! The engine guards its state with one reader/writer lock, so it can be
//! shared across threads and tasks behind an `Arc`.

pub mod account;
pub mod api;
mod audit;
mod base;
pub mod config;
pub mod currency;
mod engine;
pub mod error;
pub mod logging;
mod money;
mod transaction;

pub use account::{Account, NewAccount};
pub use audit::{AuditSummary, Auditor, DEFAULT_AUDIT_PERIOD};
pub use base::{AccountId, TransactionId};
pub use currency::{CurrencyTable, CurrencyTableError, CurrencyValidator};
pub use engine::Engine;
pub use error::LedgerError;
pub use money::Money;
pub use transaction::{NewTransaction, Transaction};
