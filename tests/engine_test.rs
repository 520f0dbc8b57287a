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

//! Engine public API integration tests.

use double_entry_ledger::{
    AccountId, CurrencyTable, Engine, LedgerError, Money, NewAccount, NewTransaction,
    TransactionId,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn usd(amount: Decimal) -> Money {
    Money::new(amount, "USD")
}

fn engine() -> Engine {
    Engine::new(CurrencyTable::common())
}

fn open(engine: &Engine, id: &str, account_type: &str, balance: Money) {
    let currency = balance.currency.clone();
    engine
        .create_account(NewAccount::new(id, id, account_type, currency).with_balance(balance))
        .unwrap();
}

fn transfer(id: &str, debit: &str, credit: &str, amount: Money) -> NewTransaction {
    NewTransaction::new(id, debit, credit, amount)
}

fn balance(engine: &Engine, id: &str) -> Money {
    engine.account_balance(&AccountId::from(id)).unwrap()
}

// === Transfers ===

#[test]
fn transfer_moves_value_from_debit_to_credit() {
    let engine = engine();
    open(&engine, "A", "asset", usd(dec!(1000)));
    open(&engine, "B", "asset", usd(dec!(1000)));

    engine
        .record_transaction(transfer("t1", "A", "B", usd(dec!(250.25))))
        .unwrap();

    assert_eq!(balance(&engine, "A"), usd(dec!(749.75)));
    assert_eq!(balance(&engine, "B"), usd(dec!(1250.25)));
}

#[test]
fn end_to_end_zero_balance_accounts() {
    let engine = engine();
    open(&engine, "1001", "asset", usd(dec!(0)));
    open(&engine, "2001", "liability", usd(dec!(0)));

    // A zero-balance debit account cannot fund a positive transfer.
    let result = engine.record_transaction(transfer("t1", "1001", "2001", usd(dec!(500.00))));
    assert_eq!(
        result,
        Err(LedgerError::InsufficientFunds(AccountId::from("1001")))
    );
    assert!(engine.transaction_history(&AccountId::from("1001")).is_empty());
}

#[test]
fn end_to_end_debit_reduces_and_credit_increases() {
    let engine = engine();
    open(&engine, "1001", "asset", usd(dec!(500.00)));
    open(&engine, "2001", "liability", usd(dec!(-500.00)));

    engine
        .record_transaction(
            transfer("t1", "1001", "2001", usd(dec!(500.00))).with_description("repay loan"),
        )
        .unwrap();

    assert_eq!(balance(&engine, "1001"), usd(dec!(0.00)));
    assert_eq!(balance(&engine, "2001"), usd(dec!(0.00)));

    let history = engine.transaction_history(&AccountId::from("1001"));
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, TransactionId::from("t1"));
    assert_eq!(history[0].description, "repay loan");
    assert!(engine.verify_ledger_balance().is_ok());
}

#[test]
fn debit_account_checked_before_credit_account() {
    let engine = engine();

    let result = engine.record_transaction(transfer("t1", "missing-d", "missing-c", usd(dec!(1))));
    assert_eq!(
        result,
        Err(LedgerError::AccountNotFound(AccountId::from("missing-d")))
    );

    open(&engine, "A", "asset", usd(dec!(10)));
    let result = engine.record_transaction(transfer("t2", "A", "missing-c", usd(dec!(1))));
    assert_eq!(
        result,
        Err(LedgerError::AccountNotFound(AccountId::from("missing-c")))
    );
    assert_eq!(balance(&engine, "A"), usd(dec!(10)));
}

#[test]
fn currency_mismatch_with_either_account() {
    let engine = engine();
    open(&engine, "usd", "asset", usd(dec!(100)));
    open(&engine, "usd2", "asset", usd(dec!(100)));
    open(&engine, "eur", "asset", Money::new(dec!(100), "EUR"));

    let result =
        engine.record_transaction(transfer("t1", "usd", "usd2", Money::new(dec!(1), "EUR")));
    assert_eq!(
        result,
        Err(LedgerError::CurrencyMismatch {
            expected: "USD".into(),
            found: "EUR".into()
        })
    );

    let result = engine.record_transaction(transfer("t2", "usd", "eur", usd(dec!(1))));
    assert_eq!(
        result,
        Err(LedgerError::CurrencyMismatch {
            expected: "EUR".into(),
            found: "USD".into()
        })
    );

    assert_eq!(balance(&engine, "usd"), usd(dec!(100)));
    assert_eq!(balance(&engine, "eur"), Money::new(dec!(100), "EUR"));
    assert_eq!(engine.transaction_count(), 0);
}

#[test]
fn currency_mismatch_reported_before_insufficient_funds() {
    let engine = engine();
    open(&engine, "A", "asset", usd(dec!(0)));
    open(&engine, "B", "asset", usd(dec!(0)));

    let result = engine.record_transaction(transfer("t1", "A", "B", Money::new(dec!(5), "GBP")));
    assert!(matches!(result, Err(LedgerError::CurrencyMismatch { .. })));
}

#[test]
fn insufficient_funds_leaves_balances_unchanged() {
    let engine = engine();
    open(&engine, "A", "asset", usd(dec!(50.00)));
    open(&engine, "B", "asset", usd(dec!(0)));

    let result = engine.record_transaction(transfer("t1", "A", "B", usd(dec!(50.01))));
    assert_eq!(result, Err(LedgerError::InsufficientFunds(AccountId::from("A"))));

    assert_eq!(balance(&engine, "A"), usd(dec!(50.00)));
    assert_eq!(balance(&engine, "B"), usd(dec!(0)));
    assert_eq!(engine.transaction_count(), 0);
}

#[test]
fn exact_balance_can_be_transferred() {
    let engine = engine();
    open(&engine, "A", "asset", usd(dec!(50.00)));
    open(&engine, "B", "asset", usd(dec!(0)));

    engine
        .record_transaction(transfer("t1", "A", "B", usd(dec!(50.00))))
        .unwrap();
    assert!(balance(&engine, "A").is_zero());
}

#[test]
fn negative_balance_cannot_fund_transfers() {
    let engine = engine();
    open(&engine, "liab", "liability", usd(dec!(-100)));
    open(&engine, "B", "asset", usd(dec!(0)));

    let result = engine.record_transaction(transfer("t1", "liab", "B", usd(dec!(1))));
    assert_eq!(
        result,
        Err(LedgerError::InsufficientFunds(AccountId::from("liab")))
    );
}

#[test]
fn duplicate_transaction_ids_are_appended() {
    let engine = engine();
    open(&engine, "A", "asset", usd(dec!(100)));
    open(&engine, "B", "asset", usd(dec!(0)));

    engine.record_transaction(transfer("dup", "A", "B", usd(dec!(10)))).unwrap();
    engine.record_transaction(transfer("dup", "A", "B", usd(dec!(10)))).unwrap();

    assert_eq!(balance(&engine, "A"), usd(dec!(80)));
    assert_eq!(engine.transaction_history(&AccountId::from("B")).len(), 2);
}

#[test]
fn negative_amount_moves_value_toward_debit_account() {
    let engine = engine();
    open(&engine, "A", "asset", usd(dec!(10)));
    open(&engine, "B", "asset", usd(dec!(-10)));

    // Any balance covers a negative amount.
    engine
        .record_transaction(transfer("t1", "A", "B", usd(dec!(-50))))
        .unwrap();

    assert_eq!(balance(&engine, "A"), usd(dec!(60)));
    assert_eq!(balance(&engine, "B"), usd(dec!(-60)));
    assert!(engine.verify_ledger_balance().is_ok());
}

#[test]
fn zero_amount_is_recorded_without_moving_value() {
    let engine = engine();
    open(&engine, "A", "asset", usd(dec!(0)));
    open(&engine, "B", "asset", usd(dec!(0)));

    engine
        .record_transaction(transfer("t1", "A", "B", usd(dec!(0))))
        .unwrap();

    assert!(balance(&engine, "A").is_zero());
    assert!(balance(&engine, "B").is_zero());
    assert_eq!(engine.transaction_history(&AccountId::from("B")).len(), 1);
}

// === Out-of-range Arithmetic ===

#[test]
fn credit_overflow_rolls_back_both_accounts() {
    let engine = engine();
    open(&engine, "d", "asset", usd(dec!(1)));
    open(&engine, "c", "asset", usd(Decimal::MAX));
    let audit_before = engine.verify_ledger_balance();

    let result = engine.record_transaction(transfer("t1", "d", "c", usd(dec!(1))));

    assert_eq!(
        result,
        Err(LedgerError::UnbalancedTransaction {
            difference: dec!(1),
            currency: "USD".into()
        })
    );
    assert_eq!(balance(&engine, "d"), usd(dec!(1)));
    assert_eq!(balance(&engine, "c"), usd(Decimal::MAX));
    assert_eq!(engine.transaction_count(), 0);
    assert_eq!(engine.verify_ledger_balance(), audit_before);
}

#[test]
fn debit_overflow_leaves_credit_account_untouched() {
    let engine = engine();
    open(&engine, "d", "asset", usd(Decimal::MAX));
    open(&engine, "c", "asset", usd(dec!(5)));

    let result = engine.record_transaction(transfer("t1", "d", "c", usd(dec!(-1))));

    assert!(matches!(result, Err(LedgerError::UnbalancedTransaction { .. })));
    assert_eq!(balance(&engine, "d"), usd(Decimal::MAX));
    assert_eq!(balance(&engine, "c"), usd(dec!(5)));
    assert!(engine.transaction_history(&AccountId::from("c")).is_empty());
}

#[test]
fn ledger_keeps_working_after_rolled_back_overflow() {
    let engine = engine();
    open(&engine, "d", "asset", usd(dec!(10)));
    open(&engine, "c", "asset", usd(Decimal::MAX));
    open(&engine, "e", "asset", usd(dec!(0)));

    assert!(engine.record_transaction(transfer("t1", "d", "c", usd(dec!(1)))).is_err());
    engine
        .record_transaction(transfer("t2", "d", "e", usd(dec!(4))))
        .unwrap();

    assert_eq!(balance(&engine, "d"), usd(dec!(6)));
    assert_eq!(balance(&engine, "e"), usd(dec!(4)));
    assert_eq!(engine.transaction_count(), 1);
}

// === Queries ===

#[test]
fn balance_of_unknown_account_fails() {
    let engine = engine();
    assert_eq!(
        engine.account_balance(&AccountId::from("nope")),
        Err(LedgerError::AccountNotFound(AccountId::from("nope")))
    );
}

#[test]
fn history_is_filtered_and_in_commit_order() {
    let engine = engine();
    open(&engine, "A", "asset", usd(dec!(100)));
    open(&engine, "B", "asset", usd(dec!(100)));
    open(&engine, "C", "asset", usd(dec!(100)));

    engine.record_transaction(transfer("1", "A", "B", usd(dec!(1)))).unwrap();
    engine.record_transaction(transfer("2", "B", "C", usd(dec!(2)))).unwrap();
    engine.record_transaction(transfer("3", "C", "A", usd(dec!(3)))).unwrap();
    engine.record_transaction(transfer("4", "B", "A", usd(dec!(4)))).unwrap();

    let ids: Vec<_> = engine
        .transaction_history(&AccountId::from("A"))
        .into_iter()
        .map(|tx| tx.id.0)
        .collect();
    assert_eq!(ids, ["1", "3", "4"]);

    let history = engine.transaction_history(&AccountId::from("B"));
    assert!(history.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));
}

#[test]
fn history_of_unknown_or_idle_account_is_empty() {
    let engine = engine();
    open(&engine, "idle", "asset", usd(dec!(0)));

    assert!(engine.transaction_history(&AccountId::from("idle")).is_empty());
    assert!(engine.transaction_history(&AccountId::from("ghost")).is_empty());
}

#[test]
fn failed_transactions_are_not_logged() {
    let engine = engine();
    open(&engine, "A", "asset", usd(dec!(5)));
    open(&engine, "B", "asset", usd(dec!(0)));

    let _ = engine.record_transaction(transfer("t1", "A", "B", usd(dec!(6))));
    let _ = engine.record_transaction(transfer("t2", "A", "X", usd(dec!(1))));

    assert!(engine.transaction_history(&AccountId::from("A")).is_empty());
}

#[test]
fn commit_timestamp_is_assigned_by_engine() {
    let engine = engine();
    open(&engine, "A", "asset", usd(dec!(5)));
    open(&engine, "B", "asset", usd(dec!(0)));

    let before = chrono::Utc::now();
    engine.record_transaction(transfer("t1", "A", "B", usd(dec!(1)))).unwrap();
    let after = chrono::Utc::now();

    let tx = &engine.transaction_history(&AccountId::from("A"))[0];
    assert!(before <= tx.timestamp && tx.timestamp <= after);
}

// === Ledger Verification ===

#[test]
fn empty_ledger_is_balanced() {
    assert!(engine().verify_ledger_balance().is_ok());
}

#[test]
fn offsetting_opening_balances_stay_balanced() {
    let engine = engine();
    open(&engine, "cash", "asset", usd(dec!(1000)));
    open(&engine, "equity", "equity", usd(dec!(-1000)));
    open(&engine, "expense", "expense", usd(dec!(0)));
    open(&engine, "eur-cash", "asset", Money::new(dec!(20), "EUR"));
    open(&engine, "eur-loan", "liability", Money::new(dec!(-20), "EUR"));

    engine.record_transaction(transfer("1", "cash", "expense", usd(dec!(99.99)))).unwrap();
    engine.record_transaction(transfer("2", "expense", "cash", usd(dec!(9.99)))).unwrap();
    engine
        .record_transaction(transfer("3", "eur-cash", "eur-loan", Money::new(dec!(20), "EUR")))
        .unwrap();

    assert!(engine.verify_ledger_balance().is_ok());
}

#[test]
fn non_offsetting_opening_balance_fails_verification() {
    let engine = engine();
    open(&engine, "A", "asset", usd(dec!(1000)));
    open(&engine, "B", "asset", usd(dec!(1000)));

    engine.record_transaction(transfer("t1", "A", "B", usd(dec!(10)))).unwrap();

    assert_eq!(
        engine.verify_ledger_balance(),
        Err(LedgerError::LedgerUnbalanced {
            currency: "USD".into(),
            total: dec!(2000)
        })
    );
    // Verification is read-only.
    assert_eq!(balance(&engine, "A"), usd(dec!(990)));
}

#[test]
fn overflowing_currency_total_is_reported() {
    let engine = engine();
    open(&engine, "A", "asset", usd(Decimal::MAX));
    open(&engine, "B", "asset", usd(Decimal::MAX));
    open(&engine, "C", "liability", usd(Decimal::MIN));

    assert_eq!(
        engine.verify_ledger_balance(),
        Err(LedgerError::LedgerTotalOverflow {
            currency: "USD".into()
        })
    );
    assert_eq!(balance(&engine, "A"), usd(Decimal::MAX));
}

#[test]
fn opposite_extreme_balances_net_to_zero() {
    let engine = engine();
    open(&engine, "A", "asset", usd(Decimal::MAX));
    open(&engine, "B", "liability", usd(Decimal::MIN));
    open(&engine, "C", "expense", usd(dec!(0)));

    assert!(engine.verify_ledger_balance().is_ok());
}
