// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use nestegg::aggregate::compute_progress;
use nestegg::models::{Category, NewTransaction};
use nestegg::refresh::RefreshCoordinator;
use nestegg::store::LedgerStore;
use nestegg::{ErrorKind, LedgerError};

fn setup() -> LedgerStore {
    LedgerStore::open_in_memory(Arc::new(RefreshCoordinator::new())).unwrap()
}

fn tx(day: u32, title: &str, amount: i64, category: Category) -> NewTransaction {
    NewTransaction {
        date: Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap(),
        title: title.to_string(),
        amount: Decimal::from(amount),
        category,
    }
}

#[test]
fn goal_round_trip() {
    let mut store = setup();
    assert!(store.active_goal().unwrap().is_none());

    let goal = store
        .create_or_replace_goal("Emergency Fund", Decimal::new(500050, 2))
        .unwrap();
    let active = store.active_goal().unwrap().unwrap();
    assert_eq!(active, goal);
    assert_eq!(active.name, "Emergency Fund");
    assert_eq!(active.target_amount, Decimal::new(500050, 2));

    // zero is a valid target
    let zero = store.create_or_replace_goal("Nothing", Decimal::ZERO).unwrap();
    assert_eq!(store.active_goal().unwrap().unwrap().id, zero.id);
}

#[test]
fn invalid_goal_is_rejected_without_side_effects() {
    let mut store = setup();
    let before = store.refresh().current_version();

    let err = store.create_or_replace_goal("   ", Decimal::from(10)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = store
        .create_or_replace_goal("Car", Decimal::from(-1))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    assert!(store.active_goal().unwrap().is_none());
    assert_eq!(store.refresh().current_version(), before);
}

#[test]
fn transaction_requires_a_goal() {
    let mut store = setup();
    let err = store
        .add_transaction(tx(1, "Salary", 100, Category::Income))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(store.refresh().current_version(), 0);
    assert!(store.list_transactions(Category::Income, None).unwrap().is_empty());
}

#[test]
fn invalid_transactions_are_rejected() {
    let mut store = setup();
    store.create_or_replace_goal("Bike", Decimal::from(900)).unwrap();
    let version = store.refresh().current_version();

    for bad in [
        tx(1, "Salary", 0, Category::Income),
        tx(1, "Salary", -5, Category::Income),
        tx(1, "  ", 5, Category::Expense),
    ] {
        let err = store.add_transaction(bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
    assert_eq!(store.refresh().current_version(), version);
}

#[test]
fn emergency_fund_progress() {
    let mut store = setup();
    let goal = store
        .create_or_replace_goal("Emergency Fund", Decimal::from(5000))
        .unwrap();
    store
        .add_transaction(tx(1, "Salary", 2000, Category::Income))
        .unwrap();
    store
        .add_transaction(tx(2, "Rent", 500, Category::Expense))
        .unwrap();

    let p = compute_progress(store.connection(), goal.id).unwrap();
    assert_eq!(p.net, Decimal::from(1500));
    assert_eq!(p.clamped, Decimal::from(1500));
    assert_eq!(p.percent, Decimal::new(300, 1));
}

#[test]
fn progress_is_clamped_at_both_ends() {
    let mut store = setup();
    let goal = store.create_or_replace_goal("Trip", Decimal::from(1000)).unwrap();

    let p = compute_progress(store.connection(), goal.id).unwrap();
    assert_eq!((p.net, p.clamped, p.percent), (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO));

    store.add_transaction(tx(1, "Gift", 300, Category::Income)).unwrap();
    store.add_transaction(tx(2, "Repair", 800, Category::Expense)).unwrap();
    let p = compute_progress(store.connection(), goal.id).unwrap();
    assert_eq!(p.net, Decimal::from(-500));
    assert_eq!(p.clamped, Decimal::ZERO);
    assert_eq!(p.percent, Decimal::ZERO);

    store.add_transaction(tx(3, "Bonus", 5000, Category::Income)).unwrap();
    let p = compute_progress(store.connection(), goal.id).unwrap();
    assert_eq!(p.net, Decimal::from(4500));
    assert_eq!(p.clamped, Decimal::from(1000));
    assert_eq!(p.percent, Decimal::from(100));
}

#[test]
fn new_goal_does_not_take_old_transactions() {
    let mut store = setup();
    let first = store.create_or_replace_goal("Laptop", Decimal::from(3000)).unwrap();
    let t = store
        .add_transaction(tx(4, "Freelance", 1200, Category::Income))
        .unwrap();
    assert_eq!(t.goal_id, first.id);

    let second = store.create_or_replace_goal("Holiday", Decimal::from(2000)).unwrap();
    assert_ne!(first.id, second.id);

    let listed = store.list_transactions(Category::Income, None).unwrap();
    assert_eq!(listed[0].goal_id, first.id);
    assert_eq!(
        compute_progress(store.connection(), second.id).unwrap().net,
        Decimal::ZERO
    );
    assert_eq!(
        compute_progress(store.connection(), first.id).unwrap().net,
        Decimal::from(1200)
    );
}

#[test]
fn progress_of_unknown_goal_is_not_found() {
    let store = setup();
    let err = compute_progress(store.connection(), 42).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn clear_all_is_idempotent() {
    let mut store = setup();
    let goal = store.create_or_replace_goal("House", Decimal::from(100000)).unwrap();
    store.add_transaction(tx(1, "Salary", 4000, Category::Income)).unwrap();
    store.add_transaction(tx(2, "Food", 300, Category::Expense)).unwrap();

    assert_eq!(store.clear_all_transactions().unwrap(), 2);
    let v1 = store.refresh().current_version();
    for category in Category::ALL {
        assert!(store.list_transactions(category, None).unwrap().is_empty());
    }

    assert_eq!(store.clear_all_transactions().unwrap(), 0);
    assert!(store.refresh().current_version() > v1);
    for category in Category::ALL {
        assert!(store.list_transactions(category, None).unwrap().is_empty());
    }
    assert_eq!(store.active_goal().unwrap().unwrap(), goal);
}

#[test]
fn recent_lists_three_newest_with_id_tiebreak() {
    let mut store = setup();
    store.create_or_replace_goal("Car", Decimal::from(20000)).unwrap();
    store.add_transaction(tx(1, "Oldest", 10, Category::Expense)).unwrap();
    store.add_transaction(tx(5, "Tie A", 20, Category::Expense)).unwrap();
    store.add_transaction(tx(5, "Tie B", 30, Category::Expense)).unwrap();
    store.add_transaction(tx(3, "Middle", 40, Category::Expense)).unwrap();
    store.add_transaction(tx(9, "Salary", 50, Category::Income)).unwrap();

    let recent = store.list_transactions(Category::Expense, Some(3)).unwrap();
    let titles: Vec<&str> = recent.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["Tie B", "Tie A", "Middle"]);
    assert!(recent.iter().all(|t| t.category == Category::Expense));
}

#[test]
fn version_increases_once_per_commit() {
    let mut store = setup();
    let mut last = store.refresh().current_version();

    store.create_or_replace_goal("Fund", Decimal::from(10)).unwrap();
    assert_eq!(store.refresh().current_version(), last + 1);
    last += 1;

    store.add_transaction(tx(1, "In", 5, Category::Income)).unwrap();
    assert_eq!(store.refresh().current_version(), last + 1);
    last += 1;

    let _ = store.add_transaction(tx(1, "", 5, Category::Income));
    assert_eq!(store.refresh().current_version(), last);

    store.clear_all_transactions().unwrap();
    assert_eq!(store.refresh().current_version(), last + 1);
}

#[test]
fn storage_failure_leaves_no_trace() {
    let mut store = setup();
    store.create_or_replace_goal("Pond", Decimal::from(700)).unwrap();
    store
        .connection()
        .execute_batch(
            "CREATE TRIGGER refuse_inserts BEFORE INSERT ON transactions
             BEGIN SELECT RAISE(ABORT, 'disk says no'); END;",
        )
        .unwrap();
    let version = store.refresh().current_version();

    let err = store
        .add_transaction(tx(6, "Salary", 100, Category::Income))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageFault);
    assert!(matches!(err, LedgerError::Database(_)));
    assert_eq!(store.refresh().current_version(), version);
    assert!(store.list_transactions(Category::Income, None).unwrap().is_empty());
}

#[test]
fn dangling_active_goal_is_not_found() {
    let mut store = setup();
    store.create_or_replace_goal("Roof", Decimal::from(8000)).unwrap();
    store
        .connection()
        .execute_batch(
            "PRAGMA foreign_keys = OFF;
             UPDATE active_goal SET goal_id = 999 WHERE slot = 1;",
        )
        .unwrap();
    let version = store.refresh().current_version();

    let err = store
        .add_transaction(tx(7, "Gift", 50, Category::Income))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(store.refresh().current_version(), version);
    assert!(store.list_transactions(Category::Income, None).unwrap().is_empty());
}
