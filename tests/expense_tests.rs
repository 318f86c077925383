// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use splitclip::error::LedgerError;
use splitclip::ledger::{FanoutPolicy, SplitSource};
use splitclip::models::{MessageKind, NewExpense, Role};
use splitclip::store::SqliteStore;
use splitclip::{cli, commands::expenses, config, db};

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn setup() -> (Connection, i64, Vec<i64>) {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let store = SqliteStore::new(&conn);
    let alice = store.add_user("alice@example.com", Some("Alice"), None).unwrap().id;
    let bob = store.add_user("bob@example.com", Some("Bob"), None).unwrap().id;
    let carol = store.add_user("carol@example.com", Some("Carol"), None).unwrap().id;
    let group = store.create_group("Trip", Some("Goa"), alice, &[]).unwrap().id;
    store.add_member(group, bob, Role::Member).unwrap();
    store.add_member(group, carol, Role::Member).unwrap();
    (conn, group, vec![alice, bob, carol])
}

fn request(group_id: i64, paid_by: i64, amount: &str, split_with: Vec<i64>) -> NewExpense {
    NewExpense {
        group_id,
        paid_by,
        title: "Taxi".into(),
        description: None,
        amount: d(amount),
        category: "travel".into(),
        date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
        split_with,
    }
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
        .unwrap()
}

fn reject_splits_for(conn: &Connection, user_id: i64) {
    conn.execute_batch(&format!(
        "CREATE TRIGGER fail_split BEFORE INSERT ON expense_splits
         WHEN NEW.user_id = {user_id}
         BEGIN SELECT RAISE(ABORT, 'split rejected'); END;"
    ))
    .unwrap();
}

fn invalid_message(err: LedgerError) -> String {
    match err {
        LedgerError::Invalid(msg) => msg,
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn three_way_split_assigns_extra_cent_in_list_order() {
    let (conn, group, ids) = setup();
    let store = SqliteStore::new(&conn);
    let receipt = store
        .record_expense(&request(group, ids[0], "100.00", ids.clone()), FanoutPolicy::Atomic, "INR")
        .unwrap();

    assert!(receipt.is_complete());
    let amounts: Vec<Decimal> = receipt.splits.iter().map(|s| s.amount).collect();
    assert_eq!(amounts, vec![d("33.34"), d("33.33"), d("33.33")]);
    assert_eq!(receipt.splits[0].user_id, ids[0]);
    assert!(receipt.splits.iter().all(|s| !s.is_settled));

    let stored = store.splits_for_expenses(&[receipt.expense.id]).unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored.iter().map(|s| s.amount).sum::<Decimal>(), d("100"));
}

#[test]
fn payer_is_not_added_to_participants() {
    let (conn, group, ids) = setup();
    let store = SqliteStore::new(&conn);
    let receipt = store
        .record_expense(&request(group, ids[0], "60", vec![ids[1], ids[2]]), FanoutPolicy::Atomic, "INR")
        .unwrap();
    assert_eq!(receipt.splits.len(), 2);
    assert!(receipt.splits.iter().all(|s| s.user_id != ids[0]));
    assert!(receipt.splits.iter().all(|s| s.amount == d("30")));
}

#[test]
fn duplicate_participants_get_one_share() {
    let (conn, group, ids) = setup();
    let store = SqliteStore::new(&conn);
    let receipt = store
        .record_expense(
            &request(group, ids[0], "20", vec![ids[1], ids[1], ids[2]]),
            FanoutPolicy::Atomic,
            "INR",
        )
        .unwrap();
    assert_eq!(receipt.splits.len(), 2);
    assert_eq!(receipt.splits[0].amount, d("10"));
}

#[test]
fn invalid_requests_are_rejected_before_writing() {
    let (conn, group, ids) = setup();
    let store = SqliteStore::new(&conn);

    let mut blank = request(group, ids[0], "10", vec![ids[1]]);
    blank.title = "   ".into();
    let msg = invalid_message(store.record_expense(&blank, FanoutPolicy::Atomic, "INR").unwrap_err());
    assert_eq!(msg, "Expense title cannot be empty");

    for amount in ["0", "-5", "0.004"] {
        let err = store
            .record_expense(&request(group, ids[0], amount, vec![ids[1]]), FanoutPolicy::Atomic, "INR")
            .unwrap_err();
        assert_eq!(invalid_message(err), "Amount must be greater than 0");
    }

    let err = store
        .record_expense(&request(group, ids[0], "10", vec![]), FanoutPolicy::Atomic, "INR")
        .unwrap_err();
    assert_eq!(invalid_message(err), "Select at least one person to split with");

    assert_eq!(count(&conn, "expenses"), 0);
    assert_eq!(count(&conn, "expense_splits"), 0);
}

#[test]
fn outsiders_cannot_pay_or_share() {
    let (conn, group, ids) = setup();
    let store = SqliteStore::new(&conn);
    let dave = store.add_user("dave@example.com", None, None).unwrap().id;

    let err = store
        .record_expense(&request(group, dave, "10", vec![ids[0]]), FanoutPolicy::Atomic, "INR")
        .unwrap_err();
    assert!(invalid_message(err).starts_with("Payer"));

    let err = store
        .record_expense(&request(group, ids[0], "10", vec![ids[1], dave]), FanoutPolicy::Atomic, "INR")
        .unwrap_err();
    assert_eq!(
        invalid_message(err),
        format!("User {} is not a member of group {}", dave, group)
    );
    assert_eq!(count(&conn, "expenses"), 0);
}

#[test]
fn atomic_policy_rolls_back_expense_when_a_split_fails() {
    let (conn, group, ids) = setup();
    reject_splits_for(&conn, ids[1]);
    let store = SqliteStore::new(&conn);

    let err = store
        .record_expense(&request(group, ids[0], "90", ids.clone()), FanoutPolicy::Atomic, "INR")
        .unwrap_err();
    assert!(matches!(err, LedgerError::Storage(_)));
    assert_eq!(count(&conn, "expenses"), 0);
    assert_eq!(count(&conn, "expense_splits"), 0);
    assert_eq!(count(&conn, "group_messages"), 0);
}

#[test]
fn best_effort_policy_keeps_expense_and_reports_missing() {
    let (conn, group, ids) = setup();
    reject_splits_for(&conn, ids[1]);
    let store = SqliteStore::new(&conn);

    let receipt = store
        .record_expense(&request(group, ids[0], "90", ids.clone()), FanoutPolicy::BestEffort, "INR")
        .unwrap();
    assert!(!receipt.is_complete());
    assert_eq!(receipt.missing, vec![ids[1]]);
    assert_eq!(receipt.splits.len(), 2);
    assert_eq!(count(&conn, "expenses"), 1);
    assert_eq!(count(&conn, "expense_splits"), 2);
}

#[test]
fn expense_notice_is_posted_to_group_chat() {
    let (conn, group, ids) = setup();
    let store = SqliteStore::new(&conn);
    let receipt = store
        .record_expense(&request(group, ids[1], "45.5", vec![ids[0], ids[1]]), FanoutPolicy::Atomic, "INR")
        .unwrap();

    let messages = store.group_messages(group).unwrap();
    assert_eq!(messages.len(), 1);
    let notice = &messages[0];
    assert_eq!(notice.kind, MessageKind::Expense);
    assert_eq!(notice.sender_id, ids[1]);
    assert_eq!(notice.expense_id, Some(receipt.expense.id));
    assert_eq!(notice.message, "Bob added expense: Taxi (INR 45.50)");
}

#[test]
fn add_command_resolves_emails_and_uses_settings_policy() {
    let (conn, _group, ids) = setup();
    config::set(&conn, config::KEY_FANOUT, "best-effort").unwrap();
    config::set(&conn, config::KEY_CURRENCY, "eur").unwrap();
    reject_splits_for(&conn, ids[2]);

    let matches = cli::build_cli().get_matches_from([
        "splitclip",
        "expense",
        "add",
        "--group",
        "Trip",
        "--payer",
        "ALICE@example.com",
        "--title",
        "Groceries",
        "--amount",
        "75",
        "--split-with",
        "alice@example.com, bob@example.com,carol@example.com",
        "--date",
        "2025-05-01",
    ]);
    let Some(("expense", exp)) = matches.subcommand() else {
        panic!("no expense subcommand");
    };
    let Some(("add", sub)) = exp.subcommand() else {
        panic!("no add subcommand");
    };
    let receipt = expenses::add(&conn, sub).unwrap();
    assert_eq!(receipt.expense.paid_by, ids[0]);
    assert_eq!(receipt.expense.category, "general");
    assert_eq!(receipt.expense.date, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
    assert_eq!(receipt.missing, vec![ids[2]]);

    let rows = expenses::expense_rows(&conn, receipt.expense.group_id).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].paid_by, "Alice");
    assert_eq!(rows[0].amount, "75.00");
    assert_eq!(rows[0].shares, 2);
    assert_eq!(rows[0].settled, 0);

    let notices = SqliteStore::new(&conn)
        .group_messages(receipt.expense.group_id)
        .unwrap();
    assert_eq!(notices[0].message, "Alice added expense: Groceries (EUR 75.00)");
}
