// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::json;
use splitclip::ledger::{settle, FanoutPolicy};
use splitclip::models::{NewExpense, Role};
use splitclip::store::SqliteStore;
use splitclip::{cli, commands::exporter, db};
use tempfile::tempdir;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let store = SqliteStore::new(&conn);
    let a = store.add_user("a@example.com", Some("Ana"), None).unwrap().id;
    let b = store.add_user("b@example.com", Some("Ben"), None).unwrap().id;
    let g = store.create_group("Trip", None, a, &[]).unwrap().id;
    store.add_member(g, b, Role::Member).unwrap();
    let receipt = store
        .record_expense(
            &NewExpense {
                group_id: g,
                paid_by: a,
                title: "Hotel".into(),
                description: Some("two nights".into()),
                amount: "250".parse().unwrap(),
                category: "stay".into(),
                date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
                split_with: vec![a, b],
            },
            FanoutPolicy::Atomic,
            "INR",
        )
        .unwrap();
    settle(&store, receipt.splits[1].id).unwrap();
    conn
}

fn run_export(conn: &Connection, format: &str, out: &str) {
    let matches = cli::build_cli().get_matches_from([
        "splitclip", "export", "expenses", "--group", "Trip", "--format", format, "--out", out,
    ]);
    let Some(("export", sub)) = matches.subcommand() else {
        panic!("no export subcommand");
    };
    exporter::handle(conn, sub).unwrap();
}

#[test]
fn export_expenses_as_json_has_one_record_per_split() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("trip.json");
    run_export(&conn, "json", &out.to_string_lossy());

    let raw = std::fs::read_to_string(&out).unwrap();
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let items = v.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["title"], json!("Hotel"));
    assert_eq!(items[0]["date"], json!("2025-06-10"));
    assert_eq!(items[0]["paid_by"], json!("Ana"));
    assert_eq!(items[0]["owed_by"], json!("Ana"));
    assert_eq!(items[0]["settled"], json!(false));
    assert_eq!(items[1]["owed_by"], json!("Ben"));
    assert_eq!(items[1]["settled"], json!(true));

    let share = |i: usize| -> Decimal { items[i]["share"].as_str().unwrap().parse().unwrap() };
    assert_eq!(share(0) + share(1), "250".parse::<Decimal>().unwrap());
}

#[test]
fn export_expenses_as_csv_writes_header_and_rows() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("trip.csv");
    run_export(&conn, "csv", &out.to_string_lossy());

    let mut rdr = csv::Reader::from_path(&out).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[6], "owed_by");
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[1][6], "Ben");
    assert_eq!(&records[1][8], "true");
}
