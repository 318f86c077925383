// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::ledger::{ExpenseReceipt, FanoutPolicy, SplitSource};
use crate::models::NewExpense;
use crate::store::SqliteStore;
use crate::utils::{
    fmt_money, id_for_group, id_for_user, ids_for_users, maybe_print_json, parse_date,
    parse_decimal, pretty_table,
};
use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            add(conn, sub)?;
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("splits", sub)) => splits(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Parses `expense add` arguments, records the expense and prints a summary.
pub fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<ExpenseReceipt> {
    let settings = Settings::load(conn)?;
    let group_id = id_for_group(conn, sub.get_one::<String>("group").unwrap())?;
    let paid_by = id_for_user(conn, sub.get_one::<String>("payer").unwrap())?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let split_with = ids_for_users(conn, sub.get_one::<String>("split_with").unwrap())?;
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => chrono::Local::now().date_naive(),
    };
    let policy = if sub.get_flag("best_effort") {
        FanoutPolicy::BestEffort
    } else {
        settings.fanout
    };

    let req = NewExpense {
        group_id,
        paid_by,
        title: sub.get_one::<String>("title").unwrap().to_string(),
        description: sub.get_one::<String>("description").cloned(),
        amount,
        category: sub.get_one::<String>("category").unwrap().to_string(),
        date,
        split_with,
    };
    let receipt = SqliteStore::new(conn)
        .record_expense(&req, policy, &settings.currency)
        .context("Failed to record expense")?;

    println!(
        "Recorded '{}' {} split {} way(s) (expense id {})",
        receipt.expense.title,
        fmt_money(&receipt.expense.amount, &settings.currency),
        receipt.splits.len(),
        receipt.expense.id
    );
    if !receipt.is_complete() {
        eprintln!(
            "warning: {} split(s) could not be written; run `splitclip doctor`",
            receipt.missing.len()
        );
    }
    Ok(receipt)
}

#[derive(Serialize)]
pub struct ExpenseRow {
    pub id: i64,
    pub date: String,
    pub title: String,
    pub paid_by: String,
    pub amount: String,
    pub category: String,
    pub shares: usize,
    pub settled: usize,
}

pub fn expense_rows(conn: &Connection, group_id: i64) -> Result<Vec<ExpenseRow>> {
    let store = SqliteStore::new(conn);
    let expenses = store.group_expenses(group_id)?;
    let ids: Vec<i64> = expenses.iter().map(|e| e.id).collect();
    let splits = store.splits_for_expenses(&ids)?;
    let names: std::collections::HashMap<i64, String> = store
        .group_members(group_id)?
        .into_iter()
        .map(|m| (m.user_id, m.display_name))
        .collect();

    let mut data = Vec::with_capacity(expenses.len());
    for e in expenses {
        let own: Vec<_> = splits.iter().filter(|s| s.expense_id == e.id).collect();
        let paid_by = match names.get(&e.paid_by) {
            Some(n) => n.clone(),
            None => store.user_by_id(e.paid_by)?.display_name().to_string(),
        };
        data.push(ExpenseRow {
            id: e.id,
            date: e.date.to_string(),
            title: e.title,
            paid_by,
            amount: format!("{:.2}", e.amount),
            category: e.category,
            shares: own.len(),
            settled: own.iter().filter(|s| s.is_settled).count(),
        });
    }
    Ok(data)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let group_id = id_for_group(conn, sub.get_one::<String>("group").unwrap())?;
    let data = expense_rows(conn, group_id)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.title.clone(),
                    r.paid_by.clone(),
                    r.amount.clone(),
                    r.category.clone(),
                    format!("{}/{}", r.settled, r.shares),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Title", "Paid By", "Amount", "Category", "Settled"],
                rows
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct SplitRow {
    pub split_id: i64,
    pub expense: String,
    pub owed_by: String,
    pub amount: String,
    pub settled: bool,
    pub settled_at: Option<String>,
}

fn splits(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    let group_id = id_for_group(conn, sub.get_one::<String>("group").unwrap())?;
    let expenses = store.group_expenses(group_id)?;
    let ids: Vec<i64> = expenses.iter().map(|e| e.id).collect();

    let mut data = Vec::new();
    for s in store.splits_for_expenses(&ids)? {
        let title = expenses
            .iter()
            .find(|e| e.id == s.expense_id)
            .map(|e| e.title.clone())
            .unwrap_or_default();
        data.push(SplitRow {
            split_id: s.id,
            expense: title,
            owed_by: store.user_by_id(s.user_id)?.display_name().to_string(),
            amount: format!("{:.2}", s.amount),
            settled: s.is_settled,
            settled_at: s.settled_at.map(|t| t.to_rfc3339()),
        });
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.split_id.to_string(),
                    r.expense.clone(),
                    r.owed_by.clone(),
                    r.amount.clone(),
                    if r.settled { "yes".into() } else { "no".into() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Split", "Expense", "Owed By", "Amount", "Settled"], rows)
        );
    }
    Ok(())
}
