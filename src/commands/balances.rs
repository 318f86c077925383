// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::ledger::{group_balances, settle, MemberFailurePolicy};
use crate::models::Balance;
use crate::store::SqliteStore;
use crate::utils::{fmt_money, id_for_group, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn compute(
    conn: &Connection,
    group_id: i64,
    policy: MemberFailurePolicy,
) -> Result<Vec<Balance>> {
    let store = SqliteStore::new(conn);
    let balances = group_balances(&store, &store, &store, group_id, policy)
        .with_context(|| format!("Failed to compute balances for group {}", group_id))?;
    Ok(balances)
}

pub fn handle_balance(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let group_id = id_for_group(conn, sub.get_one::<String>("group").unwrap())?;
    let policy = if sub.get_flag("strict") {
        MemberFailurePolicy::Strict
    } else {
        settings.balance
    };
    let data = compute(conn, group_id, policy)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let ccy = settings.currency.as_str();
    let rows = data
        .iter()
        .map(|b| {
            vec![
                b.display_name.clone(),
                format!("{:.2}", b.total_paid),
                format!("{:.2}", b.total_owed),
                format!("{:.2}", b.total_received),
                format!("{:.2}", b.net),
                status(b, ccy),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Member", "Paid", "Owed", "Received", "Net", "Status"],
            rows
        )
    );
    Ok(())
}

fn status(b: &Balance, ccy: &str) -> String {
    if b.net > Decimal::ZERO {
        format!("owes {}", fmt_money(&b.owes(), ccy))
    } else if b.net < Decimal::ZERO {
        format!("is owed {}", fmt_money(&b.is_owed(), ccy))
    } else {
        "settled up".to_string()
    }
}

pub fn handle_settle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let split_id = *sub.get_one::<i64>("split").unwrap();
    let store = SqliteStore::new(conn);
    let split = settle(&store, split_id)?;
    println!(
        "Split {} settled ({:.2} by user {})",
        split.id, split.amount, split.user_id
    );
    Ok(())
}
