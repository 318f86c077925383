// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::pretty_table;
use anyhow::{Context, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;

/// Returns `[issue, detail]` rows for every inconsistency found.
pub fn find_issues(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // Split shares must add up to the expense amount.
    let mut stmt = conn.prepare(
        "SELECT e.id, e.amount, s.amount FROM expenses e
         JOIN expense_splits s ON s.expense_id=e.id
         ORDER BY e.id",
    )?;
    let mut cur = stmt.query([])?;
    let mut current: Option<(i64, Decimal, Decimal)> = None;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let total = parse_amount(&r.get::<_, String>(1)?)?;
        let share = parse_amount(&r.get::<_, String>(2)?)?;
        if let Some((cid, _, sum)) = current.as_mut() {
            if *cid == id {
                *sum += share;
                continue;
            }
        }
        if let Some(done) = current.take() {
            check_sum(&mut rows, done);
        }
        current = Some((id, total, share));
    }
    if let Some(done) = current {
        check_sum(&mut rows, done);
    }

    let mut stmt2 = conn.prepare(
        "SELECT e.id, e.title FROM expenses e
         WHERE NOT EXISTS (SELECT 1 FROM expense_splits s WHERE s.expense_id=e.id)
         ORDER BY e.id",
    )?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let id: i64 = r.get(0)?;
        let title: String = r.get(1)?;
        rows.push(vec!["expense_without_splits".into(), format!("#{} {}", id, title)]);
    }

    let mut stmt3 = conn.prepare(
        "SELECT s.id, s.user_id, e.group_id FROM expense_splits s
         JOIN expenses e ON e.id=s.expense_id
         WHERE NOT EXISTS (
             SELECT 1 FROM group_members m WHERE m.group_id=e.group_id AND m.user_id=s.user_id
         )
         ORDER BY s.id",
    )?;
    let mut cur3 = stmt3.query([])?;
    while let Some(r) = cur3.next()? {
        let split: i64 = r.get(0)?;
        let user: i64 = r.get(1)?;
        let group: i64 = r.get(2)?;
        rows.push(vec![
            "split_owner_not_member".into(),
            format!("split {} user {} group {}", split, user, group),
        ]);
    }

    Ok(rows)
}

fn parse_amount(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid stored amount '{}'", s))
}

fn check_sum(rows: &mut Vec<Vec<String>>, (id, total, sum): (i64, Decimal, Decimal)) {
    if sum != total {
        rows.push(vec![
            "split_sum_mismatch".into(),
            format!("expense {}: amount {:.2}, splits {:.2}", id, total, sum),
        ]);
    }
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = find_issues(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
