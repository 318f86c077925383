// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::id_for_group;
use anyhow::{anyhow, Result};
use rusqlite::{params, Connection};
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("expenses", sub)) => {
            let group_id = id_for_group(conn, sub.get_one::<String>("group").unwrap())?;
            let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
            let out = sub.get_one::<String>("out").unwrap();
            export_expenses(conn, group_id, &fmt, out)
        }
        _ => Ok(()),
    }
}

/// Writes one record per split (expenses without splits get one record
/// with empty split columns).
pub fn export_expenses(conn: &Connection, group_id: i64, fmt: &str, out: &str) -> Result<()> {
    let mut stmt = conn.prepare(
        "SELECT e.id, e.date, e.title, e.category, e.amount,
                COALESCE(NULLIF(TRIM(p.full_name), ''), p.email),
                COALESCE(NULLIF(TRIM(o.full_name), ''), o.email),
                s.amount, s.is_settled
         FROM expenses e
         JOIN users p ON p.id=e.paid_by
         LEFT JOIN expense_splits s ON s.expense_id=e.id
         LEFT JOIN users o ON o.id=s.user_id
         WHERE e.group_id=?1
         ORDER BY e.date, e.id, s.id",
    )?;
    let rows = stmt.query_map(params![group_id], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, String>(5)?,
            r.get::<_, Option<String>>(6)?,
            r.get::<_, Option<String>>(7)?,
            r.get::<_, Option<bool>>(8)?,
        ))
    })?;

    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "expense_id",
                "date",
                "title",
                "category",
                "amount",
                "paid_by",
                "owed_by",
                "share",
                "settled",
            ])?;
            for row in rows {
                let (id, d, t, c, amt, payer, ower, share, settled) = row?;
                wtr.write_record([
                    id.to_string(),
                    d,
                    t,
                    c,
                    amt,
                    payer,
                    ower.unwrap_or_default(),
                    share.unwrap_or_default(),
                    settled.map(|s| s.to_string()).unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for row in rows {
                let (id, d, t, c, amt, payer, ower, share, settled) = row?;
                items.push(json!({
                    "expense_id": id, "date": d, "title": t, "category": c, "amount": amt,
                    "paid_by": payer, "owed_by": ower, "share": share, "settled": settled
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        other => return Err(anyhow!("Unknown format: {} (use csv|json)", other)),
    }
    println!("Exported expenses to {}", out);
    Ok(())
}
