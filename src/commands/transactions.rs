// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::{params, Connection};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let n = conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
            if n == 0 {
                return Err(anyhow!("Transaction {} not found", id));
            }
            println!("Removed transaction {}", id);
        }
        Some(("stats", sub)) => stats(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Largest amount a personal transaction may hold (12 digits, 2 decimals).
pub fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

/// Makes an entered amount storable: sign dropped, capped at
/// [`max_amount`], rounded half-up to cents.
pub fn normalize_amount(amount: Decimal) -> Decimal {
    let mut v = amount;
    if v.is_sign_negative() {
        tracing::warn!(%amount, "negative amount, using absolute value");
        v = v.abs();
    }
    if v > max_amount() {
        tracing::warn!(%amount, "amount too large, capping");
        v = max_amount();
    }
    v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let title = sub.get_one::<String>("title").unwrap().trim().to_string();
    if title.is_empty() {
        return Err(anyhow!("Title cannot be empty"));
    }
    let amount = normalize_amount(parse_decimal(sub.get_one::<String>("amount").unwrap())?);
    let is_income = sub.get_flag("income");
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => chrono::Local::now().date_naive(),
    };

    conn.execute(
        "INSERT INTO transactions(title, amount, is_income, date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![title, amount.to_string(), is_income, date, Utc::now()],
    )?;
    let ccy = Settings::load(conn)?.currency;
    println!(
        "Recorded {} {} '{}' on {}",
        if is_income { "income" } else { "expense" },
        fmt_money(&amount, &ccy),
        title,
        date
    );
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub title: String,
    pub kind: String,
    pub amount: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let mut sql = String::from(
        "SELECT id, date, title, is_income, amount FROM transactions WHERE 1=1",
    );
    let mut params_vec: Vec<Value> = Vec::new();

    if let Some(from) = sub.get_one::<String>("from") {
        sql.push_str(" AND date>=?");
        params_vec.push(Value::Text(parse_date(from)?.to_string()));
    }
    if let Some(to) = sub.get_one::<String>("to") {
        sql.push_str(" AND date<=?");
        params_vec.push(Value::Text(parse_date(to)?.to_string()));
    }
    if let Some(q) = sub.get_one::<String>("search").map(|s| s.trim()).filter(|s| !s.is_empty()) {
        sql.push_str(" AND lower(title) LIKE ?");
        params_vec.push(Value::Text(format!("%{}%", q.to_lowercase())));
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(Value::Integer(*limit as i64));
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let date: String = r.get(1)?;
        let title: String = r.get(2)?;
        let is_income: bool = r.get(3)?;
        let amount: String = r.get(4)?;
        data.push(TransactionRow {
            id,
            date,
            title,
            kind: if is_income { "income" } else { "expense" }.to_string(),
            amount,
        });
    }
    Ok(data)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.title.clone(),
                    r.kind.clone(),
                    r.amount.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Date", "Title", "Type", "Amount"], rows)
        );
    }
    Ok(())
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Summary {
    pub count: usize,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

pub fn summary(conn: &Connection, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Summary> {
    let mut stmt = conn.prepare(
        "SELECT amount, is_income FROM transactions
         WHERE (?1 IS NULL OR date>=?1) AND (?2 IS NULL OR date<=?2)",
    )?;
    let mut rows = stmt.query(params![from, to])?;
    let mut s = Summary {
        count: 0,
        income: Decimal::ZERO,
        expense: Decimal::ZERO,
        net: Decimal::ZERO,
    };
    while let Some(r) = rows.next()? {
        let a_s: String = r.get(0)?;
        let is_income: bool = r.get(1)?;
        let amt = a_s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid amount '{}' in transactions", a_s))?;
        if is_income {
            s.income += amt;
        } else {
            s.expense += amt;
        }
        s.count += 1;
    }
    s.net = s.income - s.expense;
    Ok(s)
}

fn stats(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let from = sub.get_one::<String>("from").map(|d| parse_date(d)).transpose()?;
    let to = sub.get_one::<String>("to").map(|d| parse_date(d)).transpose()?;
    let s = summary(conn, from, to)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        let ccy = Settings::load(conn)?.currency;
        println!(
            "{}",
            pretty_table(
                &["Transactions", "Income", "Expense", "Net"],
                vec![vec![
                    s.count.to_string(),
                    fmt_money(&s.income, &ccy),
                    fmt_money(&s.expense, &ccy),
                    fmt_money(&s.net, &ccy),
                ]]
            )
        );
    }
    Ok(())
}
