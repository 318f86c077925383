// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{SqliteStore, amount_at, placeholders};
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{ExpenseSource, MembershipSource, NoticeSink, SplitSource};
use crate::models::{Expense, GroupMember, GroupMessage, NewExpense, NewMessage, Split};
use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params, params_from_iter};
use rust_decimal::Decimal;

const EXPENSE_COLS: &str =
    "id, group_id, paid_by, title, description, amount, category, date, created_at";
const SPLIT_COLS: &str = "id, expense_id, user_id, amount, is_settled, settled_at";
/// Ids bound per `IN (...)` query, well under SQLite's variable limit.
const MAX_BOUND_IDS: usize = 500;

fn expense_from_row(r: &Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: r.get(0)?,
        group_id: r.get(1)?,
        paid_by: r.get(2)?,
        title: r.get(3)?,
        description: r.get(4)?,
        amount: amount_at(r, 5)?,
        category: r.get(6)?,
        date: r.get(7)?,
        created_at: r.get(8)?,
    })
}

fn split_from_row(r: &Row<'_>) -> rusqlite::Result<Split> {
    Ok(Split {
        id: r.get(0)?,
        expense_id: r.get(1)?,
        user_id: r.get(2)?,
        amount: amount_at(r, 3)?,
        is_settled: r.get(4)?,
        settled_at: r.get(5)?,
    })
}

impl SqliteStore<'_> {
    pub fn expense_by_id(&self, expense_id: i64) -> LedgerResult<Expense> {
        let sql = format!("SELECT {EXPENSE_COLS} FROM expenses WHERE id=?1");
        self.conn
            .query_row(&sql, params![expense_id], expense_from_row)
            .optional()?
            .ok_or_else(|| LedgerError::not_found("expense", expense_id))
    }

    /// All expenses of a group, newest first.
    pub fn group_expenses(&self, group_id: i64) -> LedgerResult<Vec<Expense>> {
        let sql = format!(
            "SELECT {EXPENSE_COLS} FROM expenses WHERE group_id=?1 ORDER BY date DESC, id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![group_id], expense_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn split_by_id(&self, split_id: i64) -> LedgerResult<Split> {
        let sql = format!("SELECT {SPLIT_COLS} FROM expense_splits WHERE id=?1");
        self.conn
            .query_row(&sql, params![split_id], split_from_row)
            .optional()?
            .ok_or_else(|| LedgerError::not_found("split", split_id))
    }
}

impl MembershipSource for SqliteStore<'_> {
    fn members(&self, group_id: i64) -> LedgerResult<Vec<GroupMember>> {
        self.group_members(group_id)
    }
}

impl ExpenseSource for SqliteStore<'_> {
    fn group_expense_ids(&self, group_id: i64) -> LedgerResult<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id FROM expenses WHERE group_id=?1 ORDER BY id")?;
        let rows = stmt.query_map(params![group_id], |r| r.get::<_, i64>(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn expenses_paid_by(&self, group_id: i64, user_id: i64) -> LedgerResult<Vec<Expense>> {
        let sql = format!(
            "SELECT {EXPENSE_COLS} FROM expenses WHERE group_id=?1 AND paid_by=?2 ORDER BY id"
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params![group_id, user_id], expense_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn create_expense(&self, new: &NewExpense) -> LedgerResult<Expense> {
        self.conn.execute(
            "INSERT INTO expenses(group_id, paid_by, title, description, amount, category, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                new.group_id,
                new.paid_by,
                new.title,
                new.description,
                new.amount.to_string(),
                new.category,
                new.date,
                Utc::now()
            ],
        )?;
        self.expense_by_id(self.conn.last_insert_rowid())
    }
}

impl SplitSource for SqliteStore<'_> {
    fn splits_owed_by(&self, user_id: i64, expense_ids: &[i64]) -> LedgerResult<Vec<Split>> {
        let mut out = Vec::new();
        for chunk in expense_ids.chunks(MAX_BOUND_IDS) {
            let sql = format!(
                "SELECT {SPLIT_COLS} FROM expense_splits WHERE user_id=? AND expense_id IN ({})",
                placeholders(chunk.len())
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let args = std::iter::once(user_id).chain(chunk.iter().copied());
            let rows = stmt.query_map(params_from_iter(args), split_from_row)?;
            for split in rows {
                out.push(split?);
            }
        }
        out.sort_by_key(|s| s.id);
        Ok(out)
    }

    fn splits_for_expenses(&self, expense_ids: &[i64]) -> LedgerResult<Vec<Split>> {
        let mut out = Vec::new();
        for chunk in expense_ids.chunks(MAX_BOUND_IDS) {
            let sql = format!(
                "SELECT {SPLIT_COLS} FROM expense_splits WHERE expense_id IN ({})",
                placeholders(chunk.len())
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), split_from_row)?;
            for split in rows {
                out.push(split?);
            }
        }
        out.sort_by_key(|s| (s.expense_id, s.id));
        Ok(out)
    }

    fn create_split(&self, expense_id: i64, user_id: i64, amount: Decimal) -> LedgerResult<Split> {
        self.conn.execute(
            "INSERT INTO expense_splits(expense_id, user_id, amount, is_settled, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)",
            params![expense_id, user_id, amount.to_string(), Utc::now()],
        )?;
        self.split_by_id(self.conn.last_insert_rowid())
    }

    fn settle_split(&self, split_id: i64) -> LedgerResult<Split> {
        let changed = self.conn.execute(
            "UPDATE expense_splits SET is_settled=1, settled_at=COALESCE(settled_at, ?2) WHERE id=?1",
            params![split_id, Utc::now()],
        )?;
        if changed == 0 {
            return Err(LedgerError::not_found("split", split_id));
        }
        self.split_by_id(split_id)
    }
}

impl NoticeSink for SqliteStore<'_> {
    fn post_notice(&self, msg: &NewMessage) -> LedgerResult<GroupMessage> {
        self.insert_message(msg)
    }
}
