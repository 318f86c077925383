// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! SQLite-backed record store for groups, users, chat and the group ledger.

mod chat;
mod friends;
mod groups;
mod ledger;
mod users;

use crate::error::LedgerResult;
use crate::ledger::{ExpenseReceipt, FanoutPolicy, fan_out};
use crate::models::NewExpense;
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use rust_decimal::Decimal;

/// Borrowed view of a database connection implementing every ledger source.
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn conn(&self) -> &'c Connection {
        self.conn
    }

    /// Records an expense with its splits; `currency` labels the chat notice.
    ///
    /// [`FanoutPolicy::Atomic`] runs the whole fan-out in one transaction, so
    /// the store must not already be inside one.
    pub fn record_expense(
        &self,
        req: &NewExpense,
        policy: FanoutPolicy,
        currency: &str,
    ) -> LedgerResult<ExpenseReceipt> {
        match policy {
            FanoutPolicy::Atomic => {
                let tx = self.conn.unchecked_transaction()?;
                let receipt = fan_out(&SqliteStore::new(&tx), req, policy, currency)?;
                tx.commit()?;
                Ok(receipt)
            }
            FanoutPolicy::BestEffort => fan_out(self, req, policy, currency),
        }
    }
}

/// Reads a TEXT money column.
pub(crate) fn amount_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = r.get(idx)?;
    raw.trim()
        .parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// `?,?,?` for an IN list of `n` values.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}
