// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::SqliteStore;
use crate::error::{LedgerError, LedgerResult};
use crate::models::User;
use crate::utils::clean_phone;
use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};

const USER_COLS: &str = "id, email, full_name, phone, created_at";

fn user_from_row(r: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: r.get(0)?,
        email: r.get(1)?,
        full_name: r.get(2)?,
        phone: r.get(3)?,
        created_at: r.get(4)?,
    })
}

impl SqliteStore<'_> {
    /// Adds a user. Emails are stored lower-cased and must be unique;
    /// phones are stored normalised.
    pub fn add_user(
        &self,
        email: &str,
        full_name: Option<&str>,
        phone: Option<&str>,
    ) -> LedgerResult<User> {
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(LedgerError::invalid(format!("Invalid email '{}'", email)));
        }
        if self.user_by_email(&email)?.is_some() {
            return Err(LedgerError::invalid(format!(
                "User '{}' already exists",
                email
            )));
        }
        let full_name = full_name.map(str::trim).filter(|n| !n.is_empty());
        let phone = phone.map(clean_phone).filter(|p| !p.is_empty());
        self.conn.execute(
            "INSERT INTO users(email, full_name, phone, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![email, full_name, phone, Utc::now()],
        )?;
        self.user_by_id(self.conn.last_insert_rowid())
    }

    pub fn user_by_id(&self, user_id: i64) -> LedgerResult<User> {
        let sql = format!("SELECT {USER_COLS} FROM users WHERE id=?1");
        self.conn
            .query_row(&sql, params![user_id], user_from_row)
            .optional()?
            .ok_or_else(|| LedgerError::not_found("user", user_id))
    }

    pub fn user_by_email(&self, email: &str) -> LedgerResult<Option<User>> {
        let sql = format!("SELECT {USER_COLS} FROM users WHERE email=?1");
        Ok(self
            .conn
            .query_row(&sql, params![email.trim().to_lowercase()], user_from_row)
            .optional()?)
    }

    pub fn user_by_phone(&self, phone: &str) -> LedgerResult<Option<User>> {
        let phone = clean_phone(phone);
        if phone.is_empty() {
            return Ok(None);
        }
        let sql = format!("SELECT {USER_COLS} FROM users WHERE phone=?1 ORDER BY id LIMIT 1");
        Ok(self
            .conn
            .query_row(&sql, params![phone], user_from_row)
            .optional()?)
    }

    pub fn list_users(&self) -> LedgerResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLS} FROM users ORDER BY email");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], user_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Case-insensitive substring match on name or email.
    pub fn search_users(&self, query: &str) -> LedgerResult<Vec<User>> {
        let q = query.trim();
        if q.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = format!("%{}%", q.to_lowercase());
        let sql = format!(
            "SELECT {USER_COLS} FROM users
             WHERE lower(COALESCE(full_name,'')) LIKE ?1 OR lower(email) LIKE ?1
             ORDER BY email LIMIT 20"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![pattern], user_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
