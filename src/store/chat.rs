// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::SqliteStore;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{GroupMessage, MessageKind, NewMessage};
use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};

const MESSAGE_SELECT: &str = "SELECT m.id, m.group_id, m.sender_id,
        COALESCE(NULLIF(TRIM(u.full_name), ''), u.email),
        m.message, m.message_type, m.expense_id, m.created_at
     FROM group_messages m LEFT JOIN users u ON u.id=m.sender_id";

fn message_from_row(r: &Row<'_>) -> rusqlite::Result<GroupMessage> {
    Ok(GroupMessage {
        id: r.get(0)?,
        group_id: r.get(1)?,
        sender_id: r.get(2)?,
        sender_name: r.get(3)?,
        message: r.get(4)?,
        kind: r.get(5)?,
        expense_id: r.get(6)?,
        created_at: r.get(7)?,
    })
}

impl SqliteStore<'_> {
    /// Sends a plain text message. The sender must belong to the group.
    pub fn send_message(
        &self,
        group_id: i64,
        sender_id: i64,
        text: &str,
    ) -> LedgerResult<GroupMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(LedgerError::invalid("Message cannot be empty"));
        }
        if !self.is_member(group_id, sender_id)? {
            return Err(LedgerError::invalid(format!(
                "User {} is not a member of group {}",
                sender_id, group_id
            )));
        }
        self.insert_message(&NewMessage {
            group_id,
            sender_id,
            message: text.to_string(),
            kind: MessageKind::Text,
            expense_id: None,
        })
    }

    pub(crate) fn insert_message(&self, msg: &NewMessage) -> LedgerResult<GroupMessage> {
        self.conn.execute(
            "INSERT INTO group_messages(group_id, sender_id, message, message_type, expense_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                msg.group_id,
                msg.sender_id,
                msg.message,
                msg.kind,
                msg.expense_id,
                Utc::now()
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        let sql = format!("{MESSAGE_SELECT} WHERE m.id=?1");
        self.conn
            .query_row(&sql, params![id], message_from_row)
            .optional()?
            .ok_or_else(|| LedgerError::not_found("message", id))
    }

    /// Messages of a group, oldest first.
    pub fn group_messages(&self, group_id: i64) -> LedgerResult<Vec<GroupMessage>> {
        let sql = format!("{MESSAGE_SELECT} WHERE m.group_id=?1 ORDER BY m.id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![group_id], message_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
