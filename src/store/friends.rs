// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::SqliteStore;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Friend, FriendStatus};
use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};

fn friend_from_row(r: &Row<'_>) -> rusqlite::Result<Friend> {
    Ok(Friend {
        id: r.get(0)?,
        user_id: r.get(1)?,
        friend_id: r.get(2)?,
        status: r.get(3)?,
        created_at: r.get(4)?,
        name: r.get(5)?,
        email: r.get(6)?,
    })
}

// Other party joined on friend_id: rows as seen by their owner.
const OUTGOING_SELECT: &str = "SELECT f.id, f.user_id, f.friend_id, f.status, f.created_at,
        COALESCE(NULLIF(TRIM(u.full_name), ''), u.email), u.email
     FROM friends f JOIN users u ON u.id=f.friend_id";

// Other party joined on user_id: requests as seen by their recipient.
const INCOMING_SELECT: &str = "SELECT f.id, f.user_id, f.friend_id, f.status, f.created_at,
        COALESCE(NULLIF(TRIM(u.full_name), ''), u.email), u.email
     FROM friends f JOIN users u ON u.id=f.user_id";

impl SqliteStore<'_> {
    /// Sends a pending friend request from `user_id` to the user with
    /// `friend_email`.
    pub fn send_friend_request(&self, user_id: i64, friend_email: &str) -> LedgerResult<Friend> {
        self.user_by_id(user_id)?;
        let friend = self
            .user_by_email(friend_email)?
            .ok_or_else(|| LedgerError::not_found("user", friend_email.trim().to_lowercase()))?;
        if friend.id == user_id {
            return Err(LedgerError::invalid("You cannot add yourself as a friend"));
        }
        let existing: Option<FriendStatus> = self
            .conn
            .query_row(
                "SELECT status FROM friends
                 WHERE (user_id=?1 AND friend_id=?2) OR (user_id=?2 AND friend_id=?1)
                 ORDER BY status='accepted' DESC LIMIT 1",
                params![user_id, friend.id],
                |r| r.get(0),
            )
            .optional()?;
        match existing {
            Some(FriendStatus::Accepted) => {
                return Err(LedgerError::invalid(format!(
                    "Already friends with {}",
                    friend.email
                )));
            }
            Some(FriendStatus::Pending) => {
                return Err(LedgerError::invalid(format!(
                    "A friend request with {} is already pending",
                    friend.email
                )));
            }
            None => {}
        }

        self.conn.execute(
            "INSERT INTO friends(user_id, friend_id, status, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, friend.id, FriendStatus::Pending, Utc::now()],
        )?;
        tracing::info!(user_id, friend_id = friend.id, "friend request sent");
        self.outgoing_by_id(self.conn.last_insert_rowid())
    }

    /// Accepts the pending request `requester_id` sent to `user_id`. Both
    /// directions are stored as accepted so either side lists the other.
    pub fn accept_friend(&self, user_id: i64, requester_id: i64) -> LedgerResult<Friend> {
        let request_id: i64 = self
            .conn
            .query_row(
                "SELECT id FROM friends WHERE user_id=?1 AND friend_id=?2 AND status=?3",
                params![requester_id, user_id, FriendStatus::Pending],
                |r| r.get(0),
            )
            .optional()?
            .ok_or_else(|| {
                LedgerError::not_found(
                    "friend request",
                    format!("from {} to {}", requester_id, user_id),
                )
            })?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE friends SET status=?2 WHERE id=?1",
            params![request_id, FriendStatus::Accepted],
        )?;
        tx.execute(
            "INSERT INTO friends(user_id, friend_id, status, created_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, friend_id) DO UPDATE SET status=excluded.status",
            params![user_id, requester_id, FriendStatus::Accepted, Utc::now()],
        )?;
        tx.commit()?;
        tracing::info!(user_id, requester_id, "friend request accepted");

        let sql = format!("{OUTGOING_SELECT} WHERE f.user_id=?1 AND f.friend_id=?2");
        self.conn
            .query_row(&sql, params![user_id, requester_id], friend_from_row)
            .optional()?
            .ok_or_else(|| LedgerError::not_found("friend", requester_id))
    }

    /// Accepted friends of `user_id`.
    pub fn user_friends(&self, user_id: i64) -> LedgerResult<Vec<Friend>> {
        let sql = format!("{OUTGOING_SELECT} WHERE f.user_id=?1 AND f.status=?2 ORDER BY f.id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id, FriendStatus::Accepted], friend_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Pending requests waiting for `user_id` to accept them.
    pub fn friend_requests(&self, user_id: i64) -> LedgerResult<Vec<Friend>> {
        let sql = format!("{INCOMING_SELECT} WHERE f.friend_id=?1 AND f.status=?2 ORDER BY f.id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id, FriendStatus::Pending], friend_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn outgoing_by_id(&self, id: i64) -> LedgerResult<Friend> {
        let sql = format!("{OUTGOING_SELECT} WHERE f.id=?1");
        self.conn
            .query_row(&sql, params![id], friend_from_row)
            .optional()?
            .ok_or_else(|| LedgerError::not_found("friend", id))
    }
}
