// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::SqliteStore;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Group, GroupMember, Role};
use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};

const GROUP_COLS: &str = "g.id, g.name, g.description, g.created_by, g.created_at, g.updated_at,
     (SELECT COUNT(*) FROM group_members gm WHERE gm.group_id=g.id)";

fn group_from_row(r: &Row<'_>) -> rusqlite::Result<Group> {
    Ok(Group {
        id: r.get(0)?,
        name: r.get(1)?,
        description: r.get(2)?,
        created_by: r.get(3)?,
        created_at: r.get(4)?,
        updated_at: r.get(5)?,
        member_count: r.get(6)?,
    })
}

fn member_from_row(r: &Row<'_>) -> rusqlite::Result<GroupMember> {
    Ok(GroupMember {
        id: r.get(0)?,
        group_id: r.get(1)?,
        user_id: r.get(2)?,
        role: r.get(3)?,
        joined_at: r.get(4)?,
        display_name: r.get(5)?,
    })
}

impl SqliteStore<'_> {
    /// Creates a group, makes `creator` its admin and adds `members` as
    /// plain members, in one transaction.
    ///
    /// Unknown users, repeats and the creator are left out of `members`;
    /// the returned `member_count` tells how many were actually added.
    pub fn create_group(
        &self,
        name: &str,
        description: Option<&str>,
        creator: i64,
        members: &[i64],
    ) -> LedgerResult<Group> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::invalid("Group name cannot be empty"));
        }
        if self.group_by_name(name)?.is_some() {
            return Err(LedgerError::invalid(format!(
                "Group '{}' already exists",
                name
            )));
        }
        self.user_by_id(creator)?;
        let description = description.map(str::trim).filter(|d| !d.is_empty());
        let mut initial: Vec<i64> = Vec::with_capacity(members.len());
        for &user_id in members {
            if user_id == creator || initial.contains(&user_id) {
                continue;
            }
            match self.user_by_id(user_id) {
                Ok(_) => initial.push(user_id),
                Err(LedgerError::NotFound { .. }) => {
                    tracing::warn!(user_id, "unknown user left out of new group");
                }
                Err(err) => return Err(err),
            }
        }
        let now = Utc::now();

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO expense_groups(name, description, created_by, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![name, description, creator, now],
        )?;
        let group_id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO group_members(group_id, user_id, role, joined_at) VALUES (?1, ?2, ?3, ?4)",
            params![group_id, creator, Role::Admin, now],
        )?;
        for user_id in &initial {
            tx.execute(
                "INSERT INTO group_members(group_id, user_id, role, joined_at) VALUES (?1, ?2, ?3, ?4)",
                params![group_id, user_id, Role::Member, now],
            )?;
        }
        tx.commit()?;
        tracing::info!(group_id, creator, members = initial.len(), "group created");
        self.group_by_id(group_id)
    }

    pub fn group_by_id(&self, group_id: i64) -> LedgerResult<Group> {
        let sql = format!("SELECT {GROUP_COLS} FROM expense_groups g WHERE g.id=?1");
        self.conn
            .query_row(&sql, params![group_id], group_from_row)
            .optional()?
            .ok_or_else(|| LedgerError::not_found("group", group_id))
    }

    pub fn group_by_name(&self, name: &str) -> LedgerResult<Option<Group>> {
        let sql = format!("SELECT {GROUP_COLS} FROM expense_groups g WHERE g.name=?1");
        Ok(self
            .conn
            .query_row(&sql, params![name.trim()], group_from_row)
            .optional()?)
    }

    pub fn all_groups(&self) -> LedgerResult<Vec<Group>> {
        let sql = format!("SELECT {GROUP_COLS} FROM expense_groups g ORDER BY g.name");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], group_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Groups `user_id` belongs to, most recently created first.
    pub fn user_groups(&self, user_id: i64) -> LedgerResult<Vec<Group>> {
        let sql = format!(
            "SELECT {GROUP_COLS} FROM expense_groups g
             JOIN group_members m ON m.group_id=g.id
             WHERE m.user_id=?1
             ORDER BY g.created_at DESC, g.id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], group_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn group_members(&self, group_id: i64) -> LedgerResult<Vec<GroupMember>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT m.id, m.group_id, m.user_id, m.role, m.joined_at,
                    COALESCE(NULLIF(TRIM(u.full_name), ''), u.email)
             FROM group_members m JOIN users u ON u.id=m.user_id
             WHERE m.group_id=?1 ORDER BY m.id",
        )?;
        let rows = stmt.query_map(params![group_id], member_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn is_member(&self, group_id: i64, user_id: i64) -> LedgerResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM group_members WHERE group_id=?1 AND user_id=?2",
                params![group_id, user_id],
                |r| r.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn add_member(&self, group_id: i64, user_id: i64, role: Role) -> LedgerResult<GroupMember> {
        self.group_by_id(group_id)?;
        self.user_by_id(user_id)?;
        if self.is_member(group_id, user_id)? {
            return Err(LedgerError::invalid(format!(
                "User {} is already a member of group {}",
                user_id, group_id
            )));
        }
        self.conn.execute(
            "INSERT INTO group_members(group_id, user_id, role, joined_at) VALUES (?1, ?2, ?3, ?4)",
            params![group_id, user_id, role, Utc::now()],
        )?;
        let member_id = self.conn.last_insert_rowid();
        tracing::info!(group_id, user_id, role = role.as_str(), "member added");
        self.group_members(group_id)?
            .into_iter()
            .find(|m| m.id == member_id)
            .ok_or_else(|| LedgerError::not_found("member", member_id))
    }

    pub fn remove_member(&self, group_id: i64, user_id: i64) -> LedgerResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM group_members WHERE group_id=?1 AND user_id=?2",
            params![group_id, user_id],
        )?;
        if changed == 0 {
            return Err(LedgerError::not_found(
                "member",
                format!("{} in group {}", user_id, group_id),
            ));
        }
        tracing::info!(group_id, user_id, "member removed");
        Ok(())
    }

    /// Renames and/or re-describes a group. An empty description clears it.
    pub fn update_group(
        &self,
        group_id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> LedgerResult<Group> {
        let current = self.group_by_id(group_id)?;
        let name = match name.map(str::trim) {
            Some("") => return Err(LedgerError::invalid("Group name cannot be empty")),
            Some(n) => n.to_string(),
            None => current.name,
        };
        if let Some(other) = self.group_by_name(&name)? {
            if other.id != group_id {
                return Err(LedgerError::invalid(format!(
                    "Group '{}' already exists",
                    name
                )));
            }
        }
        let description = match description.map(str::trim) {
            Some("") => None,
            Some(d) => Some(d.to_string()),
            None => current.description,
        };
        self.conn.execute(
            "UPDATE expense_groups SET name=?2, description=?3, updated_at=?4 WHERE id=?1",
            params![group_id, name, description, Utc::now()],
        )?;
        self.group_by_id(group_id)
    }
}
