// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::{FanoutPolicy, MemberFailurePolicy};
use anyhow::{anyhow, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

pub const KEY_CURRENCY: &str = "currency";
pub const KEY_FANOUT: &str = "fanout_policy";
pub const KEY_BALANCE: &str = "balance_policy";

/// Persistent preferences stored in the `settings` table.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub currency: String,
    pub fanout: FanoutPolicy,
    pub balance: MemberFailurePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            currency: "INR".to_string(),
            fanout: FanoutPolicy::Atomic,
            balance: MemberFailurePolicy::Skip,
        }
    }
}

impl Settings {
    pub fn load(conn: &Connection) -> Result<Settings> {
        let mut s = Settings::default();
        if let Some(v) = get(conn, KEY_CURRENCY)? {
            s.currency = v;
        }
        if let Some(v) = get(conn, KEY_FANOUT)? {
            s.fanout = FanoutPolicy::parse(&v)
                .ok_or_else(|| anyhow!("Invalid {} '{}' in settings", KEY_FANOUT, v))?;
        }
        if let Some(v) = get(conn, KEY_BALANCE)? {
            s.balance = MemberFailurePolicy::parse(&v)
                .ok_or_else(|| anyhow!("Invalid {} '{}' in settings", KEY_BALANCE, v))?;
        }
        Ok(s)
    }
}

pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

/// Validates and stores a setting. Unknown keys are rejected.
pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let value = value.trim();
    let stored = match key {
        KEY_CURRENCY => {
            if value.is_empty() {
                return Err(anyhow!("Currency cannot be empty"));
            }
            value.to_uppercase()
        }
        KEY_FANOUT => FanoutPolicy::parse(value)
            .ok_or_else(|| anyhow!("Invalid fanout policy '{}' (use atomic|best-effort)", value))?
            .as_str()
            .to_string(),
        KEY_BALANCE => MemberFailurePolicy::parse(value)
            .ok_or_else(|| anyhow!("Invalid balance policy '{}' (use skip|strict)", value))?
            .as_str()
            .to_string(),
        other => return Err(anyhow!("Unknown setting '{}'", other)),
    };
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, stored],
    )?;
    Ok(())
}
