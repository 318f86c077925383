// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::MessageKind;
use crate::store::SqliteStore;
use crate::utils::{id_for_group, id_for_user, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    match m.subcommand() {
        Some(("send", sub)) => {
            let group_id = id_for_group(conn, sub.get_one::<String>("group").unwrap())?;
            let sender = id_for_user(conn, sub.get_one::<String>("sender").unwrap())?;
            let msg = store.send_message(group_id, sender, sub.get_one::<String>("message").unwrap())?;
            println!("Message {} sent", msg.id);
        }
        Some(("list", sub)) => {
            let group_id = id_for_group(conn, sub.get_one::<String>("group").unwrap())?;
            let messages = store.group_messages(group_id)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &messages)? {
                let rows = messages
                    .into_iter()
                    .map(|m| {
                        let text = match m.kind {
                            MessageKind::Text => m.message,
                            other => format!("[{}] {}", other.as_str(), m.message),
                        };
                        vec![
                            m.created_at.format("%Y-%m-%d %H:%M").to_string(),
                            m.sender_name.unwrap_or_else(|| format!("user {}", m.sender_id)),
                            text,
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["When", "From", "Message"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
