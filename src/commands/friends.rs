// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::SqliteStore;
use crate::utils::{id_for_user, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    match m.subcommand() {
        Some(("add", sub)) => {
            let user_id = id_for_user(conn, sub.get_one::<String>("user").unwrap())?;
            let req = store.send_friend_request(user_id, sub.get_one::<String>("friend").unwrap())?;
            println!("Friend request sent to {}", req.name);
        }
        Some(("accept", sub)) => {
            let user_id = id_for_user(conn, sub.get_one::<String>("user").unwrap())?;
            let from = id_for_user(conn, sub.get_one::<String>("from").unwrap())?;
            let friend = store.accept_friend(user_id, from)?;
            println!("You are now friends with {}", friend.name);
        }
        Some(("list", sub)) => {
            let user_id = id_for_user(conn, sub.get_one::<String>("user").unwrap())?;
            let data = if sub.get_flag("pending") {
                store.friend_requests(user_id)?
            } else {
                store.user_friends(user_id)?
            };
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .into_iter()
                    .map(|f| {
                        vec![
                            f.name,
                            f.email,
                            f.status.as_str().to_string(),
                            f.created_at.format("%Y-%m-%d").to_string(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Name", "Email", "Status", "Since"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
