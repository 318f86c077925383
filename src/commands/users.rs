// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::User;
use crate::store::SqliteStore;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    match m.subcommand() {
        Some(("add", sub)) => {
            let email = sub.get_one::<String>("email").unwrap();
            let name = sub.get_one::<String>("name").map(|s| s.as_str());
            let phone = sub.get_one::<String>("phone").map(|s| s.as_str());
            let user = store.add_user(email, name, phone)?;
            println!("Added user '{}' ({})", user.display_name(), user.email);
        }
        Some(("list", _)) => print_users(store.list_users()?),
        Some(("search", sub)) => {
            let q = sub.get_one::<String>("query").unwrap();
            print_users(store.search_users(q)?);
        }
        _ => {}
    }
    Ok(())
}

fn print_users(users: Vec<User>) {
    let rows = users
        .into_iter()
        .map(|u| {
            vec![
                u.email,
                u.full_name.unwrap_or_default(),
                u.phone.unwrap_or_default(),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Email", "Name", "Phone"], rows));
}
