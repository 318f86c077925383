// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Group, Role};
use crate::store::SqliteStore;
use crate::utils::{id_for_group, id_for_user, pretty_table};
use anyhow::{anyhow, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    match m.subcommand() {
        Some(("create", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let description = sub.get_one::<String>("description").map(|s| s.as_str());
            let creator = id_for_user(conn, sub.get_one::<String>("creator").unwrap())?;
            let (members, requested) = match sub.get_one::<String>("members") {
                Some(list) => initial_members(&store, list, creator)?,
                None => (Vec::new(), 0),
            };
            let group = store.create_group(name, description, creator, &members)?;
            println!("Created group '{}' (id {})", group.name, group.id);
            if requested > 0 {
                println!(
                    "{} of {} members added",
                    group.member_count - 1,
                    requested
                );
            }
        }
        Some(("list", sub)) => {
            let groups = match sub.get_one::<String>("user") {
                Some(email) => store.user_groups(id_for_user(conn, email)?)?,
                None => store.all_groups()?,
            };
            print_groups(groups);
        }
        Some(("members", sub)) => {
            let group_id = id_for_group(conn, sub.get_one::<String>("group").unwrap())?;
            let rows = store
                .group_members(group_id)?
                .into_iter()
                .map(|m| {
                    vec![
                        m.display_name,
                        m.role.as_str().to_string(),
                        m.joined_at.format("%Y-%m-%d").to_string(),
                    ]
                })
                .collect();
            println!("{}", pretty_table(&["Member", "Role", "Joined"], rows));
        }
        Some(("add-member", sub)) => {
            let group = sub.get_one::<String>("group").unwrap();
            let group_id = id_for_group(conn, group)?;
            let user_id = id_for_user(conn, sub.get_one::<String>("user").unwrap())?;
            let role_raw = sub.get_one::<String>("role").unwrap();
            let role = Role::parse(role_raw).ok_or_else(|| anyhow!("Invalid role '{}'", role_raw))?;
            let member = store.add_member(group_id, user_id, role)?;
            println!(
                "Added {} to '{}' as {}",
                member.display_name,
                group.trim(),
                member.role.as_str()
            );
        }
        Some(("rm-member", sub)) => {
            let group = sub.get_one::<String>("group").unwrap();
            let group_id = id_for_group(conn, group)?;
            let email = sub.get_one::<String>("user").unwrap();
            store.remove_member(group_id, id_for_user(conn, email)?)?;
            println!("Removed {} from '{}'", email.trim(), group.trim());
        }
        Some(("update", sub)) => {
            let group_id = id_for_group(conn, sub.get_one::<String>("group").unwrap())?;
            let name = sub.get_one::<String>("name").map(|s| s.as_str());
            let description = sub.get_one::<String>("description").map(|s| s.as_str());
            let group = store.update_group(group_id, name, description)?;
            println!("Updated group '{}'", group.name);
        }
        _ => {}
    }
    Ok(())
}

/// Resolves `--members` emails. Unknown emails are reported and skipped;
/// the second value counts every distinct email other than the creator's.
fn initial_members(store: &SqliteStore<'_>, list: &str, creator: i64) -> Result<(Vec<i64>, usize)> {
    let mut seen: Vec<String> = Vec::new();
    let mut ids = Vec::new();
    for email in list.split(',').map(|e| e.trim().to_lowercase()).filter(|e| !e.is_empty()) {
        if seen.contains(&email) {
            continue;
        }
        seen.push(email.clone());
        match store.user_by_email(&email)? {
            Some(u) if u.id == creator => {
                seen.pop();
            }
            Some(u) => ids.push(u.id),
            None => eprintln!("warning: no user with email '{}'", email),
        }
    }
    Ok((ids, seen.len()))
}

fn print_groups(groups: Vec<Group>) {
    let rows = groups
        .into_iter()
        .map(|g| {
            vec![
                g.name,
                g.description.unwrap_or_default(),
                g.member_count.to_string(),
                g.created_at.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Group", "Description", "Members", "Created"], rows)
    );
}
