// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{self, Settings, KEY_BALANCE, KEY_CURRENCY, KEY_FANOUT};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let s = Settings::load(conn)?;
            let rows = vec![
                vec![KEY_CURRENCY.to_string(), s.currency],
                vec![KEY_FANOUT.to_string(), s.fanout.as_str().to_string()],
                vec![KEY_BALANCE.to_string(), s.balance.as_str().to_string()],
            ];
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap();
            let value = sub.get_one::<String>("value").unwrap();
            config::set(conn, key, value)?;
            println!("Set {}", key);
        }
        _ => {}
    }
    Ok(())
}
