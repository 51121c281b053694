// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{get_setting, id_for_account, set_setting};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

const KEYS: [&str; 2] = ["currency", "default_account"];

fn known_key(key: &str) -> Result<&str> {
    KEYS.iter()
        .copied()
        .find(|k| *k == key.trim())
        .ok_or_else(|| anyhow!("Unknown setting '{}' (known: {})", key, KEYS.join(", ")))
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let key = known_key(sub.get_one::<String>("key").unwrap())?;
            match get_setting(conn, key)? {
                Some(v) => println!("{} = {}", key, v),
                None => println!("{} is not set", key),
            }
        }
        Some(("set", sub)) => {
            let key = known_key(sub.get_one::<String>("key").unwrap())?;
            let value = sub.get_one::<String>("value").unwrap().trim();
            let value = match key {
                "currency" => value.to_uppercase(),
                _ => {
                    id_for_account(conn, value)?;
                    value.to_string()
                }
            };
            set_setting(conn, key, &value)?;
            println!("{} = {}", key, value);
        }
        _ => {}
    }
    Ok(())
}
