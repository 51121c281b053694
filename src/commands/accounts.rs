// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::SchoolError;
use crate::utils::{clear_setting, get_setting, id_for_account, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let taken: i64 = conn.query_row(
                "SELECT COUNT(*) FROM accounts WHERE name=?1",
                params![name],
                |r| r.get(0),
            )?;
            if taken > 0 {
                return Err(SchoolError::AccountExists(name.to_string()).into());
            }
            conn.execute("INSERT INTO accounts(name) VALUES (?1)", params![name])?;
            info!(account = name, "account created");
            println!("Added account '{}'", name);
        }
        Some(("list", _)) => {
            let mut stmt = conn.prepare(
                "SELECT a.name, a.created_at,
                        (SELECT COUNT(*) FROM students s WHERE s.account_id=a.id),
                        (SELECT COUNT(*) FROM teachers t WHERE t.account_id=a.id)
                 FROM accounts a ORDER BY a.name",
            )?;
            let rows = stmt.query_map([], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, i64>(2)?,
                    r.get::<_, i64>(3)?,
                ))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (n, cr, s, t) = row?;
                data.push(vec![n, s.to_string(), t.to_string(), cr]);
            }
            println!(
                "{}",
                pretty_table(&["Name", "Students", "Teachers", "Created"], data)
            );
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let id = id_for_account(conn, name)?;
            conn.execute("DELETE FROM accounts WHERE id=?1", params![id])?;
            if get_setting(conn, "default_account")?.as_deref() == Some(name) {
                clear_setting(conn, "default_account")?;
                info!(account = name, "default_account cleared");
            }
            info!(account = name, "account removed with all its records");
            println!("Removed account '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
