// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::report::{RecordIssue, validate_records};
use crate::store;
use crate::utils::{pretty_table, resolve_account};
use anyhow::Result;
use rusqlite::Connection;
use tracing::warn;

/// Issues for one account plus fee rows whose student is gone or belongs to
/// another account.
pub fn find_issues(conn: &Connection, account_id: i64) -> Result<Vec<RecordIssue>> {
    let fees = store::list_fee_records(conn, account_id)?;
    let expenses = store::list_expense_records(conn, account_id)?;
    let mut issues = validate_records(&fees, &expenses);

    let students = store::student_names(conn, account_id)?;
    for f in fees.iter().filter(|f| !students.contains_key(&f.student_id)) {
        issues.push(RecordIssue {
            kind: "fee",
            id: f.id,
            detail: format!("student #{} not found in this account", f.student_id),
        });
    }
    Ok(issues)
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let account_id = resolve_account(conn, m)?;
    let issues = find_issues(conn, account_id)?;
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
        return Ok(());
    }
    warn!(count = issues.len(), "records need attention");
    let rows = issues
        .into_iter()
        .map(|i| vec![i.kind.to_string(), i.id.to_string(), i.detail])
        .collect();
    println!("{}", pretty_table(&["Kind", "ID", "Issue"], rows));
    Ok(())
}
