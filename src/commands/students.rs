// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::SchoolError;
use crate::models::{Status, Student};
use crate::store::{self, Table};
use crate::utils::{
    arg_str, date_arg_or_today, matches_search, maybe_print_json, parse_date, pretty_table,
    resolve_account,
};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let account_id = resolve_account(conn, sub)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            store::delete_record(conn, Table::Students, account_id, id)?;
            println!("Removed student #{} and their fee payments", id);
        }
        _ => {}
    }
    Ok(())
}

fn status_arg(sub: &clap::ArgMatches) -> Result<Option<Status>> {
    Ok(match sub.get_one::<String>("status") {
        Some(s) => Some(s.parse()?),
        None => None,
    })
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let account_id = resolve_account(conn, sub)?;
    let student = Student {
        id: 0,
        account_id,
        full_name: arg_str(sub, "name").unwrap_or_default(),
        grade: arg_str(sub, "grade").unwrap_or_default(),
        parent_name: arg_str(sub, "parent").unwrap_or_default(),
        parent_phone: arg_str(sub, "phone").unwrap_or_default(),
        enrollment_date: date_arg_or_today(sub, "enrolled")?,
        status: status_arg(sub)?.unwrap_or(Status::Active),
    };
    let id = store::insert_student(conn, &student)?;
    println!(
        "Added student #{} {} ({})",
        id, student.full_name, student.grade
    );
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let account_id = resolve_account(conn, sub)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut student = store::list_students(conn, account_id)?
        .into_iter()
        .find(|s| s.id == id)
        .ok_or(SchoolError::NotFound { kind: "student", id })?;

    if let Some(v) = arg_str(sub, "name") {
        student.full_name = v;
    }
    if let Some(v) = arg_str(sub, "grade") {
        student.grade = v;
    }
    if let Some(v) = arg_str(sub, "parent") {
        student.parent_name = v;
    }
    if let Some(v) = arg_str(sub, "phone") {
        student.parent_phone = v;
    }
    if let Some(v) = sub.get_one::<String>("enrolled") {
        student.enrollment_date = parse_date(v)?.to_string();
    }
    if let Some(st) = status_arg(sub)? {
        student.status = st;
    }
    store::update_student(conn, &student)?;
    println!("Updated student #{} {}", id, student.full_name);
    Ok(())
}

/// Students of the account matching `--search` (name, grade, parent name)
/// and `--status`.
pub fn query_students(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Student>> {
    let account_id = resolve_account(conn, sub)?;
    let term = arg_str(sub, "search").unwrap_or_default();
    let status = status_arg(sub)?;
    Ok(store::list_students(conn, account_id)?
        .into_iter()
        .filter(|s| status.is_none_or(|st| s.status == st))
        .filter(|s| {
            matches_search(
                &term,
                &[s.full_name.as_str(), s.grade.as_str(), s.parent_name.as_str()],
            )
        })
        .collect())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_students(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|s| {
                vec![
                    s.id.to_string(),
                    s.full_name.clone(),
                    s.grade.clone(),
                    s.parent_name.clone(),
                    s.parent_phone.clone(),
                    s.enrollment_date.clone(),
                    s.status.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Name", "Grade", "Parent", "Phone", "Enrolled", "Status"],
                rows,
            )
        );
    }
    Ok(())
}
