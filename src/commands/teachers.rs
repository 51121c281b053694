// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::SchoolError;
use crate::models::{Status, Teacher};
use crate::report::teacher_stats;
use crate::store::{self, Table};
use crate::utils::{
    arg_str, date_arg_or_today, fmt_money, get_currency, matches_search, maybe_print_json,
    parse_amount, parse_date, pretty_table, resolve_account,
};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub const PAGE_SIZE: usize = 10;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let account_id = resolve_account(conn, sub)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            store::delete_record(conn, Table::Teachers, account_id, id)?;
            println!("Removed teacher #{}", id);
        }
        Some(("stats", sub)) => stats(conn, sub)?,
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
    let salary = match sub.get_one::<String>("salary") {
        Some(s) => parse_amount(s)?,
        None => Decimal::ZERO,
    };
    let teacher = Teacher {
        id: 0,
        account_id,
        name: arg_str(sub, "name").unwrap_or_default(),
        phone: arg_str(sub, "phone").unwrap_or_default(),
        email: arg_str(sub, "email").unwrap_or_default(),
        specialization: arg_str(sub, "specialization").unwrap_or_default(),
        salary,
        hire_date: date_arg_or_today(sub, "hired")?,
        status: status_arg(sub)?.unwrap_or(Status::Active),
        address: arg_str(sub, "address").unwrap_or_default(),
        qualifications: arg_str(sub, "qualifications").unwrap_or_default(),
        notes: arg_str(sub, "note").filter(|n| !n.is_empty()),
    };
    let id = store::insert_teacher(conn, &teacher)?;
    println!("Added teacher #{} {}", id, teacher.name);
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let account_id = resolve_account(conn, sub)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut t = store::list_teachers(conn, account_id)?
        .into_iter()
        .find(|t| t.id == id)
        .ok_or(SchoolError::NotFound { kind: "teacher", id })?;

    for (field, slot) in [
        ("name", &mut t.name),
        ("phone", &mut t.phone),
        ("email", &mut t.email),
        ("specialization", &mut t.specialization),
        ("address", &mut t.address),
        ("qualifications", &mut t.qualifications),
    ] {
        if let Some(v) = arg_str(sub, field) {
            *slot = v;
        }
    }
    if let Some(s) = sub.get_one::<String>("salary") {
        t.salary = parse_amount(s)?;
    }
    if let Some(v) = sub.get_one::<String>("hired") {
        t.hire_date = parse_date(v)?.to_string();
    }
    if let Some(st) = status_arg(sub)? {
        t.status = st;
    }
    if let Some(n) = arg_str(sub, "note") {
        t.notes = Some(n).filter(|n| !n.is_empty());
    }
    store::update_teacher(conn, &t)?;
    println!("Updated teacher #{} {}", id, t.name);
    Ok(())
}

/// Teachers matching `--search` (name, phone, email, specialization) and
/// `--status`, cut to `--page` when given.
pub fn query_teachers(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Teacher>> {
    let account_id = resolve_account(conn, sub)?;
    let term = arg_str(sub, "search").unwrap_or_default();
    let status = status_arg(sub)?;
    let matching = store::list_teachers(conn, account_id)?
        .into_iter()
        .filter(|t| status.is_none_or(|st| t.status == st))
        .filter(|t| {
            matches_search(
                &term,
                &[
                    t.name.as_str(),
                    t.phone.as_str(),
                    t.email.as_str(),
                    t.specialization.as_str(),
                ],
            )
        });
    Ok(match sub.get_one::<usize>("page") {
        Some(&page) => matching
            .skip(page.saturating_sub(1).saturating_mul(PAGE_SIZE))
            .take(PAGE_SIZE)
            .collect(),
        None => matching.collect(),
    })
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_teachers(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let ccy = get_currency(conn)?;
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.name.clone(),
                    t.specialization.clone(),
                    t.phone.clone(),
                    t.email.clone(),
                    fmt_money(&t.salary, &ccy),
                    t.hire_date.clone(),
                    t.status.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "ID",
                    "Name",
                    "Specialization",
                    "Phone",
                    "Email",
                    "Salary",
                    "Hired",
                    "Status"
                ],
                rows,
            )
        );
    }
    Ok(())
}

fn stats(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let account_id = resolve_account(conn, sub)?;
    let s = teacher_stats(&store::list_teachers(conn, account_id)?);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        let ccy = get_currency(conn)?;
        let rows = vec![
            vec!["Teachers".to_string(), s.total_teachers.to_string()],
            vec!["Active".to_string(), s.active_teachers.to_string()],
            vec!["Monthly salaries".to_string(), fmt_money(&s.total_salaries, &ccy)],
        ];
        println!("{}", pretty_table(&["Metric", "Value"], rows));
    }
    Ok(())
}
