// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::SchoolError;
use crate::models::{FeeRecord, PAYMENT_TYPES};
use crate::report::fee_type_totals;
use crate::store::{self, Table};
use crate::utils::{
    arg_str, date_arg_or_today, fmt_money, get_currency, matches_search, maybe_print_json,
    parse_amount, parse_date, payment_type, pretty_table, resolve_account,
};
use anyhow::Result;
use chrono::Datelike;
use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let account_id = resolve_account(conn, sub)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            store::delete_record(conn, Table::Fees, account_id, id)?;
            println!("Removed fee payment #{}", id);
        }
        Some(("types", sub)) => types(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let account_id = resolve_account(conn, sub)?;
    let fee = FeeRecord {
        id: 0,
        account_id,
        student_id: *sub.get_one::<i64>("student").unwrap(),
        amount: parse_amount(sub.get_one::<String>("amount").unwrap())?,
        payment_type: payment_type(sub.get_one::<String>("type").unwrap())?,
        payment_date: date_arg_or_today(sub, "date")?,
        academic_year: arg_str(sub, "academic-year")
            .unwrap_or_else(|| chrono::Local::now().year().to_string()),
        notes: arg_str(sub, "note").filter(|n| !n.is_empty()),
    };
    let id = store::insert_fee(conn, &fee)?;
    info!(id, student = fee.student_id, amount = %fee.amount, "fee recorded");
    println!(
        "Recorded {} ({}) from student #{} on {}",
        fmt_money(&fee.amount, &get_currency(conn)?),
        fee.payment_type,
        fee.student_id,
        fee.payment_date
    );
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let account_id = resolve_account(conn, sub)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut fee = store::list_fee_records(conn, account_id)?
        .into_iter()
        .find(|f| f.id == id)
        .ok_or(SchoolError::NotFound { kind: "fee", id })?;

    if let Some(&student) = sub.get_one::<i64>("student") {
        fee.student_id = student;
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        fee.amount = parse_amount(a)?;
    }
    if let Some(t) = sub.get_one::<String>("type") {
        fee.payment_type = payment_type(t)?;
    }
    if let Some(d) = sub.get_one::<String>("date") {
        fee.payment_date = parse_date(d)?.to_string();
    }
    if let Some(y) = arg_str(sub, "academic-year") {
        fee.academic_year = y;
    }
    if let Some(n) = arg_str(sub, "note") {
        fee.notes = Some(n).filter(|n| !n.is_empty());
    }
    store::update_fee(conn, &fee)?;
    println!("Updated fee payment #{}", id);
    Ok(())
}

#[derive(Serialize)]
pub struct FeeRow {
    pub id: i64,
    pub date: String,
    pub student: String,
    pub payment_type: String,
    pub amount: String,
    pub academic_year: String,
    pub notes: String,
}

/// Fee payments newest first, filtered by `--search` over student name,
/// payment type and academic year.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<FeeRow>> {
    let account_id = resolve_account(conn, sub)?;
    let names = store::student_names(conn, account_id)?;
    let term = arg_str(sub, "search").unwrap_or_default();
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(usize::MAX);

    Ok(store::list_fee_records(conn, account_id)?
        .into_iter()
        .map(|f| {
            let student = names.get(&f.student_id).cloned().unwrap_or_default();
            (f, student)
        })
        .filter(|(f, student)| {
            matches_search(
                &term,
                &[
                    student.as_str(),
                    f.payment_type.as_str(),
                    f.academic_year.as_str(),
                ],
            )
        })
        .take(limit)
        .map(|(f, student)| FeeRow {
            id: f.id,
            date: f.payment_date,
            student,
            payment_type: f.payment_type,
            amount: f.amount.to_string(),
            academic_year: f.academic_year,
            notes: f.notes.unwrap_or_default(),
        })
        .collect())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.student.clone(),
                    r.payment_type.clone(),
                    r.amount.clone(),
                    r.academic_year.clone(),
                    r.notes.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Student", "Type", "Amount", "Academic year", "Notes"],
                rows,
            )
        );
    }
    Ok(())
}

fn types(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    if sub.get_flag("all") {
        if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &PAYMENT_TYPES)? {
            for t in PAYMENT_TYPES {
                println!("{}", t);
            }
        }
        return Ok(());
    }
    let account_id = resolve_account(conn, sub)?;
    let totals = fee_type_totals(&store::list_fee_records(conn, account_id)?);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &totals)? {
        let ccy = get_currency(conn)?;
        let rows = totals
            .iter()
            .map(|c| vec![c.label.clone(), fmt_money(&c.total, &ccy)])
            .collect();
        println!("{}", pretty_table(&["Payment type", "Collected"], rows));
    }
    Ok(())
}
