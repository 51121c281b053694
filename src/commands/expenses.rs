// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::SchoolError;
use crate::models::{EXPENSE_CATEGORIES, ExpenseRecord};
use crate::report::expense_category_totals;
use crate::store::{self, Table};
use crate::utils::{
    arg_str, date_arg_or_today, expense_category, fmt_money, get_currency, matches_search,
    maybe_print_json, parse_amount, parse_date, pretty_table, resolve_account,
};
use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let account_id = resolve_account(conn, sub)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            store::delete_record(conn, Table::Expenses, account_id, id)?;
            println!("Removed expense #{}", id);
        }
        Some(("categories", sub)) => categories(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let account_id = resolve_account(conn, sub)?;
    let expense = ExpenseRecord {
        id: 0,
        account_id,
        category: expense_category(sub.get_one::<String>("category").unwrap())?,
        amount: parse_amount(sub.get_one::<String>("amount").unwrap())?,
        description: arg_str(sub, "description").unwrap_or_default(),
        expense_date: date_arg_or_today(sub, "date")?,
        notes: arg_str(sub, "note").filter(|n| !n.is_empty()),
    };
    let id = store::insert_expense(conn, &expense)?;
    info!(id, category = %expense.category, amount = %expense.amount, "expense recorded");
    println!(
        "Recorded expense {} ({}) on {}",
        fmt_money(&expense.amount, &get_currency(conn)?),
        expense.category,
        expense.expense_date
    );
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let account_id = resolve_account(conn, sub)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut expense = store::list_expense_records(conn, account_id)?
        .into_iter()
        .find(|e| e.id == id)
        .ok_or(SchoolError::NotFound { kind: "expense", id })?;

    if let Some(c) = sub.get_one::<String>("category") {
        expense.category = expense_category(c)?;
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        expense.amount = parse_amount(a)?;
    }
    if let Some(d) = arg_str(sub, "description") {
        expense.description = d;
    }
    if let Some(d) = sub.get_one::<String>("date") {
        expense.expense_date = parse_date(d)?.to_string();
    }
    if let Some(n) = arg_str(sub, "note") {
        expense.notes = Some(n).filter(|n| !n.is_empty());
    }
    store::update_expense(conn, &expense)?;
    println!("Updated expense #{}", id);
    Ok(())
}

/// Expenses newest first, filtered by `--search` over category and
/// description.
pub fn query_expenses(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<ExpenseRecord>> {
    let account_id = resolve_account(conn, sub)?;
    let term = arg_str(sub, "search").unwrap_or_default();
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(usize::MAX);
    Ok(store::list_expense_records(conn, account_id)?
        .into_iter()
        .filter(|e| matches_search(&term, &[e.category.as_str(), e.description.as_str()]))
        .take(limit)
        .collect())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_expenses(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|e| {
                vec![
                    e.id.to_string(),
                    e.expense_date.clone(),
                    e.category.clone(),
                    e.description.clone(),
                    e.amount.to_string(),
                    e.notes.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Category", "Description", "Amount", "Notes"],
                rows,
            )
        );
    }
    Ok(())
}

fn categories(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    if sub.get_flag("all") {
        if !maybe_print_json(
            sub.get_flag("json"),
            sub.get_flag("jsonl"),
            &EXPENSE_CATEGORIES,
        )? {
            for c in EXPENSE_CATEGORIES {
                println!("{}", c);
            }
        }
        return Ok(());
    }
    let account_id = resolve_account(conn, sub)?;
    let totals = expense_category_totals(&store::list_expense_records(conn, account_id)?);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &totals)? {
        let ccy = get_currency(conn)?;
        let rows = totals
            .iter()
            .map(|c| vec![c.label.clone(), fmt_money(&c.total, &ccy)])
            .collect();
        println!("{}", pretty_table(&["Category", "Spent"], rows));
    }
    Ok(())
}
