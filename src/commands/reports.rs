// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::report::{self, YearlyReport};
use crate::store;
use crate::utils::{
    fmt_money, fmt_percent, get_currency, maybe_print_json, parse_year, pretty_table,
    resolve_account,
};
use anyhow::Result;
use rusqlite::Connection;
use tracing::debug;

pub const MONTHLY_HEADERS: [&str; 5] = ["Month", "Revenue", "Expenses", "Profit", "Status"];
pub const SUMMARY_HEADERS: [&str; 2] = ["Item", "Value"];
pub const ANALYSIS_HEADERS: [&str; 3] = ["Analysis", "Month", "Value"];

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("yearly", sub)) => yearly(conn, sub)?,
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("years", sub)) => years(conn, sub)?,
        Some(("dashboard", sub)) => dashboard(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Fetches the account's full record set and aggregates it for `--year`.
pub fn load_yearly_report(conn: &Connection, sub: &clap::ArgMatches) -> Result<YearlyReport> {
    let account_id = resolve_account(conn, sub)?;
    let year = parse_year(sub.get_one::<String>("year").unwrap())?;
    let fees = store::list_fee_records(conn, account_id)?;
    let expenses = store::list_expense_records(conn, account_id)?;
    debug!(
        account_id,
        year,
        fees = fees.len(),
        expenses = expenses.len(),
        "aggregating"
    );
    Ok(report::compute_yearly_report(account_id, &fees, &expenses, year))
}

fn signed(d: &rust_decimal::Decimal) -> String {
    if d.is_sign_negative() && !d.is_zero() {
        format!("{:.2}", d.round_dp(2))
    } else {
        format!("+{:.2}", d.round_dp(2))
    }
}

/// One row per month plus nothing else; amounts with two decimals.
pub fn monthly_rows(r: &YearlyReport) -> Vec<Vec<String>> {
    r.months
        .iter()
        .map(|m| {
            vec![
                m.month_label.to_string(),
                format!("{:.2}", m.revenue.round_dp(2)),
                format!("{:.2}", m.expenses.round_dp(2)),
                format!("{:.2}", m.profit.round_dp(2)),
                m.status().as_str().to_string(),
            ]
        })
        .collect()
}

pub fn summary_rows(r: &YearlyReport) -> Vec<Vec<String>> {
    let s = &r.summary;
    let two = |d: &rust_decimal::Decimal| format!("{:.2}", d.round_dp(2));
    vec![
        vec!["Total revenue".into(), two(&s.total_revenue)],
        vec!["Total expenses".into(), two(&s.total_expenses)],
        vec!["Net profit".into(), two(&s.net_profit)],
        vec!["Profit margin".into(), fmt_percent(&s.profit_margin)],
        vec!["Average monthly revenue".into(), two(&s.average_monthly_revenue)],
        vec!["Average monthly expenses".into(), two(&s.average_monthly_expenses)],
        vec!["Average monthly profit".into(), two(&s.average_monthly_profit)],
    ]
}

pub fn analysis_rows(r: &YearlyReport) -> Vec<Vec<String>> {
    let s = &r.summary;
    vec![
        vec![
            "Best month".into(),
            s.best_month.month_label.into(),
            format!("{:.2}", s.best_month.profit.round_dp(2)),
        ],
        vec![
            "Worst month".into(),
            s.worst_month.month_label.into(),
            format!("{:.2}", s.worst_month.profit.round_dp(2)),
        ],
        vec![
            "Profitable months".into(),
            String::new(),
            s.profitable_month_count.to_string(),
        ],
        vec![
            "Loss months".into(),
            String::new(),
            s.loss_month_count.to_string(),
        ],
    ]
}

fn yearly(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let r = load_yearly_report(conn, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &r.months)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let mut rows: Vec<Vec<String>> = r
        .months
        .iter()
        .map(|m| {
            vec![
                m.month_label.to_string(),
                fmt_money(&m.revenue, &ccy),
                fmt_money(&m.expenses, &ccy),
                signed(&m.profit),
                m.status().as_str().to_string(),
            ]
        })
        .collect();
    rows.push(vec![
        "Total".into(),
        fmt_money(&r.summary.total_revenue, &ccy),
        fmt_money(&r.summary.total_expenses, &ccy),
        signed(&r.summary.net_profit),
        String::new(),
    ]);
    println!("Monthly report for {}", r.summary.year);
    println!("{}", pretty_table(&MONTHLY_HEADERS, rows));
    Ok(())
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let r = load_yearly_report(conn, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &r.summary)? {
        return Ok(());
    }
    println!("Summary for {}", r.summary.year);
    println!("{}", pretty_table(&SUMMARY_HEADERS, summary_rows(&r)));
    println!("{}", pretty_table(&ANALYSIS_HEADERS, analysis_rows(&r)));
    Ok(())
}

fn years(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let account_id = resolve_account(conn, sub)?;
    let fees = store::list_fee_records(conn, account_id)?;
    let expenses = store::list_expense_records(conn, account_id)?;
    let mut years = report::available_years(&fees, &expenses);
    if years.is_empty() {
        use chrono::Datelike;
        years.push(chrono::Local::now().year());
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &years)? {
        for y in years {
            println!("{}", y);
        }
    }
    Ok(())
}

fn dashboard(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let account_id = resolve_account(conn, sub)?;
    let stats = report::dashboard_stats(
        &store::list_students(conn, account_id)?,
        &store::list_fee_records(conn, account_id)?,
        &store::list_expense_records(conn, account_id)?,
    );
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &stats)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let rows = vec![
        vec!["Students".into(), stats.total_students.to_string()],
        vec!["Active students".into(), stats.active_students.to_string()],
        vec!["Revenue".into(), fmt_money(&stats.total_revenue, &ccy)],
        vec!["Expenses".into(), fmt_money(&stats.total_expenses, &ccy)],
        vec!["Net profit".into(), fmt_money(&stats.net_profit, &ccy)],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}
