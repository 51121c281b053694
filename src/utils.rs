// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::error::SchoolError;
use crate::models::{EXPENSE_CATEGORIES, PAYMENT_TYPES};

pub const DEFAULT_CURRENCY: &str = "EGP";

/// Trimmed value of an optional string argument.
pub fn arg_str(sub: &clap::ArgMatches, name: &str) -> Option<String> {
    sub.get_one::<String>(name).map(|s| s.trim().to_string())
}

/// Date argument as stored text, today when absent.
pub fn date_arg_or_today(sub: &clap::ArgMatches, name: &str) -> Result<String> {
    match sub.get_one::<String>(name) {
        Some(s) => Ok(parse_date(s)?.to_string()),
        None => Ok(chrono::Local::now().date_naive().to_string()),
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Largest single amount accepted from the command line.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Amounts entered for fees, expenses and salaries.
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    if d < Decimal::ZERO {
        return Err(SchoolError::NegativeAmount(s.trim().to_string()).into());
    }
    if d > Decimal::from(MAX_AMOUNT) {
        return Err(SchoolError::AmountTooLarge(s.trim().to_string()).into());
    }
    Ok(d)
}

pub fn parse_year(s: &str) -> Result<i32> {
    let t = s.trim();
    if t.len() != 4 || !t.chars().all(|c| c.is_ascii_digit()) {
        return Err(SchoolError::InvalidYear(s.to_string()).into());
    }
    Ok(t.parse()?)
}

pub fn payment_type(s: &str) -> Result<String> {
    let t = s.trim();
    PAYMENT_TYPES
        .iter()
        .find(|p| p.eq_ignore_ascii_case(t))
        .map(|p| p.to_string())
        .ok_or_else(|| SchoolError::UnknownPaymentType(t.to_string()).into())
}

pub fn expense_category(s: &str) -> Result<String> {
    let t = s.trim();
    EXPENSE_CATEGORIES
        .iter()
        .find(|c| c.eq_ignore_ascii_case(t))
        .map(|c| c.to_string())
        .ok_or_else(|| SchoolError::UnknownCategory(t.to_string()).into())
}

/// Case-insensitive substring match against any of `fields`. An empty term
/// matches everything.
pub fn matches_search(term: &str, fields: &[&str]) -> bool {
    let needle = term.trim().to_lowercase();
    needle.is_empty() || fields.iter().any(|f| f.to_lowercase().contains(&needle))
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{:.2} {}", d.round_dp(2), ccy)
}

pub fn fmt_percent(fraction: &Decimal) -> String {
    format!("{:.1}%", (fraction * Decimal::ONE_HUNDRED).round_dp(1))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn id_for_account(conn: &Connection, name: &str) -> Result<i64> {
    let id: Option<i64> = conn
        .query_row(
            "SELECT id FROM accounts WHERE name=?1",
            params![name.trim()],
            |r| r.get(0),
        )
        .optional()?;
    id.ok_or_else(|| SchoolError::AccountNotFound(name.trim().to_string()).into())
}

/// The account a command works on: `--account`, else the `default_account`
/// setting.
pub fn resolve_account(conn: &Connection, sub: &clap::ArgMatches) -> Result<i64> {
    let name = match sub.get_one::<String>("account") {
        Some(n) => n.clone(),
        None => get_setting(conn, "default_account")?.ok_or(SchoolError::NoAccount)?,
    };
    id_for_account(conn, &name)
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn clear_setting(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM settings WHERE key=?1", params![key])?;
    Ok(())
}

pub fn get_currency(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, "currency")?.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()))
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_must_be_four_digits() {
        assert_eq!(parse_year(" 2024 ").unwrap(), 2024);
        assert!(parse_year("24").is_err());
        assert!(parse_year("20x4").is_err());
        assert!(parse_year("-202").is_err());
    }

    #[test]
    fn amounts_reject_negatives() {
        assert_eq!(parse_amount("12.50").unwrap(), Decimal::new(1250, 2));
        let err = parse_amount("-1").unwrap_err();
        assert!(err.to_string().contains("must not be negative"));
    }

    #[test]
    fn amounts_above_ceiling_are_rejected() {
        assert_eq!(
            parse_amount("1000000000000").unwrap(),
            Decimal::from(MAX_AMOUNT)
        );
        let err = parse_amount("1000000000000.01").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SchoolError>(),
            Some(SchoolError::AmountTooLarge(_))
        ));
        assert!(parse_amount("79228162514264337593543950335").is_err());
    }

    #[test]
    fn labels_are_canonicalised() {
        assert_eq!(payment_type(" bus FEES ").unwrap(), "Bus fees");
        assert_eq!(expense_category("stationery").unwrap(), "Stationery");
        assert!(payment_type("Lunch").is_err());
    }

    #[test]
    fn search_is_case_insensitive() {
        assert!(matches_search("ali", &["Grade 3", "Sara ALI"]));
        assert!(matches_search("  ", &["anything"]));
        assert!(!matches_search("zzz", &["Grade 3"]));
    }

    #[test]
    fn percent_rounds_to_one_place() {
        let f = Decimal::new(8, 1);
        assert_eq!(fmt_percent(&f), "80.0%");
        assert_eq!(fmt_money(&Decimal::new(1234567, 3), "EGP"), "1234.57 EGP");
    }
}
