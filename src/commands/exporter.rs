// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::reports::{
    ANALYSIS_HEADERS, MONTHLY_HEADERS, SUMMARY_HEADERS, analysis_rows, load_yearly_report,
    monthly_rows, summary_rows,
};
use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("report", sub)) => export_report(conn, sub),
        _ => Ok(()),
    }
}

struct Sheet {
    name: &'static str,
    headers: &'static [&'static str],
    rows: Vec<Vec<String>>,
}

fn sheet_path(out: &Path, sheet: &str) -> PathBuf {
    let stem = out
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "report".into());
    out.with_file_name(format!("{}_{}.csv", stem, sheet))
}

fn write_csv(path: &Path, sheet: &Sheet) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Create {}", path.display()))?;
    wtr.write_record(sheet.headers)?;
    for r in &sheet.rows {
        wtr.write_record(r)?;
    }
    wtr.flush()?;
    Ok(())
}

fn sheet_json(sheet: &Sheet) -> Value {
    let rows = sheet
        .rows
        .iter()
        .map(|r| {
            let obj: Map<String, Value> = sheet
                .headers
                .iter()
                .zip(r)
                .map(|(h, v)| (h.to_string(), Value::String(v.clone())))
                .collect();
            Value::Object(obj)
        })
        .collect();
    Value::Array(rows)
}

fn export_report(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let kind = sub.get_one::<String>("kind").unwrap().as_str();
    let out = PathBuf::from(sub.get_one::<String>("out").unwrap().trim());
    if fmt != "csv" && fmt != "json" {
        return Err(anyhow!("Unknown format: {} (use csv|json)", fmt));
    }

    let report = load_yearly_report(conn, sub)?;
    let all = [
        Sheet {
            name: "summary",
            headers: &SUMMARY_HEADERS,
            rows: summary_rows(&report),
        },
        Sheet {
            name: "monthly",
            headers: &MONTHLY_HEADERS,
            rows: monthly_rows(&report),
        },
        Sheet {
            name: "analysis",
            headers: &ANALYSIS_HEADERS,
            rows: analysis_rows(&report),
        },
    ];
    let sheets: Vec<&Sheet> = all
        .iter()
        .filter(|s| kind == "all" || s.name == kind)
        .collect();

    let mut written = Vec::new();
    match fmt.as_str() {
        "csv" if sheets.len() == 1 => {
            write_csv(&out, sheets[0])?;
            written.push(out.clone());
        }
        "csv" => {
            for sheet in &sheets {
                let path = sheet_path(&out, sheet.name);
                write_csv(&path, sheet)?;
                written.push(path);
            }
        }
        _ => {
            let doc = if sheets.len() == 1 {
                sheet_json(sheets[0])
            } else {
                let mut obj = Map::new();
                obj.insert("year".into(), Value::from(report.summary.year));
                for sheet in &sheets {
                    obj.insert(sheet.name.into(), sheet_json(sheet));
                }
                Value::Object(obj)
            };
            std::fs::write(&out, serde_json::to_string_pretty(&doc)?)
                .with_context(|| format!("Write {}", out.display()))?;
            written.push(out.clone());
        }
    }
    for p in &written {
        info!(path = %p.display(), "report exported");
        println!("Exported {} report for {} to {}", kind, report.summary.year, p.display());
    }
    Ok(())
}
