// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SchoolError;

/// Fee payment types, in the order the fee summary lists them.
pub const PAYMENT_TYPES: [&str; 6] = [
    "Tuition fees",
    "Book fees",
    "Activity fees",
    "Uniform fees",
    "Bus fees",
    "Other",
];

/// Expense categories, in the order the expense summary lists them.
pub const EXPENSE_CATEGORIES: [&str; 10] = [
    "Teacher salaries",
    "Administrative salaries",
    "Building maintenance",
    "Electricity and water",
    "Internet and communications",
    "Stationery",
    "Cleaning",
    "Security",
    "Transport",
    "Other",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Inactive,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = SchoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Status::Active),
            "inactive" => Ok(Status::Inactive),
            _ => Err(SchoolError::InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub account_id: i64,
    pub full_name: String,
    pub grade: String,
    pub parent_name: String,
    pub parent_phone: String,
    pub enrollment_date: String,
    pub status: Status,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub id: i64,
    pub account_id: i64,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub specialization: String,
    pub salary: Decimal,
    pub hire_date: String,
    pub status: Status,
    pub address: String,
    pub qualifications: String,
    pub notes: Option<String>,
}

/// A fee payment collected from a student.
///
/// `payment_date` is kept as stored; see [`record_date`] for how it is read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeRecord {
    pub id: i64,
    pub account_id: i64,
    pub student_id: i64,
    pub amount: Decimal,
    pub payment_type: String,
    pub payment_date: String,
    pub academic_year: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub account_id: i64,
    pub category: String,
    pub amount: Decimal,
    pub description: String,
    pub expense_date: String,
    pub notes: Option<String>,
}

impl FeeRecord {
    pub fn date(&self) -> Option<NaiveDate> {
        record_date(&self.payment_date)
    }
}

impl ExpenseRecord {
    pub fn date(&self) -> Option<NaiveDate> {
        record_date(&self.expense_date)
    }
}

/// Reads a stored record date. Accepts `YYYY-MM-DD`, RFC 3339 timestamps and
/// naive `YYYY-MM-DDTHH:MM:SS` timestamps; anything else is `None`.
pub fn record_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}
