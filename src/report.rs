// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Profit/loss aggregation over fee and expense records.
//!
//! Everything here is a pure function of its inputs: callers fetch one
//! account's records, hand them over as slices and render whatever comes back.
//! Nothing is cached between calls.

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::models::{
    EXPENSE_CATEGORIES, ExpenseRecord, FeeRecord, PAYMENT_TYPES, Status, Student, Teacher,
    record_date,
};

pub const MONTHS_IN_YEAR: usize = 12;

pub const MONTH_LABELS: [&str; MONTHS_IN_YEAR] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthStatus {
    Profit,
    Loss,
    Breakeven,
}

impl MonthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonthStatus::Profit => "profit",
            MonthStatus::Loss => "loss",
            MonthStatus::Breakeven => "breakeven",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    /// 0 = January
    pub month_index: usize,
    pub month_label: &'static str,
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub profit: Decimal,
}

impl MonthlySummary {
    fn new(month_index: usize, revenue: Decimal, expenses: Decimal) -> Self {
        Self {
            month_index,
            month_label: MONTH_LABELS[month_index],
            revenue,
            expenses,
            profit: revenue - expenses,
        }
    }

    pub fn status(&self) -> MonthStatus {
        if self.profit > Decimal::ZERO {
            MonthStatus::Profit
        } else if self.profit < Decimal::ZERO {
            MonthStatus::Loss
        } else {
            MonthStatus::Breakeven
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub net_profit: Decimal,
    /// Fraction, not percent. Zero when there is no revenue.
    pub profit_margin: Decimal,
    pub average_monthly_revenue: Decimal,
    pub average_monthly_expenses: Decimal,
    pub average_monthly_profit: Decimal,
    pub best_month: MonthlySummary,
    pub worst_month: MonthlySummary,
    pub profitable_month_count: usize,
    pub loss_month_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearlyReport {
    pub summary: YearSummary,
    pub months: [MonthlySummary; MONTHS_IN_YEAR],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub label: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_students: usize,
    pub active_students: usize,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub net_profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeacherStats {
    pub total_teachers: usize,
    pub active_teachers: usize,
    pub total_salaries: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordIssue {
    pub kind: &'static str,
    pub id: i64,
    pub detail: String,
}

/// Common view of fees and expenses for month bucketing.
trait Dated {
    const KIND: &'static str;
    fn id(&self) -> i64;
    fn account_id(&self) -> i64;
    fn raw_date(&self) -> &str;
    fn amount(&self) -> Decimal;
}

impl Dated for FeeRecord {
    const KIND: &'static str = "fee";
    fn id(&self) -> i64 {
        self.id
    }
    fn account_id(&self) -> i64 {
        self.account_id
    }
    fn raw_date(&self) -> &str {
        &self.payment_date
    }
    fn amount(&self) -> Decimal {
        self.amount
    }
}

impl Dated for ExpenseRecord {
    const KIND: &'static str = "expense";
    fn id(&self) -> i64 {
        self.id
    }
    fn account_id(&self) -> i64 {
        self.account_id
    }
    fn raw_date(&self) -> &str {
        &self.expense_date
    }
    fn amount(&self) -> Decimal {
        self.amount
    }
}

fn monthly_sums<R: Dated>(
    account_id: i64,
    year: i32,
    records: &[R],
) -> [Decimal; MONTHS_IN_YEAR] {
    let mut sums = [Decimal::ZERO; MONTHS_IN_YEAR];
    let mut year_total = Decimal::ZERO;
    for r in records {
        if r.account_id() != account_id {
            warn!(
                kind = R::KIND,
                id = r.id(),
                owner = r.account_id(),
                account_id,
                "record belongs to another account, skipped"
            );
            continue;
        }
        let Some(date) = record_date(r.raw_date()) else {
            warn!(
                kind = R::KIND,
                id = r.id(),
                date = r.raw_date(),
                "unparseable date, record left out of monthly totals"
            );
            continue;
        };
        if date.year() != year {
            continue;
        }
        let month = date.month0() as usize;
        match (
            sums[month].checked_add(r.amount()),
            year_total.checked_add(r.amount()),
        ) {
            (Some(m), Some(t)) => {
                sums[month] = m;
                year_total = t;
            }
            _ => warn!(
                kind = R::KIND,
                id = r.id(),
                amount = %r.amount(),
                "amount overflows the yearly total, record skipped"
            ),
        }
    }
    sums
}

/// Sum that leaves out any amount whose addition would overflow `Decimal`.
fn checked_total(what: &'static str, amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, |acc, a| match acc.checked_add(a) {
        Some(t) => t,
        None => {
            warn!(what, amount = %a, "amount overflows the total, left out");
            acc
        }
    })
}

/// Builds the twelve monthly rows and the year summary for one account.
///
/// Year totals are folded from the monthly rows, so they always equal the sum
/// of the parts. Best and worst month go to the earliest month on ties, and
/// months without any activity take part like any other.
pub fn compute_yearly_report(
    account_id: i64,
    fees: &[FeeRecord],
    expenses: &[ExpenseRecord],
    year: i32,
) -> YearlyReport {
    let revenue = monthly_sums(account_id, year, fees);
    let spent = monthly_sums(account_id, year, expenses);
    let months: [MonthlySummary; MONTHS_IN_YEAR] =
        std::array::from_fn(|i| MonthlySummary::new(i, revenue[i], spent[i]));

    let total_revenue = checked_total("revenue", months.iter().map(|m| m.revenue));
    let total_expenses = checked_total("expenses", months.iter().map(|m| m.expenses));
    let net_profit = total_revenue - total_expenses;
    let profit_margin = if total_revenue > Decimal::ZERO {
        net_profit.checked_div(total_revenue).unwrap_or_else(|| {
            warn!(year, account_id, "profit margin out of range, reported as 0");
            Decimal::ZERO
        })
    } else {
        Decimal::ZERO
    };
    let twelve = Decimal::from(MONTHS_IN_YEAR as u32);

    let best_month = months[1..]
        .iter()
        .fold(&months[0], |best, m| if m.profit > best.profit { m } else { best })
        .clone();
    let worst_month = months[1..]
        .iter()
        .fold(&months[0], |worst, m| if m.profit < worst.profit { m } else { worst })
        .clone();

    let summary = YearSummary {
        year,
        total_revenue,
        total_expenses,
        net_profit,
        profit_margin,
        average_monthly_revenue: total_revenue / twelve,
        average_monthly_expenses: total_expenses / twelve,
        average_monthly_profit: net_profit / twelve,
        best_month,
        worst_month,
        profitable_month_count: months
            .iter()
            .filter(|m| m.status() == MonthStatus::Profit)
            .count(),
        loss_month_count: months
            .iter()
            .filter(|m| m.status() == MonthStatus::Loss)
            .count(),
    };
    debug!(year, account_id, %net_profit, "yearly report computed");
    YearlyReport { summary, months }
}

/// Sums `records` per label, keeping the order of `labels` and dropping
/// labels whose total is zero. Records with a label outside `labels` count
/// towards nothing.
pub fn compute_category_totals<R, A, C>(
    records: &[R],
    labels: &[&str],
    amount_of: A,
    category_of: C,
) -> Vec<CategoryTotal>
where
    A: Fn(&R) -> Decimal,
    C: Fn(&R) -> &str,
{
    let unknown = records
        .iter()
        .filter(|&r| !labels.contains(&category_of(r)))
        .count();
    if unknown > 0 {
        debug!(unknown, "records with unrecognised category left out of totals");
    }

    labels
        .iter()
        .filter_map(|label| {
            let total = checked_total(
                "category",
                records
                    .iter()
                    .filter(|&r| category_of(r) == *label)
                    .map(&amount_of),
            );
            (!total.is_zero()).then(|| CategoryTotal {
                label: label.to_string(),
                total,
            })
        })
        .collect()
}

pub fn fee_type_totals(fees: &[FeeRecord]) -> Vec<CategoryTotal> {
    compute_category_totals(fees, &PAYMENT_TYPES, |f| f.amount, |f| f.payment_type.as_str())
}

pub fn expense_category_totals(expenses: &[ExpenseRecord]) -> Vec<CategoryTotal> {
    compute_category_totals(expenses, &EXPENSE_CATEGORIES, |e| e.amount, |e| e.category.as_str())
}

/// Calendar years with at least one dated record, newest first.
pub fn available_years(fees: &[FeeRecord], expenses: &[ExpenseRecord]) -> Vec<i32> {
    let years: BTreeSet<i32> = fees
        .iter()
        .filter_map(FeeRecord::date)
        .chain(expenses.iter().filter_map(ExpenseRecord::date))
        .map(|d| d.year())
        .collect();
    years.into_iter().rev().collect()
}

/// All-time figures, independent of dates.
pub fn dashboard_stats(
    students: &[Student],
    fees: &[FeeRecord],
    expenses: &[ExpenseRecord],
) -> DashboardStats {
    let total_revenue = checked_total("revenue", fees.iter().map(|f| f.amount));
    let total_expenses = checked_total("expenses", expenses.iter().map(|e| e.amount));
    DashboardStats {
        total_students: students.len(),
        active_students: students
            .iter()
            .filter(|s| s.status == Status::Active)
            .count(),
        total_revenue,
        total_expenses,
        net_profit: total_revenue - total_expenses,
    }
}

pub fn teacher_stats(teachers: &[Teacher]) -> TeacherStats {
    TeacherStats {
        total_teachers: teachers.len(),
        active_teachers: teachers
            .iter()
            .filter(|t| t.status == Status::Active)
            .count(),
        total_salaries: checked_total("salaries", teachers.iter().map(|t| t.salary)),
    }
}

/// Records the aggregation silently degrades on. Reporting only; totals are
/// computed the same way whether or not these exist.
pub fn validate_records(fees: &[FeeRecord], expenses: &[ExpenseRecord]) -> Vec<RecordIssue> {
    let mut issues = Vec::new();
    for f in fees {
        if f.date().is_none() {
            issues.push(issue::<FeeRecord>(
                f.id,
                format!("unparseable payment date '{}'", f.payment_date),
            ));
        }
        if !PAYMENT_TYPES.contains(&f.payment_type.as_str()) {
            issues.push(issue::<FeeRecord>(
                f.id,
                format!("unknown payment type '{}'", f.payment_type),
            ));
        }
        if f.amount < Decimal::ZERO {
            issues.push(issue::<FeeRecord>(f.id, format!("negative amount {}", f.amount)));
        }
    }
    for e in expenses {
        if e.date().is_none() {
            issues.push(issue::<ExpenseRecord>(
                e.id,
                format!("unparseable expense date '{}'", e.expense_date),
            ));
        }
        if !EXPENSE_CATEGORIES.contains(&e.category.as_str()) {
            issues.push(issue::<ExpenseRecord>(
                e.id,
                format!("unknown category '{}'", e.category),
            ));
        }
        if e.amount < Decimal::ZERO {
            issues.push(issue::<ExpenseRecord>(
                e.id,
                format!("negative amount {}", e.amount),
            ));
        }
    }
    issues
}

fn issue<R: Dated>(id: i64, detail: String) -> RecordIssue {
    RecordIssue {
        kind: R::KIND,
        id,
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: i64 = 1;

    fn fee(id: i64, amount: i64, date: &str) -> FeeRecord {
        FeeRecord {
            id,
            account_id: ACCOUNT,
            student_id: 1,
            amount: Decimal::from(amount),
            payment_type: "Tuition fees".into(),
            payment_date: date.into(),
            academic_year: "2024".into(),
            notes: None,
        }
    }

    fn expense(id: i64, amount: i64, date: &str, category: &str) -> ExpenseRecord {
        ExpenseRecord {
            id,
            account_id: ACCOUNT,
            category: category.into(),
            amount: Decimal::from(amount),
            description: String::new(),
            expense_date: date.into(),
            notes: None,
        }
    }

    #[test]
    fn two_month_scenario() {
        let fees = vec![fee(1, 1000, "2024-01-15"), fee(2, 500, "2024-02-10")];
        let expenses = vec![expense(1, 300, "2024-01-20", "Other")];
        let report = compute_yearly_report(ACCOUNT, &fees, &expenses, 2024);

        let jan = &report.months[0];
        assert_eq!(jan.month_label, "January");
        assert_eq!(jan.revenue, Decimal::from(1000));
        assert_eq!(jan.expenses, Decimal::from(300));
        assert_eq!(jan.profit, Decimal::from(700));
        let feb = &report.months[1];
        assert_eq!(feb.revenue, Decimal::from(500));
        assert_eq!(feb.expenses, Decimal::ZERO);
        assert_eq!(feb.profit, Decimal::from(500));
        for m in &report.months[2..] {
            assert_eq!(m.revenue, Decimal::ZERO);
            assert_eq!(m.expenses, Decimal::ZERO);
            assert_eq!(m.profit, Decimal::ZERO);
        }

        let s = &report.summary;
        assert_eq!(s.total_revenue, Decimal::from(1500));
        assert_eq!(s.total_expenses, Decimal::from(300));
        assert_eq!(s.net_profit, Decimal::from(1200));
        assert_eq!(s.profit_margin, Decimal::from_str_exact("0.8").unwrap());
        assert_eq!(s.average_monthly_profit, Decimal::from(100));
        assert_eq!(s.best_month.month_label, "January");
        assert_eq!(s.worst_month.month_label, "March");
        assert_eq!(s.profitable_month_count, 2);
        assert_eq!(s.loss_month_count, 0);
    }

    #[test]
    fn totals_match_monthly_parts() {
        let mut fees = Vec::new();
        let mut expenses = Vec::new();
        let mut expected_rev = Decimal::ZERO;
        let mut expected_exp = Decimal::ZERO;
        for month in 1..=12i64 {
            let rev = month * 137 % 1000;
            let exp = month * 211 % 700;
            fees.push(fee(month, rev, &format!("2023-{:02}-05", month)));
            expenses.push(expense(month, exp, &format!("2023-{:02}-28", month), "Cleaning"));
            expected_rev += Decimal::from(rev);
            expected_exp += Decimal::from(exp);
        }
        let report = compute_yearly_report(ACCOUNT, &fees, &expenses, 2023);
        let s = &report.summary;
        assert_eq!(s.total_revenue, expected_rev);
        assert_eq!(s.total_expenses, expected_exp);
        assert_eq!(s.net_profit, expected_rev - expected_exp);
        let profit_sum: Decimal = report.months.iter().map(|m| m.profit).sum();
        assert_eq!(profit_sum, s.net_profit);
        for m in &report.months {
            assert_eq!(m.profit, m.revenue - m.expenses);
        }
    }

    #[test]
    fn repeated_calls_give_identical_reports() {
        let fees = vec![fee(1, 333, "2024-05-01"), fee(2, 7, "2024-11-30")];
        let expenses = vec![expense(1, 1000, "2024-05-02", "Security")];
        let a = compute_yearly_report(ACCOUNT, &fees, &expenses, 2024);
        let b = compute_yearly_report(ACCOUNT, &fees, &expenses, 2024);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn no_revenue_means_zero_margin() {
        let expenses = vec![expense(1, 250, "2024-04-01", "Stationery")];
        let report = compute_yearly_report(ACCOUNT, &[], &expenses, 2024);
        assert_eq!(report.summary.total_revenue, Decimal::ZERO);
        assert_eq!(report.summary.profit_margin, Decimal::ZERO);
        assert_eq!(report.summary.net_profit, Decimal::from(-250));
        assert_eq!(report.summary.loss_month_count, 1);
        assert_eq!(report.summary.worst_month.month_label, "April");
    }

    #[test]
    fn empty_input_is_all_zero() {
        let report = compute_yearly_report(ACCOUNT, &[], &[], 2024);
        let s = &report.summary;
        assert_eq!(s.total_revenue, Decimal::ZERO);
        assert_eq!(s.total_expenses, Decimal::ZERO);
        assert_eq!(s.profit_margin, Decimal::ZERO);
        assert_eq!(s.best_month.month_index, 0);
        assert_eq!(s.worst_month.month_index, 0);
        assert_eq!(s.profitable_month_count, 0);
        assert_eq!(s.loss_month_count, 0);
    }

    #[test]
    fn other_years_do_not_leak() {
        let fees = vec![fee(1, 900, "2024-06-15")];
        let report = compute_yearly_report(ACCOUNT, &fees, &[], 2025);
        assert!(report.months.iter().all(|m| m.revenue.is_zero()));
        assert_eq!(report.summary.total_revenue, Decimal::ZERO);
    }

    #[test]
    fn best_month_tie_goes_to_earlier_month() {
        let fees = vec![fee(1, 100, "2024-01-10"), fee(2, 100, "2024-03-10")];
        let report = compute_yearly_report(ACCOUNT, &fees, &[], 2024);
        assert_eq!(report.summary.best_month.month_index, 0);
        assert_eq!(report.summary.best_month.month_label, "January");
    }

    #[test]
    fn bad_dates_and_foreign_records_are_skipped() {
        let mut foreign = fee(3, 5000, "2024-01-01");
        foreign.account_id = 99;
        let fees = vec![fee(1, 100, "not a date"), fee(2, 40, "2024-02-29"), foreign];
        let report = compute_yearly_report(ACCOUNT, &fees, &[], 2024);
        assert_eq!(report.summary.total_revenue, Decimal::from(40));
        assert_eq!(report.months[1].revenue, Decimal::from(40));
    }

    #[test]
    fn category_totals_keep_label_order_and_drop_zeros() {
        let expenses = vec![
            expense(1, 1000, "2024-01-01", "Salaries"),
            expense(2, 500, "2024-01-02", "Salaries"),
            expense(3, 200, "2024-01-03", "Utilities"),
        ];
        let totals = compute_category_totals(
            &expenses,
            &["Salaries", "Utilities", "Other"],
            |e: &ExpenseRecord| e.amount,
            |e: &ExpenseRecord| e.category.as_str(),
        );
        assert_eq!(
            totals,
            vec![
                CategoryTotal {
                    label: "Salaries".into(),
                    total: Decimal::from(1500)
                },
                CategoryTotal {
                    label: "Utilities".into(),
                    total: Decimal::from(200)
                },
            ]
        );
    }

    #[test]
    fn zero_sum_category_with_records_is_dropped() {
        let expenses = vec![
            expense(1, 0, "2024-01-01", "Stationery"),
            expense(2, 0, "2024-02-01", "Stationery"),
            expense(3, 45, "2024-02-01", "Security"),
        ];
        let totals = expense_category_totals(&expenses);
        assert_eq!(
            totals,
            vec![CategoryTotal {
                label: "Security".into(),
                total: Decimal::from(45)
            }]
        );
    }

    #[test]
    fn overflowing_amounts_are_left_out_instead_of_panicking() {
        let mut big = fee(1, 0, "2024-03-01");
        big.amount = Decimal::MAX;
        let mut bigger = big.clone();
        bigger.id = 2;
        let fees = vec![big, bigger, fee(3, 10, "2024-04-01")];

        let report = compute_yearly_report(ACCOUNT, &fees, &[], 2024);
        assert_eq!(report.months[2].revenue, Decimal::MAX);
        assert_eq!(report.months[3].revenue, Decimal::ZERO);
        assert_eq!(report.summary.total_revenue, Decimal::MAX);
        assert_eq!(report.summary.profit_margin, Decimal::ONE);

        let stats = dashboard_stats(&[], &fees, &[]);
        assert_eq!(stats.total_revenue, Decimal::MAX);
        let totals = fee_type_totals(&fees);
        assert_eq!(totals[0].total, Decimal::MAX);
    }

    #[test]
    fn tiny_revenue_against_huge_expenses_keeps_margin_finite() {
        let mut cent = fee(1, 0, "2024-01-01");
        cent.amount = Decimal::new(1, 2);
        let mut huge = expense(1, 0, "2024-01-02", "Other");
        huge.amount = Decimal::MAX;
        let report = compute_yearly_report(ACCOUNT, &[cent], &[huge], 2024);
        assert_eq!(report.summary.profit_margin, Decimal::ZERO);
        assert!(report.summary.net_profit < Decimal::ZERO);
    }

    #[test]
    fn unknown_categories_count_nowhere() {
        let expenses = vec![
            expense(1, 80, "2024-01-01", "Cleaning"),
            expense(2, 999, "2024-01-01", "Parties"),
        ];
        let totals = expense_category_totals(&expenses);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].label, "Cleaning");
        assert_eq!(totals[0].total, Decimal::from(80));
    }

    #[test]
    fn fee_types_follow_fixed_order() {
        let mut bus = fee(1, 50, "2024-01-01");
        bus.payment_type = "Bus fees".into();
        let fees = vec![bus, fee(2, 300, "2024-01-02")];
        let labels: Vec<String> = fee_type_totals(&fees).into_iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["Tuition fees", "Bus fees"]);
    }

    #[test]
    fn years_are_listed_newest_first() {
        let fees = vec![fee(1, 1, "2022-03-01"), fee(2, 1, "garbage")];
        let expenses = vec![
            expense(1, 1, "2024-01-01", "Other"),
            expense(2, 1, "2022-09-09", "Other"),
        ];
        assert_eq!(available_years(&fees, &expenses), vec![2024, 2022]);
    }

    #[test]
    fn validation_flags_degraded_records() {
        let mut odd = fee(1, 10, "15/01/2024");
        odd.payment_type = "Lunch".into();
        let expenses = vec![expense(1, 5, "2024-01-01", "Transport")];
        let issues = validate_records(&[odd], &expenses);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.kind == "fee" && i.id == 1));
    }
}
