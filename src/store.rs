// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Account-scoped reads and writes over the SQLite tables.
//!
//! Every statement filters on `account_id`; an update or delete that matches
//! no row of the given account fails with [`SchoolError::NotFound`].

use anyhow::{Context, Result};
use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::error::SchoolError;
use crate::models::{ExpenseRecord, FeeRecord, Status, Student, Teacher};

fn decimal_col(raw: &str, what: &str, id: i64) -> Result<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid {} '{}' on row {}", what, raw, id))
}

fn status_col(raw: &str) -> Result<Status> {
    Ok(raw.parse::<Status>()?)
}

fn expect_one(changed: usize, kind: &'static str, id: i64) -> Result<()> {
    if changed == 0 {
        return Err(SchoolError::NotFound { kind, id }.into());
    }
    Ok(())
}

// ---- students ----

fn student_from_row(r: &Row<'_>) -> Result<Student> {
    let status: String = r.get(7)?;
    Ok(Student {
        id: r.get(0)?,
        account_id: r.get(1)?,
        full_name: r.get(2)?,
        grade: r.get(3)?,
        parent_name: r.get(4)?,
        parent_phone: r.get(5)?,
        enrollment_date: r.get(6)?,
        status: status_col(&status)?,
    })
}

pub fn list_students(conn: &Connection, account_id: i64) -> Result<Vec<Student>> {
    let mut stmt = conn.prepare(
        "SELECT id, account_id, full_name, grade, parent_name, parent_phone, enrollment_date, status
         FROM students WHERE account_id=?1 ORDER BY full_name, id",
    )?;
    let mut rows = stmt.query(params![account_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(student_from_row(r)?);
    }
    Ok(out)
}

pub fn insert_student(conn: &Connection, s: &Student) -> Result<i64> {
    conn.execute(
        "INSERT INTO students(account_id, full_name, grade, parent_name, parent_phone, enrollment_date, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            s.account_id,
            s.full_name,
            s.grade,
            s.parent_name,
            s.parent_phone,
            s.enrollment_date,
            s.status.as_str()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_student(conn: &Connection, s: &Student) -> Result<()> {
    let n = conn.execute(
        "UPDATE students SET full_name=?1, grade=?2, parent_name=?3, parent_phone=?4,
             enrollment_date=?5, status=?6, updated_at=datetime('now')
         WHERE id=?7 AND account_id=?8",
        params![
            s.full_name,
            s.grade,
            s.parent_name,
            s.parent_phone,
            s.enrollment_date,
            s.status.as_str(),
            s.id,
            s.account_id
        ],
    )?;
    expect_one(n, "student", s.id)
}

pub fn student_names(conn: &Connection, account_id: i64) -> Result<HashMap<i64, String>> {
    let mut stmt = conn.prepare("SELECT id, full_name FROM students WHERE account_id=?1")?;
    let rows = stmt.query_map(params![account_id], |r| {
        Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?))
    })?;
    let mut out = HashMap::new();
    for row in rows {
        let (id, name) = row?;
        out.insert(id, name);
    }
    Ok(out)
}

// ---- teachers ----

fn teacher_from_row(r: &Row<'_>) -> Result<Teacher> {
    let id: i64 = r.get(0)?;
    let salary: String = r.get(6)?;
    let status: String = r.get(8)?;
    Ok(Teacher {
        id,
        account_id: r.get(1)?,
        name: r.get(2)?,
        phone: r.get(3)?,
        email: r.get(4)?,
        specialization: r.get(5)?,
        salary: decimal_col(&salary, "salary", id)?,
        hire_date: r.get(7)?,
        status: status_col(&status)?,
        address: r.get(9)?,
        qualifications: r.get(10)?,
        notes: r.get(11)?,
    })
}

/// Newest hires first.
pub fn list_teachers(conn: &Connection, account_id: i64) -> Result<Vec<Teacher>> {
    let mut stmt = conn.prepare(
        "SELECT id, account_id, name, phone, email, specialization, salary, hire_date, status,
                address, qualifications, notes
         FROM teachers WHERE account_id=?1 ORDER BY created_at DESC, id DESC",
    )?;
    let mut rows = stmt.query(params![account_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(teacher_from_row(r)?);
    }
    Ok(out)
}

pub fn insert_teacher(conn: &Connection, t: &Teacher) -> Result<i64> {
    conn.execute(
        "INSERT INTO teachers(account_id, name, phone, email, specialization, salary, hire_date,
                              status, address, qualifications, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            t.account_id,
            t.name,
            t.phone,
            t.email,
            t.specialization,
            t.salary.to_string(),
            t.hire_date,
            t.status.as_str(),
            t.address,
            t.qualifications,
            t.notes
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_teacher(conn: &Connection, t: &Teacher) -> Result<()> {
    let n = conn.execute(
        "UPDATE teachers SET name=?1, phone=?2, email=?3, specialization=?4, salary=?5,
             hire_date=?6, status=?7, address=?8, qualifications=?9, notes=?10,
             updated_at=datetime('now')
         WHERE id=?11 AND account_id=?12",
        params![
            t.name,
            t.phone,
            t.email,
            t.specialization,
            t.salary.to_string(),
            t.hire_date,
            t.status.as_str(),
            t.address,
            t.qualifications,
            t.notes,
            t.id,
            t.account_id
        ],
    )?;
    expect_one(n, "teacher", t.id)
}

// ---- fees ----

/// All fee payments of one account, newest payment first, regardless of date.
pub fn list_fee_records(conn: &Connection, account_id: i64) -> Result<Vec<FeeRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, account_id, student_id, amount, payment_type, payment_date, academic_year, notes
         FROM fees WHERE account_id=?1 ORDER BY payment_date DESC, id DESC",
    )?;
    let mut rows = stmt.query(params![account_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let amount: String = r.get(3)?;
        out.push(FeeRecord {
            id,
            account_id: r.get(1)?,
            student_id: r.get(2)?,
            amount: decimal_col(&amount, "fee amount", id)?,
            payment_type: r.get(4)?,
            payment_date: r.get(5)?,
            academic_year: r.get(6)?,
            notes: r.get(7)?,
        });
    }
    Ok(out)
}

fn student_belongs(conn: &Connection, account_id: i64, student_id: i64) -> Result<()> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM students WHERE id=?1 AND account_id=?2",
        params![student_id, account_id],
        |r| r.get(0),
    )?;
    expect_one(n as usize, "student", student_id)
}

pub fn insert_fee(conn: &Connection, f: &FeeRecord) -> Result<i64> {
    student_belongs(conn, f.account_id, f.student_id)?;
    conn.execute(
        "INSERT INTO fees(account_id, student_id, amount, payment_type, payment_date, academic_year, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            f.account_id,
            f.student_id,
            f.amount.to_string(),
            f.payment_type,
            f.payment_date,
            f.academic_year,
            f.notes
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_fee(conn: &Connection, f: &FeeRecord) -> Result<()> {
    student_belongs(conn, f.account_id, f.student_id)?;
    let n = conn.execute(
        "UPDATE fees SET student_id=?1, amount=?2, payment_type=?3, payment_date=?4,
             academic_year=?5, notes=?6
         WHERE id=?7 AND account_id=?8",
        params![
            f.student_id,
            f.amount.to_string(),
            f.payment_type,
            f.payment_date,
            f.academic_year,
            f.notes,
            f.id,
            f.account_id
        ],
    )?;
    expect_one(n, "fee", f.id)
}

// ---- expenses ----

/// All expenses of one account, newest first, regardless of date.
pub fn list_expense_records(conn: &Connection, account_id: i64) -> Result<Vec<ExpenseRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, account_id, category, amount, description, expense_date, notes
         FROM expenses WHERE account_id=?1 ORDER BY expense_date DESC, id DESC",
    )?;
    let mut rows = stmt.query(params![account_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let amount: String = r.get(3)?;
        out.push(ExpenseRecord {
            id,
            account_id: r.get(1)?,
            category: r.get(2)?,
            amount: decimal_col(&amount, "expense amount", id)?,
            description: r.get(4)?,
            expense_date: r.get(5)?,
            notes: r.get(6)?,
        });
    }
    Ok(out)
}

pub fn insert_expense(conn: &Connection, e: &ExpenseRecord) -> Result<i64> {
    conn.execute(
        "INSERT INTO expenses(account_id, category, amount, description, expense_date, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            e.account_id,
            e.category,
            e.amount.to_string(),
            e.description,
            e.expense_date,
            e.notes
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_expense(conn: &Connection, e: &ExpenseRecord) -> Result<()> {
    let n = conn.execute(
        "UPDATE expenses SET category=?1, amount=?2, description=?3, expense_date=?4, notes=?5
         WHERE id=?6 AND account_id=?7",
        params![
            e.category,
            e.amount.to_string(),
            e.description,
            e.expense_date,
            e.notes,
            e.id,
            e.account_id
        ],
    )?;
    expect_one(n, "expense", e.id)
}

/// Record kinds that can be deleted by id.
#[derive(Debug, Clone, Copy)]
pub enum Table {
    Students,
    Teachers,
    Fees,
    Expenses,
}

impl Table {
    fn name(&self) -> &'static str {
        match self {
            Table::Students => "students",
            Table::Teachers => "teachers",
            Table::Fees => "fees",
            Table::Expenses => "expenses",
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Table::Students => "student",
            Table::Teachers => "teacher",
            Table::Fees => "fee",
            Table::Expenses => "expense",
        }
    }
}

pub fn delete_record(conn: &Connection, table: Table, account_id: i64, id: i64) -> Result<()> {
    let sql = format!("DELETE FROM {} WHERE id=?1 AND account_id=?2", table.name());
    let n = conn.execute(&sql, params![id, account_id])?;
    expect_one(n, table.kind(), id)
}
