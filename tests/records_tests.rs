// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use schoolbook::commands::{accounts, doctor, expenses, fees, students, teachers};
use schoolbook::error::SchoolError;
use schoolbook::{cli, db, store, utils};

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute_batch(
        r#"
        INSERT INTO accounts(id, name) VALUES (1, 'Nile School'), (2, 'Delta School');
        INSERT INTO students(id, account_id, full_name, grade, parent_name, enrollment_date)
            VALUES (1, 1, 'Sara Ali', 'Grade 3', 'Ali Hassan', '2024-09-01'),
                   (2, 2, 'Omar Said', 'Grade 5', 'Said Omar', '2024-09-01');
        "#,
    )
    .unwrap();
    utils::set_setting(&conn, "default_account", "Nile School").unwrap();
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["schoolbook"];
    argv.extend_from_slice(args);
    let m = cli::build_cli().get_matches_from(argv);
    match m.subcommand() {
        Some(("account", sub)) => accounts::handle(conn, sub),
        Some(("student", sub)) => students::handle(conn, sub),
        Some(("teacher", sub)) => teachers::handle(conn, sub),
        Some(("fee", sub)) => fees::handle(conn, sub),
        Some(("expense", sub)) => expenses::handle(conn, sub),
        Some(("doctor", sub)) => doctor::handle(conn, sub),
        other => panic!("unexpected subcommand {:?}", other.map(|(n, _)| n)),
    }
}

fn leaf(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["schoolbook"];
    argv.extend_from_slice(args);
    let m = cli::build_cli().get_matches_from(argv);
    let (_, group) = m.subcommand().unwrap();
    let (_, sub) = group.subcommand().unwrap();
    sub.clone()
}

#[test]
fn fee_add_canonicalises_type_and_lists_with_student_name() {
    let conn = setup();
    run(
        &conn,
        &[
            "fee", "add", "--student", "1", "--amount", "1500.50", "--type", "tuition FEES",
            "--date", "2024-10-01", "--academic-year", "2024/2025",
        ],
    )
    .unwrap();

    let rows = fees::query_rows(&conn, &leaf(&["fee", "list", "--search", "sara"])).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].student, "Sara Ali");
    assert_eq!(rows[0].payment_type, "Tuition fees");
    assert_eq!(rows[0].amount, "1500.50");

    let none = fees::query_rows(&conn, &leaf(&["fee", "list", "--search", "bus"])).unwrap();
    assert!(none.is_empty());
}

#[test]
fn fee_add_rejects_bad_input_without_writing() {
    let conn = setup();
    let err = run(
        &conn,
        &["fee", "add", "--student", "1", "--amount", "10", "--type", "Lunch"],
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SchoolError>(),
        Some(SchoolError::UnknownPaymentType(_))
    ));

    let err = run(
        &conn,
        &["fee", "add", "--student", "1", "--amount=-5", "--type", "Other"],
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SchoolError>(),
        Some(SchoolError::NegativeAmount(_))
    ));

    // student 2 belongs to the other school
    assert!(
        run(
            &conn,
            &["fee", "add", "--student", "2", "--amount", "10", "--type", "Other"],
        )
        .is_err()
    );
    assert!(store::list_fee_records(&conn, 1).unwrap().is_empty());
}

#[test]
fn edits_and_deletes_are_scoped_to_the_account() {
    let conn = setup();
    conn.execute(
        "INSERT INTO expenses(id, account_id, category, amount, expense_date)
         VALUES (7, 2, 'Security', '80', '2024-03-01')",
        [],
    )
    .unwrap();

    let err = run(&conn, &["expense", "edit", "--id", "7", "--amount", "1"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SchoolError>(),
        Some(SchoolError::NotFound { kind: "expense", id: 7 })
    ));
    assert!(run(&conn, &["expense", "rm", "--id", "7"]).is_err());

    run(
        &conn,
        &["expense", "edit", "--id", "7", "--amount", "95", "--account", "Delta School"],
    )
    .unwrap();
    let delta = store::list_expense_records(&conn, 2).unwrap();
    assert_eq!(delta[0].amount, Decimal::from(95));

    run(&conn, &["expense", "rm", "--id", "7", "--account", "Delta School"]).unwrap();
    assert!(store::list_expense_records(&conn, 2).unwrap().is_empty());
}

#[test]
fn expense_list_filters_and_limits() {
    let conn = setup();
    for (cat, amount, date, desc) in [
        ("Stationery", "40", "2024-01-02", "chalk"),
        ("Cleaning", "60", "2024-01-05", "floor wax"),
        ("Stationery", "25", "2024-02-01", "paper"),
    ] {
        run(
            &conn,
            &[
                "expense", "add", "--category", cat, "--amount", amount, "--date", date,
                "--description", desc,
            ],
        )
        .unwrap();
    }
    let hits = expenses::query_expenses(&conn, &leaf(&["expense", "list", "--search", "station"]))
        .unwrap();
    assert_eq!(hits.len(), 2);
    let latest = expenses::query_expenses(&conn, &leaf(&["expense", "list", "--limit", "1"]))
        .unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].description, "paper");
}

#[test]
fn students_search_and_status() {
    let conn = setup();
    run(
        &conn,
        &["student", "add", "--name", "Mona Adel", "--grade", "Grade 1", "--enrolled", "2023-09-01"],
    )
    .unwrap();
    run(&conn, &["student", "edit", "--id", "1", "--status", "inactive"]).unwrap();

    let active = students::query_students(&conn, &leaf(&["student", "list", "--status", "active"]))
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].full_name, "Mona Adel");

    let by_parent =
        students::query_students(&conn, &leaf(&["student", "list", "--search", "hassan"])).unwrap();
    assert_eq!(by_parent.len(), 1);
    assert_eq!(by_parent[0].id, 1);

    assert!(run(&conn, &["student", "edit", "--id", "1", "--status", "gone"]).is_err());
}

#[test]
fn teachers_page_by_ten() {
    let conn = setup();
    for i in 0..12 {
        conn.execute(
            "INSERT INTO teachers(account_id, name, specialization, salary, hire_date)
             VALUES (1, ?1, 'Math', '1000', '2022-09-01')",
            params![format!("Teacher {:02}", i)],
        )
        .unwrap();
    }
    let first = teachers::query_teachers(&conn, &leaf(&["teacher", "list", "--page", "1"])).unwrap();
    let second =
        teachers::query_teachers(&conn, &leaf(&["teacher", "list", "--page", "2"])).unwrap();
    assert_eq!(first.len(), teachers::PAGE_SIZE);
    assert_eq!(second.len(), 2);
    let past_end =
        teachers::query_teachers(&conn, &leaf(&["teacher", "list", "--page", "3"])).unwrap();
    assert!(past_end.is_empty());
    let huge = usize::MAX.to_string();
    let far =
        teachers::query_teachers(&conn, &leaf(&["teacher", "list", "--page", huge.as_str()]))
            .unwrap();
    assert!(far.is_empty());
    let all = teachers::query_teachers(&conn, &leaf(&["teacher", "list"])).unwrap();
    assert_eq!(all.len(), 12);

    let stats = schoolbook::report::teacher_stats(&store::list_teachers(&conn, 1).unwrap());
    assert_eq!(stats.total_salaries, Decimal::from(12_000));
}

#[test]
fn doctor_reports_unusable_rows() {
    let conn = setup();
    conn.execute_batch(
        r#"
        INSERT INTO fees(id, account_id, student_id, amount, payment_type, payment_date, academic_year)
            VALUES (1, 1, 1, '100', 'Tuition fees', '2024-01-10', '2024'),
                   (2, 1, 1, '100', 'Tuition fees', 'someday', '2024');
        INSERT INTO expenses(id, account_id, category, amount, expense_date)
            VALUES (3, 1, 'Party', '20', '2024-01-11');
        "#,
    )
    .unwrap();

    let issues = doctor::find_issues(&conn, 1).unwrap();
    let found: Vec<(&str, i64)> = issues.iter().map(|i| (i.kind, i.id)).collect();
    assert_eq!(found, vec![("fee", 2), ("expense", 3)]);
    assert!(doctor::find_issues(&conn, 2).unwrap().is_empty());
    run(&conn, &["doctor"]).unwrap();
}

#[test]
fn duplicate_account_name_is_a_clear_error() {
    let conn = setup();
    let err = run(&conn, &["account", "add", "--name", " Nile School "]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SchoolError>(),
        Some(SchoolError::AccountExists(name)) if name == "Nile School"
    ));
    run(&conn, &["account", "add", "--name", "Sinai School"]).unwrap();
    assert!(utils::id_for_account(&conn, "Sinai School").is_ok());
}

#[test]
fn removing_the_default_account_clears_the_setting() {
    let conn = setup();
    run(&conn, &["account", "rm", "--name", "Delta School"]).unwrap();
    assert_eq!(
        utils::get_setting(&conn, "default_account").unwrap().as_deref(),
        Some("Nile School")
    );

    run(&conn, &["account", "rm", "--name", "Nile School"]).unwrap();
    assert_eq!(utils::get_setting(&conn, "default_account").unwrap(), None);
    let err = run(&conn, &["fee", "list"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SchoolError>(),
        Some(SchoolError::NoAccount)
    ));
}

#[test]
fn fee_amount_above_ceiling_is_rejected() {
    let conn = setup();
    let err = run(
        &conn,
        &[
            "fee", "add", "--student", "1", "--amount", "79228162514264337593543950335",
            "--type", "Other",
        ],
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SchoolError>(),
        Some(SchoolError::AmountTooLarge(_))
    ));
    assert!(store::list_fee_records(&conn, 1).unwrap().is_empty());
}
