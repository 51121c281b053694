// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

fn opt(name: &'static str) -> Arg {
    Arg::new(name).long(name)
}

fn search_arg() -> Arg {
    opt("search").help("Case-insensitive substring filter")
}

fn year_arg() -> Arg {
    opt("year")
        .required(true)
        .help("Four-digit calendar year, e.g. 2024")
}

fn student_fields(cmd: Command, adding: bool) -> Command {
    cmd.arg(opt("name").required(adding).help("Full name"))
        .arg(opt("grade").required(adding))
        .arg(opt("parent").help("Parent name"))
        .arg(opt("phone").help("Parent phone"))
        .arg(opt("enrolled").help("Enrollment date YYYY-MM-DD (default: today)"))
        .arg(opt("status").help("active|inactive"))
}

fn teacher_fields(cmd: Command, adding: bool) -> Command {
    cmd.arg(opt("name").required(adding))
        .arg(opt("phone"))
        .arg(opt("email"))
        .arg(opt("specialization"))
        .arg(opt("salary").help("Monthly salary"))
        .arg(opt("hired").help("Hire date YYYY-MM-DD (default: today)"))
        .arg(opt("status").help("active|inactive"))
        .arg(opt("address"))
        .arg(opt("qualifications"))
        .arg(opt("note"))
}

fn fee_fields(cmd: Command, adding: bool) -> Command {
    cmd.arg(
        opt("student")
            .required(adding)
            .value_parser(value_parser!(i64))
            .help("Student id"),
    )
    .arg(opt("amount").required(adding))
    .arg(opt("type").required(adding).help("Payment type, see `fee types --all`"))
    .arg(opt("date").help("Payment date YYYY-MM-DD (default: today)"))
    .arg(opt("academic-year").help("Academic year label (default: current year)"))
    .arg(opt("note"))
}

fn expense_fields(cmd: Command, adding: bool) -> Command {
    cmd.arg(
        opt("category")
            .required(adding)
            .help("Expense category, see `expense categories --all`"),
    )
    .arg(opt("amount").required(adding))
    .arg(opt("description"))
    .arg(opt("date").help("Expense date YYYY-MM-DD (default: today)"))
    .arg(opt("note"))
}

pub fn build_cli() -> Command {
    Command::new("schoolbook")
        .version(crate_version!())
        .about("School administration: students, teachers, fees, expenses and profit reports")
        .arg(
            Arg::new("account")
                .long("account")
                .global(true)
                .help("Owning account (school); defaults to the default_account setting"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("config")
                .about("Read or change settings (currency, default_account)")
                .subcommand(Command::new("get").arg(Arg::new("key").required(true)))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
        .subcommand(
            Command::new("account")
                .about("Manage owning accounts")
                .subcommand(Command::new("add").arg(opt("name").required(true)))
                .subcommand(Command::new("list"))
                .subcommand(Command::new("rm").arg(opt("name").required(true))),
        )
        .subcommand(
            Command::new("student")
                .about("Manage students")
                .subcommand(student_fields(Command::new("add"), true))
                .subcommand(student_fields(Command::new("edit").arg(id_arg()), false))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(search_arg())
                        .arg(opt("status").help("active|inactive")),
                ))
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("teacher")
                .about("Manage teachers")
                .subcommand(teacher_fields(Command::new("add"), true))
                .subcommand(teacher_fields(Command::new("edit").arg(id_arg()), false))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(search_arg())
                        .arg(opt("status").help("active|inactive"))
                        .arg(
                            opt("page")
                                .value_parser(value_parser!(usize))
                                .help("Page number, 10 teachers per page"),
                        ),
                ))
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(json_flags(Command::new("stats"))),
        )
        .subcommand(
            Command::new("fee")
                .about("Record fee payments")
                .subcommand(fee_fields(Command::new("add"), true))
                .subcommand(fee_fields(Command::new("edit").arg(id_arg()), false))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(search_arg())
                        .arg(opt("limit").value_parser(value_parser!(usize))),
                ))
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(json_flags(
                    Command::new("types").about("Totals per payment type").arg(
                        Arg::new("all")
                            .long("all")
                            .action(ArgAction::SetTrue)
                            .help("List the recognised payment types instead"),
                    ),
                )),
        )
        .subcommand(
            Command::new("expense")
                .about("Record expenses")
                .subcommand(expense_fields(Command::new("add"), true))
                .subcommand(expense_fields(Command::new("edit").arg(id_arg()), false))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(search_arg())
                        .arg(opt("limit").value_parser(value_parser!(usize))),
                ))
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(json_flags(
                    Command::new("categories").about("Totals per category").arg(
                        Arg::new("all")
                            .long("all")
                            .action(ArgAction::SetTrue)
                            .help("List the recognised categories instead"),
                    ),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Profit and loss reports")
                .subcommand(json_flags(
                    Command::new("yearly")
                        .about("Month-by-month revenue, expenses and profit")
                        .arg(year_arg()),
                ))
                .subcommand(json_flags(
                    Command::new("summary")
                        .about("Year totals, margin, averages, best and worst month")
                        .arg(year_arg()),
                ))
                .subcommand(json_flags(
                    Command::new("years").about("Years that have records"),
                ))
                .subcommand(json_flags(
                    Command::new("dashboard").about("All-time totals"),
                )),
        )
        .subcommand(
            Command::new("export")
                .about("Write report tables to a file")
                .subcommand(
                    Command::new("report")
                        .arg(year_arg())
                        .arg(
                            opt("kind")
                                .default_value("all")
                                .value_parser(["all", "monthly", "summary", "analysis"]),
                        )
                        .arg(opt("format").default_value("csv").help("csv|json"))
                        .arg(opt("out").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Flag records the reports cannot use"))
}
