// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

/// Upper bound for `--months`, one hundred years.
pub const MAX_MONTHS: u32 = 1200;

fn months_arg() -> Arg {
    Arg::new("months")
        .long("months")
        .value_parser(value_parser!(u32).range(1..=MAX_MONTHS as i64))
        .default_value("4")
        .help("Number of calendar months, current month included")
}

pub fn build_cli() -> Command {
    Command::new("nestegg")
        .about("Track income and expenses against a savings goal")
        .version(clap::crate_version!())
        .arg(
            Arg::new("data_dir")
                .long("data-dir")
                .env("NESTEGG_HOME")
                .global(true)
                .help("Directory holding the ledger database and preferences"),
        )
        .arg(
            Arg::new("rates_file")
                .long("rates-file")
                .global(true)
                .help("Read exchange rates from a JSON file instead of the NBP API"),
        )
        .arg(
            Arg::new("currency")
                .long("currency")
                .global(true)
                .help("Display currency for this run (overrides the saved one)"),
        )
        .subcommand(Command::new("init").about("Create the ledger database"))
        .subcommand(
            Command::new("goal")
                .about("Savings goal")
                .subcommand(
                    Command::new("set")
                        .about("Set a new active goal")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("amount").required(true)),
                )
                .subcommand(Command::new("show").about("Show the active goal")),
        )
        .subcommand(
            Command::new("tx")
                .about("Transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record income or an expense against the active goal")
                        .arg(
                            Arg::new("category")
                                .required(true)
                                .help("income or expense"),
                        )
                        .arg(Arg::new("title").required(true))
                        .arg(Arg::new("amount").required(true))
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .help("YYYY-MM-DD or RFC 3339, defaults to now"),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List transactions of one category, newest first")
                        .arg(Arg::new("category").required(true))
                        .arg(
                            Arg::new("window")
                                .long("window")
                                .default_value("all")
                                .help("all, this-month or last-month"),
                        )
                        .arg(
                            Arg::new("search")
                                .long("search")
                                .help("Title filter, '*' matches anything"),
                        ),
                ))
                .subcommand(json_flags(
                    Command::new("recent").about("Latest income and expenses"),
                ))
                .subcommand(
                    Command::new("clear")
                        .about("Delete every transaction (goals are kept)")
                        .arg(
                            Arg::new("yes")
                                .long("yes")
                                .action(ArgAction::SetTrue)
                                .help("Confirm the deletion"),
                        ),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Progress and analytics")
                .subcommand(json_flags(
                    Command::new("progress").about("Progress towards the active goal"),
                ))
                .subcommand(json_flags(
                    Command::new("monthly")
                        .about("Income and expenses per month, oldest first")
                        .arg(months_arg()),
                ))
                .subcommand(json_flags(
                    Command::new("stats")
                        .about("Totals, averages and savings rate")
                        .arg(months_arg()),
                )),
        )
        .subcommand(
            Command::new("fx")
                .about("Display currency")
                .subcommand(Command::new("list").about("Available currencies and rates"))
                .subcommand(
                    Command::new("use")
                        .about("Remember a display currency")
                        .arg(Arg::new("code").required(true)),
                )
                .subcommand(
                    Command::new("convert")
                        .about("Convert a base-currency amount")
                        .arg(Arg::new("amount").required(true))
                        .arg(Arg::new("code").required(true)),
                ),
        )
}
