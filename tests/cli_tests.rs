// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use nestegg::cli;
use nestegg::commands::transactions::new_transaction_from;
use nestegg::models::{Category, Goal};
use nestegg::prefs::{CURRENCY, Preferences};

fn tx_sub(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["nestegg", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("tx", tx_m)) => match tx_m.subcommand() {
            Some((_, sub)) => sub.clone(),
            None => panic!("no tx subcommand"),
        },
        _ => panic!("no tx command"),
    }
}

#[test]
fn add_arguments_become_a_new_transaction() {
    let sub = tx_sub(&["add", "outcome", "Groceries", "42.50", "--date", "2025-02-03"]);
    let new = new_transaction_from(&sub).unwrap();
    assert_eq!(new.category, Category::Expense);
    assert_eq!(new.title, "Groceries");
    assert_eq!(new.amount, Decimal::new(4250, 2));
    assert_eq!(new.date, Utc.with_ymd_and_hms(2025, 2, 3, 0, 0, 0).unwrap());
}

#[test]
fn bad_category_is_reported() {
    let sub = tx_sub(&["add", "transfer", "Move", "10"]);
    assert!(new_transaction_from(&sub).is_err());
}

#[test]
fn months_must_be_in_range() {
    let res = cli::build_cli().try_get_matches_from(["nestegg", "report", "monthly", "--months", "0"]);
    assert!(res.is_err());
    let ok = cli::build_cli()
        .try_get_matches_from(["nestegg", "report", "stats", "--months", "6"])
        .unwrap();
    let (_, report) = ok.subcommand().unwrap();
    let (_, stats) = report.subcommand().unwrap();
    assert_eq!(stats.get_one::<u32>("months"), Some(&6));

    let too_many = (cli::MAX_MONTHS + 1).to_string();
    let res = cli::build_cli().try_get_matches_from([
        "nestegg",
        "report",
        "monthly",
        "--months",
        too_many.as_str(),
    ]);
    assert!(res.is_err());
    let res = cli::build_cli().try_get_matches_from(["nestegg", "report", "stats", "--months", "2147483647"]);
    assert!(res.is_err());
}

#[test]
fn preferences_persist_goal_and_currency() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");

    let mut prefs = Preferences::load(&path).unwrap();
    assert!(prefs.cached_goal().is_none());
    prefs
        .mirror_goal(&Goal {
            id: 3,
            name: "Bike".into(),
            target_amount: Decimal::from(900),
        })
        .unwrap();
    prefs.set(CURRENCY, "EUR").unwrap();

    let reloaded = Preferences::load(&path).unwrap();
    assert_eq!(
        reloaded.cached_goal(),
        Some(("Bike".to_string(), Decimal::from(900)))
    );
    assert_eq!(reloaded.currency(), Some("EUR"));
}
