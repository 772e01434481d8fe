// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use chrono::Utc;
use serde::Serialize;

use crate::commands::Session;
use crate::currency::{RateTable, convert};
use crate::models::{Category, NewTransaction, TimeWindow, Transaction};
use crate::utils::{maybe_print_json, parse_decimal, parse_timestamp, pretty_table, required};

pub async fn handle(s: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(s, sub).await?,
        Some(("list", sub)) => list(s, sub).await?,
        Some(("recent", sub)) => recent(s, sub).await?,
        Some(("clear", sub)) => clear(s, sub).await?,
        _ => {}
    }
    Ok(())
}

/// Reads the add-transaction arguments; the date defaults to now.
pub fn new_transaction_from(sub: &clap::ArgMatches) -> Result<NewTransaction> {
    let category: Category = required(sub, "category")?.parse()?;
    let title = required(sub, "title")?.to_string();
    let amount = parse_decimal(required(sub, "amount")?)?;
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_timestamp(d)?,
        None => Utc::now(),
    };
    Ok(NewTransaction {
        date,
        title,
        amount,
        category,
    })
}

async fn add(s: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let new = new_transaction_from(sub)?;
    let t = s.ledger.add_transaction(new).await?;
    println!(
        "Recorded {} {} '{}' on {} (goal #{})",
        t.category,
        t.amount,
        t.title,
        t.date.format("%Y-%m-%d"),
        t.goal_id
    );
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub title: String,
    pub category: String,
    pub amount: String,
    pub currency: String,
}

pub fn to_rows(data: &[Transaction], rates: &RateTable, ccy: &str) -> Vec<TransactionRow> {
    data.iter()
        .map(|t| TransactionRow {
            id: t.id,
            date: t.date.format("%Y-%m-%d %H:%M").to_string(),
            title: t.title.clone(),
            category: t.category.to_string(),
            amount: format!("{:.2}", convert(t.amount, rates, ccy)),
            currency: ccy.to_string(),
        })
        .collect()
}

fn print_rows(rows: Vec<TransactionRow>) {
    let data: Vec<Vec<String>> = rows
        .into_iter()
        .map(|r| vec![r.date, r.title, r.category, r.amount, r.currency])
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "Title", "Category", "Amount", "CCY"], data)
    );
}

async fn list(s: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let category: Category = required(sub, "category")?.parse()?;
    let window: TimeWindow = sub
        .get_one::<String>("window")
        .map(String::as_str)
        .unwrap_or("all")
        .parse()?;
    let search = sub.get_one::<String>("search").map(String::as_str).unwrap_or("");

    let data = s.ledger.list_transactions(category, window, search).await?;
    let ccy = s.display_currency();
    let rates = s.rates_for_display().await;
    let rows = to_rows(&data, &rates, &ccy);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
        print_rows(rows);
    }
    Ok(())
}

async fn recent(s: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let ccy = s.display_currency();
    let rates = s.rates_for_display().await;
    let mut rows = Vec::new();
    for category in Category::ALL {
        let data = s.ledger.recent_transactions(category).await?;
        rows.extend(to_rows(&data, &rates, &ccy));
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
        print_rows(rows);
    }
    Ok(())
}

async fn clear(s: &Session, sub: &clap::ArgMatches) -> Result<()> {
    if !sub.get_flag("yes") {
        bail!("Refusing to delete all transactions without --yes");
    }
    let removed = s.ledger.clear_all_transactions().await?;
    println!("Deleted {} transactions", removed);
    Ok(())
}
