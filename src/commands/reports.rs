// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde_json::json;

use crate::aggregate::DEFAULT_ROLLUP_MONTHS;
use crate::commands::Session;
use crate::currency::{convert, display_goal};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};

pub async fn handle(s: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("progress", sub)) => progress(s, sub).await?,
        Some(("monthly", sub)) => monthly(s, sub).await?,
        Some(("stats", sub)) => stats(s, sub).await?,
        _ => {}
    }
    Ok(())
}

fn months(sub: &clap::ArgMatches) -> u32 {
    sub.get_one::<u32>("months")
        .copied()
        .unwrap_or(DEFAULT_ROLLUP_MONTHS)
}

async fn progress(s: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let Some((goal, progress)) = s.ledger.progress().await? else {
        println!("No goal set yet. Use `nestegg goal set <name> <amount>`.");
        return Ok(());
    };
    let ccy = s.display_currency();
    let rates = s.rates_for_display().await;
    let card = display_goal(&goal, &progress, &rates, &ccy);

    let out = json!({
        "goal": &card,
        "net": progress.net,
        "version": s.ledger.change_version(),
    });
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &out)? {
        let rows = vec![vec![
            card.name.clone(),
            fmt_money(&card.target, &card.currency),
            fmt_money(&card.saved, &card.currency),
            format!("{:.2}", progress.net),
            format!("{:.1}%", card.percent.round_dp(1)),
        ]];
        println!(
            "{}",
            pretty_table(&["Goal", "Target", "Saved", "Net (BASE)", "Progress"], rows)
        );
    }
    Ok(())
}

async fn monthly(s: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let rollup = s.ledger.monthly_rollup(months(sub)).await?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rollup)? {
        return Ok(());
    }
    let ccy = s.display_currency();
    let rates = s.rates_for_display().await;
    let data = rollup
        .iter()
        .map(|m| {
            vec![
                m.month_label.clone(),
                format!("{:.2}", convert(m.income_total, &rates, &ccy)),
                format!("{:.2}", convert(m.expense_total, &rates, &ccy)),
                format!("{:.2}", m.net),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Month", "Income", "Expense", "Net (BASE)"], data)
    );
    Ok(())
}

async fn stats(s: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let st = s.ledger.statistics(months(sub)).await?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &st)? {
        return Ok(());
    }
    let data = vec![
        vec!["Total income".to_string(), format!("{:.2}", st.total_income)],
        vec!["Total expenses".to_string(), format!("{:.2}", st.total_expenses)],
        vec!["Average income".to_string(), format!("{:.2}", st.average_income)],
        vec![
            "Average expenses".to_string(),
            format!("{:.2}", st.average_expenses),
        ],
        vec!["Total savings".to_string(), format!("{:.2}", st.total_savings)],
        vec!["Average savings".to_string(), format!("{:.2}", st.average_savings)],
        vec![
            "Savings rate".to_string(),
            format!("{:.2}%", st.savings_rate_percent),
        ],
        vec![
            "Expense ratio".to_string(),
            format!("{:.2}%", st.expense_ratio_percent),
        ],
        vec!["Ranking".to_string(), st.ranking.to_string()],
    ];
    println!("{}", pretty_table(&["Statistic", "Value (BASE)"], data));
    Ok(())
}
