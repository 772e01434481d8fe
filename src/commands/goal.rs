// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing::warn;

use crate::commands::Session;
use crate::currency::convert;
use crate::utils::{fmt_money, parse_decimal, required};

pub async fn handle(s: &mut Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(s, sub).await?,
        Some(("show", _)) => show(s).await?,
        _ => {}
    }
    Ok(())
}

async fn set(s: &mut Session, sub: &clap::ArgMatches) -> Result<()> {
    let name = required(sub, "name")?;
    let amount = parse_decimal(required(sub, "amount")?)?;
    let goal = s.ledger.set_goal(name, amount).await?;
    // the cache is best effort, the ledger already holds the goal
    if let Err(err) = s.prefs.mirror_goal(&goal) {
        warn!("could not cache goal in preferences: {:#}", err);
    }
    println!("Goal set: '{}' with target {}", goal.name, goal.target_amount);
    Ok(())
}

async fn show(s: &Session) -> Result<()> {
    let ccy = s.display_currency();
    match s.ledger.active_goal().await {
        Ok(Some(goal)) => {
            let rates = s.rates_for_display().await;
            println!(
                "Goal '{}' (#{}) target {}",
                goal.name,
                goal.id,
                fmt_money(&convert(goal.target_amount, &rates, &ccy), &ccy)
            );
        }
        Ok(None) => println!("No goal set yet. Use `nestegg goal set <name> <amount>`."),
        Err(err) => {
            let Some((name, amount)) = s.prefs.cached_goal() else {
                return Err(err.into());
            };
            warn!("ledger unavailable, showing cached goal: {}", err);
            println!("Goal '{}' target {} (cached)", name, amount);
        }
    }
    Ok(())
}
