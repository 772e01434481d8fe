// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};

use crate::commands::Session;
use crate::currency::convert;
use crate::prefs::CURRENCY;
use crate::utils::{parse_decimal, pretty_table, required};

pub async fn handle(s: &mut Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", _)) => list(s).await?,
        Some(("use", sub)) => use_currency(s, sub).await?,
        Some(("convert", sub)) => convert_amount(s, sub).await?,
        _ => {}
    }
    Ok(())
}

async fn list(s: &Session) -> Result<()> {
    let rates = s.rates().await;
    let selected = s.display_currency();
    let data = rates
        .currencies()
        .map(|(code, name, rate)| {
            vec![
                if code == selected {
                    format!("* {}", code)
                } else {
                    code.to_string()
                },
                name.unwrap_or("").to_string(),
                rate.to_string(),
            ]
        })
        .collect();
    let rate_hdr = format!("Rate ({})", rates.base);
    println!(
        "{}",
        pretty_table(&["Code", "Currency", rate_hdr.as_str()], data)
    );
    Ok(())
}

async fn use_currency(s: &mut Session, sub: &clap::ArgMatches) -> Result<()> {
    let code = required(sub, "code")?.trim().to_uppercase();
    let rates = s.rates().await;
    if rates.rate(&code).is_none() {
        bail!("Unknown currency '{}'", code);
    }
    s.prefs.set(CURRENCY, &code)?;
    println!("Display currency set to {}", code);
    Ok(())
}

async fn convert_amount(s: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_decimal(required(sub, "amount")?)?;
    let code = required(sub, "code")?.trim().to_uppercase();
    let rates = s.rates().await;
    let res = convert(amount, &rates, &code);
    println!("{} {} -> {:.2} {}", amount, rates.base, res, code);
    Ok(())
}
