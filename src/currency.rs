// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::aggregate::Progress;
use crate::models::Goal;

/// Currency every ledger amount is recorded in.
pub const BASE_CURRENCY: &str = "PLN";

const NBP_TABLE_A: &str = "https://api.nbp.pl/api/exchangerates/tables/A?format=json";

const UA: &str = concat!("nestegg/", env!("CARGO_PKG_VERSION"));

/// Rates keyed by currency code, each the price of one unit of that currency
/// in the base currency. The base currency itself is always present at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub base: String,
    #[serde(default)]
    rates: BTreeMap<String, Decimal>,
    #[serde(default)]
    names: BTreeMap<String, String>,
}

impl Default for RateTable {
    fn default() -> Self {
        Self::new(BASE_CURRENCY)
    }
}

impl RateTable {
    pub fn new(base: &str) -> Self {
        let base = base.to_uppercase();
        let mut rates = BTreeMap::new();
        rates.insert(base.clone(), Decimal::ONE);
        Self {
            base,
            rates,
            names: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, code: &str, rate: Decimal, name: Option<&str>) {
        let code = code.to_uppercase();
        if let Some(n) = name {
            self.names.insert(code.clone(), n.to_string());
        }
        self.rates.insert(code, rate);
    }

    pub fn rate(&self, code: &str) -> Option<Decimal> {
        self.rates.get(&code.to_uppercase()).copied()
    }

    pub fn name(&self, code: &str) -> Option<&str> {
        self.names.get(&code.to_uppercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// `(code, display name, rate)` sorted by code.
    pub fn currencies(&self) -> impl Iterator<Item = (&str, Option<&str>, Decimal)> + '_ {
        self.rates
            .iter()
            .map(|(c, r)| (c.as_str(), self.names.get(c).map(String::as_str), *r))
    }

    // tables loaded from disk may use any case and may omit the base row
    fn normalized(self) -> Self {
        let base = self.base.to_uppercase();
        let mut rates: BTreeMap<String, Decimal> = self
            .rates
            .into_iter()
            .map(|(c, r)| (c.to_uppercase(), r))
            .collect();
        rates.entry(base.clone()).or_insert(Decimal::ONE);
        let names = self
            .names
            .into_iter()
            .map(|(c, n)| (c.to_uppercase(), n))
            .collect();
        Self { base, rates, names }
    }
}

/// Converts a base-currency amount for display.
///
/// Non-positive amounts show as 0. An unknown code, or a zero rate, leaves
/// the amount as it is.
pub fn convert(amount_in_base: Decimal, rates: &RateTable, target_code: &str) -> Decimal {
    if amount_in_base <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    match rates.rate(target_code) {
        Some(r) if !r.is_zero() => amount_in_base / r,
        Some(_) => {
            warn!(code = target_code, "zero rate, showing base amount");
            amount_in_base
        }
        None => {
            debug!(code = target_code, "no rate, showing base amount");
            amount_in_base
        }
    }
}

/// Goal card values in the display currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalDisplay {
    pub name: String,
    pub currency: String,
    pub target: Decimal,
    pub saved: Decimal,
    pub percent: Decimal,
}

/// Target and clamped savings converted to `code`; the percentage is
/// currency independent and passes through.
pub fn display_goal(goal: &Goal, progress: &Progress, rates: &RateTable, code: &str) -> GoalDisplay {
    let currency = if rates.rate(code).is_some() {
        code.to_uppercase()
    } else {
        rates.base.clone()
    };
    GoalDisplay {
        name: goal.name.clone(),
        currency,
        target: convert(goal.target_amount, rates, code),
        saved: convert(progress.clamped, rates, code),
        percent: progress.percent,
    }
}

/// Source of the rate table read once at session start.
pub trait RateProvider: Send + Sync {
    fn fetch(&self) -> Result<RateTable>;
}

/// Table A of the National Bank of Poland (mid rates against PLN).
pub struct NbpRates {
    url: String,
}

impl Default for NbpRates {
    fn default() -> Self {
        Self {
            url: NBP_TABLE_A.to_string(),
        }
    }
}

pub fn http_client() -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

#[derive(Debug, Deserialize)]
struct NbpTable {
    rates: Vec<NbpRate>,
}

#[derive(Debug, Deserialize)]
struct NbpRate {
    currency: String,
    code: String,
    mid: f64,
}

impl RateProvider for NbpRates {
    fn fetch(&self) -> Result<RateTable> {
        let client = http_client()?;
        let resp = client
            .get(&self.url)
            .send()
            .with_context(|| format!("Request {}", self.url))?
            .error_for_status()?;
        let tables: Vec<NbpTable> = resp.json().context("Decode NBP rate table")?;
        table_from_nbp(tables)
    }
}

fn table_from_nbp(tables: Vec<NbpTable>) -> Result<RateTable> {
    let first = tables
        .into_iter()
        .next()
        .context("NBP response contained no table")?;
    let mut table = RateTable::new(BASE_CURRENCY);
    for r in first.rates {
        let mid = Decimal::try_from(r.mid)
            .with_context(|| format!("Invalid rate '{}' for {}", r.mid, r.code))?;
        table.insert(&r.code, mid, Some(&r.currency));
    }
    Ok(table)
}

/// Offline table stored as JSON (the serialized form of [`RateTable`]).
pub struct FileRates {
    path: PathBuf,
}

impl FileRates {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl RateProvider for FileRates {
    fn fetch(&self) -> Result<RateTable> {
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Read rate table {}", self.path.display()))?;
        let table: RateTable = serde_json::from_str(&raw)
            .with_context(|| format!("Parse rate table {}", self.path.display()))?;
        Ok(table.normalized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nbp_payload_becomes_table() {
        let raw = r#"[{"table":"A","no":"001/A/NBP/2025","effectiveDate":"2025-01-02",
            "rates":[{"currency":"euro","code":"EUR","mid":4.2718},
                     {"currency":"dolar amerykański","code":"USD","mid":4.1512}]}]"#;
        let tables: Vec<NbpTable> = serde_json::from_str(raw).unwrap();
        let table = table_from_nbp(tables).unwrap();
        assert_eq!(
            table.rate("eur").map(|r| r.round_dp(4)),
            Some(Decimal::new(42718, 4))
        );
        assert_eq!(table.name("EUR"), Some("euro"));
        assert_eq!(table.rate("PLN"), Some(Decimal::ONE));
        assert_eq!(table.len(), 3);
    }
}
