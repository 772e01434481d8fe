// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Derived views over committed ledger state: goal progress, monthly
//! rollups, savings statistics and the two transaction filters.
//!
//! Nothing here writes. Functions that need "now" take it as an argument.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use regex::{Regex, RegexBuilder};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::error::{LedgerError, Result};
use crate::models::{Category, TimeWindow, Transaction};
use crate::queries;

/// How many rows the "recent" lists show per category.
pub const RECENT_LIMIT: usize = 3;
/// Months covered by the analysis screen.
pub const DEFAULT_ROLLUP_MONTHS: u32 = 4;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub net: Decimal,
    pub clamped: Decimal,
    pub percent: Decimal,
}

impl Progress {
    /// `net` is income minus expenses, `clamped` is that value held inside
    /// `[0, target]`, and `percent` is 0 for a zero target.
    pub fn from_totals(income: Decimal, expense: Decimal, target: Decimal) -> Self {
        let net = income - expense;
        let clamped = net.max(Decimal::ZERO).min(target.max(Decimal::ZERO));
        let percent = if target <= Decimal::ZERO {
            Decimal::ZERO
        } else {
            clamped * HUNDRED / target
        };
        Progress {
            net,
            clamped,
            percent,
        }
    }
}

pub fn compute_progress(conn: &Connection, goal_id: i64) -> Result<Progress> {
    let goal = queries::goal_by_id(conn, goal_id)?
        .ok_or_else(|| LedgerError::NotFound(format!("goal {}", goal_id)))?;
    let income = queries::sum_for_goal(conn, goal_id, Category::Income)?;
    let expense = queries::sum_for_goal(conn, goal_id, Category::Expense)?;
    debug!(goal_id, %income, %expense, "progress totals");
    Ok(Progress::from_totals(income, expense, goal.target_amount))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRollup {
    pub month_label: String, // YYYY-MM
    pub income_total: Decimal,
    pub expense_total: Decimal,
    pub net: Decimal,
}

/// First instant of the UTC month containing `ts`.
pub fn month_start(ts: &DateTime<Utc>) -> DateTime<Utc> {
    shift_month(ts, 0).unwrap_or(*ts)
}

// First instant of the month `delta` months away from the one holding `ts`.
fn shift_month(ts: &DateTime<Utc>, delta: i32) -> Option<DateTime<Utc>> {
    let index = ts.year() * 12 + ts.month0() as i32 + delta;
    let first = NaiveDate::from_ymd_opt(index.div_euclid(12), index.rem_euclid(12) as u32 + 1, 1)?;
    Some(first.and_hms_opt(0, 0, 0)?.and_utc())
}

fn month_bounds(now: &DateTime<Utc>, back: i32) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start = shift_month(now, -back);
    let end = shift_month(now, 1 - back);
    match (start, end) {
        (Some(s), Some(e)) => Ok((s, e)),
        _ => Err(LedgerError::Validation(format!(
            "month {} before {} is out of range",
            back, now
        ))),
    }
}

/// Income and expense per UTC calendar month for the `months_back` months
/// ending with the month of `now`, oldest first. Empty months are zero.
pub fn compute_monthly_rollup(
    conn: &Connection,
    months_back: u32,
    now: &DateTime<Utc>,
) -> Result<Vec<MonthlyRollup>> {
    if months_back == 0 {
        return Err(LedgerError::Validation(
            "months_back must be a positive number".into(),
        ));
    }
    let back = i32::try_from(months_back)
        .map_err(|_| LedgerError::Validation(format!("months_back {} is too large", months_back)))?;

    // oldest month first, so an unrepresentable range fails before any work
    month_bounds(now, back - 1)?;

    let mut out = Vec::new();
    for offset in (0..back).rev() {
        let (start, end) = month_bounds(now, offset)?;
        let income_total = queries::sum_between(conn, Category::Income, &start, &end)?;
        let expense_total = queries::sum_between(conn, Category::Expense, &start, &end)?;
        out.push(MonthlyRollup {
            month_label: start.format("%Y-%m").to_string(),
            income_total,
            expense_total,
            net: income_total - expense_total,
        });
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Ranking {
    Excellent,
    Good,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl Ranking {
    /// Tiers are inclusive at their lower bound, highest first.
    pub fn for_rate(rate_percent: Decimal) -> Self {
        if rate_percent >= Decimal::from(20) {
            Ranking::Excellent
        } else if rate_percent >= Decimal::TEN {
            Ranking::Good
        } else {
            Ranking::NeedsImprovement
        }
    }
}

impl fmt::Display for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Ranking::Excellent => "Excellent",
            Ranking::Good => "Good",
            Ranking::NeedsImprovement => "Needs Improvement",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub average_income: Decimal,
    pub average_expenses: Decimal,
    pub total_savings: Decimal,
    pub average_savings: Decimal,
    pub savings_rate_percent: Decimal,
    pub expense_ratio_percent: Decimal,
    pub ranking: Ranking,
}

fn per_item(total: Decimal, count: u64) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(count)
    }
}

pub fn compute_statistics(
    income_totals: &[Decimal],
    expense_totals: &[Decimal],
    income_count: u64,
    expense_count: u64,
) -> Statistics {
    let total_income: Decimal = income_totals.iter().copied().sum();
    let total_expenses: Decimal = expense_totals.iter().copied().sum();
    let total_savings = total_income - total_expenses;
    let (savings_rate_percent, expense_ratio_percent) = if total_income > Decimal::ZERO {
        (
            (total_savings * HUNDRED / total_income).round_dp(2),
            (total_expenses * HUNDRED / total_income).round_dp(2),
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };
    Statistics {
        total_income,
        total_expenses,
        average_income: per_item(total_income, income_count),
        average_expenses: per_item(total_expenses, expense_count),
        total_savings,
        average_savings: per_item(total_savings, income_count),
        savings_rate_percent,
        expense_ratio_percent,
        ranking: Ranking::for_rate(savings_rate_percent),
    }
}

/// Statistics over the last `months_back` months of the rollup, averaged by
/// the all-time number of transactions in each category.
pub fn gather_statistics(
    conn: &Connection,
    months_back: u32,
    now: &DateTime<Utc>,
) -> Result<Statistics> {
    let rollup = compute_monthly_rollup(conn, months_back, now)?;
    let income: Vec<Decimal> = rollup.iter().map(|m| m.income_total).collect();
    let expense: Vec<Decimal> = rollup.iter().map(|m| m.expense_total).collect();
    let income_count = queries::count_by_category(conn, Category::Income)?;
    let expense_count = queries::count_by_category(conn, Category::Expense)?;
    Ok(compute_statistics(&income, &expense, income_count, expense_count))
}

/// Case-insensitive title search where `*` stands for any run of characters.
/// Every other character is literal.
#[derive(Debug, Clone)]
pub struct TitlePattern {
    re: Option<Regex>,
}

impl TitlePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Ok(Self { re: None });
        }
        let source = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let re = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|err| {
                LedgerError::Validation(format!("invalid search '{}': {}", pattern, err))
            })?;
        Ok(Self { re: Some(re) })
    }

    pub fn matches(&self, title: &str) -> bool {
        match &self.re {
            Some(re) => re.is_match(title),
            None => true,
        }
    }
}

pub fn filter_by_title(transactions: Vec<Transaction>, pattern: &str) -> Result<Vec<Transaction>> {
    let pat = TitlePattern::new(pattern)?;
    Ok(transactions
        .into_iter()
        .filter(|t| pat.matches(&t.title))
        .collect())
}

pub fn filter_by_time_window(
    transactions: Vec<Transaction>,
    window: TimeWindow,
    now: &DateTime<Utc>,
) -> Vec<Transaction> {
    let this_month = month_start(now);
    match window {
        TimeWindow::AllTime => transactions,
        TimeWindow::ThisMonth => transactions
            .into_iter()
            .filter(|t| t.date >= this_month)
            .collect(),
        TimeWindow::LastMonth => {
            let last_month = shift_month(now, -1).unwrap_or(this_month);
            transactions
                .into_iter()
                .filter(|t| t.date >= last_month && t.date < this_month)
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn month_shift_crosses_year_boundary() {
        let now = Utc.with_ymd_and_hms(2025, 2, 14, 9, 30, 0).unwrap();
        let start = shift_month(&now, -3).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap());
        assert_eq!(month_start(&now), Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn wildcard_is_the_only_special_character() {
        let pat = TitlePattern::new("a.c*").unwrap();
        assert!(pat.matches("A.C rent"));
        assert!(!pat.matches("abc rent"));
        let pat = TitlePattern::new("(x").unwrap();
        assert!(pat.matches("fee (x2)"));
    }

    #[test]
    fn zero_target_reports_zero_percent() {
        let p = Progress::from_totals(Decimal::from(10), Decimal::ZERO, Decimal::ZERO);
        assert_eq!(p.net, Decimal::from(10));
        assert_eq!(p.clamped, Decimal::ZERO);
        assert_eq!(p.percent, Decimal::ZERO);
    }
}
