// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub name: String,
    pub target_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub title: String,
    pub amount: Decimal, // always > 0, sign lives in `category`
    pub category: Category,
    pub goal_id: i64,
}

/// Input of an add-transaction command; the goal is attached by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub date: DateTime<Utc>,
    pub title: String,
    pub amount: Decimal,
    pub category: Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Income,
    Expense,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Income, Category::Expense];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Income => "income",
            Category::Expense => "expense",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Category::Income),
            // "outcome" is how older databases spelled expenses
            "expense" | "outcome" => Ok(Category::Expense),
            other => Err(LedgerError::Validation(format!(
                "invalid category '{}', expected income or expense",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeWindow {
    #[default]
    AllTime,
    ThisMonth,
    LastMonth,
}

impl FromStr for TimeWindow {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "all-time" => Ok(TimeWindow::AllTime),
            "this-month" => Ok(TimeWindow::ThisMonth),
            "last-month" => Ok(TimeWindow::LastMonth),
            other => Err(LedgerError::Validation(format!(
                "invalid time window '{}', expected all, this-month or last-month",
                other
            ))),
        }
    }
}
