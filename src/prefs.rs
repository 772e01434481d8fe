// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use crate::models::Goal;

pub const GOAL_NAME: &str = "goal_name";
pub const GOAL_AMOUNT: &str = "goal_amount";
pub const CURRENCY: &str = "currency";

/// String preferences kept in a JSON file next to the database.
///
/// Only a warm-start cache for what to show before the ledger answers; the
/// ledger stays the source of truth for goals.
#[derive(Debug)]
pub struct Preferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl Preferences {
    /// Loads the file, or starts empty when it does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        let values = if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Read preferences {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Parse preferences {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }

    fn save(&self) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&self.values)?)
            .with_context(|| format!("Write preferences {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Replace preferences {}", self.path.display()))?;
        Ok(())
    }

    pub fn mirror_goal(&mut self, goal: &Goal) -> Result<()> {
        self.values.insert(GOAL_NAME.into(), goal.name.clone());
        self.values
            .insert(GOAL_AMOUNT.into(), goal.target_amount.to_string());
        self.save()
    }

    /// Goal name and target as last mirrored, if both are present and parse.
    pub fn cached_goal(&self) -> Option<(String, Decimal)> {
        let name = self.get(GOAL_NAME)?;
        let amount = self.get(GOAL_AMOUNT)?.parse::<Decimal>().ok()?;
        Some((name.to_string(), amount))
    }

    pub fn currency(&self) -> Option<&str> {
        self.get(CURRENCY)
    }
}
