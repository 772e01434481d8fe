// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

use crate::currency::{FileRates, NbpRates, RateProvider};

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.nestegg", "Nestegg", "nestegg"));

pub const DB_FILE: &str = "nestegg.sqlite";
pub const PREFS_FILE: &str = "prefs.json";
const DEFAULT_LOG: &str = "nestegg=warn";

#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub rates_file: Option<PathBuf>,
}

impl Settings {
    /// `data_dir` comes from `--data-dir` / `NESTEGG_HOME`; the platform data
    /// directory is used when neither is given.
    pub fn resolve(data_dir: Option<&Path>, rates_file: Option<&Path>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(d) => d.to_path_buf(),
            None => default_data_dir()?,
        };
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data dir {}", data_dir.display()))?;
        Ok(Self {
            data_dir,
            rates_file: rates_file.map(Path::to_path_buf),
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }

    pub fn prefs_path(&self) -> PathBuf {
        self.data_dir.join(PREFS_FILE)
    }

    pub fn rate_provider(&self) -> Box<dyn RateProvider> {
        match &self.rates_file {
            Some(p) => Box::new(FileRates::new(p)),
            None => Box::new(NbpRates::default()),
        }
    }
}

pub fn default_data_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    Ok(proj.data_dir().to_path_buf())
}

/// `NESTEGG_LOG`, then `RUST_LOG`, then warnings only.
pub fn log_filter() -> String {
    std::env::var("NESTEGG_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| DEFAULT_LOG.to_string())
}

pub fn init_tracing() {
    let filter = EnvFilter::try_new(log_filter()).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
