// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod aggregate;
pub mod cli;
pub mod commands;
pub mod config;
pub mod currency;
pub mod db;
pub mod error;
pub mod models;
pub mod prefs;
pub mod queries;
pub mod refresh;
pub mod service;
pub mod store;
pub mod utils;

pub use error::{ErrorKind, LedgerError};
pub use service::Ledger;
