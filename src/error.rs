// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Errors reported by the ledger.
//!
//! Every failure falls in one of three kinds (see [`ErrorKind`]):
//!
//! - validation: the caller supplied a bad value, nothing was written;
//! - not found: a required entity (the active goal) is missing;
//! - storage fault: SQLite or the writer thread failed.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    StorageFault,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Validation(_) => ErrorKind::Validation,
            LedgerError::NotFound(_) => ErrorKind::NotFound,
            LedgerError::Database(_) | LedgerError::Unavailable(_) => ErrorKind::StorageFault,
        }
    }
}

impl From<tokio::task::JoinError> for LedgerError {
    fn from(err: tokio::task::JoinError) -> Self {
        LedgerError::Unavailable(format!("blocking task failed: {}", err))
    }
}
