// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The ledger store: sole owner of the writable connection.
//!
//! Every mutation runs inside one SQLite transaction. It either commits and
//! bumps the change-version exactly once, or rolls back (the transaction is
//! dropped) and leaves both the data and the version untouched.

use std::path::Path;
use std::sync::Arc;

use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::db;
use crate::error::{LedgerError, Result};
use crate::models::{Category, Goal, NewTransaction, Transaction};
use crate::queries;
use crate::refresh::RefreshCoordinator;

pub struct LedgerStore {
    conn: Connection,
    refresh: Arc<RefreshCoordinator>,
}

impl LedgerStore {
    pub fn open(path: &Path, refresh: Arc<RefreshCoordinator>) -> Result<Self> {
        let conn = db::open_writer(path)?;
        Ok(Self { conn, refresh })
    }

    pub fn open_in_memory(refresh: Arc<RefreshCoordinator>) -> Result<Self> {
        let conn = db::open_in_memory()?;
        Ok(Self { conn, refresh })
    }

    /// Committed state as seen by the writer. Only valid between mutations.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }

    pub fn refresh(&self) -> &Arc<RefreshCoordinator> {
        &self.refresh
    }

    /// Stores a new goal and makes it the active one. Earlier goals stay in
    /// the table so their transactions keep a valid reference.
    pub fn create_or_replace_goal(&mut self, name: &str, target_amount: Decimal) -> Result<Goal> {
        let name = name.trim();
        if name.is_empty() {
            warn!("rejected goal with empty name");
            return Err(LedgerError::Validation("goal name must not be empty".into()));
        }
        if target_amount < Decimal::ZERO {
            warn!(%target_amount, "rejected goal with negative target");
            return Err(LedgerError::Validation(format!(
                "goal target must not be negative, got {}",
                target_amount
            )));
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO goals(name, target_amount) VALUES (?1, ?2)",
            params![name, target_amount.to_string()],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO active_goal(slot, goal_id) VALUES (1, ?1)
             ON CONFLICT(slot) DO UPDATE SET goal_id = excluded.goal_id",
            params![id],
        )?;
        tx.commit()?;

        let version = self.refresh.bump();
        info!(goal_id = id, version, "active goal replaced");
        Ok(Goal {
            id,
            name: name.to_string(),
            target_amount,
        })
    }

    /// Records a transaction against the goal active right now.
    pub fn add_transaction(&mut self, new: NewTransaction) -> Result<Transaction> {
        let title = new.title.trim();
        if title.is_empty() {
            warn!("rejected transaction with empty title");
            return Err(LedgerError::Validation(
                "transaction title must not be empty".into(),
            ));
        }
        if new.amount <= Decimal::ZERO {
            warn!(amount = %new.amount, "rejected non-positive transaction amount");
            return Err(LedgerError::Validation(format!(
                "transaction amount must be positive, got {}",
                new.amount
            )));
        }

        let tx = self.conn.transaction()?;
        let goal_id = queries::active_goal_id(&tx)?.ok_or_else(|| {
            LedgerError::Validation("no goal has been set yet; set a goal first".into())
        })?;
        // the pointer is covered by a foreign key, so this only trips on a damaged file
        if queries::goal_by_id(&tx, goal_id)?.is_none() {
            return Err(LedgerError::NotFound(format!("active goal {}", goal_id)));
        }
        tx.execute(
            "INSERT INTO transactions(date, title, amount, category, goal_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                db::fmt_timestamp(&new.date),
                title,
                new.amount.to_string(),
                new.category.as_str(),
                goal_id
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        let version = self.refresh.bump();
        info!(id, goal_id, category = %new.category, version, "transaction recorded");
        Ok(Transaction {
            id,
            date: new.date,
            title: title.to_string(),
            amount: new.amount,
            category: new.category,
            goal_id,
        })
    }

    /// Removes every transaction, keeping goals. Returns the number removed.
    pub fn clear_all_transactions(&mut self) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM transactions", [])?;
        tx.commit()?;

        let version = self.refresh.bump();
        info!(removed, version, "all transactions cleared");
        Ok(removed)
    }

    pub fn active_goal(&self) -> Result<Option<Goal>> {
        queries::active_goal(&self.conn)
    }

    pub fn list_transactions(
        &self,
        category: Category,
        limit: Option<usize>,
    ) -> Result<Vec<Transaction>> {
        queries::list_transactions(&self.conn, category, limit)
    }
}
