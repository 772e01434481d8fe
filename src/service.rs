// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Async handle over the ledger.
//!
//! Mutations go through a queue drained by one writer thread that owns the
//! [`LedgerStore`], so they commit one at a time in submission order.
//! Queries run on the blocking pool, each on its own read connection, and
//! only ever see committed transactions.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info};

use crate::aggregate::{self, MonthlyRollup, Progress, RECENT_LIMIT, Statistics};
use crate::db;
use crate::error::{LedgerError, Result};
use crate::models::{Category, Goal, NewTransaction, TimeWindow, Transaction};
use crate::queries;
use crate::refresh::RefreshCoordinator;
use crate::store::LedgerStore;

const QUEUE_DEPTH: usize = 64;

enum Command {
    SetGoal {
        name: String,
        target_amount: Decimal,
        reply: oneshot::Sender<Result<Goal>>,
    },
    AddTransaction {
        new: NewTransaction,
        reply: oneshot::Sender<Result<Transaction>>,
    },
    ClearTransactions {
        reply: oneshot::Sender<Result<usize>>,
    },
}

pub struct Ledger {
    path: PathBuf,
    commands: mpsc::Sender<Command>,
    refresh: Arc<RefreshCoordinator>,
    writer: Option<thread::JoinHandle<()>>,
}

impl Ledger {
    /// Opens (creating if needed) the database at `path` and starts the writer.
    pub fn open(path: &Path) -> Result<Self> {
        let refresh = Arc::new(RefreshCoordinator::new());
        let store = LedgerStore::open(path, Arc::clone(&refresh))?;
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let writer = thread::Builder::new()
            .name("ledger-writer".into())
            .spawn(move || run_writer(store, rx))
            .map_err(|e| LedgerError::Unavailable(format!("spawn writer: {}", e)))?;
        info!(path = %path.display(), "ledger opened");
        Ok(Self {
            path: path.to_path_buf(),
            commands: tx,
            refresh,
            writer: Some(writer),
        })
    }

    /// Stops accepting commands and waits for queued ones to finish.
    pub async fn close(mut self) -> Result<()> {
        let writer = self.writer.take();
        drop(self);
        if let Some(handle) = writer {
            tokio::task::spawn_blocking(move || handle.join())
                .await?
                .map_err(|_| LedgerError::Unavailable("writer thread panicked".into()))?;
        }
        Ok(())
    }

    async fn submit<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<T>>) -> Command,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| LedgerError::Unavailable("writer stopped".into()))?;
        rx.await
            .map_err(|_| LedgerError::Unavailable("writer dropped the request".into()))?
    }

    pub async fn set_goal(&self, name: &str, target_amount: Decimal) -> Result<Goal> {
        let name = name.to_string();
        self.submit(|reply| Command::SetGoal {
            name,
            target_amount,
            reply,
        })
        .await
    }

    pub async fn add_transaction(&self, new: NewTransaction) -> Result<Transaction> {
        self.submit(|reply| Command::AddTransaction { new, reply }).await
    }

    pub async fn clear_all_transactions(&self) -> Result<usize> {
        self.submit(|reply| Command::ClearTransactions { reply }).await
    }

    async fn read<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = db::open_reader(&path)?;
            f(&conn)
        })
        .await?
    }

    pub async fn active_goal(&self) -> Result<Option<Goal>> {
        self.read(queries::active_goal).await
    }

    /// One category, newest first, narrowed by time window and title search.
    pub async fn list_transactions(
        &self,
        category: Category,
        window: TimeWindow,
        search: &str,
    ) -> Result<Vec<Transaction>> {
        let search = search.to_string();
        let now = Utc::now();
        self.read(move |conn| {
            let all = queries::list_transactions(conn, category, None)?;
            let in_window = aggregate::filter_by_time_window(all, window, &now);
            aggregate::filter_by_title(in_window, &search)
        })
        .await
    }

    pub async fn recent_transactions(&self, category: Category) -> Result<Vec<Transaction>> {
        self.read(move |conn| queries::list_transactions(conn, category, Some(RECENT_LIMIT)))
            .await
    }

    /// Progress of the active goal, `None` until a goal is set.
    pub async fn progress(&self) -> Result<Option<(Goal, Progress)>> {
        self.read(|conn| {
            let Some(goal) = queries::active_goal(conn)? else {
                return Ok(None);
            };
            let progress = aggregate::compute_progress(conn, goal.id)?;
            Ok(Some((goal, progress)))
        })
        .await
    }

    pub async fn monthly_rollup(&self, months_back: u32) -> Result<Vec<MonthlyRollup>> {
        self.monthly_rollup_at(months_back, Utc::now()).await
    }

    pub async fn monthly_rollup_at(
        &self,
        months_back: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<MonthlyRollup>> {
        self.read(move |conn| aggregate::compute_monthly_rollup(conn, months_back, &now))
            .await
    }

    pub async fn statistics(&self, months_back: u32) -> Result<Statistics> {
        let now = Utc::now();
        self.read(move |conn| aggregate::gather_statistics(conn, months_back, &now))
            .await
    }

    pub fn change_version(&self) -> u64 {
        self.refresh.current_version()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.refresh.subscribe()
    }
}

fn run_writer(mut store: LedgerStore, mut rx: mpsc::Receiver<Command>) {
    while let Some(cmd) = rx.blocking_recv() {
        // a caller that gave up on the reply does not undo the commit
        match cmd {
            Command::SetGoal {
                name,
                target_amount,
                reply,
            } => {
                let _ = reply.send(store.create_or_replace_goal(&name, target_amount));
            }
            Command::AddTransaction { new, reply } => {
                let _ = reply.send(store.add_transaction(new));
            }
            Command::ClearTransactions { reply } => {
                let _ = reply.send(store.clear_all_transactions());
            }
        }
    }
    debug!("ledger writer drained");
    if let Err((_, err)) = store.into_connection().close() {
        error!("closing ledger database failed: {}", err);
    }
}
