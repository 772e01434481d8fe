// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use rusqlite::types::Type;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::models::Category;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the single writable connection and makes sure the schema exists.
pub fn open_writer(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    // journal_mode returns a row, so it cannot go through execute_batch
    conn.query_row("PRAGMA journal_mode = WAL", [], |r| r.get::<_, String>(0))?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Private in-memory database with the full schema. Only one connection can
/// see it, so it suits the synchronous store, not the async `Ledger`.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Opens a connection used for queries only. It sees committed data only.
pub fn open_reader(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA query_only = ON;")?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS goals(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL CHECK(length(name) > 0),
        target_amount TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    -- exactly one row once a goal has been set
    CREATE TABLE IF NOT EXISTS active_goal(
        slot INTEGER PRIMARY KEY CHECK(slot = 1),
        goal_id INTEGER NOT NULL,
        FOREIGN KEY(goal_id) REFERENCES goals(id)
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        title TEXT NOT NULL CHECK(length(title) > 0),
        amount TEXT NOT NULL,
        category TEXT NOT NULL CHECK(category IN ('income','expense')),
        goal_id INTEGER NOT NULL,
        FOREIGN KEY(goal_id) REFERENCES goals(id)
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_category_date ON transactions(category, date);
    CREATE INDEX IF NOT EXISTS idx_transactions_goal ON transactions(goal_id);
    "#,
    )?;
    Ok(())
}

/// Fixed-width UTC text, so comparing columns as strings orders them by time.
pub fn fmt_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn timestamp_column(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn decimal_column(idx: usize, raw: &str) -> rusqlite::Result<Decimal> {
    raw.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn category_column(idx: usize, raw: &str) -> rusqlite::Result<Category> {
    raw.parse::<Category>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
