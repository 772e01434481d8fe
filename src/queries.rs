// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only ledger queries. They accept any connection and never write.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use crate::db::{category_column, decimal_column, fmt_timestamp, timestamp_column};
use crate::error::Result;
use crate::models::{Category, Goal, Transaction};

fn goal_from_row(r: &Row<'_>) -> rusqlite::Result<Goal> {
    let target: String = r.get(2)?;
    Ok(Goal {
        id: r.get(0)?,
        name: r.get(1)?,
        target_amount: decimal_column(2, &target)?,
    })
}

fn transaction_from_row(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    let date: String = r.get(1)?;
    let amount: String = r.get(3)?;
    let category: String = r.get(4)?;
    Ok(Transaction {
        id: r.get(0)?,
        date: timestamp_column(1, &date)?,
        title: r.get(2)?,
        amount: decimal_column(3, &amount)?,
        category: category_column(4, &category)?,
        goal_id: r.get(5)?,
    })
}

pub fn active_goal(conn: &Connection) -> Result<Option<Goal>> {
    let goal = conn
        .query_row(
            "SELECT g.id, g.name, g.target_amount
             FROM active_goal a JOIN goals g ON g.id = a.goal_id
             WHERE a.slot = 1",
            [],
            goal_from_row,
        )
        .optional()?;
    Ok(goal)
}

/// Raw pointer value, kept separate from [`active_goal`] so a dangling
/// pointer can be told apart from "no goal yet".
pub fn active_goal_id(conn: &Connection) -> Result<Option<i64>> {
    let id = conn
        .query_row("SELECT goal_id FROM active_goal WHERE slot = 1", [], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(id)
}

pub fn goal_by_id(conn: &Connection, id: i64) -> Result<Option<Goal>> {
    let goal = conn
        .query_row(
            "SELECT id, name, target_amount FROM goals WHERE id = ?1",
            params![id],
            goal_from_row,
        )
        .optional()?;
    Ok(goal)
}

/// Transactions of one category, newest first. Equal dates fall back to
/// insertion order, later rows first.
pub fn list_transactions(
    conn: &Connection,
    category: Category,
    limit: Option<usize>,
) -> Result<Vec<Transaction>> {
    let mut sql = String::from(
        "SELECT id, date, title, amount, category, goal_id FROM transactions
         WHERE category = ?1 ORDER BY date DESC, id DESC",
    );
    if limit.is_some() {
        sql.push_str(" LIMIT ?2");
    }
    let mut stmt = conn.prepare(&sql)?;
    let rows = match limit {
        Some(n) => stmt.query_map(
            params![category.as_str(), i64::try_from(n).unwrap_or(i64::MAX)],
            transaction_from_row,
        )?,
        None => stmt.query_map(params![category.as_str()], transaction_from_row)?,
    };
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

// Amounts are TEXT decimals; SQLite's SUM would go through floats, so add them here.
fn sum_amounts(mut rows: rusqlite::Rows<'_>) -> Result<Decimal> {
    let mut total = Decimal::ZERO;
    while let Some(r) = rows.next()? {
        let raw: String = r.get(0)?;
        total += decimal_column(0, &raw)?;
    }
    Ok(total)
}

pub fn sum_for_goal(conn: &Connection, goal_id: i64, category: Category) -> Result<Decimal> {
    let mut stmt =
        conn.prepare("SELECT amount FROM transactions WHERE goal_id = ?1 AND category = ?2")?;
    let rows = stmt.query(params![goal_id, category.as_str()])?;
    sum_amounts(rows)
}

/// Sum over the half-open interval `[start, end)`.
pub fn sum_between(
    conn: &Connection,
    category: Category,
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
) -> Result<Decimal> {
    let mut stmt = conn.prepare(
        "SELECT amount FROM transactions WHERE category = ?1 AND date >= ?2 AND date < ?3",
    )?;
    let rows = stmt.query(params![
        category.as_str(),
        fmt_timestamp(start),
        fmt_timestamp(end)
    ])?;
    sum_amounts(rows)
}

pub fn count_by_category(conn: &Connection, category: Category) -> Result<u64> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE category = ?1",
        params![category.as_str()],
        |r| r.get(0),
    )?;
    Ok(n.max(0) as u64)
}
