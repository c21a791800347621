//! History of queries handed to the executor

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

use super::{from_micros, to_micros};
use tracer_core::errors::{ExError, ExErrorKind};

use crate::errors::{from_rusqlite, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub sql: String,
    pub executed_at: DateTime<Utc>,
}

pub struct QueryHistory;

impl QueryHistory {
    /// Record a query; returns the new entry's id
    pub fn record(conn: &Connection, sql: &str, at: DateTime<Utc>) -> Result<i64> {
        conn.execute(
            "INSERT INTO query_history (sql, executed_at) VALUES (?1, ?2)",
            rusqlite::params![sql, to_micros(at)],
        )
        .map_err(from_rusqlite)?;
        Ok(conn.last_insert_rowid())
    }

    /// Entries between `from` and `to` (both inclusive, either open), oldest
    /// first
    pub fn list(
        conn: &Connection,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<HistoryEntry>> {
        let mut stmt = conn
            .prepare(
                "SELECT id, sql, executed_at FROM query_history
                 WHERE executed_at >= ?1 AND executed_at <= ?2
                 ORDER BY executed_at, id",
            )
            .map_err(from_rusqlite)?;

        let lower = from.map(to_micros).unwrap_or(i64::MIN);
        let upper = to.map(to_micros).unwrap_or(i64::MAX);

        let rows = stmt
            .query_map(rusqlite::params![lower, upper], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        rows.into_iter()
            .map(|(id, sql, at)| {
                let executed_at = from_micros(at).ok_or_else(|| {
                    ExError::new(ExErrorKind::Internal)
                        .with_op("hydrate")
                        .with_message(format!("query_history {}: timestamp out of range", id))
                })?;
                Ok(HistoryEntry {
                    id,
                    sql,
                    executed_at,
                })
            })
            .collect()
    }
}
