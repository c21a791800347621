//! SQLite repository for data requests
//!
//! Writes that change a request are guarded by its `updated_at`: the caller
//! passes the value it read, and the update only lands if the row still
//! carries it.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;
use tracer_core::errors::{ExError, ExErrorKind};
use tracer_core::lifecycle::TransitionOutcome;
use tracer_core::model::{DataRequest, OutputFormat, RequestStatus};
use tracer_core::queries::RequestFilter;

use super::{from_micros, to_micros};
use crate::errors::{corrupt_row, from_rusqlite, not_found, stale_update, Result};

const SELECT_COLUMNS: &str = "id, name, nim, email, phone_number, purpose, format, year_from, \
     year_to, tables, columns, sql_query, status, admin_notes, created_at, updated_at";

/// One row of the transition audit trail
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionRecord {
    pub request_id: String,
    pub from: RequestStatus,
    pub to: RequestStatus,
    pub admin_notes: Option<String>,
    /// Administrator who applied the change, when known
    pub actor: Option<String>,
    pub notified: bool,
    pub at: DateTime<Utc>,
}

/// SQLite repository for data requests
pub struct RequestRepo;

impl RequestRepo {
    /// Insert a new request
    ///
    /// # Errors
    /// `Persistence` on any SQLite failure, including a duplicate id.
    pub fn insert(conn: &Connection, request: &DataRequest) -> Result<()> {
        conn.execute(
            "INSERT INTO data_requests (id, name, nim, email, phone_number, purpose, format,
                year_from, year_to, tables, columns, sql_query, status, admin_notes,
                created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            rusqlite::params![
                request.id,
                request.name,
                request.nim,
                request.email,
                request.phone_number,
                request.purpose,
                request.format.as_str(),
                request.year_from,
                request.year_to,
                encode_list(&request.tables)?,
                encode_list(&request.columns)?,
                request.sql_query,
                request.status.as_str(),
                request.admin_notes,
                to_micros(request.created_at),
                to_micros(request.updated_at),
            ],
        )
        .map_err(from_rusqlite)?;

        tracing::debug!(data_request_id = %request.id, "data request inserted");
        Ok(())
    }

    /// Load one request
    ///
    /// # Errors
    /// `NotFound` when no row has this id.
    pub fn get(conn: &Connection, request_id: &str) -> Result<DataRequest> {
        Self::find(conn, request_id)?.ok_or_else(|| not_found(request_id))
    }

    pub fn find(conn: &Connection, request_id: &str) -> Result<Option<DataRequest>> {
        let row = conn
            .query_row(
                &format!("SELECT {} FROM data_requests WHERE id = ?1", SELECT_COLUMNS),
                [request_id],
                StoredRequest::from_row,
            )
            .optional()
            .map_err(from_rusqlite)?;

        row.map(StoredRequest::into_request).transpose()
    }

    /// List requests through a filter
    ///
    /// # Errors
    /// `InvalidFilter` for out-of-range paging, `Persistence` on SQLite
    /// failures.
    pub fn list(conn: &Connection, filter: &RequestFilter) -> Result<Vec<DataRequest>> {
        filter.validate().map_err(ExError::from)?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM data_requests ORDER BY created_at DESC, id",
                SELECT_COLUMNS
            ))
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([], StoredRequest::from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        let requests = rows
            .into_iter()
            .map(StoredRequest::into_request)
            .collect::<Result<Vec<_>>>()?;

        filter.apply(requests).map_err(ExError::from)
    }

    /// Persist a transition and append it to the audit trail
    ///
    /// Runs in one transaction. The row is only updated if its stored
    /// `updated_at` equals `expected_updated_at`. `actor` is recorded on the
    /// audit row.
    ///
    /// # Errors
    /// `NotFound` when the request is gone, `Concurrency` when it changed
    /// since it was read.
    pub fn apply_transition(
        conn: &mut Connection,
        outcome: &TransitionOutcome,
        expected_updated_at: DateTime<Utc>,
        actor: Option<&str>,
    ) -> Result<()> {
        let request = &outcome.request;
        let tx = conn.transaction().map_err(from_rusqlite)?;

        let changed = tx
            .execute(
                "UPDATE data_requests
                 SET status = ?1, admin_notes = ?2, updated_at = ?3
                 WHERE id = ?4 AND updated_at = ?5",
                rusqlite::params![
                    request.status.as_str(),
                    request.admin_notes,
                    to_micros(request.updated_at),
                    request.id,
                    to_micros(expected_updated_at),
                ],
            )
            .map_err(from_rusqlite)?;

        if changed == 0 {
            return Err(missing_or_stale(&tx, "apply_transition", &request.id));
        }

        tx.execute(
            "INSERT INTO request_transitions
                (request_id, from_status, to_status, admin_notes, actor, notified, at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                request.id,
                outcome.previous_status.as_str(),
                request.status.as_str(),
                request.admin_notes,
                actor,
                outcome.notify_requester,
                to_micros(request.updated_at),
            ],
        )
        .map_err(from_rusqlite)?;

        tx.commit().map_err(from_rusqlite)?;

        tracing::debug!(
            data_request_id = %request.id,
            status_from = %outcome.previous_status,
            status_to = %request.status,
            "transition persisted"
        );
        Ok(())
    }

    /// Persist the administrator's query for a request
    ///
    /// # Errors
    /// `NotFound` or `Concurrency`, as for [`RequestRepo::apply_transition`].
    pub fn update_query(
        conn: &Connection,
        request: &DataRequest,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let changed = conn
            .execute(
                "UPDATE data_requests SET sql_query = ?1, updated_at = ?2
                 WHERE id = ?3 AND updated_at = ?4",
                rusqlite::params![
                    request.sql_query,
                    to_micros(request.updated_at),
                    request.id,
                    to_micros(expected_updated_at),
                ],
            )
            .map_err(from_rusqlite)?;

        if changed == 0 {
            return Err(missing_or_stale(conn, "update_query", &request.id));
        }
        Ok(())
    }

    /// Persist a student's amendment of the request attributes
    ///
    /// Writes purpose, format, years, tables, columns and query. Requester
    /// fields and status are never touched here.
    ///
    /// # Errors
    /// `NotFound` or `Concurrency`, as for [`RequestRepo::apply_transition`].
    pub fn update_attributes(
        conn: &Connection,
        request: &DataRequest,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let changed = conn
            .execute(
                "UPDATE data_requests
                 SET purpose = ?1, format = ?2, year_from = ?3, year_to = ?4, tables = ?5,
                     columns = ?6, sql_query = ?7, updated_at = ?8
                 WHERE id = ?9 AND updated_at = ?10",
                rusqlite::params![
                    request.purpose,
                    request.format.as_str(),
                    request.year_from,
                    request.year_to,
                    encode_list(&request.tables)?,
                    encode_list(&request.columns)?,
                    request.sql_query,
                    to_micros(request.updated_at),
                    request.id,
                    to_micros(expected_updated_at),
                ],
            )
            .map_err(from_rusqlite)?;

        if changed == 0 {
            return Err(missing_or_stale(conn, "update_attributes", &request.id));
        }

        tracing::debug!(data_request_id = %request.id, "data request attributes updated");
        Ok(())
    }

    /// Audit trail for one request, oldest first
    pub fn transitions(conn: &Connection, request_id: &str) -> Result<Vec<TransitionRecord>> {
        let mut stmt = conn
            .prepare(
                "SELECT from_status, to_status, admin_notes, actor, notified, at
                 FROM request_transitions
                 WHERE request_id = ?1
                 ORDER BY id",
            )
            .map_err(from_rusqlite)?;

        let rows = stmt
            .query_map([request_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, bool>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        rows.into_iter()
            .map(|(from, to, admin_notes, actor, notified, at)| {
                Ok(TransitionRecord {
                    request_id: request_id.to_string(),
                    from: parse_status(request_id, &from)?,
                    to: parse_status(request_id, &to)?,
                    admin_notes,
                    actor,
                    notified,
                    at: timestamp(request_id, "at", at)?,
                })
            })
            .collect()
    }
}

/// Classify a zero-row conditional update
fn missing_or_stale(conn: &Connection, op: &str, request_id: &str) -> ExError {
    let exists = conn
        .query_row(
            "SELECT 1 FROM data_requests WHERE id = ?1",
            [request_id],
            |_| Ok(()),
        )
        .optional();

    match exists {
        Ok(Some(())) => stale_update(op, request_id),
        Ok(None) => not_found(request_id).with_op(op),
        Err(e) => from_rusqlite(e),
    }
}

/// Raw column values, converted outside the rusqlite row callback so that
/// decoding failures surface as `ExError`
struct StoredRequest {
    id: String,
    name: String,
    nim: String,
    email: String,
    phone_number: String,
    purpose: String,
    format: String,
    year_from: Option<i32>,
    year_to: Option<i32>,
    tables: String,
    columns: String,
    sql_query: Option<String>,
    status: String,
    admin_notes: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl StoredRequest {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            nim: row.get(2)?,
            email: row.get(3)?,
            phone_number: row.get(4)?,
            purpose: row.get(5)?,
            format: row.get(6)?,
            year_from: row.get(7)?,
            year_to: row.get(8)?,
            tables: row.get(9)?,
            columns: row.get(10)?,
            sql_query: row.get(11)?,
            status: row.get(12)?,
            admin_notes: row.get(13)?,
            created_at: row.get(14)?,
            updated_at: row.get(15)?,
        })
    }

    fn into_request(self) -> Result<DataRequest> {
        let id = self.id;
        Ok(DataRequest {
            format: self
                .format
                .parse::<OutputFormat>()
                .map_err(|e| corrupt_row(&id, "format", &e.to_string()))?,
            status: parse_status(&id, &self.status)?,
            tables: decode_list(&id, "tables", &self.tables)?,
            columns: decode_list(&id, "columns", &self.columns)?,
            created_at: timestamp(&id, "created_at", self.created_at)?,
            updated_at: timestamp(&id, "updated_at", self.updated_at)?,
            name: self.name,
            nim: self.nim,
            email: self.email,
            phone_number: self.phone_number,
            purpose: self.purpose,
            year_from: self.year_from,
            year_to: self.year_to,
            sql_query: self.sql_query,
            admin_notes: self.admin_notes,
            id,
        })
    }
}

fn encode_list(items: &[String]) -> Result<String> {
    serde_json::to_string(items).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("encode_list")
            .with_message(e.to_string())
    })
}

fn decode_list(request_id: &str, field: &str, raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw).map_err(|e| corrupt_row(request_id, field, &e.to_string()))
}

fn parse_status(request_id: &str, raw: &str) -> Result<RequestStatus> {
    raw.parse::<RequestStatus>()
        .map_err(|e| corrupt_row(request_id, "status", &e.to_string()))
}

fn timestamp(request_id: &str, field: &str, micros: i64) -> Result<DateTime<Utc>> {
    from_micros(micros)
        .ok_or_else(|| corrupt_row(request_id, field, &format!("timestamp {} out of range", micros)))
}
