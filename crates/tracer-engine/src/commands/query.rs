//! Query command handlers with boundary logging.
//!
//! Nothing here executes SQL against tracer-study data; that belongs to the
//! external executor. These handlers produce, check and record query text.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracer_core::errors::ExError;
use tracer_core::model::now_micros;
use tracer_core::query::{effective_query, ensure_select_only, SimpleQuery};
use tracer_core::{log_op_end, log_op_error, log_op_start};
use tracer_store::errors::Result;
use tracer_store::{HistoryEntry, QueryHistory, RequestRepo};

use super::elapsed_ms;

/// SQL preview for a stored request
///
/// The administrator's stored query wins over the generated template. With
/// `record`, the query is checked by the select-only guard and appended to
/// the history.
///
/// ## Errors
///
/// - `NotFound`: no such request
/// - `UnsafeQuery`: `record` was requested for a query the guard rejects
///   (including the placeholder)
pub fn query_preview(conn: &Connection, request_id: &str, record: bool) -> Result<String> {
    log_op_start!("query_preview", data_request_id = request_id, record = record);
    let start = std::time::Instant::now();

    let result = query_preview_impl(conn, request_id, record).map_err(|e| {
        log_op_error!(
            "query_preview",
            e.clone(),
            duration_ms = elapsed_ms(start),
            data_request_id = request_id
        );
        e
    })?;

    log_op_end!(
        "query_preview",
        duration_ms = elapsed_ms(start),
        result_len = result.len() as u64
    );
    Ok(result)
}

fn query_preview_impl(conn: &Connection, request_id: &str, record: bool) -> Result<String> {
    let request = RequestRepo::get(conn, request_id)?;
    let sql = effective_query(&request);

    if record {
        ensure_select_only(&sql).map_err(ExError::from)?;
        QueryHistory::record(conn, &sql, now_micros())?;
    }

    Ok(sql)
}

/// Run the select-only guard
///
/// ## Errors
///
/// - `UnsafeQuery`: the text is not a single read-only statement
pub fn query_check(sql: &str) -> Result<()> {
    log_op_start!("query_check");
    let start = std::time::Instant::now();

    ensure_select_only(sql).map_err(ExError::from).map_err(|e| {
        log_op_error!("query_check", e.clone(), duration_ms = elapsed_ms(start));
        e
    })?;

    log_op_end!("query_check", duration_ms = elapsed_ms(start));
    Ok(())
}

/// Render a simple query against `table` and check it
///
/// ## Errors
///
/// - `MalformedRequest`: blank table or empty select list
/// - `UnsafeQuery`: a clause smuggled in a statement separator
pub fn query_build(query: &SimpleQuery, table: &str) -> Result<String> {
    log_op_start!("query_build", table = table);
    let start = std::time::Instant::now();

    let result = query
        .render(table)
        .and_then(|sql| ensure_select_only(&sql).map(|()| sql))
        .map_err(ExError::from)
        .map_err(|e| {
            log_op_error!("query_build", e.clone(), duration_ms = elapsed_ms(start));
            e
        })?;

    log_op_end!(
        "query_build",
        duration_ms = elapsed_ms(start),
        result_len = result.len() as u64
    );
    Ok(result)
}

/// Recorded queries in an inclusive time window, oldest first
pub fn query_history(
    conn: &Connection,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Result<Vec<HistoryEntry>> {
    log_op_start!("query_history");
    let start = std::time::Instant::now();

    let result = QueryHistory::list(conn, from, to).map_err(|e| {
        log_op_error!("query_history", e.clone(), duration_ms = elapsed_ms(start));
        e
    })?;

    log_op_end!(
        "query_history",
        duration_ms = elapsed_ms(start),
        result_len = result.len() as u64
    );
    Ok(result)
}
