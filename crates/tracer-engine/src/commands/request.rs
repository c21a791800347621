//! Data request command handlers with boundary logging.

use rusqlite::Connection;
use serde::Serialize;
use tracer_core::errors::{ExError, ExErrorKind};
use tracer_core::lifecycle::{transition, TransitionOutcome};
use tracer_core::model::{DataRequest, NewDataRequest, RequestStatus};
use tracer_core::notification::{draft_download_ready, draft_status_notification, NotificationDraft};
use tracer_core::ops::{amend_request, attach_query, create_request, RequestAmendment};
use tracer_core::queries::RequestFilter;
use tracer_core::{log_op_end, log_op_error, log_op_start};
use tracer_core_types::{OperationContext, Sensitive};
use tracer_store::errors::Result;
use tracer_store::{RequestRepo, TransitionRecord};

use super::elapsed_ms;

/// What a caller gets back from [`request_transition`]
#[derive(Debug, Clone, Serialize)]
pub struct TransitionResult {
    pub outcome: TransitionOutcome,
    /// Mail to hand to the notification collaborator, if one is due
    pub notification: Option<NotificationDraft>,
}

/// Validate a student's draft and store it as a new `Pending` request
///
/// ## Errors
///
/// - `MissingField`, `InvalidEmail`, `InvalidYearRange`: draft rejected
/// - `Persistence`: database error
pub fn request_create(conn: &Connection, draft: NewDataRequest) -> Result<DataRequest> {
    let requester = Sensitive::new(draft.email.as_str()).hint();
    log_op_start!("request_create", requester = requester.as_str());
    let start = std::time::Instant::now();

    let result = request_create_impl(conn, draft).map_err(|e| {
        log_op_error!("request_create", e.clone(), duration_ms = elapsed_ms(start));
        e
    })?;

    log_op_end!(
        "request_create",
        duration_ms = elapsed_ms(start),
        data_request_id = result.id.as_str()
    );
    Ok(result)
}

fn request_create_impl(conn: &Connection, draft: NewDataRequest) -> Result<DataRequest> {
    let request = create_request(draft).map_err(ExError::from)?;
    RequestRepo::insert(conn, &request)?;
    Ok(request)
}

/// Load one request
///
/// ## Errors
///
/// - `NotFound`: no such request
pub fn request_get(conn: &Connection, request_id: &str) -> Result<DataRequest> {
    log_op_start!("request_get", data_request_id = request_id);
    let start = std::time::Instant::now();

    let result = RequestRepo::get(conn, request_id).map_err(|e| {
        log_op_error!("request_get", e.clone(), duration_ms = elapsed_ms(start));
        e
    })?;

    log_op_end!("request_get", duration_ms = elapsed_ms(start));
    Ok(result)
}

/// List requests through a filter
///
/// ## Errors
///
/// - `InvalidFilter`: paging out of range
pub fn request_list(conn: &Connection, filter: &RequestFilter) -> Result<Vec<DataRequest>> {
    log_op_start!("request_list");
    let start = std::time::Instant::now();

    let result = RequestRepo::list(conn, filter).map_err(|e| {
        log_op_error!("request_list", e.clone(), duration_ms = elapsed_ms(start));
        e
    })?;

    log_op_end!(
        "request_list",
        duration_ms = elapsed_ms(start),
        result_len = result.len() as u64
    );
    Ok(result)
}

/// Move a stored request to `target`
///
/// Loads the request, applies the lifecycle rules, and persists the result
/// with the loaded `updated_at` as precondition. A notification draft is
/// returned when the transition recommends one; sending it is up to the
/// caller.
///
/// ## Errors
///
/// - `NotFound`: no such request
/// - `InvalidTransition`, `NoOp`: rejected by the lifecycle
/// - `Concurrency`: the request changed between load and write
pub fn request_transition(
    conn: &mut Connection,
    ctx: &OperationContext,
    request_id: &str,
    target: RequestStatus,
    notes: Option<&str>,
) -> Result<TransitionResult> {
    log_op_start!(
        "request_transition",
        data_request_id = request_id,
        status_to = target.as_str(),
        correlation_id = ctx.correlation_id.as_str()
    );
    let start = std::time::Instant::now();

    let result = request_transition_impl(conn, ctx, request_id, target, notes).map_err(|e| {
        let e = e.with_correlation_id(ctx.correlation_id.clone());
        log_op_error!(
            "request_transition",
            e.clone(),
            duration_ms = elapsed_ms(start),
            data_request_id = request_id
        );
        e
    })?;

    log_op_end!(
        "request_transition",
        duration_ms = elapsed_ms(start),
        status_from = result.outcome.previous_status.as_str(),
        status_to = result.outcome.request.status.as_str(),
        notify_requester = result.outcome.notify_requester
    );
    Ok(result)
}

fn request_transition_impl(
    conn: &mut Connection,
    ctx: &OperationContext,
    request_id: &str,
    target: RequestStatus,
    notes: Option<&str>,
) -> Result<TransitionResult> {
    let current = RequestRepo::get(conn, request_id)?;
    let outcome = transition(&current, target, notes).map_err(ExError::from)?;

    RequestRepo::apply_transition(conn, &outcome, current.updated_at, ctx.actor.as_deref())?;

    let notification = draft_status_notification(&outcome);
    Ok(TransitionResult {
        outcome,
        notification,
    })
}

/// Audit trail of a request, oldest first
///
/// ## Errors
///
/// - `NotFound`: no such request
pub fn request_history(conn: &Connection, request_id: &str) -> Result<Vec<TransitionRecord>> {
    log_op_start!("request_history", data_request_id = request_id);
    let start = std::time::Instant::now();

    let result = RequestRepo::get(conn, request_id)
        .and_then(|_| RequestRepo::transitions(conn, request_id))
        .map_err(|e| {
            log_op_error!("request_history", e.clone(), duration_ms = elapsed_ms(start));
            e
        })?;

    log_op_end!(
        "request_history",
        duration_ms = elapsed_ms(start),
        result_len = result.len() as u64
    );
    Ok(result)
}

/// Store an administrator's query on a request
///
/// ## Errors
///
/// - `UnsafeQuery`: not a single read-only statement
/// - `NotFound`, `Concurrency`: as for [`request_transition`]
pub fn request_attach_query(
    conn: &Connection,
    ctx: &OperationContext,
    request_id: &str,
    sql: &str,
) -> Result<DataRequest> {
    log_op_start!(
        "request_attach_query",
        data_request_id = request_id,
        correlation_id = ctx.correlation_id.as_str()
    );
    let start = std::time::Instant::now();

    let result = request_attach_query_impl(conn, request_id, sql).map_err(|e| {
        let e = e.with_correlation_id(ctx.correlation_id.clone());
        log_op_error!(
            "request_attach_query",
            e.clone(),
            duration_ms = elapsed_ms(start),
            data_request_id = request_id
        );
        e
    })?;

    log_op_end!("request_attach_query", duration_ms = elapsed_ms(start));
    Ok(result)
}

fn request_attach_query_impl(conn: &Connection, request_id: &str, sql: &str) -> Result<DataRequest> {
    let current = RequestRepo::get(conn, request_id)?;
    let updated = attach_query(&current, sql).map_err(ExError::from)?;
    RequestRepo::update_query(conn, &updated, current.updated_at)?;
    Ok(updated)
}

/// Apply a student's amendment to a request awaiting review
///
/// Loads the request, applies the amendment, and persists it with the
/// loaded `updated_at` as precondition.
///
/// ## Errors
///
/// - `NotFound`: no such request
/// - `NotAmendable`: the request is past review
/// - `NoOp`, `MissingField`, `InvalidYearRange`, `UnsafeQuery`: amendment
///   rejected
/// - `Concurrency`: the request changed between load and write
pub fn request_amend(
    conn: &Connection,
    ctx: &OperationContext,
    request_id: &str,
    amendment: &RequestAmendment,
) -> Result<DataRequest> {
    log_op_start!(
        "request_amend",
        data_request_id = request_id,
        correlation_id = ctx.correlation_id.as_str()
    );
    let start = std::time::Instant::now();

    let result = request_amend_impl(conn, request_id, amendment).map_err(|e| {
        let e = e.with_correlation_id(ctx.correlation_id.clone());
        log_op_error!(
            "request_amend",
            e.clone(),
            duration_ms = elapsed_ms(start),
            data_request_id = request_id
        );
        e
    })?;

    log_op_end!("request_amend", duration_ms = elapsed_ms(start));
    Ok(result)
}

fn request_amend_impl(
    conn: &Connection,
    request_id: &str,
    amendment: &RequestAmendment,
) -> Result<DataRequest> {
    let current = RequestRepo::get(conn, request_id)?;
    let updated = amend_request(&current, amendment).map_err(ExError::from)?;
    RequestRepo::update_attributes(conn, &updated, current.updated_at)?;
    Ok(updated)
}

/// Draft the download-ready mail for a completed request
///
/// ## Errors
///
/// - `NotFound`: no such request
/// - `InvalidInput`: the request is not `COMPLETED`, or `csv_id` is blank
pub fn request_ready_mail(
    conn: &Connection,
    request_id: &str,
    base_url: &str,
    csv_id: &str,
) -> Result<NotificationDraft> {
    log_op_start!("request_ready_mail", data_request_id = request_id);
    let start = std::time::Instant::now();

    let result = request_ready_mail_impl(conn, request_id, base_url, csv_id).map_err(|e| {
        log_op_error!("request_ready_mail", e.clone(), duration_ms = elapsed_ms(start));
        e
    })?;

    log_op_end!("request_ready_mail", duration_ms = elapsed_ms(start));
    Ok(result)
}

fn request_ready_mail_impl(
    conn: &Connection,
    request_id: &str,
    base_url: &str,
    csv_id: &str,
) -> Result<NotificationDraft> {
    if csv_id.trim().is_empty() {
        return Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("request_ready_mail")
            .with_message("csv id is empty"));
    }

    let request = RequestRepo::get(conn, request_id)?;
    if request.status != RequestStatus::Completed {
        return Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("request_ready_mail")
            .with_entity_id(request_id)
            .with_message(format!(
                "data is only ready for COMPLETED requests, this one is {}",
                request.status
            )));
    }

    Ok(draft_download_ready(&request, base_url, csv_id.trim()))
}
