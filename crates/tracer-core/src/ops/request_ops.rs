use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::{Result, TracerError};
use crate::lifecycle::next_timestamp;
use crate::model::{now_micros, DataRequest, NewDataRequest, OutputFormat};
use crate::query::guard::ensure_select_only;
use crate::rules::validation::{validate_new_request, validate_year_range};

/// Changes a student makes to a request under review
///
/// `None` leaves a field as it is. For the years, `Some(None)` clears the
/// bound; for `sql_query`, a blank value clears the stored query. Requester
/// fields (name, nim, email, phone) are not amendable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestAmendment {
    pub purpose: Option<String>,
    pub format: Option<OutputFormat>,
    pub year_from: Option<Option<i32>>,
    pub year_to: Option<Option<i32>>,
    pub tables: Option<Vec<String>>,
    pub columns: Option<Vec<String>>,
    pub sql_query: Option<String>,
}

impl RequestAmendment {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Create a new data request from a student's draft
///
/// Text fields are trimmed, the draft is validated, and the request gets a
/// UUID v7 id and `Pending` status.
///
/// # Errors
/// * `MissingField` - a required field is blank
/// * `InvalidEmail` - email is malformed
/// * `InvalidYearRange` - years out of window or inverted
/// * `UnsafeQuery` - a supplied query is not a single read-only statement
pub fn create_request(draft: NewDataRequest) -> Result<DataRequest> {
    create_request_at(draft, now_micros())
}

/// Same as [`create_request`] with a caller-supplied creation time
///
/// # Errors
/// See [`create_request`].
pub fn create_request_at(draft: NewDataRequest, now: DateTime<Utc>) -> Result<DataRequest> {
    let draft = normalize(draft);
    validate_new_request(&draft)?;
    if let Some(sql) = draft.sql_query.as_deref() {
        ensure_select_only(sql)?;
    }

    let id = Uuid::now_v7().to_string();
    tracing::debug!(data_request_id = %id, "data request created");

    Ok(DataRequest::from_draft(id, draft, now))
}

/// Store an administrator's query on the request
///
/// The query must pass the select-only guard. Returns the updated snapshot;
/// the input is left untouched.
///
/// # Errors
/// `UnsafeQuery` if the text is not a single read-only statement.
pub fn attach_query(request: &DataRequest, sql: &str) -> Result<DataRequest> {
    ensure_select_only(sql)?;

    let mut updated = request.clone();
    updated.sql_query = Some(sql.trim().to_string());
    updated.updated_at = next_timestamp(request.updated_at, now_micros());
    Ok(updated)
}

/// Apply a student's amendment using the system clock
///
/// # Errors
/// See [`amend_request_at`].
pub fn amend_request(request: &DataRequest, amendment: &RequestAmendment) -> Result<DataRequest> {
    amend_request_at(request, amendment, now_micros())
}

/// Apply a student's amendment at a given instant
///
/// Only `PENDING` and `REQUIRES_REVISION` requests can be amended. The
/// status and admin notes are untouched; `updated_at` moves strictly
/// forward. The input is left unmodified.
///
/// # Errors
/// * `NotAmendable` - the request is past review
/// * `NoOp` - the amendment changes nothing
/// * `MissingField` - purpose amended to a blank value
/// * `InvalidYearRange` - the resulting range is inverted or out of window
/// * `UnsafeQuery` - the amended query is not a single read-only statement
pub fn amend_request_at(
    request: &DataRequest,
    amendment: &RequestAmendment,
    now: DateTime<Utc>,
) -> Result<DataRequest> {
    if !request.status.is_amendable() {
        return Err(TracerError::NotAmendable {
            request_id: request.id.clone(),
            status: request.status,
        });
    }
    if amendment.is_empty() {
        return Err(TracerError::NoOp {
            request_id: request.id.clone(),
            status: request.status,
        });
    }

    let mut updated = request.clone();

    if let Some(purpose) = &amendment.purpose {
        let purpose = purpose.trim();
        if purpose.is_empty() {
            return Err(TracerError::MissingField {
                field: "purpose".to_string(),
            });
        }
        updated.purpose = purpose.to_string();
    }
    if let Some(format) = amendment.format {
        updated.format = format;
    }
    if let Some(year_from) = amendment.year_from {
        updated.year_from = year_from;
    }
    if let Some(year_to) = amendment.year_to {
        updated.year_to = year_to;
    }
    validate_year_range(updated.year_from, updated.year_to)?;

    if let Some(tables) = &amendment.tables {
        updated.tables = tables.clone();
    }
    if let Some(columns) = &amendment.columns {
        updated.columns = columns.clone();
    }
    if let Some(sql) = &amendment.sql_query {
        let sql = sql.trim();
        if sql.is_empty() {
            updated.sql_query = None;
        } else {
            ensure_select_only(sql)?;
            updated.sql_query = Some(sql.to_string());
        }
    }

    updated.updated_at = next_timestamp(request.updated_at, now);

    tracing::debug!(data_request_id = %request.id, "data request amended");
    Ok(updated)
}

fn normalize(mut draft: NewDataRequest) -> NewDataRequest {
    draft.name = draft.name.trim().to_string();
    draft.nim = draft.nim.trim().to_string();
    draft.email = draft.email.trim().to_string();
    draft.phone_number = draft.phone_number.trim().to_string();
    draft.purpose = draft.purpose.trim().to_string();
    draft.sql_query = draft
        .sql_query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty());
    draft
}
