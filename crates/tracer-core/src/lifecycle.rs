//! Request lifecycle state machine
//!
//! Validates and applies status changes on an in-memory copy of a
//! [`DataRequest`]. Nothing here performs I/O: persisting the new snapshot
//! and mailing the requester are left to the caller, guided by
//! [`TransitionOutcome::notify_requester`].

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::Serialize;

use crate::errors::{Result, TracerError};
use crate::model::{now_micros, DataRequest, RequestStatus};

/// Result of a successful transition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionOutcome {
    /// The updated snapshot
    pub request: DataRequest,
    /// Status before the transition
    pub previous_status: RequestStatus,
    /// The caller should mail the requester about this change
    pub notify_requester: bool,
}

impl TransitionOutcome {
    pub fn status_changed(&self) -> bool {
        self.previous_status != self.request.status
    }
}

/// Apply a status change using the system clock
///
/// # Errors
///
/// * `NoOp` - target equals the current status and `notes` is blank
/// * `InvalidTransition` - target is not reachable from the current status
pub fn transition(
    request: &DataRequest,
    target: RequestStatus,
    notes: Option<&str>,
) -> Result<TransitionOutcome> {
    transition_at(request, target, notes, now_micros())
}

/// Apply a status change at a given instant
///
/// A target equal to the current status is a notes-only update: allowed in
/// every state (terminal ones included) as long as notes are provided, and
/// never recommends a notification.
///
/// The returned `updated_at` is strictly later than the input's, even when
/// `now` is not.
///
/// # Errors
///
/// * `NoOp` - target equals the current status and `notes` is blank
/// * `InvalidTransition` - target is not reachable from the current status
pub fn transition_at(
    request: &DataRequest,
    target: RequestStatus,
    notes: Option<&str>,
    now: DateTime<Utc>,
) -> Result<TransitionOutcome> {
    let from = request.status;
    // blank notes count as none, but stored notes keep the caller's text
    let notes = notes.filter(|n| !n.trim().is_empty());

    if target == from {
        if notes.is_none() {
            return Err(TracerError::NoOp {
                request_id: request.id.clone(),
                status: from,
            });
        }
    } else if !from.can_transition_to(target) {
        return Err(TracerError::InvalidTransition {
            request_id: request.id.clone(),
            from,
            to: target,
        });
    }

    let mut updated = request.clone();
    updated.status = target;
    if let Some(notes) = notes {
        updated.admin_notes = Some(notes.to_string());
    }
    updated.updated_at = next_timestamp(request.updated_at, now);

    let notify_requester = target != from && from.notifies_on_exit();

    tracing::debug!(
        data_request_id = %request.id,
        status_from = %from,
        status_to = %target,
        notify_requester,
        "transition validated"
    );

    Ok(TransitionOutcome {
        request: updated,
        previous_status: from,
        notify_requester,
    })
}

/// `now` at microsecond precision, bumped past `previous` when needed
pub(crate) fn next_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let now = now.trunc_subsecs(6);
    if now > previous {
        now
    } else {
        previous.trunc_subsecs(6) + Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewDataRequest, OutputFormat};
    use chrono::TimeZone;

    fn request_at(status: RequestStatus, at: DateTime<Utc>) -> DataRequest {
        let draft = NewDataRequest {
            name: "Sari Dewi".to_string(),
            nim: "13519002".to_string(),
            email: "sari@students.itb.ac.id".to_string(),
            phone_number: "0812000000".to_string(),
            purpose: "Salary analysis".to_string(),
            format: OutputFormat::Excel,
            year_from: None,
            year_to: None,
            tables: vec!["graduates".to_string()],
            columns: vec![],
            sql_query: None,
        };
        let mut req = DataRequest::from_draft("dr-1".to_string(), draft, at);
        req.status = status;
        req
    }

    #[test]
    fn test_next_timestamp_moves_forward_when_clock_lags() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let earlier = t - Duration::seconds(5);
        assert_eq!(next_timestamp(t, earlier), t + Duration::microseconds(1));
        assert_eq!(next_timestamp(earlier, t), t);
    }

    #[test]
    fn test_notes_only_update_on_terminal_state() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let req = request_at(RequestStatus::Completed, t);

        let outcome =
            transition_at(&req, RequestStatus::Completed, Some("archived"), t).unwrap();

        assert_eq!(outcome.request.status, RequestStatus::Completed);
        assert_eq!(outcome.request.admin_notes.as_deref(), Some("archived"));
        assert!(!outcome.notify_requester);
        assert!(!outcome.status_changed());
    }

    #[test]
    fn test_whitespace_notes_count_as_empty() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let req = request_at(RequestStatus::Approved, t);

        let err = transition_at(&req, RequestStatus::Approved, Some("   "), t).unwrap_err();
        assert!(matches!(err, TracerError::NoOp { .. }));
    }

    #[test]
    fn test_notes_retained_when_absent() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut req = request_at(RequestStatus::Approved, t);
        req.admin_notes = Some("earlier note".to_string());

        let outcome = transition_at(&req, RequestStatus::InProgress, None, t).unwrap();
        assert_eq!(outcome.request.admin_notes.as_deref(), Some("earlier note"));
    }
}
