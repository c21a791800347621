#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{draft, setup};
use tracer_core::logging_facility::init_test_capture;
use tracer_core::model::RequestStatus;
use tracer_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use tracer_core_types::OperationContext;
use tracer_engine::commands::request::{request_create, request_transition};

#[test]
fn test_transition_emits_one_start_and_one_end() {
    let capture = init_test_capture();
    let mut conn = setup();
    let created = request_create(&conn, draft("graduates", "tech")).unwrap();

    request_transition(
        &mut conn,
        &OperationContext::new(),
        &created.id,
        RequestStatus::Approved,
        None,
    )
    .unwrap();

    let events: Vec<_> = capture
        .events_for("request_transition")
        .into_iter()
        .filter(|e| {
            e.field("data_request_id") == Some(created.id.as_str())
                || e.field("status_from") == Some("PENDING")
        })
        .collect();
    let kinds: Vec<_> = events.iter().filter_map(|e| e.event.clone()).collect();
    assert!(kinds.contains(&EVENT_START.to_string()));
    assert!(kinds.contains(&EVENT_END.to_string()));
    assert!(!kinds.contains(&EVENT_END_ERROR.to_string()));
}

#[test]
fn test_failed_transition_emits_error_with_code() {
    let capture = init_test_capture();
    let mut conn = setup();
    let created = request_create(&conn, draft("graduates", "tech")).unwrap();

    request_transition(
        &mut conn,
        &OperationContext::new(),
        &created.id,
        RequestStatus::Completed,
        None,
    )
    .unwrap_err();

    let errors: Vec<_> = capture
        .events_for("request_transition")
        .into_iter()
        .filter(|e| {
            e.event.as_deref() == Some(EVENT_END_ERROR)
                && e.field("data_request_id") == Some(created.id.as_str())
        })
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field("err_code"), Some("ERR_INVALID_TRANSITION"));
}

#[test]
fn test_create_logs_redacted_requester() {
    let capture = init_test_capture();
    let conn = setup();
    let created = request_create(&conn, draft("graduates", "tech")).unwrap();

    let end = capture
        .events_for("request_create")
        .into_iter()
        .find(|e| e.field("data_request_id") == Some(created.id.as_str()))
        .expect("end event");
    assert_eq!(end.event.as_deref(), Some(EVENT_END));

    assert!(capture
        .events()
        .iter()
        .all(|e| e.fields.values().all(|v| !v.contains("sari@students.itb.ac.id"))));
}
