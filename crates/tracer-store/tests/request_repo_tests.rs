#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{Duration, TimeZone, Utc};
use rusqlite::Connection;
use tracer_core::errors::ExErrorKind;
use tracer_core::lifecycle::transition_at;
use tracer_core::model::{DataRequest, NewDataRequest, OutputFormat, RequestStatus};
use tracer_core::ops::{amend_request, attach_query, create_request_at, RequestAmendment};
use tracer_core::queries::{RequestFilter, SortKey};
use tracer_store::db;
use tracer_store::RequestRepo;

fn setup() -> Connection {
    db::open_store_in_memory().expect("in-memory store")
}

fn draft(name: &str, email: &str) -> NewDataRequest {
    NewDataRequest {
        name: name.to_string(),
        nim: "13520001".to_string(),
        email: email.to_string(),
        phone_number: "08123456789".to_string(),
        purpose: "tech industry analysis".to_string(),
        format: OutputFormat::Excel,
        year_from: Some(2020),
        year_to: Some(2024),
        tables: vec!["graduates".to_string(), "employment".to_string()],
        columns: vec!["name".to_string(), "nim".to_string()],
        sql_query: None,
    }
}

fn stored(conn: &Connection, name: &str, minutes: i64) -> DataRequest {
    let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes);
    let req = create_request_at(draft(name, "someone@itb.ac.id"), at).unwrap();
    RequestRepo::insert(conn, &req).unwrap();
    req
}

#[test]
fn test_insert_then_get_round_trips() {
    let conn = setup();
    let now = Utc::now();
    let req = create_request_at(draft("Budi", "budi@itb.ac.id"), now).unwrap();

    RequestRepo::insert(&conn, &req).unwrap();
    let loaded = RequestRepo::get(&conn, &req.id).unwrap();

    assert_eq!(loaded, req);
}

#[test]
fn test_get_missing_is_not_found() {
    let conn = setup();
    let err = RequestRepo::get(&conn, "nope").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.entity_id(), Some("nope"));
    assert!(RequestRepo::find(&conn, "nope").unwrap().is_none());
}

#[test]
fn test_duplicate_id_is_persistence_error() {
    let conn = setup();
    let req = stored(&conn, "Budi", 0);
    let err = RequestRepo::insert(&conn, &req).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Persistence);
}

#[test]
fn test_apply_transition_updates_row_and_audits() {
    let mut conn = setup();
    let req = stored(&conn, "Budi", 0);

    let outcome = transition_at(&req, RequestStatus::Approved, Some("ok"), Utc::now()).unwrap();
    RequestRepo::apply_transition(&mut conn, &outcome, req.updated_at, Some("admin-1"))
        .unwrap();

    let loaded = RequestRepo::get(&conn, &req.id).unwrap();
    assert_eq!(loaded.status, RequestStatus::Approved);
    assert_eq!(loaded.admin_notes.as_deref(), Some("ok"));
    assert_eq!(loaded.updated_at, outcome.request.updated_at);

    let trail = RequestRepo::transitions(&conn, &req.id).unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].from, RequestStatus::Pending);
    assert_eq!(trail[0].to, RequestStatus::Approved);
    assert!(trail[0].notified);
    assert_eq!(trail[0].actor.as_deref(), Some("admin-1"));
}

#[test]
fn test_stale_snapshot_is_rejected() {
    let mut conn = setup();
    let req = stored(&conn, "Budi", 0);

    // first admin approves
    let first = transition_at(&req, RequestStatus::Approved, None, Utc::now()).unwrap();
    RequestRepo::apply_transition(&mut conn, &first, req.updated_at, None).unwrap();

    // second admin still holds the pending snapshot
    let second = transition_at(&req, RequestStatus::Rejected, None, Utc::now()).unwrap();
    let err =
        RequestRepo::apply_transition(&mut conn, &second, req.updated_at, None).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Concurrency);
    assert_eq!(
        RequestRepo::get(&conn, &req.id).unwrap().status,
        RequestStatus::Approved
    );
    assert_eq!(RequestRepo::transitions(&conn, &req.id).unwrap().len(), 1);
}

#[test]
fn test_transition_on_missing_row_is_not_found() {
    let mut conn = setup();
    let req = create_request_at(draft("Ghost", "g@itb.ac.id"), Utc::now()).unwrap();
    let outcome = transition_at(&req, RequestStatus::Approved, None, Utc::now()).unwrap();

    let err =
        RequestRepo::apply_transition(&mut conn, &outcome, req.updated_at, None).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_update_query_with_precondition() {
    let conn = setup();
    let req = stored(&conn, "Budi", 0);

    let updated = attach_query(&req, "SELECT name FROM graduates").unwrap();
    RequestRepo::update_query(&conn, &updated, req.updated_at).unwrap();

    let loaded = RequestRepo::get(&conn, &req.id).unwrap();
    assert_eq!(loaded.sql_query.as_deref(), Some("SELECT name FROM graduates"));

    let again = attach_query(&req, "SELECT nim FROM graduates").unwrap();
    let err = RequestRepo::update_query(&conn, &again, req.updated_at).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Concurrency);
}

#[test]
fn test_update_attributes_with_precondition() {
    let conn = setup();
    let req = stored(&conn, "Budi", 0);

    let amendment = RequestAmendment {
        purpose: Some("gender pay gap".to_string()),
        format: Some(OutputFormat::Csv),
        year_from: Some(None),
        year_to: Some(None),
        tables: Some(vec!["graduates".to_string()]),
        columns: Some(vec![String::new(), "name".to_string()]),
        ..Default::default()
    };
    let amended = amend_request(&req, &amendment).unwrap();
    RequestRepo::update_attributes(&conn, &amended, req.updated_at).unwrap();

    let loaded = RequestRepo::get(&conn, &req.id).unwrap();
    assert_eq!(loaded, amended);
    assert!(loaded.selects_all_columns());

    // a second writer still holding the original snapshot loses
    let late = amend_request(&req, &amendment).unwrap();
    let err = RequestRepo::update_attributes(&conn, &late, req.updated_at).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Concurrency);
    assert_eq!(RequestRepo::get(&conn, &req.id).unwrap(), amended);
}

#[test]
fn test_list_applies_filter() {
    let conn = setup();
    stored(&conn, "Citra", 0);
    stored(&conn, "Agus", 1);
    stored(&conn, "Budi", 2);

    let newest_first = RequestRepo::list(&conn, &RequestFilter::default()).unwrap();
    let names: Vec<_> = newest_first.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Budi", "Agus", "Citra"]);

    let by_name = RequestRepo::list(
        &conn,
        &RequestFilter::default().sort(SortKey::NameAsc).paginate(1, 2),
    )
    .unwrap();
    let names: Vec<_> = by_name.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Agus", "Budi"]);

    let err = RequestRepo::list(&conn, &RequestFilter::default().paginate(0, 10)).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidFilter);
}

#[test]
fn test_file_store_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("store.db");

    let id = {
        let conn = db::open_store(&path).unwrap();
        stored(&conn, "Budi", 0).id
    };

    let conn = db::open_store(&path).unwrap();
    assert_eq!(RequestRepo::get(&conn, &id).unwrap().name, "Budi");
}
