//! CLI integration tests
//!
//! Drive the built `tracer` binary against a scratch store.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn db_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("store.db")
}

fn tracer(temp_dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tracer"))
        .current_dir(temp_dir.path())
        .env_remove("TRACER_DB")
        .env("TRACER_BASE_URL", "https://tracer.example.org")
        .arg("--db")
        .arg(db_path(temp_dir))
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "CLI command should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert_success(output);
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn create(temp_dir: &TempDir, table: &str, purpose: &str) -> String {
    let output = tracer(
        temp_dir,
        &[
            "request",
            "create",
            "--name",
            "Budi Santoso",
            "--nim",
            "13520001",
            "--email",
            "budi@students.itb.ac.id",
            "--phone",
            "08123456789",
            "--purpose",
            purpose,
            "--format",
            "csv",
            "--year-from",
            "2020",
            "--year-to",
            "2024",
            "--table",
            table,
            "--columns",
            "name, nim",
        ],
    );
    let json = stdout_json(&output);
    assert_eq!(json["status"], "PENDING");
    json["id"].as_str().unwrap().to_string()
}

fn transitions_in_db(path: &Path, id: &str) -> i64 {
    let conn = Connection::open(path).unwrap();
    conn.query_row(
        "SELECT COUNT(*) FROM request_transitions WHERE request_id = ?1",
        [id],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn test_create_show_and_list() {
    let temp_dir = TempDir::new().unwrap();
    let id = create(&temp_dir, "graduates, employment", "tech industry analysis");

    let shown = stdout_json(&tracer(&temp_dir, &["request", "show", &id]));
    assert_eq!(shown["name"], "Budi Santoso");
    assert_eq!(shown["table"], "graduates, employment");
    assert_eq!(shown["format"], "CSV");

    let listed = stdout_json(&tracer(&temp_dir, &["request", "list", "--search", "1352"]));
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let none = stdout_json(&tracer(&temp_dir, &["request", "list", "--search", "zzz"]));
    assert!(none.as_array().unwrap().is_empty());
}

#[test]
fn test_transition_and_history() {
    let temp_dir = TempDir::new().unwrap();
    let id = create(&temp_dir, "graduates", "research");

    let result = stdout_json(&tracer(
        &temp_dir,
        &[
            "request",
            "transition",
            &id,
            "approved",
            "--notes",
            "ok",
            "--actor",
            "admin-1",
        ],
    ));
    assert_eq!(result["outcome"]["request"]["status"], "APPROVED");
    assert_eq!(result["outcome"]["notify_requester"], true);
    assert_eq!(
        result["notification"]["subject"],
        "Data Request Approved - Ready for Processing"
    );

    let history = stdout_json(&tracer(&temp_dir, &["request", "history", &id]));
    assert_eq!(history[0]["from"], "PENDING");
    assert_eq!(history[0]["to"], "APPROVED");
    assert_eq!(history[0]["actor"], "admin-1");
    assert_eq!(transitions_in_db(&db_path(&temp_dir), &id), 1);
}

#[test]
fn test_illegal_transition_exits_with_error() {
    let temp_dir = TempDir::new().unwrap();
    let id = create(&temp_dir, "graduates", "research");

    let output = tracer(&temp_dir, &["request", "transition", &id, "COMPLETED"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: [ERR_INVALID_TRANSITION]"), "{}", stderr);
    assert_eq!(transitions_in_db(&db_path(&temp_dir), &id), 0);
}

#[test]
fn test_unknown_status_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let id = create(&temp_dir, "graduates", "research");

    let output = tracer(&temp_dir, &["request", "transition", &id, "ARCHIVED"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown request status"));
}

#[test]
fn test_query_preview_and_history() {
    let temp_dir = TempDir::new().unwrap();
    let id = create(&temp_dir, "graduates, employment, companies", "tech industry");

    let output = tracer(&temp_dir, &["query", "preview", &id, "--record"]);
    assert_success(&output);
    let sql = String::from_utf8_lossy(&output.stdout);
    assert!(sql.starts_with("SELECT name, nim\nFROM graduates\n"));
    assert!(sql.trim_end().ends_with("ORDER BY graduation_year DESC, name ASC;"));

    let history = stdout_json(&tracer(&temp_dir, &["query", "history"]));
    assert_eq!(history.as_array().unwrap().len(), 1);

    let old = stdout_json(&tracer(&temp_dir, &["query", "history", "--to", "2000-01-01"]));
    assert!(old.as_array().unwrap().is_empty());
}

#[test]
fn test_preview_without_tables_prints_placeholder() {
    let temp_dir = TempDir::new().unwrap();
    let id = create(&temp_dir, "", "research");

    let output = tracer(&temp_dir, &["query", "preview", &id]);
    assert_success(&output);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim_end(),
        "-- SQL query will be generated based on requested tables and columns"
    );
}

#[test]
fn test_query_check_and_build() {
    let temp_dir = TempDir::new().unwrap();

    let ok = tracer(&temp_dir, &["query", "check", "SELECT * FROM graduates"]);
    assert_success(&ok);

    let bad = tracer(&temp_dir, &["query", "check", "DROP TABLE graduates"]);
    assert_eq!(bad.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&bad.stderr).contains("ERR_UNSAFE_QUERY"));

    let built = tracer(
        &temp_dir,
        &[
            "query",
            "build",
            "--table",
            "tracer_responses",
            "--select",
            "id, name",
            "--where",
            "year > 2020",
            "--limit",
            "5",
        ],
    );
    assert_success(&built);
    assert_eq!(
        String::from_utf8_lossy(&built.stdout).trim_end(),
        "SELECT id, name FROM tracer_responses WHERE year > 2020 LIMIT 5"
    );
}

#[test]
fn test_ready_mail_after_completion() {
    let temp_dir = TempDir::new().unwrap();
    let id = create(&temp_dir, "graduates", "research");

    for status in ["approved", "in-progress", "completed"] {
        assert_success(&tracer(&temp_dir, &["request", "transition", &id, status]));
    }

    let mail = stdout_json(&tracer(
        &temp_dir,
        &["request", "ready-mail", &id, "--csv-id", "csv-7"],
    ));
    assert_eq!(mail["subject"], "Your Requested Data is Ready");
    assert!(mail["body"]
        .as_str()
        .unwrap()
        .contains("https://tracer.example.org/sql/csv-7"));
}

#[test]
fn test_set_query_is_used_by_preview() {
    let temp_dir = TempDir::new().unwrap();
    let id = create(&temp_dir, "graduates", "research");

    assert_success(&tracer(
        &temp_dir,
        &["request", "set-query", &id, "SELECT nim FROM graduates"],
    ));

    let output = tracer(&temp_dir, &["query", "preview", &id]);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim_end(),
        "SELECT nim FROM graduates"
    );
}

#[test]
fn test_amend_after_revision() {
    let temp_dir = TempDir::new().unwrap();
    let id = create(&temp_dir, "graduates", "alumni study");

    assert_success(&tracer(
        &temp_dir,
        &[
            "request",
            "transition",
            &id,
            "requires-revision",
            "--notes",
            "add salary data",
        ],
    ));

    let amended = stdout_json(&tracer(
        &temp_dir,
        &[
            "request",
            "amend",
            &id,
            "--table",
            "graduates, salary",
            "--columns",
            ", name",
            "--year-to",
            "0",
        ],
    ));
    assert_eq!(amended["table"], "graduates, salary");
    assert_eq!(amended["columns"], ", name");
    assert!(amended["year_to"].is_null());
    assert_eq!(amended["status"], "REQUIRES_REVISION");

    let preview = tracer(&temp_dir, &["query", "preview", &id]);
    assert_success(&preview);
    let sql = String::from_utf8_lossy(&preview.stdout);
    assert!(sql.starts_with("SELECT *\nFROM graduates"));
    assert!(sql.contains("LEFT JOIN salary ON graduates.id = salary.graduate_id"));
}

#[test]
fn test_amend_rejected_once_approved() {
    let temp_dir = TempDir::new().unwrap();
    let id = create(&temp_dir, "graduates", "alumni study");
    assert_success(&tracer(&temp_dir, &["request", "transition", &id, "approved"]));

    let output = tracer(&temp_dir, &["request", "amend", &id, "--purpose", "other"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_NOT_AMENDABLE"));
}

#[test]
fn test_create_rejects_unsafe_query() {
    let temp_dir = TempDir::new().unwrap();
    let output = tracer(
        &temp_dir,
        &[
            "request",
            "create",
            "--name",
            "Budi Santoso",
            "--nim",
            "13520001",
            "--email",
            "budi@students.itb.ac.id",
            "--phone",
            "08123456789",
            "--purpose",
            "research",
            "--format",
            "csv",
            "--sql-query",
            "DROP TABLE x",
        ],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_UNSAFE_QUERY"));
}
