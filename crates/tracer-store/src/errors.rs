//! Error helpers for tracer-store
//!
//! The store reports every failure as a `tracer_core` `ExError`.

use tracer_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// An applied migration whose SQL no longer matches what was recorded
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

pub fn not_found(request_id: &str) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_entity_id(request_id)
        .with_message(format!("Data request not found: {}", request_id))
}

/// The row's `updated_at` no longer matches the snapshot the caller read
pub fn stale_update(op: &str, request_id: &str) -> ExError {
    ExError::new(ExErrorKind::Concurrency)
        .with_op(op)
        .with_entity_id(request_id)
        .with_message("stale update: record was modified concurrently")
}

/// A stored value that cannot be turned back into a domain value
pub fn corrupt_row(request_id: &str, field: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Internal)
        .with_op("hydrate")
        .with_entity_id(request_id)
        .with_message(format!("Corrupt value in column {}: {}", field, reason))
}

pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation)
        .with_message(err.to_string())
}
