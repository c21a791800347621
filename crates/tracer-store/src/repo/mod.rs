//! Repository layer for persisting data requests to SQLite

pub mod history;
pub mod request_repo;

pub use history::{HistoryEntry, QueryHistory};
pub use request_repo::{RequestRepo, TransitionRecord};

use chrono::{DateTime, Utc};

/// Timestamps are stored as microseconds since the epoch
pub(crate) fn to_micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

pub(crate) fn from_micros(micros: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_micros(micros)
}
