//! Tracer Store - SQLite persistence for data requests
//!
//! Provides:
//! - connection helpers (`db`)
//! - embedded, checksummed schema migrations
//! - the request repository with optimistic concurrency and a transition
//!   audit trail
//! - the executed-query history

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use errors::Result;
pub use repo::{HistoryEntry, QueryHistory, RequestRepo, TransitionRecord};
