//! Read-side helpers for request listings
//!
//! Filtering, ordering and paging are deterministic: equal sort keys are
//! broken by request id.

pub mod request_filter;

pub use request_filter::{RequestFilter, SortKey, MAX_PAGE_SIZE};
