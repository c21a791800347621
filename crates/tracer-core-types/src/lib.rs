//! Core types shared across the tracer facilities
//!
//! This crate provides foundational types used by both error handling
//! and logging facilities:
//!
//! - **Correlation types**: CorrelationId, TraceId, OperationContext
//! - **Personal data**: Sensitive<T> marker for automatic redaction
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::{CorrelationId, OperationContext, TraceId};
pub use sensitive::Sensitive;
