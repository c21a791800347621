//! Structured logging for the tracer workspace
//!
//! - one initialization point, `init(profile)`
//! - boundary macros `log_op_start!`, `log_op_end!`, `log_op_error!`
//! - an in-memory capture layer for tests
//!
//! Boundary events belong to the engine layer. Core code logs at `debug`
//! only.
//!
//! ```rust
//! use tracer_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
