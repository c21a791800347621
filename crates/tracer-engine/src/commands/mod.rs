//! Command orchestration layer.
//!
//! ## Logging Ownership
//!
//! Each public function emits `log_op_start!` at entry and exactly one of
//! `log_op_end!` or `log_op_error!`. Core and store log at `debug` only.

pub mod query;
pub mod request;

fn elapsed_ms(start: std::time::Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
