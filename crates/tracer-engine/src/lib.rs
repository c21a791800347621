//! Tracer Engine - Orchestration layer
//!
//! Coordinates core domain logic with the SQLite store. Every public
//! operation here owns its boundary logging.

pub mod commands;

pub use commands::request::TransitionResult;
