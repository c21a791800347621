//! SQL text produced for and checked on behalf of administrators
//!
//! - `template`: preview query derived from a data request
//! - `builder`: explicit select/where/order/limit query against a fixed table
//! - `guard`: select-only check applied before anything reaches the executor

pub mod builder;
pub mod guard;
pub mod template;

pub use builder::SimpleQuery;
pub use guard::ensure_select_only;
pub use template::{effective_query, generate, try_generate, PLACEHOLDER};
