//! Tracer Core - data-request administration kernel
//!
//! Pure, in-memory logic for the tracer-study data-request workflow:
//! - the request lifecycle state machine (`lifecycle`)
//! - SQL preview generation and the select-only guard (`query`)
//! - creation-time validation (`rules`)
//! - listing filters (`queries`)
//! - requester notification drafts (`notification`)
//! - the error and logging facilities shared by the other crates
//!
//! Nothing in this crate touches storage or the network.

pub mod errors;
pub mod lifecycle;
pub mod logging_facility;
pub mod model;
pub mod notification;
pub mod ops;
pub mod queries;
pub mod query;
pub mod rules;

// Used by the logging macros
pub use tracer_core_types::schema;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, Result, TracerError};
pub use lifecycle::{transition, transition_at, TransitionOutcome};
pub use model::{DataRequest, NewDataRequest, OutputFormat, RequestStatus};
pub use notification::{draft_download_ready, draft_status_notification, NotificationDraft};
pub use queries::{RequestFilter, SortKey};
