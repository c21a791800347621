use tracer_core_types::{CorrelationId, TraceId};
use thiserror::Error;

use crate::model::RequestStatus;

/// Result type alias using TracerError
pub type Result<T> = std::result::Result<T, TracerError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// A stable, structured classification of every error the workspace can
/// report. Each kind maps to a stable code usable by API responses and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Validation
    InvalidInput,
    MissingField,
    InvalidEmail,
    InvalidYearRange,
    InvalidStatus,
    InvalidFormat,
    InvalidFilter,

    // Lifecycle
    InvalidTransition,
    NoOp,
    NotAmendable,

    // Query generation
    MalformedRequest,
    UnsafeQuery,

    // Lookup
    NotFound,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    Concurrency,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::MissingField => "ERR_MISSING_FIELD",
            ExErrorKind::InvalidEmail => "ERR_INVALID_EMAIL",
            ExErrorKind::InvalidYearRange => "ERR_INVALID_YEAR_RANGE",
            ExErrorKind::InvalidStatus => "ERR_INVALID_STATUS",
            ExErrorKind::InvalidFormat => "ERR_INVALID_FORMAT",
            ExErrorKind::InvalidFilter => "ERR_INVALID_FILTER",
            ExErrorKind::InvalidTransition => "ERR_INVALID_TRANSITION",
            ExErrorKind::NoOp => "ERR_NO_OP",
            ExErrorKind::NotAmendable => "ERR_NOT_AMENDABLE",
            ExErrorKind::MalformedRequest => "ERR_MALFORMED_REQUEST",
            ExErrorKind::UnsafeQuery => "ERR_UNSAFE_QUERY",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether the caller can fix the problem and retry
    ///
    /// Everything raised by lifecycle validation or query generation is
    /// recoverable; persistence and internal failures are not.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ExErrorKind::Io | ExErrorKind::Persistence | ExErrorKind::Internal
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus context for
/// debugging. The store and engine layers report failures as `ExError`.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    correlation_id: Option<CorrelationId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            correlation_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the id of the data request involved
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: CorrelationId) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn correlation_id(&self) -> Option<&CorrelationId> {
        self.correlation_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (data_request_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for data-request operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TracerError {
    // ===== Lifecycle Errors =====
    /// Requested status is not reachable from the current one
    #[error("Invalid transition for data request {request_id}: {from} -> {to}")]
    InvalidTransition {
        request_id: String,
        from: RequestStatus,
        to: RequestStatus,
    },

    /// Same status and no notes
    #[error("Nothing to update for data request {request_id}: status is already {status} and no notes were given")]
    NoOp {
        request_id: String,
        status: RequestStatus,
    },

    /// Attributes can only change while the request awaits review
    #[error("Data request {request_id} cannot be amended while {status}")]
    NotAmendable {
        request_id: String,
        status: RequestStatus,
    },

    // ===== Parsing Errors =====
    /// Unknown status string
    #[error("Unknown request status: {value}")]
    InvalidStatus { value: String },

    /// Unknown output format string
    #[error("Unknown output format: {value}")]
    InvalidFormat { value: String },

    // ===== Validation Errors =====
    /// A required field is blank
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Email address is not well formed
    #[error("Invalid email address: {email}")]
    InvalidEmail { email: String },

    /// year_from > year_to, or a year outside the accepted window
    #[error("Invalid year range: {year_from:?} to {year_to:?}")]
    InvalidYearRange {
        year_from: Option<i32>,
        year_to: Option<i32>,
    },

    /// Listing parameters out of bounds
    #[error("Invalid filter: {reason}")]
    InvalidFilter { reason: String },

    // ===== Query Errors =====
    /// Request lacks what is needed to build a query
    #[error("Malformed request: {reason}")]
    MalformedRequest { reason: String },

    /// SQL rejected by the select-only guard
    #[error("Unsafe query: {reason}")]
    UnsafeQuery { reason: String },

    // ===== Lookup / Persistence Errors =====
    #[error("Data request not found: {request_id}")]
    RequestNotFound { request_id: String },

    // ===== Generic Errors =====
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl TracerError {
    /// Canonical kind for this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            TracerError::InvalidTransition { .. } => ExErrorKind::InvalidTransition,
            TracerError::NoOp { .. } => ExErrorKind::NoOp,
            TracerError::NotAmendable { .. } => ExErrorKind::NotAmendable,
            TracerError::InvalidStatus { .. } => ExErrorKind::InvalidStatus,
            TracerError::InvalidFormat { .. } => ExErrorKind::InvalidFormat,
            TracerError::MissingField { .. } => ExErrorKind::MissingField,
            TracerError::InvalidEmail { .. } => ExErrorKind::InvalidEmail,
            TracerError::InvalidYearRange { .. } => ExErrorKind::InvalidYearRange,
            TracerError::InvalidFilter { .. } => ExErrorKind::InvalidFilter,
            TracerError::MalformedRequest { .. } => ExErrorKind::MalformedRequest,
            TracerError::UnsafeQuery { .. } => ExErrorKind::UnsafeQuery,
            TracerError::RequestNotFound { .. } => ExErrorKind::NotFound,
            TracerError::Internal { .. } => ExErrorKind::Internal,
        }
    }
}

/// Conversion from TracerError to ExError
///
/// Keeps the entity id and the human message; the kind comes from
/// `TracerError::kind`.
impl From<TracerError> for ExError {
    fn from(err: TracerError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        let base = ExError::new(kind).with_message(message);

        match err {
            TracerError::InvalidTransition { request_id, .. }
            | TracerError::NoOp { request_id, .. } => {
                base.with_entity_id(request_id).with_op("transition")
            }
            TracerError::NotAmendable { request_id, .. } => {
                base.with_entity_id(request_id).with_op("amend")
            }
            TracerError::RequestNotFound { request_id } => base.with_entity_id(request_id),
            TracerError::MalformedRequest { .. } => base.with_op("generate_query"),
            TracerError::UnsafeQuery { .. } => base.with_op("ensure_select_only"),
            _ => base,
        }
    }
}
