//! Correlation types for tracking one admin operation end to end
//!
//! A `CorrelationId` ties together the log events emitted while a single
//! command (create, transition, preview) runs through engine, core and store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a single admin operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generate a new CorrelationId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap an id received from a caller (e.g. an upstream HTTP header)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trace identifier propagated from an outer system, if any
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(String);

impl TraceId {
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried explicitly through an operation
///
/// Callers own this value and pass it down; nothing is read from ambient
/// state.
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub correlation_id: CorrelationId,
    pub trace_id: Option<TraceId>,
    /// Identity of the administrator performing the operation, when known
    pub actor: Option<String>,
}

impl OperationContext {
    pub fn new() -> Self {
        Self {
            correlation_id: CorrelationId::new(),
            trace_id: None,
            actor: None,
        }
    }

    pub fn with_correlation_id(correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id,
            trace_id: None,
            actor: None,
        }
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}
