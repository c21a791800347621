#![allow(clippy::unwrap_used, clippy::expect_used)]

use tracer_core::errors::{ExError, ExErrorKind, TracerError};
use tracer_core::model::RequestStatus;
use tracer_core_types::CorrelationId;

#[test]
fn test_codes_are_stable() {
    let expected = [
        (ExErrorKind::InvalidTransition, "ERR_INVALID_TRANSITION"),
        (ExErrorKind::NoOp, "ERR_NO_OP"),
        (ExErrorKind::NotAmendable, "ERR_NOT_AMENDABLE"),
        (ExErrorKind::MalformedRequest, "ERR_MALFORMED_REQUEST"),
        (ExErrorKind::UnsafeQuery, "ERR_UNSAFE_QUERY"),
        (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
        (ExErrorKind::Concurrency, "ERR_CONCURRENCY"),
        (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
    ];
    for (kind, code) in expected {
        assert_eq!(kind.code(), code);
    }
}

#[test]
fn test_noop_converts_with_entity_and_op() {
    let err = TracerError::NoOp {
        request_id: "dr-1".to_string(),
        status: RequestStatus::Approved,
    };
    let ex: ExError = err.into();

    assert_eq!(ex.kind(), ExErrorKind::NoOp);
    assert_eq!(ex.op(), Some("transition"));
    assert_eq!(ex.entity_id(), Some("dr-1"));
    assert!(ex.message().contains("APPROVED"));
}

#[test]
fn test_query_errors_carry_operation() {
    let ex: ExError = TracerError::MalformedRequest {
        reason: "no table requested".to_string(),
    }
    .into();
    assert_eq!(ex.op(), Some("generate_query"));

    let ex: ExError = TracerError::UnsafeQuery {
        reason: "only SELECT statements are allowed".to_string(),
    }
    .into();
    assert_eq!(ex.op(), Some("ensure_select_only"));
    assert!(ex.to_string().starts_with("[ERR_UNSAFE_QUERY] in operation 'ensure_select_only'"));
}

#[test]
fn test_source_chain() {
    let cause = ExError::new(ExErrorKind::Persistence).with_message("disk I/O error");
    let ex = ExError::new(ExErrorKind::Internal)
        .with_op("request_transition")
        .with_correlation_id(CorrelationId::new())
        .with_source(cause);

    let source = std::error::Error::source(&ex).expect("source present");
    assert!(source.to_string().contains("disk I/O error"));
    assert_eq!(
        ex.source_error().map(ExError::kind),
        Some(ExErrorKind::Persistence)
    );
    assert!(ex.correlation_id().is_some());
}

#[test]
fn test_recoverability() {
    assert!(ExErrorKind::InvalidTransition.is_recoverable());
    assert!(ExErrorKind::Concurrency.is_recoverable());
    assert!(!ExErrorKind::Io.is_recoverable());
    assert!(!ExErrorKind::Internal.is_recoverable());
}
