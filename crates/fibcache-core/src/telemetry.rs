//! Failure reporting side channel
//!
//! Called after the result is decided; the error is only borrowed.

use std::fmt::Display;
use tracing::Span;

/// Mark `span` as failed and emit an error event under it.
///
/// `span` must declare `error` and `otel.status_code` fields.
pub(crate) fn record_failure(span: &Span, operation: &'static str, err: &dyn Display) {
    span.record("otel.status_code", "ERROR");
    span.record("error", tracing::field::display(err));
    tracing::error!(parent: span, operation, error = %err, "Session cache operation failed");
}
