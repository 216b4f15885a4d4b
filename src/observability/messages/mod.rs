// SPDX-License-Identifier: MIT

//! Message types for optimizer lifecycle and scheduling events.

pub mod optimizer;

use tracing::Span;

/// Messages that support both structured logging and distributed tracing.
///
/// `log()` emits the human-readable `Display` line plus structured fields;
/// `span()` creates a `tracing::Span` carrying the same fields as attributes.
pub trait StructuredLog {
    fn log(&self);
    fn span(&self, name: &str) -> Span;
}
