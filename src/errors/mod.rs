// SPDX-License-Identifier: MIT

//! Error taxonomy for the capture optimizer core.
//!
//! Every fatal condition the optimizer can raise collapses into a single enum so
//! callers have one type to match on regardless of which strategy or collaborator
//! produced the failure.

use thiserror::Error;

/// Errors produced by the capture optimizer core.
#[derive(Debug, Error)]
pub enum OptimizerError {
    /// A configuration value was rejected (e.g. `num_streams == 0`).
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A driver call failed during capture, record, or wait.
    ///
    /// `primitive` names the driver operation that failed (`"begin_capture"`,
    /// `"record_event"`, ...) so the message is actionable without a debugger.
    #[error("driver failure in {primitive}: {reason}")]
    DriverFailure {
        primitive: &'static str,
        reason: String,
    },

    /// The input graph violated an invariant the optimizer assumes (e.g. a cycle).
    ///
    /// Detection is best-effort; see [`crate::topology`] for where this is raised.
    #[error("invariant violation: {message}")]
    InvariantViolation { message: String },
}

impl OptimizerError {
    pub(crate) fn driver(primitive: &'static str, reason: impl Into<String>) -> Self {
        Self::DriverFailure {
            primitive,
            reason: reason.into(),
        }
    }

    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }
}
