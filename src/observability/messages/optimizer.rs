// SPDX-License-Identifier: MIT

//! Message types for optimizer lifecycle, scheduling, and synchronization events.

use super::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// An `optimize` invocation has begun.
pub struct CaptureStarted<'a> {
    pub strategy: &'a str,
    pub node_count: usize,
    pub stream_count: usize,
}

impl Display for CaptureStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "starting {} capture: {} nodes across {} stream(s)",
            self.strategy, self.node_count, self.stream_count
        )
    }
}

impl StructuredLog for CaptureStarted<'_> {
    fn log(&self) {
        tracing::info!(
            strategy = self.strategy,
            node_count = self.node_count,
            stream_count = self.stream_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "capture",
            span_name = name,
            strategy = self.strategy,
            node_count = self.node_count,
            stream_count = self.stream_count,
        )
    }
}

/// A capture completed and yielded a native graph.
pub struct CaptureCompleted<'a> {
    pub strategy: &'a str,
    pub events_recorded: usize,
}

impl Display for CaptureCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} capture completed: {} cross-stream event(s) recorded",
            self.strategy, self.events_recorded
        )
    }
}

impl StructuredLog for CaptureCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            strategy = self.strategy,
            events_recorded = self.events_recorded,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "capture_completed",
            span_name = name,
            strategy = self.strategy,
            events_recorded = self.events_recorded,
        )
    }
}

/// A driver call failed; the active capture is being torn down before the error
/// propagates.
pub struct CaptureAborted<'a> {
    pub primitive: &'a str,
    pub reason: &'a str,
}

impl Display for CaptureAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "aborting capture after {} failed: {}",
            self.primitive, self.reason
        )
    }
}

impl StructuredLog for CaptureAborted<'_> {
    fn log(&self) {
        tracing::error!(primitive = self.primitive, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "capture_aborted",
            span_name = name,
            primitive = self.primitive,
        )
    }
}

/// An event was recorded on a node's stream because it has at least one
/// cross-stream successor.
pub struct EventRecorded {
    pub node_idx: usize,
    pub level: usize,
    pub stream: usize,
}

impl Display for EventRecorded {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "recorded event for level {} idx {} on stream {}",
            self.level, self.node_idx, self.stream
        )
    }
}

impl StructuredLog for EventRecorded {
    fn log(&self) {
        tracing::debug!(
            node_idx = self.node_idx,
            level = self.level,
            stream = self.stream,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "event_recorded",
            span_name = name,
            node_idx = self.node_idx,
            level = self.level,
            stream = self.stream,
        )
    }
}
