// SPDX-License-Identifier: MIT

//! The external collaborators the optimizer replays work through: per-thread
//! stream/event pools and the low-level driver primitives (`begin_capture`,
//! `end_capture`, `record_event`, `stream_wait_event`).
//!
//! These are trait boundaries, not implementations; a real build wires them to
//! a GPU driver; [`crate::backends::mock`] wires them to an in-process recorder
//! for tests. Every call here is synchronous: §5 of the design establishes that
//! the optimizer performs no asynchronous suspension, it just blocks on whatever
//! thread the caller runs it on.

use crate::errors::OptimizerError;

/// The driver's identifier for a hardware command queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(pub usize);

/// The driver's identifier for a synchronization event.
///
/// Identity is the value itself; a handle stays meaningful after the
/// [`ScopedEvent`] that acquired it borrows from the pool again, which is why
/// strategies are free to copy it into [`crate::graph::CaptureMetadata::event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventHandle(pub usize);

/// The opaque, driver-owned executable graph produced by a successful capture.
///
/// The optimizer returns this by value and retains no references to it; the
/// caller owns subsequent instantiation and execution.
#[derive(Debug)]
pub struct NativeGraph {
    /// Opaque driver-assigned identity for this captured graph.
    pub id: u64,
}

/// Low-level driver operations used during capture.
///
/// Every method returns a fatal [`OptimizerError::DriverFailure`] on failure;
/// nothing here is retried by the optimizer.
pub trait DriverOps: Send + Sync {
    /// Put `stream` into thread-local capture mode.
    fn begin_capture(&self, stream: StreamId) -> Result<(), OptimizerError>;

    /// End capture on `stream`, yielding the native graph it recorded.
    fn end_capture(&self, stream: StreamId) -> Result<NativeGraph, OptimizerError>;

    /// Record `event` on `stream`.
    fn record_event(&self, event: EventHandle, stream: StreamId) -> Result<(), OptimizerError>;

    /// Make `stream` wait for `event` to have been recorded.
    fn stream_wait_event(
        &self,
        stream: StreamId,
        event: EventHandle,
    ) -> Result<(), OptimizerError>;
}

/// A pool of hardware command queues, scoped per calling thread.
pub trait StreamPool: Send + Sync {
    /// Acquire a stream, returning a handle that releases it back to the pool on drop.
    fn acquire(&self) -> Result<ScopedStream<'_>, OptimizerError>;

    /// Return a stream to the pool. Called by [`ScopedStream::drop`]; not meant
    /// to be called directly.
    fn release(&self, stream: StreamId);
}

/// A pool of synchronization events, scoped per calling thread.
pub trait EventPool: Send + Sync {
    /// Acquire an event, returning a handle that releases it back to the pool on drop.
    fn acquire(&self) -> Result<ScopedEvent<'_>, OptimizerError>;

    /// Return an event to the pool. Called by [`ScopedEvent::drop`]; not meant
    /// to be called directly.
    fn release(&self, event: EventHandle);
}

/// A stream borrowed from a [`StreamPool`], released when it goes out of scope.
pub struct ScopedStream<'p> {
    id: StreamId,
    pool: &'p dyn StreamPool,
}

impl<'p> ScopedStream<'p> {
    pub fn new(id: StreamId, pool: &'p dyn StreamPool) -> Self {
        Self { id, pool }
    }

    /// The driver stream identifier this handle wraps.
    pub fn id(&self) -> StreamId {
        self.id
    }
}

impl Drop for ScopedStream<'_> {
    fn drop(&mut self) {
        self.pool.release(self.id);
    }
}

/// An event borrowed from an [`EventPool`], released when it goes out of scope.
pub struct ScopedEvent<'p> {
    id: EventHandle,
    pool: &'p dyn EventPool,
}

impl<'p> ScopedEvent<'p> {
    pub fn new(id: EventHandle, pool: &'p dyn EventPool) -> Self {
        Self { id, pool }
    }

    /// The driver event identifier this handle wraps.
    pub fn id(&self) -> EventHandle {
        self.id
    }
}

impl Drop for ScopedEvent<'_> {
    fn drop(&mut self) {
        self.pool.release(self.id);
    }
}
