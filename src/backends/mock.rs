// SPDX-License-Identifier: MIT

//! An in-process mock of stream pool, event pool, and driver ops, for testing
//! strategies without a GPU.
//!
//! [`MockDriver`] plays all three collaborator roles at once: it hands out
//! ever-increasing `StreamId`/`EventHandle` values and keeps a log of every
//! driver call it saw, in order, so tests can assert on exactly what a strategy
//! told the driver to do.

use std::sync::Mutex;

use crate::driver::{DriverOps, EventHandle, EventPool, NativeGraph, ScopedEvent, ScopedStream, StreamId, StreamPool};
use crate::errors::OptimizerError;

/// One driver call the mock observed, in the order it was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedOp {
    BeginCapture(StreamId),
    EndCapture(StreamId),
    RecordEvent(EventHandle, StreamId),
    StreamWaitEvent(StreamId, EventHandle),
}

#[derive(Default)]
struct State {
    next_stream: usize,
    next_event: usize,
    next_graph: u64,
    log: Vec<RecordedOp>,
}

/// A fake driver that records every call instead of talking to a GPU.
///
/// Stream and event ids are allocated by simple counters and never reused
/// within one `MockDriver`'s lifetime, which keeps assertions in tests
/// unambiguous (no id is ever handed out twice).
#[derive(Default)]
pub struct MockDriver {
    state: Mutex<State>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of every driver call observed so far, in order.
    pub fn log(&self) -> Vec<RecordedOp> {
        self.state.lock().expect("mock driver state poisoned").log.clone()
    }

    /// How many events have been recorded (not merely acquired) so far.
    pub fn events_recorded(&self) -> usize {
        self.log()
            .iter()
            .filter(|op| matches!(op, RecordedOp::RecordEvent(..)))
            .count()
    }
}

impl DriverOps for MockDriver {
    fn begin_capture(&self, stream: StreamId) -> Result<(), OptimizerError> {
        self.state
            .lock()
            .expect("mock driver state poisoned")
            .log
            .push(RecordedOp::BeginCapture(stream));
        Ok(())
    }

    fn end_capture(&self, stream: StreamId) -> Result<NativeGraph, OptimizerError> {
        let mut state = self.state.lock().expect("mock driver state poisoned");
        state.log.push(RecordedOp::EndCapture(stream));
        let id = state.next_graph;
        state.next_graph += 1;
        Ok(NativeGraph { id })
    }

    fn record_event(&self, event: EventHandle, stream: StreamId) -> Result<(), OptimizerError> {
        self.state
            .lock()
            .expect("mock driver state poisoned")
            .log
            .push(RecordedOp::RecordEvent(event, stream));
        Ok(())
    }

    fn stream_wait_event(
        &self,
        stream: StreamId,
        event: EventHandle,
    ) -> Result<(), OptimizerError> {
        self.state
            .lock()
            .expect("mock driver state poisoned")
            .log
            .push(RecordedOp::StreamWaitEvent(stream, event));
        Ok(())
    }
}

impl StreamPool for MockDriver {
    fn acquire(&self) -> Result<ScopedStream<'_>, OptimizerError> {
        let mut state = self.state.lock().expect("mock driver state poisoned");
        let id = StreamId(state.next_stream);
        state.next_stream += 1;
        Ok(ScopedStream::new(id, self))
    }

    fn release(&self, _stream: StreamId) {
        // Ids are never reused within a MockDriver; nothing to recycle.
    }
}

impl EventPool for MockDriver {
    fn acquire(&self) -> Result<ScopedEvent<'_>, OptimizerError> {
        let mut state = self.state.lock().expect("mock driver state poisoned");
        let id = EventHandle(state.next_event);
        state.next_event += 1;
        Ok(ScopedEvent::new(id, self))
    }

    fn release(&self, _event: EventHandle) {
        // Ids are never reused within a MockDriver; nothing to recycle.
    }
}

/// A driver whose `begin_capture` always fails, for exercising failure paths.
pub struct FailingDriver {
    inner: MockDriver,
}

impl Default for FailingDriver {
    fn default() -> Self {
        Self {
            inner: MockDriver::new(),
        }
    }
}

impl FailingDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DriverOps for FailingDriver {
    fn begin_capture(&self, _stream: StreamId) -> Result<(), OptimizerError> {
        Err(OptimizerError::driver("begin_capture", "simulated driver failure"))
    }

    fn end_capture(&self, stream: StreamId) -> Result<NativeGraph, OptimizerError> {
        self.inner.end_capture(stream)
    }

    fn record_event(&self, event: EventHandle, stream: StreamId) -> Result<(), OptimizerError> {
        self.inner.record_event(event, stream)
    }

    fn stream_wait_event(
        &self,
        stream: StreamId,
        event: EventHandle,
    ) -> Result<(), OptimizerError> {
        self.inner.stream_wait_event(stream, event)
    }
}

impl StreamPool for FailingDriver {
    fn acquire(&self) -> Result<ScopedStream<'_>, OptimizerError> {
        self.inner.acquire()
    }

    fn release(&self, stream: StreamId) {
        self.inner.release(stream)
    }
}

impl EventPool for FailingDriver {
    fn acquire(&self) -> Result<ScopedEvent<'_>, OptimizerError> {
        self.inner.acquire()
    }

    fn release(&self, event: EventHandle) {
        self.inner.release(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_ids_are_never_reused() {
        let driver = MockDriver::new();
        let a = StreamPool::acquire(&driver).unwrap();
        let b = StreamPool::acquire(&driver).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn log_captures_calls_in_order() {
        let driver = MockDriver::new();
        let stream = StreamPool::acquire(&driver).unwrap();
        let event = EventPool::acquire(&driver).unwrap();

        driver.begin_capture(stream.id()).unwrap();
        driver.record_event(event.id(), stream.id()).unwrap();
        driver.end_capture(stream.id()).unwrap();

        let log = driver.log();
        assert_eq!(
            log,
            vec![
                RecordedOp::BeginCapture(stream.id()),
                RecordedOp::RecordEvent(event.id(), stream.id()),
                RecordedOp::EndCapture(stream.id()),
            ]
        );
        assert_eq!(driver.events_recorded(), 1);
    }

    #[test]
    fn failing_driver_rejects_begin_capture() {
        let driver = FailingDriver::new();
        let stream = StreamPool::acquire(&driver).unwrap();
        assert!(driver.begin_capture(stream.id()).is_err());
    }
}
