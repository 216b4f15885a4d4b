// SPDX-License-Identifier: MIT

use crate::driver::{DriverOps, NativeGraph, StreamId, StreamPool};
use crate::errors::OptimizerError;
use crate::graph::Graph;
use crate::observability::messages::optimizer::{CaptureAborted, CaptureCompleted, CaptureStarted};
use crate::observability::messages::StructuredLog;
use crate::topology::topological_sort;

/// Replays every node onto a single stream, in topological order.
///
/// This is the degenerate case of the scheduling problem: no cross-stream
/// synchronization is possible with one stream, so correctness reduces entirely
/// to picking a topological order and replaying it: the stream's own FIFO
/// ordering does the rest.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialStrategy;

impl SequentialStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Capture `graph` onto a single stream acquired from `streams`, replaying
    /// work in topological order.
    pub fn optimize(
        &self,
        graph: &mut Graph,
        driver: &dyn DriverOps,
        streams: &dyn StreamPool,
    ) -> Result<NativeGraph, OptimizerError> {
        graph.reset_metadata();

        let stream = streams.acquire()?;
        CaptureStarted {
            strategy: "sequential",
            node_count: graph.len(),
            stream_count: 1,
        }
        .log();

        if let Err(err) = driver.begin_capture(stream.id()) {
            log_abort("begin_capture", &err);
            return Err(err);
        }

        if let Err(err) = replay(graph, stream.id()) {
            // An active capture must be terminated before the error propagates.
            let _ = driver.end_capture(stream.id());
            log_abort("replay", &err);
            return Err(err);
        }

        match driver.end_capture(stream.id()) {
            Ok(native_graph) => {
                CaptureCompleted {
                    strategy: "sequential",
                    events_recorded: 0,
                }
                .log();
                Ok(native_graph)
            }
            Err(err) => {
                log_abort("end_capture", &err);
                Err(err)
            }
        }
    }
}

fn replay(graph: &mut Graph, stream: StreamId) -> Result<(), OptimizerError> {
    let order = topological_sort(graph)?;
    for node in order {
        graph.call_work(node, stream);
    }
    Ok(())
}

fn log_abort(primitive: &str, err: &OptimizerError) {
    CaptureAborted {
        primitive,
        reason: &err.to_string(),
    }
    .log();
}
