// SPDX-License-Identifier: MIT

use crate::config::RoundRobinConfig;
use crate::driver::{DriverOps, EventPool, NativeGraph, StreamId, StreamPool};
use crate::errors::OptimizerError;
use crate::graph::{Graph, NodeId};
use crate::observability::messages::optimizer::{
    CaptureAborted, CaptureCompleted, CaptureStarted, EventRecorded,
};
use crate::observability::messages::StructuredLog;
use crate::topology::levelize;

/// Distributes work across `N` streams, level by level, round-robin within a
/// level, synchronizing only where a dependency actually crosses streams.
///
/// The replay follows a fixed three-step protocol per the data model: fork
/// (stream 0 hands off to the other `N - 1`), schedule (levelized, round-robin
/// node placement with just-enough cross-stream waits), join (every other
/// stream hands back to stream 0). Stream 0 is the one `begin_capture`/
/// `end_capture` is called on; the others only ever participate through events.
#[derive(Debug, Clone, Copy)]
pub struct RoundRobinStrategy {
    config: RoundRobinConfig,
}

impl RoundRobinStrategy {
    pub fn new(config: RoundRobinConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RoundRobinConfig {
        &self.config
    }

    /// Capture `graph` across `config().num_streams()` streams acquired from
    /// `streams`, synchronizing through events acquired from `events`.
    pub fn optimize(
        &self,
        graph: &mut Graph,
        driver: &dyn DriverOps,
        streams: &dyn StreamPool,
        events: &dyn EventPool,
    ) -> Result<NativeGraph, OptimizerError> {
        graph.reset_metadata();
        let n = self.config.num_streams();

        let mut scoped_streams = Vec::with_capacity(n);
        for _ in 0..n {
            scoped_streams.push(streams.acquire()?);
        }
        let stream_ids: Vec<StreamId> = scoped_streams.iter().map(|s| s.id()).collect();

        CaptureStarted {
            strategy: "round_robin",
            node_count: graph.len(),
            stream_count: n,
        }
        .log();

        let levels = match levelize(graph) {
            Ok(levels) => levels,
            Err(err) => {
                log_abort("levelize", &err);
                return Err(err);
            }
        };

        // Headroom for the fork event, one join event per non-primary stream, and
        // roughly one outbound event per level; growable, never relocated in a way
        // that would invalidate a handle since EventHandle is a plain Copy value.
        let mut recorded_events = Vec::with_capacity(n / 2 + levels.len());

        let outcome = run(
            graph,
            driver,
            events,
            &stream_ids,
            &levels,
            &mut recorded_events,
        );

        if let Err(err) = outcome {
            let _ = driver.end_capture(stream_ids[0]);
            log_abort("replay", &err);
            return Err(err);
        }

        match driver.end_capture(stream_ids[0]) {
            Ok(native_graph) => {
                CaptureCompleted {
                    strategy: "round_robin",
                    events_recorded: recorded_events.len(),
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

fn run<'p>(
    graph: &mut Graph,
    driver: &dyn DriverOps,
    events: &'p dyn EventPool,
    stream_ids: &[StreamId],
    levels: &[Vec<NodeId>],
    recorded_events: &mut Vec<crate::driver::ScopedEvent<'p>>,
) -> Result<(), OptimizerError> {
    let n = stream_ids.len();

    driver.begin_capture(stream_ids[0])?;

    // Fork: stream 0 records an event every other stream waits on before doing
    // anything, establishing the happens-before edge the whole capture hangs off.
    let fork_event = events.acquire()?;
    driver.record_event(fork_event.id(), stream_ids[0])?;
    for &sid in &stream_ids[1..] {
        driver.stream_wait_event(sid, fork_event.id())?;
    }
    recorded_events.push(fork_event);

    for level in levels {
        for &node in level {
            let idx = graph.metadata(node).idx;
            let own_stream = idx % n;
            let sid = stream_ids[own_stream];

            for &dep in graph.dependents(node) {
                let dep_idx = graph.metadata(dep).idx;
                if dep_idx % n != own_stream {
                    let dep_event = graph.metadata(dep).event.ok_or_else(|| {
                        OptimizerError::invariant(
                            "cross-stream predecessor has no recorded event",
                        )
                    })?;
                    driver.stream_wait_event(sid, dep_event)?;
                }
            }

            graph.call_work(node, sid);

            let crosses_streams = graph
                .successors(node)
                .iter()
                .any(|&s| graph.metadata(s).idx % n != own_stream);
            if crosses_streams {
                let event = events.acquire()?;
                driver.record_event(event.id(), sid)?;
                EventRecorded {
                    node_idx: idx,
                    level: graph.metadata(node).level,
                    stream: sid.0,
                }
                .log();
                graph.metadata_mut(node).event = Some(event.id());
                recorded_events.push(event);
            }
        }
    }

    // Join: every non-primary stream hands back to stream 0.
    for &sid in &stream_ids[1..] {
        let join_event = events.acquire()?;
        driver.record_event(join_event.id(), sid)?;
        driver.stream_wait_event(stream_ids[0], join_event.id())?;
        recorded_events.push(join_event);
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
