//! Property-based tests for the testable invariants of topology and
//! scheduling: topological order, levelization, and the Round-Robin
//! synchronization protocol.

use std::collections::HashSet;
use std::sync::Once;

use capture_optimizer_core::backends::mock::{MockDriver, RecordedOp};
use capture_optimizer_core::topology::{levelize, topological_sort};
use capture_optimizer_core::{Graph, GraphBuilder, NodeId, RoundRobinConfig, RoundRobinStrategy, SequentialStrategy};
use proptest::prelude::*;

static TRACING: Once = Once::new();

/// Install a `tracing-subscriber` fmt layer once per test binary, so the
/// `CaptureStarted`/`CaptureAborted`/... structured logs emitted during these
/// runs have somewhere to go instead of being silently dropped.
fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init()
            .ok();
    });
}

fn noop() -> capture_optimizer_core::Work {
    Box::new(|_| {})
}

/// A random DAG, described as `dependents[i]` = sorted, deduped predecessor
/// indices of node `i`, every one of them `< i`, which makes acyclicity
/// true by construction rather than something we have to check for.
fn arb_dag() -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1usize..14).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec(0..n, 0..=3), n).prop_map(move |raw| {
            (0..n)
                .map(|i| {
                    let mut preds: Vec<usize> = raw[i].iter().copied().filter(|&p| p < i).collect();
                    preds.sort_unstable();
                    preds.dedup();
                    preds
                })
                .collect()
        })
    })
}

fn build_graph(dependents: &[Vec<usize>]) -> (Graph, Vec<NodeId>) {
    let mut b = GraphBuilder::default();
    let ids: Vec<NodeId> = (0..dependents.len()).map(|_| b.add_node(noop())).collect();
    for (i, preds) in dependents.iter().enumerate() {
        for &p in preds {
            b.add_edge(ids[p], ids[i]);
        }
    }
    (b.build(), ids)
}

proptest! {
    // for every edge (u, v), u appears before v in the topological order.
    #[test]
    fn topological_order_respects_every_edge(dependents in arb_dag()) {
        let (mut graph, ids) = build_graph(&dependents);
        let order = topological_sort(&mut graph).unwrap();
        prop_assert_eq!(order.len(), graph.len());

        let position: std::collections::HashMap<NodeId, usize> =
            order.iter().enumerate().map(|(pos, &n)| (n, pos)).collect();

        for (i, preds) in dependents.iter().enumerate() {
            for &p in preds {
                prop_assert!(position[&ids[p]] < position[&ids[i]]);
            }
        }
    }

    // roots get level 0; every edge (u, v) has level(v) >= level(u) + 1.
    #[test]
    fn levelization_respects_every_edge_and_roots_are_zero(dependents in arb_dag()) {
        let (mut graph, ids) = build_graph(&dependents);
        let _levels = levelize(&mut graph).unwrap();

        for (i, preds) in dependents.iter().enumerate() {
            if preds.is_empty() {
                prop_assert_eq!(graph.metadata(ids[i]).level, 0);
            }
            for &p in preds {
                prop_assert!(graph.metadata(ids[i]).level >= graph.metadata(ids[p]).level + 1);
            }
        }
    }

    // Round-Robin records exactly one event per node with a cross-stream
    // successor, and every cross-stream edge is backed by a wait.
    #[test]
    fn round_robin_events_match_cross_stream_edges(dependents in arb_dag(), n in 1usize..6) {
        init_tracing();
        let (mut graph, ids) = build_graph(&dependents);
        let driver = MockDriver::new();
        let config = RoundRobinConfig::new(n).unwrap();

        RoundRobinStrategy::new(config)
            .optimize(&mut graph, &driver, &driver, &driver)
            .unwrap();

        for (i, preds) in dependents.iter().enumerate() {
            let own_stream = graph.metadata(ids[i]).idx % n;
            let has_cross_successor = graph
                .successors(ids[i])
                .iter()
                .any(|&s| graph.metadata(s).idx % n != own_stream);
            prop_assert_eq!(graph.metadata(ids[i]).event.is_some(), has_cross_successor);

            for &p in preds {
                let p_stream = graph.metadata(ids[p]).idx % n;
                if p_stream != own_stream {
                    let event = graph.metadata(ids[p]).event.expect("cross-stream predecessor must have an event");
                    prop_assert!(driver
                        .log()
                        .iter()
                        .any(|op| matches!(op, RecordedOp::StreamWaitEvent(_, e) if *e == event)));
                }
            }
        }
    }
}

#[test]
fn sequential_on_a_linear_chain_issues_exactly_k_calls_on_one_stream() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    init_tracing();
    for k in [0usize, 1, 5, 20] {
        let driver = MockDriver::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut b = GraphBuilder::default();
        let mut prev = None;
        for _ in 0..k {
            let calls = calls.clone();
            let id = b.add_node(Box::new(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            }));
            if let Some(p) = prev {
                b.add_edge(p, id);
            }
            prev = Some(id);
        }
        let mut graph = b.build();

        SequentialStrategy::new()
            .optimize(&mut graph, &driver, &driver)
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), k);
        assert_eq!(driver.events_recorded(), 0);
        let streams_seen: HashSet<_> = driver
            .log()
            .iter()
            .filter_map(|op| match op {
                RecordedOp::BeginCapture(s) | RecordedOp::EndCapture(s) => Some(*s),
                _ => None,
            })
            .collect();
        assert_eq!(streams_seen.len(), 1);
    }
}

#[test]
fn round_robin_on_k_independent_roots_distributes_i_mod_n_with_no_inbound_waits() {
    init_tracing();
    for (k, n) in [(5usize, 2usize), (7, 3), (1, 4), (0, 4)] {
        let driver = MockDriver::new();
        let mut b = GraphBuilder::default();
        let ids: Vec<NodeId> = (0..k).map(|_| b.add_node(noop())).collect();
        let mut graph = b.build();

        RoundRobinStrategy::new(RoundRobinConfig::new(n).unwrap())
            .optimize(&mut graph, &driver, &driver, &driver)
            .unwrap();

        for (i, &id) in ids.iter().enumerate() {
            assert_eq!(graph.metadata(id).idx % n, i % n);
        }

        // no root has a predecessor, so the only waits are the fork wait every
        // non-primary stream issues and the join wait stream 0 issues back.
        let fork_waits = n.saturating_sub(1);
        let join_waits = n.saturating_sub(1);
        let total_waits = driver
            .log()
            .iter()
            .filter(|op| matches!(op, RecordedOp::StreamWaitEvent(..)))
            .count();
        assert_eq!(total_waits, fork_waits + join_waits);

        let join_events = n.saturating_sub(1);
        assert_eq!(driver.events_recorded(), 1 + join_events);
    }
}
