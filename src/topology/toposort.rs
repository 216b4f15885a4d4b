// SPDX-License-Identifier: MIT

use crate::errors::OptimizerError;
use crate::graph::{Graph, NodeId, VisitMark};

/// Compute a reverse-postorder topological order: every predecessor appears
/// before its successors.
///
/// Uses iterative DFS with a two-pass "visit then emit" discipline: a node is
/// pushed onto the work stack twice, and the second pop is what appends it to
/// the output, so postorder falls out without recursion. The traversal clears
/// `visited` on every node first, then seeds the stack with roots (nodes with
/// no dependents) in their stored order, so the result is deterministic for a
/// given graph.
///
/// Cycle detection here is best-effort: a cycle that keeps every node reachable
/// from some root will not necessarily be caught (see the source's own
/// length-mismatch check, which this mirrors), matching the "not required for
/// well-formed inputs" wording in the design notes.
pub fn topological_sort(graph: &mut Graph) -> Result<Vec<NodeId>, OptimizerError> {
    for id in graph.nodes() {
        graph.metadata_mut(id).visited = VisitMark::Unvisited;
    }

    let mut order = Vec::with_capacity(graph.len());
    let mut stack: Vec<(NodeId, bool)> = Vec::new();

    for id in graph.nodes() {
        if graph.dependents(id).is_empty() {
            stack.push((id, false));
        }
    }

    while let Some((node, ready_to_emit)) = stack.pop() {
        if ready_to_emit {
            order.push(node);
            continue;
        }

        if graph.metadata(node).visited == VisitMark::Visited {
            continue;
        }
        graph.metadata_mut(node).visited = VisitMark::Visited;

        stack.push((node, true));
        for &successor in graph.successors(node) {
            if graph.metadata(successor).visited == VisitMark::Unvisited {
                stack.push((successor, false));
            }
        }
    }

    order.reverse();

    if order.len() != graph.len() {
        return Err(OptimizerError::invariant(
            "topological sort did not reach every node; the graph likely contains a cycle",
        ));
    }

    Ok(order)
}
