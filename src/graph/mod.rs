// SPDX-License-Identifier: MIT

//! An immutable view over the input DAG, plus the per-node "capture metadata"
//! the optimizer attaches while it runs.
//!
//! The graph itself is built once by the caller (graph construction is out of
//! scope for this crate, per the optimizer's external collaborators) and handed
//! to a strategy. The optimizer never adds or removes nodes/edges; it only reads
//! `successors`/`dependents` and writes into each node's [`CaptureMetadata`] slot.

mod metadata;

pub use metadata::CaptureMetadata;
pub(crate) use metadata::VisitMark;

use crate::driver::StreamId;

/// A unique, stable identifier for a node within one [`Graph`].
///
/// `NodeId`s are dense indices assigned in insertion order by [`GraphBuilder`]; they
/// are only meaningful relative to the `Graph` that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// The opaque, side-effecting action a node performs when replayed onto a stream.
///
/// The closure is expected to enqueue one or more driver commands on the given
/// stream. The optimizer calls it at most once per node per `optimize` invocation.
pub type Work = Box<dyn Fn(StreamId) + Send + Sync>;

struct NodeRecord {
    successors: Vec<NodeId>,
    dependents: Vec<NodeId>,
    work: Work,
}

/// An immutable DAG of opaque work items, with a mutable capture-metadata slot
/// attached to every node.
///
/// `Graph` enforces nothing about cycles itself (that is the caller's
/// responsibility, see [`GraphBuilder`]), but the topology utilities in
/// [`crate::topology`] detect malformed input on a best-effort basis.
pub struct Graph {
    nodes: Vec<NodeRecord>,
    metadata: Vec<CaptureMetadata>,
}

impl Graph {
    /// Start building a graph from scratch.
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids, in the order they were added to the builder.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Nodes with no dependents (predecessors), the roots of the DAG.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes().filter(move |&id| self.dependents(id).is_empty())
    }

    /// Ordered successors of `id` (nodes that depend on `id`).
    pub fn successors(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].successors
    }

    /// Ordered dependents of `id` (nodes `id` depends on).
    pub fn dependents(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].dependents
    }

    /// Read-only access to a node's capture metadata.
    pub fn metadata(&self, id: NodeId) -> &CaptureMetadata {
        &self.metadata[id.index()]
    }

    /// Mutable access to a node's capture metadata.
    pub fn metadata_mut(&mut self, id: NodeId) -> &mut CaptureMetadata {
        &mut self.metadata[id.index()]
    }

    /// Reset every node's capture metadata to its zero value.
    ///
    /// Strategies call this at the start of every `optimize` invocation so that
    /// metadata from a previous run (or a freshly built graph) never leaks in;
    /// per the data model, capture metadata is only valid for one optimize call.
    pub fn reset_metadata(&mut self) {
        for slot in &mut self.metadata {
            *slot = CaptureMetadata::default();
        }
    }

    /// Invoke a node's work action on the given stream.
    ///
    /// Replays exactly the one driver-enqueueing side effect the node carries;
    /// strategies are responsible for calling this at most once per node.
    pub fn call_work(&self, id: NodeId, stream: StreamId) {
        (self.nodes[id.index()].work)(stream);
    }
}

/// Builds a [`Graph`] by adding nodes and wiring dependency edges between them.
///
/// This is the only supported way to construct a `Graph`: it keeps `successors`
/// and `dependents` bidirectionally consistent, which is an invariant the rest of
/// the crate relies on without re-checking.
#[derive(Default)]
pub struct GraphBuilder {
    nodes: Vec<NodeRecord>,
}

impl GraphBuilder {
    /// Add a node with the given work action, returning its id.
    pub fn add_node(&mut self, work: Work) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeRecord {
            successors: Vec::new(),
            dependents: Vec::new(),
            work,
        });
        id
    }

    /// Declare that `successor` depends on `predecessor` (an edge `predecessor -> successor`).
    pub fn add_edge(&mut self, predecessor: NodeId, successor: NodeId) {
        self.nodes[predecessor.index()].successors.push(successor);
        self.nodes[successor.index()].dependents.push(predecessor);
    }

    /// Finish building, producing an immutable [`Graph`] with zeroed capture metadata.
    pub fn build(self) -> Graph {
        let metadata = vec![CaptureMetadata::default(); self.nodes.len()];
        Graph {
            nodes: self.nodes,
            metadata,
        }
    }
}
