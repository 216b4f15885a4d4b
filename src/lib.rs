// SPDX-License-Identifier: MIT

//! Turns a static DAG of GPU work into a single replayable native graph via
//! stream capture, picking between a single-stream sequential replay and a
//! multi-stream round-robin replay that only synchronizes where dependencies
//! actually cross streams.
//!
//! The optimizer owns no GPU resources itself; [`driver`] defines the trait
//! boundary a caller implements against a real driver (or, for tests,
//! [`backends::mock`]), and [`strategies`] is where the two replay algorithms
//! live.

pub mod backends;
pub mod config;
pub mod driver;
pub mod errors;
pub mod graph;
pub mod observability;
pub mod strategies;
pub mod topology;

pub use config::RoundRobinConfig;
pub use driver::{DriverOps, EventHandle, EventPool, NativeGraph, StreamId, StreamPool};
pub use errors::OptimizerError;
pub use graph::{CaptureMetadata, Graph, GraphBuilder, NodeId, Work};
pub use strategies::{RoundRobinStrategy, SequentialStrategy};
