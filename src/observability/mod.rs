// SPDX-License-Identifier: MIT

//! Structured logging for the capture optimizer core.
//!
//! Diagnostic events are modeled as typed message structs rather than ad hoc
//! format strings, following the same pattern the rest of this codebase uses
//! for its DAG executors: each message implements `Display` for a human-readable
//! line and [`messages::StructuredLog`] for machine-readable fields and spans.

pub mod messages;
