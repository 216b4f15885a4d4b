// SPDX-License-Identifier: MIT

//! The two replay strategies: [`SequentialStrategy`] for a single stream, and
//! [`RoundRobinStrategy`] for distributing work across several.

mod round_robin;
mod sequential;

pub use round_robin::RoundRobinStrategy;
pub use sequential::SequentialStrategy;
