// SPDX-License-Identifier: MIT

//! Driver backend implementations.
//!
//! The optimizer core never talks to hardware directly; it replays work
//! through the [`crate::driver`] trait boundary. In production that boundary is
//! wired to a real GPU driver; this crate ships only the [`mock`] backend, which
//! records what the optimizer would have told a real driver to do, for exercising
//! strategies in tests without a GPU.

#[cfg(any(test, feature = "test-util"))]
pub mod mock;
