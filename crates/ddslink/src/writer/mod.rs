// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # TopicWriter
//!
//! Typed publisher wrapping a transport writer, plus a publish loop.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ddslink::{LoopbackBus, Op, OpPayload, Result, TopicWriter};
//! use std::time::Duration;
//!
//! fn main() -> Result<()> {
//!     let participant = LoopbackBus::new().participant("host");
//!     let writer = TopicWriter::<OpPayload>::open(participant, "realsense/ops")?;
//!
//!     writer.wait_for_readers(1, Duration::from_secs(3))?;
//!     writer.write_op(Op::Sync, 1, &[42])?;
//!     Ok(())
//! }
//! ```
//!
//! [`Streamer`] keeps writing generated messages for as long as at least
//! one reader is matched.

mod builder;
mod runtime;
mod streamer;
#[cfg(test)]
mod tests;

pub use builder::WriterBuilder;
pub use runtime::TopicWriter;
pub use streamer::Streamer;
