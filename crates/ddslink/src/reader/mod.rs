// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # TopicReader
//!
//! Typed subscriber wrapping a transport reader.
//!
//! ## Overview
//!
//! A TopicReader:
//! - Decodes samples as they arrive and queues them (FIFO)
//! - Offers blocking, timed and non-blocking reads
//! - Counts matched writers from subscription-matched notifications
//! - Can hand samples to a callback instead of queueing them
//!
//! ## Example
//!
//! ```rust,no_run
//! use ddslink::{FlexibleMsg, LoopbackBus, Result, TopicReader};
//! use std::time::Duration;
//!
//! fn main() -> Result<()> {
//!     let participant = LoopbackBus::new().participant("host");
//!     let reader = TopicReader::<FlexibleMsg>::open(participant, "realsense/e2h")?;
//!
//!     reader.wait_for_writers(1, Duration::from_secs(3))?;
//!     let sample = reader.read_timeout(Duration::from_secs(1))?;
//!     println!("{}", sample.msg.json_string());
//!     Ok(())
//! }
//! ```
//!
//! ## Transport contract
//!
//! Every data-available notification must yield at least one valid sample.
//! One that does not is logged as a protocol violation.

mod builder;
mod runtime;

pub use builder::ReaderBuilder;
pub use runtime::{Sample, TopicReader};
