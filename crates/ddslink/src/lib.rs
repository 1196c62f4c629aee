// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # ddslink - Typed pub/sub plumbing for device links
//!
//! Typed readers and writers over a publish/subscribe transport, a device
//! watcher driven by discovery announcements, and a JSON shortener used to
//! keep per-sample logs readable.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ddslink::{FlexibleMsg, LoopbackBus, Result, TopicReader, TopicWriter};
//! use std::time::Duration;
//!
//! fn main() -> Result<()> {
//!     let bus = LoopbackBus::new();
//!     let device = bus.participant("device");
//!     let host = bus.participant("host");
//!
//!     let reader = TopicReader::<FlexibleMsg>::open(host, "realsense/e2h")?;
//!     let writer = TopicWriter::<FlexibleMsg>::open(device, "realsense/e2h")?;
//!     writer.wait_for_readers(1, Duration::from_secs(3))?;
//!
//!     writer.write(&serde_json::json!({ "id": "ping" }).into())?;
//!     let sample = reader.read_timeout(Duration::from_secs(1))?;
//!     println!("{}", sample.msg.json_string());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------+
//! |  TopicReader<M> | TopicWriter<M> | Streamer<M> | DeviceWatcher |
//! +---------------------------------------------------------------+
//! |  Message codecs: FlexibleMsg | OpPayload | StreamPayload | ... |
//! +---------------------------------------------------------------+
//! |  transport traits: Participant | RawReader | RawWriter         |
//! |  LoopbackBus (in-process)                                     |
//! +---------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TopicReader`] | Decodes and queues samples, counts matched writers |
//! | [`TopicWriter`] | Encodes and publishes, counts matched readers |
//! | [`Streamer`] | Publishes generated frames while readers are matched |
//! | [`DeviceWatcher`] | Tracks devices from their announcements |
//! | [`LoopbackBus`] | In-process transport |
//! | [`shorten_json`] | Fits a JSON text into a length budget |

/// Shared building blocks (GUIDs, blocking queue, counters, singleton).
pub mod core;
/// Configuration defaults and `LinkConfig`.
pub mod config;
/// Crate-wide error type.
pub mod error;
/// Typed subscriber.
pub mod reader;
/// Stream delivery statistics and clock alignment.
pub mod stats;
/// JSON-aware text shortening.
pub mod text;
/// Message payloads and their codecs.
pub mod topics;
/// Transport abstraction and the loopback implementation.
pub mod transport;
/// Device discovery.
pub mod watcher;
/// Typed publisher and publish loop.
pub mod writer;

pub use config::LinkConfig;
pub use crate::core::{Guid, SharedSingleton};
pub use error::{Error, Result};
pub use reader::{ReaderBuilder, Sample, TopicReader};
pub use stats::{ClockSync, StreamStats};
pub use text::{shorten_json, shorten_json_string, Ellipsis};
pub use topics::{DataFormat, DeviceInfo, FlexibleMsg, Message, Op, OpPayload, StreamPayload};
pub use transport::{LoopbackBus, Participant, ReaderQos, Reliability, SampleInfo};
pub use watcher::{Device, DeviceWatcher};
pub use writer::{Streamer, TopicWriter, WriterBuilder};
