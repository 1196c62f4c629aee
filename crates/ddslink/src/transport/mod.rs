// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Publish/subscribe transport seam.
//!
//! Readers, writers and the device watcher only talk to the traits below.
//! A transport owns participant/domain management, discovery and delivery;
//! it calls back into listeners from its own thread(s).
//!
//! # Thread Safety
//!
//! Listeners are invoked from transport threads. Implementations must be
//! `Send + Sync` and should not block. A transport must not hold its own
//! locks while calling a listener.
//!
//! # Contract
//!
//! - `on_data_available` fires only when at least one valid sample can be
//!   taken from the reader it is given.
//! - Match deltas are reported once per match/unmatch, in order.
//! - `on_writer_removed` fires when a writer leaves the bus for good.

pub mod loopback;

use crate::core::Guid;
use crate::error::Result;
use std::sync::Arc;

pub use loopback::LoopbackBus;

/// Metadata delivered with every sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleInfo {
    /// Writer-side timestamp, nanoseconds since the Unix epoch.
    pub source_timestamp: i64,
    /// Reader-side timestamp, nanoseconds since the Unix epoch.
    pub reception_timestamp: i64,
    /// GUID of the writer that published the sample.
    pub publication_handle: Guid,
    /// False for metadata-only samples (e.g. dispose notifications).
    pub valid_data: bool,
}

/// Undecoded sample as taken from a transport reader.
#[derive(Debug, Clone, Default)]
pub struct RawSample {
    pub data: Vec<u8>,
    pub info: SampleInfo,
}

/// Delivery guarantee requested by a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reliability {
    BestEffort,
    #[default]
    Reliable,
}

/// Reader quality of service, as far as consumers care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderQos {
    pub reliability: Reliability,
    /// Samples kept per reader before the oldest is dropped; `None` keeps all.
    pub history_depth: Option<usize>,
}

impl ReaderQos {
    pub fn reliable() -> Self {
        Self::default()
    }

    pub fn best_effort() -> Self {
        Self {
            reliability: Reliability::BestEffort,
            ..Self::default()
        }
    }

    pub fn keep_last(mut self, depth: usize) -> Self {
        self.history_depth = Some(depth);
        self
    }
}

impl Default for ReaderQos {
    fn default() -> Self {
        Self {
            reliability: Reliability::Reliable,
            history_depth: None,
        }
    }
}

/// Status information for subscription matching events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionMatchedStatus {
    /// Total cumulative count of matched publications.
    pub total_count: u32,
    /// Change in total_count since last callback.
    pub total_count_change: i32,
    /// Current number of matched publications.
    pub current_count: u32,
    /// Change in current_count since last callback.
    pub current_count_change: i32,
    /// GUID of the last matched/unmatched publication.
    pub last_publication_handle: Option<Guid>,
}

/// Status information for publication matching events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicationMatchedStatus {
    /// Total cumulative count of matched subscriptions.
    pub total_count: u32,
    /// Change in total_count since last callback.
    pub total_count_change: i32,
    /// Current number of matched subscriptions.
    pub current_count: u32,
    /// Change in current_count since last callback.
    pub current_count_change: i32,
    /// GUID of the last matched/unmatched subscription.
    pub last_subscription_handle: Option<Guid>,
}

/// Handle returned by [`Participant::add_listener`].
pub type ListenerId = u64;

/// Reader-side notifications.
pub trait ReaderListener: Send + Sync {
    /// Samples can be taken from `reader`.
    fn on_data_available(&self, reader: &dyn RawReader) {
        let _ = reader;
    }

    /// The reader matched or unmatched a writer.
    fn on_subscription_matched(&self, status: SubscriptionMatchedStatus) {
        let _ = status;
    }
}

/// Writer-side notifications.
pub trait WriterListener: Send + Sync {
    /// The writer matched or unmatched a reader.
    fn on_publication_matched(&self, status: PublicationMatchedStatus) {
        let _ = status;
    }
}

/// Participant-wide notifications.
pub trait ParticipantListener: Send + Sync {
    /// A writer on `topic` left the bus.
    fn on_writer_removed(&self, writer: Guid, topic: &str) {
        let _ = (writer, topic);
    }
}

/// Receiving endpoint.
pub trait RawReader: Send + Sync {
    fn topic_name(&self) -> &str;

    fn guid(&self) -> Guid;

    /// Pop the oldest pending sample, `None` when there is none.
    fn take_next_sample(&self) -> Result<Option<RawSample>>;
}

/// Sending endpoint.
pub trait RawWriter: Send + Sync {
    fn topic_name(&self) -> &str;

    fn guid(&self) -> Guid;

    /// Publish one serialized sample to every matched reader.
    fn write(&self, data: &[u8]) -> Result<()>;
}

/// Entry point into a transport domain.
///
/// Endpoints stay registered until the last handle to them is dropped.
pub trait Participant: Send + Sync {
    fn name(&self) -> &str;

    fn guid(&self) -> Guid;

    /// False for a participant that never joined its domain. Creating
    /// endpoints on it fails.
    fn is_valid(&self) -> bool;

    fn create_reader(
        &self,
        topic: &str,
        qos: &ReaderQos,
        listener: Arc<dyn ReaderListener>,
    ) -> Result<Arc<dyn RawReader>>;

    fn create_writer(
        &self,
        topic: &str,
        listener: Arc<dyn WriterListener>,
    ) -> Result<Arc<dyn RawWriter>>;

    fn add_listener(&self, listener: Arc<dyn ParticipantListener>) -> ListenerId;

    /// Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);
}
