// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TopicReader runtime: queue, matched-writer count and transport callbacks.

use super::builder::ReaderBuilder;
use crate::core::time::{format_ns, now_ns};
use crate::core::{Guid, MatchedCounter, WaitQueue};
use crate::error::{Error, Result};
use crate::topics::Message;
use crate::transport::{
    Participant, RawReader, ReaderListener, ReaderQos, SampleInfo, SubscriptionMatchedStatus,
};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// A decoded message with its transport metadata.
#[derive(Debug, Clone)]
pub struct Sample<M> {
    pub msg: M,
    pub info: SampleInfo,
}

/// User replacement for the default "push to queue" sink.
pub(crate) struct DataSink<M>(pub(crate) Box<dyn Fn(Sample<M>) + Send + Sync>);

/// State shared between the reader handle and the transport listener.
///
/// The transport holds it as its `ReaderListener`; it never holds the
/// transport reader back, so there is no cycle.
pub(crate) struct ReaderShared<M: Message> {
    pub(crate) topic: String,
    pub(crate) queue: WaitQueue<Sample<M>>,
    pub(crate) matched: MatchedCounter,
    /// `None`: samples go to `queue`.
    pub(crate) on_data: ArcSwap<Option<DataSink<M>>>,
    pub(crate) preview_length: usize,
}

impl<M: Message> ReaderShared<M> {
    pub(crate) fn new(topic: &str, preview_length: usize) -> Self {
        Self {
            topic: topic.to_string(),
            queue: WaitQueue::new(),
            matched: MatchedCounter::new(),
            on_data: ArcSwap::new(Arc::new(None)),
            preview_length,
        }
    }

    /// Take every available sample from `reader` and hand each to the sink.
    ///
    /// Stops at the first invalid sample or when the reader runs dry. A
    /// notification that yields no valid sample breaks the transport
    /// contract and is reported as [`Error::ProtocolViolation`].
    pub(crate) fn drain(&self, reader: &dyn RawReader) -> Result<usize> {
        let notify_time = now_ns();
        let mut got = 0usize;
        while let Some(raw) = reader.take_next_sample()? {
            if !raw.info.valid_data {
                break;
            }
            let msg = M::decode(&raw.data)?;
            if !msg.is_valid() {
                break;
            }
            let received = raw.info.reception_timestamp;
            log::debug!(
                "[READER] {}.on_data_available @{} +{} +{} {}",
                self.topic,
                received,
                format_ns(notify_time.saturating_sub(received)),
                format_ns(now_ns().saturating_sub(notify_time)),
                msg.preview(self.preview_length)
            );
            got += 1;
            self.deliver(Sample {
                msg,
                info: raw.info,
            });
        }
        if got == 0 {
            return Err(Error::ProtocolViolation {
                topic: self.topic.clone(),
                reason: "expected message not received!".to_string(),
            });
        }
        Ok(got)
    }

    fn deliver(&self, sample: Sample<M>) {
        let sink = self.on_data.load_full();
        match &*sink {
            Some(DataSink(callback)) => callback(sample),
            None => self.queue.push(sample),
        }
    }
}

impl<M: Message> ReaderListener for ReaderShared<M> {
    fn on_data_available(&self, reader: &dyn RawReader) {
        if let Err(e) = self.drain(reader) {
            log::error!("[READER] {}: {}", self.topic, e);
        }
    }

    fn on_subscription_matched(&self, status: SubscriptionMatchedStatus) {
        let delta = status.current_count_change;
        let n = self.matched.apply(delta);
        log::debug!(
            "[READER] {}.on_subscription_matched {:+} -> {}",
            self.topic,
            delta,
            n
        );
    }
}

/// Typed subscriber with blocking reads and matched-writer counting.
///
/// A reader is created idle; [`run`](Self::run) subscribes it on the
/// transport. From then on, every sample the transport delivers is decoded
/// and either queued for [`read`](Self::read) or handed to the callback set
/// with [`on_data`](Self::on_data).
pub struct TopicReader<M: Message> {
    participant: Arc<dyn Participant>,
    shared: Arc<ReaderShared<M>>,
    qos: ReaderQos,
    poll_interval: Duration,
    raw: Mutex<Option<Arc<dyn RawReader>>>,
}

impl<M: Message> TopicReader<M> {
    /// An idle reader on `topic` with default settings.
    pub fn new(participant: Arc<dyn Participant>, topic: &str) -> Result<Self> {
        ReaderBuilder::new(topic).build(participant)
    }

    /// A running reader on `topic` with default settings.
    pub fn open(participant: Arc<dyn Participant>, topic: &str) -> Result<Self> {
        ReaderBuilder::new(topic).open(participant)
    }

    pub fn builder(topic: &str) -> ReaderBuilder<M> {
        ReaderBuilder::new(topic)
    }

    pub(crate) fn from_parts(
        participant: Arc<dyn Participant>,
        shared: ReaderShared<M>,
        qos: ReaderQos,
        poll_interval: Duration,
    ) -> Result<Self> {
        if !participant.is_valid() {
            return Err(Error::InvalidConstruction(format!(
                "participant '{}' was not initialized; cannot read '{}'",
                participant.name(),
                shared.topic
            )));
        }
        Ok(Self {
            participant,
            shared: Arc::new(shared),
            qos,
            poll_interval,
            raw: Mutex::new(None),
        })
    }

    /// Subscribe on the transport. No-op if already running.
    pub fn run(&self, qos: ReaderQos) -> Result<()> {
        let mut raw = self.raw.lock();
        if raw.is_some() {
            return Ok(());
        }
        let listener: Arc<dyn ReaderListener> = self.shared.clone();
        let reader = self
            .participant
            .create_reader(&self.shared.topic, &qos, listener)?;
        log::debug!(
            "[READER] {} running as {} ({:?})",
            self.shared.topic,
            reader.guid(),
            qos.reliability
        );
        *raw = Some(reader);
        Ok(())
    }

    /// [`run`](Self::run) with the QoS this reader was built with.
    pub fn run_default(&self) -> Result<()> {
        self.run(self.qos)
    }

    pub fn is_running(&self) -> bool {
        self.raw.lock().is_some()
    }

    fn ensure_running(&self) -> Result<()> {
        if self.is_running() {
            Ok(())
        } else {
            Err(Error::InvalidState(format!(
                "reader '{}' is not running",
                self.shared.topic
            )))
        }
    }

    /// Block until a sample is queued, then pop it.
    ///
    /// There is no way to cancel this wait; use
    /// [`read_timeout`](Self::read_timeout) when one is needed.
    pub fn read(&self) -> Result<Sample<M>> {
        self.ensure_running()?;
        Ok(self.shared.queue.pop_wait())
    }

    /// Pop the next sample, waiting at most `timeout`.
    pub fn read_timeout(&self, timeout: Duration) -> Result<Sample<M>> {
        self.shared.queue.pop_timeout(timeout).ok_or_else(|| {
            Error::timeout(format!("data on '{}'", self.shared.topic), timeout)
        })
    }

    /// Pop the next sample if one is queued.
    pub fn try_read(&self) -> Option<Sample<M>> {
        self.shared.queue.try_pop()
    }

    /// Block until a sample is queued, without popping it.
    pub fn wait_for_data(&self) -> Result<()> {
        self.ensure_running()?;
        self.shared.queue.wait_until_nonempty();
        Ok(())
    }

    pub fn wait_for_data_timeout(&self, timeout: Duration) -> Result<()> {
        if self.shared.queue.wait_until_nonempty_for(timeout) {
            Ok(())
        } else {
            Err(Error::timeout(
                format!("data on '{}'", self.shared.topic),
                timeout,
            ))
        }
    }

    /// Poll until at least `n` writers are matched.
    pub fn wait_for_writers(&self, n: usize, timeout: Duration) -> Result<()> {
        let n = i64::try_from(n).unwrap_or(i64::MAX);
        if self
            .shared
            .matched
            .wait_at_least(n, timeout, self.poll_interval)
        {
            Ok(())
        } else {
            Err(Error::timeout(
                format!("{} writers on '{}'", n, self.shared.topic),
                timeout,
            ))
        }
    }

    /// Replace the sample sink: samples go to `callback` instead of the
    /// queue. The last registration wins.
    ///
    /// The callback runs on a transport thread; it must not block for long.
    pub fn on_data(&self, callback: impl Fn(Sample<M>) + Send + Sync + 'static) {
        self.shared
            .on_data
            .store(Arc::new(Some(DataSink(Box::new(callback)))));
    }

    /// Go back to queueing samples for [`read`](Self::read).
    pub fn clear_on_data(&self) {
        self.shared.on_data.store(Arc::new(None));
    }

    pub fn name(&self) -> &str {
        &self.shared.topic
    }

    pub fn qos(&self) -> ReaderQos {
        self.qos
    }

    /// Transport GUID, once running.
    pub fn guid(&self) -> Option<Guid> {
        self.raw.lock().as_ref().map(|r| r.guid())
    }

    pub fn participant(&self) -> &Arc<dyn Participant> {
        &self.participant
    }

    /// True if no sample is queued.
    pub fn is_empty(&self) -> bool {
        self.shared.queue.is_empty()
    }

    /// Number of queued samples.
    pub fn len(&self) -> usize {
        self.shared.queue.len()
    }

    /// Current matched-writer count, as reported by the transport.
    pub fn matched_writers(&self) -> i64 {
        self.shared.matched.current()
    }
}

impl<M: Message> Drop for TopicReader<M> {
    fn drop(&mut self) {
        if let Some(raw) = self.raw.get_mut().take() {
            log::debug!(
                "[READER] {} closed with {} unread samples",
                self.shared.topic,
                self.shared.queue.len()
            );
            drop(raw);
        }
    }
}
