// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TopicWriter runtime: encode-and-publish plus matched-reader counting.

use super::builder::WriterBuilder;
use crate::core::{Guid, MatchedCounter};
use crate::error::{Error, Result};
use crate::topics::{Message, Op, OpPayload};
use crate::transport::{Participant, PublicationMatchedStatus, RawWriter, WriterListener};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Callback run after every publication-matched notification.
pub(crate) struct MatchHook(pub(crate) Box<dyn Fn(&PublicationMatchedStatus) + Send + Sync>);

/// State the transport holds as the writer's listener.
pub(crate) struct WriterShared {
    pub(crate) topic: String,
    pub(crate) matched: MatchedCounter,
    pub(crate) on_matched: ArcSwap<Option<MatchHook>>,
}

impl WriterShared {
    pub(crate) fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            matched: MatchedCounter::new(),
            on_matched: ArcSwap::new(Arc::new(None)),
        }
    }
}

impl WriterListener for WriterShared {
    fn on_publication_matched(&self, status: PublicationMatchedStatus) {
        let delta = status.current_count_change;
        let n = self.matched.apply(delta);
        log::debug!(
            "[WRITER] {}.on_publication_matched {:+} -> {}",
            self.topic,
            delta,
            n
        );
        // Counter lock is released; user code may run.
        let hook = self.on_matched.load_full();
        if let Some(MatchHook(callback)) = &*hook {
            callback(&status);
        }
    }
}

/// Typed publisher with matched-reader counting.
///
/// Like [`TopicReader`](crate::TopicReader), a writer is created idle and
/// [`run`](Self::run) registers it on the transport.
pub struct TopicWriter<M: Message> {
    participant: Arc<dyn Participant>,
    shared: Arc<WriterShared>,
    poll_interval: Duration,
    default_wait: Duration,
    raw: Mutex<Option<Arc<dyn RawWriter>>>,
    _marker: PhantomData<fn(&M)>,
}

impl<M: Message> TopicWriter<M> {
    /// An idle writer on `topic` with default settings.
    pub fn new(participant: Arc<dyn Participant>, topic: &str) -> Result<Self> {
        WriterBuilder::new(topic).build(participant)
    }

    /// A running writer on `topic` with default settings.
    pub fn open(participant: Arc<dyn Participant>, topic: &str) -> Result<Self> {
        WriterBuilder::new(topic).open(participant)
    }

    pub fn builder(topic: &str) -> WriterBuilder<M> {
        WriterBuilder::new(topic)
    }

    pub(crate) fn from_parts(
        participant: Arc<dyn Participant>,
        shared: WriterShared,
        poll_interval: Duration,
        default_wait: Duration,
    ) -> Result<Self> {
        if !participant.is_valid() {
            return Err(Error::InvalidConstruction(format!(
                "participant '{}' was not initialized; cannot write '{}'",
                participant.name(),
                shared.topic
            )));
        }
        Ok(Self {
            participant,
            shared: Arc::new(shared),
            poll_interval,
            default_wait,
            raw: Mutex::new(None),
            _marker: PhantomData,
        })
    }

    /// Register on the transport. No-op if already running.
    pub fn run(&self) -> Result<()> {
        let mut raw = self.raw.lock();
        if raw.is_some() {
            return Ok(());
        }
        let listener: Arc<dyn WriterListener> = self.shared.clone();
        let writer = self
            .participant
            .create_writer(&self.shared.topic, listener)?;
        log::debug!(
            "[WRITER] {} running as {} ({})",
            self.shared.topic,
            writer.guid(),
            M::TYPE_NAME
        );
        *raw = Some(writer);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.raw.lock().is_some()
    }

    /// Encode and publish `msg`.
    pub fn write(&self, msg: &M) -> Result<()> {
        let raw = self.raw.lock().clone().ok_or_else(|| {
            Error::InvalidState(format!("writer '{}' is not running", self.shared.topic))
        })?;
        let bytes = msg.encode()?;
        raw.write(&bytes)
    }

    /// Poll until at least `n` readers are matched.
    pub fn wait_for_readers(&self, n: usize, timeout: Duration) -> Result<()> {
        let n = i64::try_from(n).unwrap_or(i64::MAX);
        if self
            .shared
            .matched
            .wait_at_least(n, timeout, self.poll_interval)
        {
            Ok(())
        } else {
            Err(Error::timeout(
                format!("{} readers on '{}'", n, self.shared.topic),
                timeout,
            ))
        }
    }

    /// [`wait_for_readers`](Self::wait_for_readers) with the default
    /// timeout (3s unless configured).
    pub fn wait_for_readers_default(&self, n: usize) -> Result<()> {
        self.wait_for_readers(n, self.default_wait)
    }

    /// Run `callback` after each publication-matched notification, with the
    /// transport's status. The last registration wins.
    pub fn on_publication_matched(
        &self,
        callback: impl Fn(&PublicationMatchedStatus) + Send + Sync + 'static,
    ) {
        self.shared
            .on_matched
            .store(Arc::new(Some(MatchHook(Box::new(callback)))));
    }

    pub fn name(&self) -> &str {
        &self.shared.topic
    }

    pub fn guid(&self) -> Option<Guid> {
        self.raw.lock().as_ref().map(|w| w.guid())
    }

    pub fn participant(&self) -> &Arc<dyn Participant> {
        &self.participant
    }

    /// Current matched-reader count, as reported by the transport.
    pub fn matched_readers(&self) -> i64 {
        self.shared.matched.current()
    }
}

impl<M: Message> Drop for TopicWriter<M> {
    fn drop(&mut self) {
        self.shared.on_matched.store(Arc::new(None));
        if self.raw.get_mut().take().is_some() {
            log::debug!("[WRITER] {} closed", self.shared.topic);
        }
    }
}

impl TopicWriter<OpPayload> {
    /// Publish an operation; missing parameters are zero.
    pub fn write_op(&self, op: Op, id: u64, params: &[u64]) -> Result<()> {
        self.write(&OpPayload::new(op, id, params))
    }
}
