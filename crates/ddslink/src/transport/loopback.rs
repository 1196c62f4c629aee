// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process transport.
//!
//! Every participant created from the same [`LoopbackBus`] sees every
//! endpoint on it. Readers and writers match by topic name; there is no
//! QoS negotiation, no network and no reliability protocol.
//!
//! # Architecture
//!
//! ```text
//!   write() / create_*() / drop       dispatcher thread
//!   ───────────────────────────       ─────────────────
//!   update DashMap tables  ──Event──▶ crossbeam channel ──▶ listener calls
//! ```
//!
//! Listener `Arc`s are cloned into the event before it is sent, so user
//! code never runs under a table lock. Data-available events are coalesced:
//! a reader whose pending queue was already drained by an earlier
//! notification is not notified again.

use crate::core::singleton::SharedSingleton;
use crate::core::time::now_ns;
use crate::core::Guid;
use crate::error::{Error, Result};
use crate::transport::{
    ListenerId, Participant, ParticipantListener, PublicationMatchedStatus, RawReader,
    RawSample, RawWriter, ReaderListener, ReaderQos, SampleInfo, SubscriptionMatchedStatus,
    WriterListener,
};
use crossbeam::channel::{self, Sender};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

const ENTITY_KIND_WRITER: u8 = 0x03;
const ENTITY_KIND_READER: u8 = 0x04;

/// Running current/total match counts of one endpoint.
#[derive(Debug, Default, Clone, Copy)]
struct MatchCounts {
    current: u32,
    total: u32,
}

impl MatchCounts {
    fn apply(&mut self, delta: i32) -> (i32, i32) {
        if delta > 0 {
            self.current += 1;
            self.total += 1;
            (1, 1)
        } else {
            self.current = self.current.saturating_sub(1);
            (0, -1)
        }
    }

    fn subscription(&mut self, delta: i32, peer: Guid) -> SubscriptionMatchedStatus {
        let (total_change, current_change) = self.apply(delta);
        SubscriptionMatchedStatus {
            total_count: self.total,
            total_count_change: total_change,
            current_count: self.current,
            current_count_change: current_change,
            last_publication_handle: Some(peer),
        }
    }

    fn publication(&mut self, delta: i32, peer: Guid) -> PublicationMatchedStatus {
        let (total_change, current_change) = self.apply(delta);
        PublicationMatchedStatus {
            total_count: self.total,
            total_count_change: total_change,
            current_count: self.current,
            current_count_change: current_change,
            last_subscription_handle: Some(peer),
        }
    }
}

struct ReaderSlot {
    topic: String,
    listener: Arc<dyn ReaderListener>,
    handle: Weak<LoopbackReader>,
    matched: MatchCounts,
}

struct WriterSlot {
    topic: String,
    listener: Arc<dyn WriterListener>,
    matched: MatchCounts,
}

struct ParticipantSlot {
    name: String,
    listeners: Vec<(ListenerId, Arc<dyn ParticipantListener>)>,
}

/// Notification queued for the dispatcher thread.
enum Event {
    DataAvailable {
        reader: Weak<LoopbackReader>,
        listener: Arc<dyn ReaderListener>,
    },
    SubscriptionMatched {
        listener: Arc<dyn ReaderListener>,
        status: SubscriptionMatchedStatus,
    },
    PublicationMatched {
        listener: Arc<dyn WriterListener>,
        status: PublicationMatchedStatus,
    },
    WriterRemoved {
        listeners: Vec<Arc<dyn ParticipantListener>>,
        writer: Guid,
        topic: String,
    },
}

impl Event {
    fn deliver(self) {
        match self {
            Event::DataAvailable { reader, listener } => {
                let Some(reader) = reader.upgrade() else {
                    return;
                };
                if reader.pending_len() == 0 {
                    // Drained by an earlier notification.
                    return;
                }
                listener.on_data_available(reader.as_ref());
            }
            Event::SubscriptionMatched { listener, status } => {
                listener.on_subscription_matched(status);
            }
            Event::PublicationMatched { listener, status } => {
                listener.on_publication_matched(status);
            }
            Event::WriterRemoved {
                listeners,
                writer,
                topic,
            } => {
                for listener in listeners {
                    listener.on_writer_removed(writer, &topic);
                }
            }
        }
    }
}

fn spawn_dispatcher() -> Option<Sender<Event>> {
    let (tx, rx) = channel::unbounded::<Event>();
    let spawned = std::thread::Builder::new()
        .name("ddslink-loopback".to_string())
        .spawn(move || {
            log::debug!("[LOOPBACK] Dispatcher started");
            for event in rx.iter() {
                event.deliver();
            }
            log::debug!("[LOOPBACK] Dispatcher stopped");
        });
    match spawned {
        Ok(_) => Some(tx),
        Err(e) => {
            log::error!(
                "[LOOPBACK] Failed to spawn dispatcher ({}), delivering inline",
                e
            );
            None
        }
    }
}

/// In-process publish/subscribe domain.
///
/// # Example
/// ```
/// use ddslink::transport::{LoopbackBus, Participant};
///
/// let bus = LoopbackBus::new();
/// let camera = bus.participant("camera");
/// let host = bus.participant("host");
/// assert!(camera.is_valid());
/// assert_ne!(camera.guid(), host.guid());
/// ```
pub struct LoopbackBus {
    participants: DashMap<Guid, ParticipantSlot>,
    readers: DashMap<Guid, ReaderSlot>,
    writers: DashMap<Guid, WriterSlot>,
    /// Serializes matching so concurrent create/drop never miss a pair.
    topology: Mutex<()>,
    next_entity: AtomicU32,
    next_listener: AtomicU64,
    /// `None` when the dispatcher thread could not be spawned.
    events: Option<Sender<Event>>,
}

impl LoopbackBus {
    /// A new, private bus.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build())
    }

    /// The process-wide bus, created on first use and released with its last
    /// holder.
    pub fn shared() -> Arc<Self> {
        SharedSingleton::<LoopbackBus>::instance(Self::build)
    }

    fn build() -> Self {
        Self {
            participants: DashMap::new(),
            readers: DashMap::new(),
            writers: DashMap::new(),
            topology: Mutex::new(()),
            next_entity: AtomicU32::new(1),
            next_listener: AtomicU64::new(1),
            events: spawn_dispatcher(),
        }
    }

    /// Join the bus as a new participant.
    pub fn participant(self: &Arc<Self>, name: &str) -> Arc<dyn Participant> {
        let guid = Guid::new_participant();
        self.participants.insert(
            guid,
            ParticipantSlot {
                name: name.to_string(),
                listeners: Vec::new(),
            },
        );
        log::debug!("[LOOPBACK] Participant '{}' joined as {}", name, guid);
        Arc::new(LoopbackParticipant {
            bus: self.clone(),
            guid,
            name: name.to_string(),
            joined: true,
        })
    }

    /// A participant handle that never joined the bus.
    ///
    /// `is_valid()` is false and endpoint creation fails, like a transport
    /// participant whose domain setup failed.
    pub fn uninitialized_participant(self: &Arc<Self>, name: &str) -> Arc<dyn Participant> {
        Arc::new(LoopbackParticipant {
            bus: self.clone(),
            guid: Guid::zero(),
            name: name.to_string(),
            joined: false,
        })
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Live readers on `topic`.
    pub fn reader_count(&self, topic: &str) -> usize {
        self.readers.iter().filter(|r| r.topic == topic).count()
    }

    /// Live writers on `topic`.
    pub fn writer_count(&self, topic: &str) -> usize {
        self.writers.iter().filter(|w| w.topic == topic).count()
    }

    /// Participant listeners registered across the bus.
    pub fn listener_count(&self) -> usize {
        self.participants.iter().map(|p| p.listeners.len()).sum()
    }

    fn post(&self, event: Event) {
        match &self.events {
            Some(tx) => {
                if let Err(channel::SendError(event)) = tx.send(event) {
                    log::error!("[LOOPBACK] Dispatcher gone, delivering inline");
                    event.deliver();
                }
            }
            None => event.deliver(),
        }
    }

    fn next_entity_key(&self) -> u32 {
        self.next_entity.fetch_add(1, Ordering::Relaxed)
    }

    fn writers_on(&self, topic: &str) -> Vec<Guid> {
        self.writers
            .iter()
            .filter(|w| w.topic == topic)
            .map(|w| *w.key())
            .collect()
    }

    fn readers_on(&self, topic: &str) -> Vec<Guid> {
        self.readers
            .iter()
            .filter(|r| r.topic == topic)
            .map(|r| *r.key())
            .collect()
    }

    /// Adjust one reader/writer pair and queue both notifications.
    fn match_pair(&self, reader: Guid, writer: Guid, delta: i32) {
        if let Some(mut slot) = self.readers.get_mut(&reader) {
            let status = slot.matched.subscription(delta, writer);
            let listener = slot.listener.clone();
            drop(slot);
            self.post(Event::SubscriptionMatched { listener, status });
        }
        if let Some(mut slot) = self.writers.get_mut(&writer) {
            let status = slot.matched.publication(delta, reader);
            let listener = slot.listener.clone();
            drop(slot);
            self.post(Event::PublicationMatched { listener, status });
        }
    }

    fn add_reader(
        &self,
        guid: Guid,
        topic: &str,
        handle: Weak<LoopbackReader>,
        listener: Arc<dyn ReaderListener>,
    ) {
        let _topology = self.topology.lock();
        self.readers.insert(
            guid,
            ReaderSlot {
                topic: topic.to_string(),
                listener,
                handle,
                matched: MatchCounts::default(),
            },
        );
        for writer in self.writers_on(topic) {
            self.match_pair(guid, writer, 1);
        }
    }

    fn add_writer(&self, guid: Guid, topic: &str, listener: Arc<dyn WriterListener>) {
        let _topology = self.topology.lock();
        self.writers.insert(
            guid,
            WriterSlot {
                topic: topic.to_string(),
                listener,
                matched: MatchCounts::default(),
            },
        );
        for reader in self.readers_on(topic) {
            self.match_pair(reader, guid, 1);
        }
    }

    fn remove_reader(&self, guid: Guid) {
        let _topology = self.topology.lock();
        let Some((_, slot)) = self.readers.remove(&guid) else {
            return;
        };
        for writer in self.writers_on(&slot.topic) {
            self.match_pair(guid, writer, -1);
        }
        log::debug!("[LOOPBACK] Reader {} left '{}'", guid, slot.topic);
    }

    fn remove_writer(&self, guid: Guid) {
        let _topology = self.topology.lock();
        let Some((_, slot)) = self.writers.remove(&guid) else {
            return;
        };
        for reader in self.readers_on(&slot.topic) {
            self.match_pair(reader, guid, -1);
        }
        let listeners: Vec<_> = self
            .participants
            .iter()
            .flat_map(|p| {
                p.listeners
                    .iter()
                    .map(|(_, l)| l.clone())
                    .collect::<Vec<_>>()
            })
            .collect();
        log::debug!(
            "[LOOPBACK] Writer {} left '{}', notifying {} listeners",
            guid,
            slot.topic,
            listeners.len()
        );
        self.post(Event::WriterRemoved {
            listeners,
            writer: guid,
            topic: slot.topic,
        });
    }

    /// Copy `data` into every reader on `topic` and queue notifications.
    fn publish(&self, writer: Guid, topic: &str, data: &[u8]) -> usize {
        let source_timestamp = now_ns();
        let targets: Vec<(Arc<LoopbackReader>, Arc<dyn ReaderListener>)> = self
            .readers
            .iter()
            .filter(|r| r.topic == topic)
            .filter_map(|r| r.handle.upgrade().map(|h| (h, r.listener.clone())))
            .collect();

        let delivered = targets.len();
        for (reader, listener) in targets {
            reader.enqueue(RawSample {
                data: data.to_vec(),
                info: SampleInfo {
                    source_timestamp,
                    reception_timestamp: now_ns(),
                    publication_handle: writer,
                    valid_data: true,
                },
            });
            self.post(Event::DataAvailable {
                reader: Arc::downgrade(&reader),
                listener,
            });
        }
        delivered
    }
}

/// Participant handle on a [`LoopbackBus`].
pub struct LoopbackParticipant {
    bus: Arc<LoopbackBus>,
    guid: Guid,
    name: String,
    joined: bool,
}

impl LoopbackParticipant {
    fn ensure_joined(&self, what: &str) -> Result<()> {
        if self.joined {
            Ok(())
        } else {
            Err(Error::Transport(format!(
                "participant '{}' is not initialized; cannot create {}",
                self.name, what
            )))
        }
    }
}

impl Participant for LoopbackParticipant {
    fn name(&self) -> &str {
        &self.name
    }

    fn guid(&self) -> Guid {
        self.guid
    }

    fn is_valid(&self) -> bool {
        self.joined
    }

    fn create_reader(
        &self,
        topic: &str,
        qos: &ReaderQos,
        listener: Arc<dyn ReaderListener>,
    ) -> Result<Arc<dyn RawReader>> {
        self.ensure_joined("reader")?;
        let guid = self.guid.entity(self.bus.next_entity_key(), ENTITY_KIND_READER);
        let reader = Arc::new(LoopbackReader {
            bus: self.bus.clone(),
            guid,
            topic: topic.to_string(),
            depth: qos.history_depth,
            pending: Mutex::new(VecDeque::new()),
        });
        self.bus
            .add_reader(guid, topic, Arc::downgrade(&reader), listener);
        log::debug!(
            "[LOOPBACK] Reader {} on '{}' ({:?})",
            guid,
            topic,
            qos.reliability
        );
        Ok(reader)
    }

    fn create_writer(
        &self,
        topic: &str,
        listener: Arc<dyn WriterListener>,
    ) -> Result<Arc<dyn RawWriter>> {
        self.ensure_joined("writer")?;
        let guid = self.guid.entity(self.bus.next_entity_key(), ENTITY_KIND_WRITER);
        let writer = Arc::new(LoopbackWriter {
            bus: self.bus.clone(),
            guid,
            topic: topic.to_string(),
        });
        self.bus.add_writer(guid, topic, listener);
        log::debug!("[LOOPBACK] Writer {} on '{}'", guid, topic);
        Ok(writer)
    }

    fn add_listener(&self, listener: Arc<dyn ParticipantListener>) -> ListenerId {
        let id = self.bus.next_listener.fetch_add(1, Ordering::Relaxed);
        if let Some(mut slot) = self.bus.participants.get_mut(&self.guid) {
            slot.listeners.push((id, listener));
        }
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        if let Some(mut slot) = self.bus.participants.get_mut(&self.guid) {
            slot.listeners.retain(|(lid, _)| *lid != id);
        }
    }
}

impl Drop for LoopbackParticipant {
    fn drop(&mut self) {
        if self.joined {
            if let Some((_, slot)) = self.bus.participants.remove(&self.guid) {
                log::debug!("[LOOPBACK] Participant '{}' left", slot.name);
            }
        }
    }
}

/// Reader endpoint; unregisters (and unmatches) on drop.
pub struct LoopbackReader {
    bus: Arc<LoopbackBus>,
    guid: Guid,
    topic: String,
    depth: Option<usize>,
    pending: Mutex<VecDeque<RawSample>>,
}

impl LoopbackReader {
    fn enqueue(&self, sample: RawSample) {
        let mut pending = self.pending.lock();
        pending.push_back(sample);
        if let Some(depth) = self.depth {
            while pending.len() > depth.max(1) {
                pending.pop_front();
                log::debug!("[LOOPBACK] Reader {} history full, dropped oldest", self.guid);
            }
        }
    }

    fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }
}

impl RawReader for LoopbackReader {
    fn topic_name(&self) -> &str {
        &self.topic
    }

    fn guid(&self) -> Guid {
        self.guid
    }

    fn take_next_sample(&self) -> Result<Option<RawSample>> {
        Ok(self.pending.lock().pop_front())
    }
}

impl Drop for LoopbackReader {
    fn drop(&mut self) {
        self.bus.remove_reader(self.guid);
    }
}

/// Writer endpoint; unregisters, unmatches and announces its removal on drop.
pub struct LoopbackWriter {
    bus: Arc<LoopbackBus>,
    guid: Guid,
    topic: String,
}

impl RawWriter for LoopbackWriter {
    fn topic_name(&self) -> &str {
        &self.topic
    }

    fn guid(&self) -> Guid {
        self.guid
    }

    fn write(&self, data: &[u8]) -> Result<()> {
        let delivered = self.bus.publish(self.guid, &self.topic, data);
        log::trace!(
            "[LOOPBACK] {} bytes on '{}' to {} readers",
            data.len(),
            self.topic,
            delivered
        );
        Ok(())
    }
}

impl Drop for LoopbackWriter {
    fn drop(&mut self) {
        self.bus.remove_writer(self.guid);
    }
}
