// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Publish loop driven by reader matching.

use super::runtime::TopicWriter;
use crate::config::{LinkConfig, DEFAULT_STREAM_INTERVAL, DEFAULT_STREAM_PAYLOAD_SIZE};
use crate::error::Result;
use crate::topics::{Message, StreamPayload};
use crate::transport::Participant;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::JoinHandle;
use std::time::Duration;

type Generator<M> = Arc<dyn Fn(u64) -> M + Send + Sync>;

struct Worker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// State reachable from the publication-matched hook.
///
/// Holds the writer weakly: the writer owns the hook, the hook owns this.
struct StreamState<M: Message> {
    writer: Weak<TopicWriter<M>>,
    generator: Generator<M>,
    interval: Duration,
    frames_sent: Arc<AtomicU64>,
    worker: Mutex<Option<Worker>>,
    closed: AtomicBool,
}

impl<M: Message> StreamState<M> {
    fn start(&self) {
        let mut worker = self.worker.lock();
        if worker.is_some() || self.closed.load(Ordering::Acquire) {
            return;
        }
        let topic = match self.writer.upgrade() {
            Some(writer) => writer.name().to_string(),
            None => return,
        };

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();
        let writer = self.writer.clone();
        let generator = self.generator.clone();
        let interval = self.interval;
        let frames_sent = self.frames_sent.clone();
        let spawned = std::thread::Builder::new()
            .name("ddslink-streamer".to_string())
            .spawn(move || {
                publish_loop(writer, generator, interval, frames_sent, thread_stop)
            });

        match spawned {
            Ok(handle) => {
                log::debug!("[STREAMER] {} started", topic);
                *worker = Some(Worker { stop, handle });
            }
            Err(e) => log::error!("[STREAMER] {}: failed to spawn thread: {}", topic, e),
        }
    }

    fn stop(&self) {
        let Some(worker) = self.worker.lock().take() else {
            return;
        };
        worker.stop.store(true, Ordering::Release);
        if worker.handle.join().is_err() {
            log::error!("[STREAMER] publish thread panicked");
        }
        log::debug!(
            "[STREAMER] stopped after {} frames",
            self.frames_sent.load(Ordering::Relaxed)
        );
    }

    fn is_streaming(&self) -> bool {
        self.worker.lock().is_some()
    }
}

fn publish_loop<M: Message>(
    writer: Weak<TopicWriter<M>>,
    generator: Generator<M>,
    interval: Duration,
    frames_sent: Arc<AtomicU64>,
    stop: Arc<AtomicBool>,
) {
    let mut frame_number = 0u64;
    while !stop.load(Ordering::Acquire) {
        let Some(writer) = writer.upgrade() else {
            break;
        };
        let msg = generator(frame_number);
        frame_number += 1;
        match writer.write(&msg) {
            Ok(()) => {
                frames_sent.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => log::error!("[STREAMER] {}: write failed: {}", writer.name(), e),
        }
        drop(writer);
        std::thread::sleep(interval);
    }
}

/// Writes one generated message per interval while readers are matched.
///
/// The loop starts when the matched-reader count becomes positive and stops
/// when it returns to zero or the streamer is dropped. Frame numbers restart
/// at 0 on each start.
pub struct Streamer<M: Message> {
    writer: Arc<TopicWriter<M>>,
    state: Arc<StreamState<M>>,
}

impl<M: Message> Streamer<M> {
    /// Stream `generator(frame_number)` on `writer` every 33 ms.
    pub fn new(
        writer: TopicWriter<M>,
        generator: impl Fn(u64) -> M + Send + Sync + 'static,
    ) -> Result<Self> {
        Self::with_interval(writer, DEFAULT_STREAM_INTERVAL, generator)
    }

    /// Stream on `writer` every `interval`. Runs the writer if it is idle.
    pub fn with_interval(
        writer: TopicWriter<M>,
        interval: Duration,
        generator: impl Fn(u64) -> M + Send + Sync + 'static,
    ) -> Result<Self> {
        let writer = Arc::new(writer);
        let state = Arc::new(StreamState {
            writer: Arc::downgrade(&writer),
            generator: Arc::new(generator),
            interval,
            frames_sent: Arc::new(AtomicU64::new(0)),
            worker: Mutex::new(None),
            closed: AtomicBool::new(false),
        });

        // Hook first so no match is missed once the writer runs.
        let hook_state = state.clone();
        writer.on_publication_matched(move |status| {
            if status.current_count > 0 {
                hook_state.start();
            } else {
                hook_state.stop();
            }
        });
        writer.run()?;
        Ok(Self { writer, state })
    }

    /// Start the loop now. No-op if it is already running.
    pub fn start_streaming(&self) {
        self.state.start();
    }

    /// Stop the loop and join its thread. No-op if it is not running.
    pub fn stop_streaming(&self) {
        self.state.stop();
    }

    pub fn is_streaming(&self) -> bool {
        self.state.is_streaming()
    }

    /// Messages written successfully since creation.
    pub fn frames_sent(&self) -> u64 {
        self.state.frames_sent.load(Ordering::Relaxed)
    }

    pub fn writer(&self) -> &TopicWriter<M> {
        &self.writer
    }
}

impl Streamer<StreamPayload> {
    /// Stream `payload_size`-byte frames tagged `stream_id` on `topic`.
    pub fn stream_payloads(
        participant: Arc<dyn Participant>,
        topic: &str,
        stream_id: u64,
        payload_size: usize,
    ) -> Result<Self> {
        let writer = TopicWriter::new(participant, topic)?;
        Self::new(writer, move |frame| {
            StreamPayload::filled(stream_id, frame, payload_size)
        })
    }

    /// Frames sized, paced and waited on as `config` says.
    pub fn stream_configured_payloads(
        participant: Arc<dyn Participant>,
        topic: &str,
        stream_id: u64,
        config: &LinkConfig,
    ) -> Result<Self> {
        let writer = TopicWriter::builder(topic).config(config).build(participant)?;
        let payload_size = config.stream_payload_size;
        Self::with_interval(writer, config.stream_interval(), move |frame| {
            StreamPayload::filled(stream_id, frame, payload_size)
        })
    }

    /// [`stream_payloads`](Self::stream_payloads) with 2048-byte frames.
    pub fn stream_default_payloads(
        participant: Arc<dyn Participant>,
        topic: &str,
        stream_id: u64,
    ) -> Result<Self> {
        Self::stream_payloads(participant, topic, stream_id, DEFAULT_STREAM_PAYLOAD_SIZE)
    }
}

impl<M: Message> Drop for Streamer<M> {
    fn drop(&mut self) {
        self.state.closed.store(true, Ordering::Release);
        self.state.stop();
    }
}
