// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;
use crate::core::Guid;
use crate::error::Error;
use crate::reader::TopicReader;
use crate::topics::{FlexibleMsg, Op, OpPayload, StreamPayload};
use crate::transport::{
    ListenerId, LoopbackBus, Participant, ParticipantListener, PublicationMatchedStatus,
    RawReader, RawWriter, ReaderListener, ReaderQos, WriterListener,
};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn eventually(what: &str, cond: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        std::thread::sleep(Duration::from_millis(2));
    }
}

/// Participant whose writers reject every sample.
struct Rejecting {
    attempts: Arc<AtomicUsize>,
}

struct RejectingWriter {
    attempts: Arc<AtomicUsize>,
}

impl RawWriter for RejectingWriter {
    fn topic_name(&self) -> &str {
        "rejected"
    }

    fn guid(&self) -> Guid {
        Guid::zero()
    }

    fn write(&self, _data: &[u8]) -> crate::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(Error::Transport("link down".to_string()))
    }
}

impl Participant for Rejecting {
    fn name(&self) -> &str {
        "rejecting"
    }

    fn guid(&self) -> Guid {
        Guid::zero()
    }

    fn is_valid(&self) -> bool {
        true
    }

    fn create_reader(
        &self,
        topic: &str,
        _qos: &ReaderQos,
        _listener: Arc<dyn ReaderListener>,
    ) -> crate::Result<Arc<dyn RawReader>> {
        Err(Error::Transport(format!("no readers on '{}'", topic)))
    }

    fn create_writer(
        &self,
        _topic: &str,
        _listener: Arc<dyn WriterListener>,
    ) -> crate::Result<Arc<dyn RawWriter>> {
        Ok(Arc::new(RejectingWriter {
            attempts: self.attempts.clone(),
        }))
    }

    fn add_listener(&self, _listener: Arc<dyn ParticipantListener>) -> ListenerId {
        0
    }

    fn remove_listener(&self, _id: ListenerId) {}
}

#[test]
fn uninitialized_participant_is_rejected() {
    let bus = LoopbackBus::new();
    let result = TopicWriter::<OpPayload>::new(bus.uninitialized_participant("x"), "ops");
    assert!(matches!(result, Err(Error::InvalidConstruction(_))));
}

#[test]
fn write_requires_run() {
    let bus = LoopbackBus::new();
    let writer = TopicWriter::<FlexibleMsg>::new(bus.participant("p"), "t").expect("writer");
    let err = writer
        .write(&FlexibleMsg::from_json(&json!({})))
        .expect_err("idle writer");
    assert!(matches!(err, Error::InvalidState(_)));
    assert!(writer.guid().is_none());

    writer.run().expect("run");
    writer.run().expect("run again");
    assert_eq!(bus.writer_count("t"), 1);
    writer
        .write(&FlexibleMsg::from_json(&json!({})))
        .expect("running writer");
}

#[test]
fn ops_reach_a_reader() {
    let bus = LoopbackBus::new();
    let participant = bus.participant("p");
    let reader = TopicReader::<OpPayload>::open(participant.clone(), "ops").expect("reader");
    let writer = TopicWriter::<OpPayload>::builder("ops")
        .poll_interval(Duration::from_millis(5))
        .open(participant)
        .expect("writer");

    writer
        .wait_for_readers(1, Duration::from_secs(5))
        .expect("reader matched");
    writer.write_op(Op::Sync, 7, &[1, 2, 3]).expect("write");
    writer.write_op(Op::Exit, 8, &[]).expect("write");

    let first = reader.read_timeout(Duration::from_secs(5)).expect("first");
    assert_eq!(first.msg.op, Op::Sync);
    assert_eq!(first.msg.id, 7);
    assert_eq!(first.msg.data, [1, 2, 3, 0, 0]);
    assert_eq!(Some(first.info.publication_handle), writer.guid());

    let second = reader.read_timeout(Duration::from_secs(5)).expect("second");
    assert_eq!(second.msg.op, Op::Exit);
    assert_eq!(second.msg.data, [0; 5]);
}

#[test]
fn wait_for_readers_times_out_and_counts() {
    let bus = LoopbackBus::new();
    let participant = bus.participant("p");
    let writer = TopicWriter::<FlexibleMsg>::builder("t")
        .poll_interval(Duration::from_millis(5))
        .default_wait(Duration::from_millis(30))
        .open(participant.clone())
        .expect("writer");

    let err = writer.wait_for_readers_default(1).expect_err("no reader");
    assert!(err.is_timeout());
    assert!(err.to_string().contains("1 readers on 't'"), "{}", err);

    let reader = TopicReader::<FlexibleMsg>::open(participant, "t").expect("reader");
    writer
        .wait_for_readers(1, Duration::from_secs(5))
        .expect("matched");
    assert_eq!(writer.matched_readers(), 1);

    drop(reader);
    eventually("unmatch", || writer.matched_readers() == 0);
}

#[test]
fn publication_hook_sees_transport_status() {
    let bus = LoopbackBus::new();
    let participant = bus.participant("p");
    let writer = TopicWriter::<FlexibleMsg>::new(participant.clone(), "t").expect("writer");
    let seen: Arc<Mutex<Vec<PublicationMatchedStatus>>> = Arc::default();
    {
        let seen = seen.clone();
        writer.on_publication_matched(move |status| seen.lock().push(status.clone()));
    }
    writer.run().expect("run");

    let reader = TopicReader::<FlexibleMsg>::open(participant, "t").expect("reader");
    eventually("match", || seen.lock().len() == 1);
    drop(reader);
    eventually("unmatch", || seen.lock().len() == 2);

    let seen = seen.lock();
    assert_eq!(seen[0].current_count, 1);
    assert_eq!(seen[0].current_count_change, 1);
    assert_eq!(seen[1].current_count, 0);
    assert_eq!(seen[1].current_count_change, -1);
}

#[test]
fn streamer_follows_reader_matching() {
    let bus = LoopbackBus::new();
    let participant = bus.participant("camera");
    let writer = TopicWriter::<StreamPayload>::new(participant.clone(), "frames").expect("writer");
    let streamer = Streamer::with_interval(writer, Duration::from_millis(2), |frame| {
        StreamPayload::filled(9, frame, 16)
    })
    .expect("streamer");
    assert!(!streamer.is_streaming());
    assert!(streamer.writer().is_running());

    let reader = TopicReader::<StreamPayload>::open(participant, "frames").expect("reader");
    for expected in 0..5 {
        let sample = reader.read_timeout(Duration::from_secs(5)).expect("frame");
        assert_eq!(sample.msg.stream_id, 9);
        assert_eq!(sample.msg.frame_number, expected);
        assert_eq!(sample.msg.data.len(), 16);
    }
    assert!(streamer.is_streaming());

    drop(reader);
    eventually("stop", || !streamer.is_streaming());
    let sent = streamer.frames_sent();
    assert!(sent >= 5);
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(streamer.frames_sent(), sent);
}

#[test]
fn stream_payloads_uses_requested_size() {
    let bus = LoopbackBus::new();
    let participant = bus.participant("camera");
    let reader = TopicReader::<StreamPayload>::open(participant.clone(), "depth").expect("reader");
    let streamer =
        Streamer::stream_payloads(participant, "depth", 4, 64).expect("streamer");

    let sample = reader.read_timeout(Duration::from_secs(5)).expect("frame");
    assert_eq!(sample.msg.stream_id, 4);
    assert_eq!(sample.msg.data.len(), 64);
    assert_eq!(sample.msg.data[63], 63);
    drop(streamer);
}

#[test]
fn streamer_keeps_going_after_write_failures() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let participant: Arc<dyn Participant> = Arc::new(Rejecting {
        attempts: attempts.clone(),
    });
    let writer = TopicWriter::<StreamPayload>::new(participant, "frames").expect("writer");
    let streamer = Streamer::with_interval(writer, Duration::from_millis(1), |frame| {
        StreamPayload::filled(1, frame, 4)
    })
    .expect("streamer");

    streamer.start_streaming();
    streamer.start_streaming();
    eventually("retries", || attempts.load(Ordering::SeqCst) >= 3);
    assert!(streamer.is_streaming());
    assert_eq!(streamer.frames_sent(), 0);

    streamer.stop_streaming();
    streamer.stop_streaming();
    assert!(!streamer.is_streaming());
    let after_stop = attempts.load(Ordering::SeqCst);
    std::thread::sleep(Duration::from_millis(10));
    assert_eq!(attempts.load(Ordering::SeqCst), after_stop);
}
