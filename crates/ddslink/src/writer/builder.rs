// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Builder pattern for TopicWriter configuration.

use super::runtime::{TopicWriter, WriterShared};
use crate::config::{LinkConfig, DEFAULT_POLL_INTERVAL, DEFAULT_WRITER_WAIT};
use crate::error::Result;
use crate::topics::Message;
use crate::transport::Participant;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

pub struct WriterBuilder<M: Message> {
    topic: String,
    poll_interval: Duration,
    default_wait: Duration,
    _marker: PhantomData<fn(&M)>,
}

impl<M: Message> WriterBuilder<M> {
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            default_wait: DEFAULT_WRITER_WAIT,
            _marker: PhantomData,
        }
    }

    /// Period of the `wait_for_readers` poll.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Timeout used by `wait_for_readers_default`.
    pub fn default_wait(mut self, timeout: Duration) -> Self {
        self.default_wait = timeout;
        self
    }

    /// Take poll interval and default wait from `config`.
    pub fn config(mut self, config: &LinkConfig) -> Self {
        self.poll_interval = config.poll_interval();
        self.default_wait = config.writer_wait();
        self
    }

    /// An idle writer.
    pub fn build(self, participant: Arc<dyn Participant>) -> Result<TopicWriter<M>> {
        TopicWriter::from_parts(
            participant,
            WriterShared::new(&self.topic),
            self.poll_interval,
            self.default_wait,
        )
    }

    /// A running writer.
    pub fn open(self, participant: Arc<dyn Participant>) -> Result<TopicWriter<M>> {
        let writer = self.build(participant)?;
        writer.run()?;
        Ok(writer)
    }
}
