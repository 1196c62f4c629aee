// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Builder pattern for TopicReader configuration.

use super::runtime::{DataSink, ReaderShared, Sample, TopicReader};
use crate::config::{LinkConfig, DEFAULT_POLL_INTERVAL, DEFAULT_PREVIEW_LENGTH};
use crate::error::Result;
use crate::topics::Message;
use crate::transport::{Participant, ReaderQos};
use std::sync::Arc;
use std::time::Duration;

pub struct ReaderBuilder<M: Message> {
    topic: String,
    qos: ReaderQos,
    poll_interval: Duration,
    preview_length: usize,
    on_data: Option<DataSink<M>>,
}

impl<M: Message> ReaderBuilder<M> {
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            qos: ReaderQos::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            preview_length: DEFAULT_PREVIEW_LENGTH,
            on_data: None,
        }
    }

    pub fn qos(mut self, qos: ReaderQos) -> Self {
        self.qos = qos;
        self
    }

    /// Period of the `wait_for_writers` poll.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Budget of the payload preview in per-sample debug logs.
    pub fn preview_length(mut self, length: usize) -> Self {
        self.preview_length = length;
        self
    }

    /// Take poll interval, preview length and history depth from `config`.
    pub fn config(mut self, config: &LinkConfig) -> Self {
        self.poll_interval = config.poll_interval();
        self.preview_length = config.preview_length;
        self.qos.history_depth = config.history_depth;
        self
    }

    /// Install the sample callback before the reader starts, so no early
    /// sample lands in the queue.
    pub fn on_data(mut self, callback: impl Fn(Sample<M>) + Send + Sync + 'static) -> Self {
        self.on_data = Some(DataSink(Box::new(callback)));
        self
    }

    /// An idle reader.
    pub fn build(self, participant: Arc<dyn Participant>) -> Result<TopicReader<M>> {
        let shared = ReaderShared::new(&self.topic, self.preview_length);
        if let Some(sink) = self.on_data {
            shared.on_data.store(Arc::new(Some(sink)));
        }
        TopicReader::from_parts(participant, shared, self.qos, self.poll_interval)
    }

    /// A running reader.
    pub fn open(self, participant: Arc<dyn Participant>) -> Result<TopicReader<M>> {
        let reader = self.build(participant)?;
        reader.run_default()?;
        Ok(reader)
    }
}
