// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-stream delivery statistics and host/device clock alignment.

use crate::core::time::{format_ns, now_ns};
use crate::reader::Sample;
use crate::topics::StreamPayload;
use std::time::Duration;

/// Counters accumulated over the frames of one stream.
///
/// Transit times are measured in the receiver's clock: the source timestamp
/// is shifted by a time offset (see [`ClockSync`]) before it is subtracted
/// from the reception timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub count: u64,
    /// Frames whose number did not follow the previous one.
    pub drops: u64,
    pub last_number: u64,
    pub total_transit_nsec: i64,
    pub min_transit_nsec: i64,
    pub max_transit_nsec: i64,
    /// Local arrival time of the first and latest frame (ns since epoch).
    pub first: i64,
    pub last: i64,
}

impl StreamStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one frame that arrived at `now`.
    pub fn process(
        &mut self,
        frame_number: u64,
        source_ns: i64,
        reception_ns: i64,
        time_offset: i64,
        now: i64,
    ) {
        if self.count > 0 && self.last_number.wrapping_add(1) != frame_number {
            self.drops += 1;
        }

        let transit = reception_ns.saturating_sub(source_ns.saturating_add(time_offset));
        self.total_transit_nsec = self.total_transit_nsec.saturating_add(transit);
        if self.count == 0 || transit > self.max_transit_nsec {
            self.max_transit_nsec = transit;
        }
        if self.count == 0 || transit < self.min_transit_nsec {
            self.min_transit_nsec = transit;
        }

        self.last = now;
        if self.count == 0 {
            self.first = now;
        }
        self.count += 1;
        self.last_number = frame_number;
    }

    /// [`process`](Self::process) a received stream sample, arriving now.
    pub fn record(&mut self, sample: &Sample<StreamPayload>, time_offset: i64) {
        self.process(
            sample.msg.frame_number,
            sample.info.source_timestamp,
            sample.info.reception_timestamp,
            time_offset,
            now_ns(),
        );
    }

    /// Mean transit time, 0 before the first frame.
    pub fn avg_transit_nsec(&self) -> i64 {
        match i64::try_from(self.count) {
            Ok(count) if count > 0 => self.total_transit_nsec / count,
            _ => 0,
        }
    }

    /// Time between the first and latest arrival.
    pub fn span(&self) -> Duration {
        crate::core::time::elapsed_between(self.first, self.last)
    }

    /// Arrival rate over [`span`](Self::span), 0 with fewer than two frames.
    pub fn frames_per_second(&self) -> f64 {
        let span = self.span().as_secs_f64();
        if self.count < 2 || span <= 0.0 {
            return 0.0;
        }
        (self.count - 1) as f64 / span
    }

    pub fn log_summary(&self, name: &str) {
        log::info!("stream {} stats:", name);
        log::info!("  count: {}", self.count);
        log::info!("  drops: {}", self.drops);
        log::info!("  last_number: {}", self.last_number);
        if self.count > 0 {
            log::info!(
                "  transit: avg {} min {} max {}",
                format_ns(self.avg_transit_nsec()),
                format_ns(self.min_transit_nsec),
                format_ns(self.max_transit_nsec)
            );
            log::info!("  rate: {:.1} fps", self.frames_per_second());
        }
    }
}

/// Estimates the offset between the host clock and a device clock from
/// request/response exchanges.
///
/// Each exchange carries four timestamps: `t0` host send, `t1` device
/// receive, `t2` device send, `t3` host receive. The first exchange is
/// discarded as warm-up.
#[derive(Debug, Clone, Default)]
pub struct ClockSync {
    exchanges: u32,
    sum: i64,
}

impl ClockSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one exchange and return its offset (device minus host).
    pub fn add_round_trip(&mut self, t0: i64, t1: i64, t2: i64, t3: i64) -> i64 {
        let offset = ((t1 - t0) + (t2 - t3)) / 2;
        log::debug!(
            "[SYNC] time-offset= {} round-trip= {}",
            format_ns(offset),
            format_ns(t3 - t0)
        );
        if self.exchanges > 0 {
            self.sum += offset;
        }
        self.exchanges += 1;
        offset
    }

    pub fn exchanges(&self) -> u32 {
        self.exchanges
    }

    /// Value to pass as `time_offset` to [`StreamStats::process`] for
    /// frames stamped by the device: the negated mean of the kept offsets,
    /// 0 until two exchanges were recorded.
    pub fn offset(&self) -> i64 {
        if self.exchanges < 2 {
            return 0;
        }
        -(self.sum / i64::from(self.exchanges - 1))
    }
}
