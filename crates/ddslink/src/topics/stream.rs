// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Numbered frames of opaque stream data.
//!
//! Wire layout: `stream_id: u64 LE | frame_number: u64 LE | data...`.

use super::{Cursor, Message};
use crate::error::Result;

/// One frame of a stream. An empty `data` marks it invalid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamPayload {
    pub stream_id: u64,
    pub frame_number: u64,
    pub data: Vec<u8>,
}

impl StreamPayload {
    pub fn new(stream_id: u64, frame_number: u64, data: Vec<u8>) -> Self {
        Self {
            stream_id,
            frame_number,
            data,
        }
    }

    /// A frame of `size` bytes, each byte the low bits of its offset.
    pub fn filled(stream_id: u64, frame_number: u64, size: usize) -> Self {
        Self::new(stream_id, frame_number, (0..size).map(|i| i as u8).collect())
    }

    pub fn invalidate(&mut self) {
        self.data.clear();
    }
}

impl Message for StreamPayload {
    const TYPE_NAME: &'static str = "StreamPayload";

    fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(16 + self.data.len());
        out.extend_from_slice(&self.stream_id.to_le_bytes());
        out.extend_from_slice(&self.frame_number.to_le_bytes());
        out.extend_from_slice(&self.data);
        Ok(out)
    }

    fn decode(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(Self::TYPE_NAME, data);
        let stream_id = cursor.u64()?;
        let frame_number = cursor.u64()?;
        Ok(Self {
            stream_id,
            frame_number,
            data: cursor.rest().to_vec(),
        })
    }

    fn is_valid(&self) -> bool {
        !self.data.is_empty()
    }

    fn preview(&self, max_length: usize) -> String {
        crate::text::shorten_json(
            &format!(
                "{{\"stream\":{},\"frame\":{},\"bytes\":{}}}",
                self.stream_id,
                self.frame_number,
                self.data.len()
            ),
            max_length,
        )
    }
}
