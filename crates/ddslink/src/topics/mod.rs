// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message types carried over topics.
//!
//! Every payload implements [`Message`]: a byte codec plus a validity check
//! and a short preview used in per-sample debug logs.

pub mod device_info;
pub mod flexible;
pub mod op;
pub mod stream;

use crate::error::{Error, Result};

pub use device_info::DeviceInfo;
pub use flexible::{DataFormat, FlexibleMsg};
pub use op::{Op, OpPayload, OP_PARAMS};
pub use stream::StreamPayload;

/// A typed topic payload.
pub trait Message: Send + Sized + 'static {
    /// Type name registered with the transport, used in logs and errors.
    const TYPE_NAME: &'static str;

    fn encode(&self) -> Result<Vec<u8>>;

    fn decode(data: &[u8]) -> Result<Self>;

    /// False for placeholder/invalidated messages.
    fn is_valid(&self) -> bool {
        true
    }

    /// One-line rendering of at most `max_length` bytes for logs.
    fn preview(&self, max_length: usize) -> String;
}

/// Little-endian cursor over a fixed-layout payload.
pub(crate) struct Cursor<'a> {
    type_name: &'static str,
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(type_name: &'static str, data: &'a [u8]) -> Self {
        Self {
            type_name,
            data,
            pos: 0,
        }
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|&end| end <= self.data.len());
        let Some(end) = end else {
            return Err(Error::codec(
                self.type_name,
                format!(
                    "buffer too short: need {} bytes at offset {}, have {}",
                    n,
                    self.pos,
                    self.data.len()
                ),
            ));
        };
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub(crate) fn u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn rest(&mut self) -> &'a [u8] {
        let bytes = &self.data[self.pos..];
        self.pos = self.data.len();
        bytes
    }

    /// Fails if bytes are left over.
    pub(crate) fn finish(self) -> Result<()> {
        if self.pos == self.data.len() {
            Ok(())
        } else {
            Err(Error::codec(
                self.type_name,
                format!("{} trailing bytes", self.data.len() - self.pos),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_reports_short_buffers() {
        let data = [1u8, 0, 0, 0, 0, 0, 0, 0, 7];
        let mut cursor = Cursor::new("Test", &data);
        assert_eq!(cursor.u64().expect("u64"), 1);
        let err = cursor.u32().expect_err("short");
        assert_eq!(
            err.to_string(),
            "codec error for 'Test': buffer too short: need 4 bytes at offset 8, have 9"
        );
    }

    #[test]
    fn cursor_rejects_trailing_bytes() {
        let data = [2u8, 3];
        let mut cursor = Cursor::new("Test", &data);
        assert_eq!(cursor.u8().expect("u8"), 2);
        assert!(cursor.finish().is_err());
    }
}
