// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Control operations exchanged between host and device.
//!
//! Wire layout (little-endian, 56 bytes):
//!
//! ```text
//! 0       8       16                                      56
//! +-------+-------+---------------------------------------+
//! |  op   |  id   |  data[0] .. data[4]                   |
//! +-------+-------+---------------------------------------+
//! ```

use super::{Cursor, Message};
use crate::error::{Error, Result};
use crate::text::shorten_json;
use std::fmt;

/// Number of `u64` parameters carried by an [`OpPayload`].
pub const OP_PARAMS: usize = 5;

const WIRE_SIZE: usize = 8 * (2 + OP_PARAMS);

/// Operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u64)]
pub enum Op {
    /// Placeholder; an `OpPayload` carrying it is invalid.
    #[default]
    Noop = 0,
    Error = 1,
    /// Clock synchronization round trip.
    Sync = 2,
    Exit = 3,
}

impl Op {
    pub fn from_raw(raw: u64) -> Option<Self> {
        match raw {
            0 => Some(Op::Noop),
            1 => Some(Op::Error),
            2 => Some(Op::Sync),
            3 => Some(Op::Exit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Noop => "NOOP",
            Op::Error => "ERROR",
            Op::Sync => "SYNC",
            Op::Exit => "EXIT",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `op` + caller-chosen `id` + five parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpPayload {
    pub op: Op,
    pub id: u64,
    pub data: [u64; OP_PARAMS],
}

impl OpPayload {
    /// Build a payload; missing parameters are zero, extra ones ignored.
    pub fn new(op: Op, id: u64, params: &[u64]) -> Self {
        let mut data = [0u64; OP_PARAMS];
        for (slot, value) in data.iter_mut().zip(params) {
            *slot = *value;
        }
        Self { op, id, data }
    }

    /// Reset to the invalid placeholder.
    pub fn invalidate(&mut self) {
        self.op = Op::Noop;
    }
}

impl Message for OpPayload {
    const TYPE_NAME: &'static str = "OpPayload";

    fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(WIRE_SIZE);
        out.extend_from_slice(&(self.op as u64).to_le_bytes());
        out.extend_from_slice(&self.id.to_le_bytes());
        for value in &self.data {
            out.extend_from_slice(&value.to_le_bytes());
        }
        Ok(out)
    }

    fn decode(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(Self::TYPE_NAME, data);
        let raw_op = cursor.u64()?;
        let op = Op::from_raw(raw_op)
            .ok_or_else(|| Error::codec(Self::TYPE_NAME, format!("unknown op {}", raw_op)))?;
        let id = cursor.u64()?;
        let mut params = [0u64; OP_PARAMS];
        for slot in params.iter_mut() {
            *slot = cursor.u64()?;
        }
        cursor.finish()?;
        Ok(Self {
            op,
            id,
            data: params,
        })
    }

    fn is_valid(&self) -> bool {
        self.op != Op::Noop
    }

    fn preview(&self, max_length: usize) -> String {
        let params: Vec<String> = self.data.iter().map(u64::to_string).collect();
        shorten_json(
            &format!(
                "{{\"op\":\"{}\",\"id\":{},\"data\":[{}]}}",
                self.op,
                self.id,
                params.join(",")
            ),
            max_length,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_invalid() {
        let mut op = OpPayload::default();
        assert!(!op.is_valid());
        op.op = Op::Sync;
        assert!(op.is_valid());
        op.invalidate();
        assert!(!op.is_valid());
    }

    #[test]
    fn params_are_padded_and_clipped() {
        let op = OpPayload::new(Op::Sync, 4, &[10, 20]);
        assert_eq!(op.data, [10, 20, 0, 0, 0]);
        let op = OpPayload::new(Op::Exit, 0, &[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(op.data, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn wire_layout() {
        let op = OpPayload::new(Op::Sync, 7, &[1, 2, 3, 4, 5]);
        let bytes = op.encode().expect("encode");
        assert_eq!(bytes.len(), WIRE_SIZE);
        assert_eq!(&bytes[0..8], &2u64.to_le_bytes());
        assert_eq!(&bytes[8..16], &7u64.to_le_bytes());
        assert_eq!(OpPayload::decode(&bytes).expect("decode"), op);
    }

    #[test]
    fn unknown_op_and_short_buffers_fail() {
        let mut bytes = OpPayload::new(Op::Sync, 1, &[]).encode().expect("encode");
        bytes[0] = 9;
        assert!(matches!(OpPayload::decode(&bytes), Err(Error::Codec { .. })));
        assert!(OpPayload::decode(&bytes[..20]).is_err());
    }

    #[test]
    fn preview_is_json_like() {
        let op = OpPayload::new(Op::Sync, 3, &[1]);
        assert_eq!(op.preview(96), r#"{"op":"SYNC","id":3,"data":[1,0,0,0,0]}"#);
        assert_eq!(op.preview(36), r#"{"op":"SYNC","id":3,"data":[ ... ]}"#);
        assert_eq!(op.preview(30), r#"{"op":"SYNC","id":3,"dat ... }"#);
    }
}
