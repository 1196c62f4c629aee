// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Endpoint identity.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// 16-byte endpoint identifier: 12-byte participant prefix + 4-byte entity id.
///
/// Readers, writers and participants of the same participant share the
/// prefix. Devices discovered by the watcher are keyed by the GUID of the
/// writer that announced them.
///
/// # Display Format
/// Hex with dots: "01.0f.ac.10.00.00.00.00.00.00.00.01.00.00.01.c1"
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
pub struct Guid {
    pub prefix: [u8; 12],
    pub entity_id: [u8; 4],
}

/// Entity id used by participants themselves.
pub const ENTITY_ID_PARTICIPANT: [u8; 4] = [0x00, 0x00, 0x01, 0xC1];

impl Guid {
    pub fn new(prefix: [u8; 12], entity_id: [u8; 4]) -> Self {
        Self { prefix, entity_id }
    }

    /// Create GUID from raw bytes (16 bytes total)
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let mut prefix = [0u8; 12];
        let mut entity_id = [0u8; 4];
        prefix.copy_from_slice(&bytes[0..12]);
        entity_id.copy_from_slice(&bytes[12..16]);
        Self { prefix, entity_id }
    }

    pub fn as_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[0..12].copy_from_slice(&self.prefix);
        bytes[12..16].copy_from_slice(&self.entity_id);
        bytes
    }

    /// All zeros: "no endpoint".
    pub const fn zero() -> Self {
        Self {
            prefix: [0; 12],
            entity_id: [0; 4],
        }
    }

    pub fn is_zero(&self) -> bool {
        self.prefix.iter().all(|&b| b == 0) && self.entity_id.iter().all(|&b| b == 0)
    }

    /// A fresh participant GUID, unique within this process.
    ///
    /// # Layout
    /// - Prefix bytes 0-3: process id (big-endian)
    /// - Prefix bytes 4-7: per-process counter (big-endian)
    /// - Prefix bytes 8-11: fixed 0xDD 0x51 0x1E 0x4B marker
    /// - Entity ID: [`ENTITY_ID_PARTICIPANT`]
    pub fn new_participant() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        let counter = NEXT.fetch_add(1, Ordering::Relaxed);

        let mut prefix = [0u8; 12];
        prefix[0..4].copy_from_slice(&std::process::id().to_be_bytes());
        prefix[4..8].copy_from_slice(&counter.to_be_bytes());
        prefix[8..12].copy_from_slice(&[0xDD, 0x51, 0x1E, 0x4B]);
        Self::new(prefix, ENTITY_ID_PARTICIPANT)
    }

    /// An endpoint GUID under this participant's prefix.
    ///
    /// `kind` goes in the last byte (0x04 reader, 0x03 writer, as in RTPS
    /// user-defined entity kinds); `key` numbers the entity.
    pub fn entity(&self, key: u32, kind: u8) -> Self {
        let key = key.to_be_bytes();
        Self::new(self.prefix, [key[1], key[2], key[3], kind])
    }

    /// True when both GUIDs belong to the same participant.
    pub fn same_participant(&self, other: &Guid) -> bool {
        self.prefix == other.prefix
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.prefix.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        for byte in &self.entity_id {
            write!(f, ".{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({})", self)
    }
}
