// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::core::Guid;
use crate::topics::DeviceInfo;
use std::fmt;

/// A device seen on the device-info topic.
///
/// Keyed by the GUID of the writer that announced it; the device is gone
/// when that writer leaves.
pub struct Device {
    guid: Guid,
    info: DeviceInfo,
}

impl Device {
    pub(crate) fn new(guid: Guid, info: DeviceInfo) -> Self {
        Self { guid, info }
    }

    /// GUID of the announcing writer.
    pub fn guid(&self) -> Guid {
        self.guid
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn serial(&self) -> &str {
        &self.info.serial
    }

    pub fn topic_root(&self) -> &str {
        &self.info.topic_root
    }

    pub fn is_locked(&self) -> bool {
        self.info.locked
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("guid", &self.guid)
            .field("name", &self.info.name)
            .field("serial", &self.info.serial)
            .finish()
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        log::debug!(
            "[WATCHER] Device ({}) {} released",
            self.guid,
            self.info.serial
        );
    }
}
