// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Device announcement published on the device-info topic.

use super::Message;
use crate::error::Result;
use crate::text::shorten_json;
use serde::{Deserialize, Serialize};

/// What a device says about itself when it comes online.
///
/// Serialized as JSON with kebab-case keys:
/// `{"name":..,"serial":..,"product-line":..,"topic-root":..,"locked":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DeviceInfo {
    pub name: String,
    pub serial: String,
    pub product_line: String,
    /// Prefix of every topic the device publishes (e.g. `realsense/D435/123`).
    pub topic_root: String,
    /// True when another host already owns the device.
    pub locked: bool,
}

impl DeviceInfo {
    pub fn new(name: &str, serial: &str, product_line: &str, topic_root: &str) -> Self {
        Self {
            name: name.to_string(),
            serial: serial.to_string(),
            product_line: product_line.to_string(),
            topic_root: topic_root.to_string(),
            locked: false,
        }
    }

    pub fn json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Message for DeviceInfo {
    const TYPE_NAME: &'static str = "DeviceInfo";

    fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    fn decode(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Anonymous announcements are ignored.
    fn is_valid(&self) -> bool {
        !self.name.is_empty()
    }

    fn preview(&self, max_length: usize) -> String {
        shorten_json(&self.json_string(), max_length)
    }
}
