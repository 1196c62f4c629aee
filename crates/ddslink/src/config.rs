// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ddslink configuration.
//!
//! - **Level 1 (Static)**: named defaults below. Never hardcode them elsewhere.
//! - **Level 2 (Dynamic)**: [`LinkConfig`], loaded from a TOML file and/or
//!   `DDSLINK_*` environment variables.
//!
//! ## Environment
//! - `DDSLINK_CONFIG_FILE`: TOML file loaded first by [`LinkConfig::load`]
//! - `DDSLINK_POLL_INTERVAL_MS`: matched-endpoint poll period (default: 500)
//! - `DDSLINK_WRITER_WAIT_MS`: default `wait_for_readers` timeout (default: 3000)
//! - `DDSLINK_STREAM_INTERVAL_MS`: streamer publish period (default: 33)
//! - `DDSLINK_STREAM_PAYLOAD_SIZE`: streamer frame size in bytes (default: 2048)
//! - `DDSLINK_PREVIEW_LENGTH`: per-sample log preview budget (default: 96)
//! - `DDSLINK_DEVICE_INFO_TOPIC`: device announcement topic
//! - `DDSLINK_HISTORY_DEPTH`: reader history depth (unset: keep all)
//!
//! # Example
//!
//! ```toml
//! poll_interval_ms = 100
//! device_info_topic = "lab/device-info"
//! ```

use crate::error::{Error, Result};
use crate::text::MIN_SHORTEN_LENGTH;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

// =======================================================================
// Defaults
// =======================================================================

/// How often `wait_for_writers` / `wait_for_readers` re-check the count.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default timeout of `TopicWriter::wait_for_readers`.
pub const DEFAULT_WRITER_WAIT: Duration = Duration::from_secs(3);

/// Streamer publish period (~30 fps).
pub const DEFAULT_STREAM_INTERVAL: Duration = Duration::from_millis(33);

/// Streamer frame size in bytes.
pub const DEFAULT_STREAM_PAYLOAD_SIZE: usize = 2048;

/// Budget of the shortened payload preview in per-sample debug logs.
pub const DEFAULT_PREVIEW_LENGTH: usize = crate::text::DEFAULT_SHORTEN_LENGTH;

/// Topic devices announce themselves on.
pub const DEVICE_INFO_TOPIC: &str = "realsense/device-info";

// =======================================================================
// Environment variable names
// =======================================================================

pub const ENV_CONFIG_FILE: &str = "DDSLINK_CONFIG_FILE";
pub const ENV_POLL_INTERVAL_MS: &str = "DDSLINK_POLL_INTERVAL_MS";
pub const ENV_WRITER_WAIT_MS: &str = "DDSLINK_WRITER_WAIT_MS";
pub const ENV_STREAM_INTERVAL_MS: &str = "DDSLINK_STREAM_INTERVAL_MS";
pub const ENV_STREAM_PAYLOAD_SIZE: &str = "DDSLINK_STREAM_PAYLOAD_SIZE";
pub const ENV_PREVIEW_LENGTH: &str = "DDSLINK_PREVIEW_LENGTH";
pub const ENV_DEVICE_INFO_TOPIC: &str = "DDSLINK_DEVICE_INFO_TOPIC";
pub const ENV_HISTORY_DEPTH: &str = "DDSLINK_HISTORY_DEPTH";

/// Runtime configuration shared by readers, writers, streamers and the
/// device watcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Matched-endpoint poll period, milliseconds.
    pub poll_interval_ms: u64,
    /// Default `wait_for_readers` timeout, milliseconds.
    pub writer_wait_ms: u64,
    /// Streamer publish period, milliseconds.
    pub stream_interval_ms: u64,
    /// Streamer frame size, bytes.
    pub stream_payload_size: usize,
    /// Preview budget for per-sample debug logs.
    pub preview_length: usize,
    /// Device announcement topic.
    pub device_info_topic: String,
    /// Reader history depth; `None` keeps every sample until read.
    pub history_depth: Option<usize>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            writer_wait_ms: DEFAULT_WRITER_WAIT.as_millis() as u64,
            stream_interval_ms: DEFAULT_STREAM_INTERVAL.as_millis() as u64,
            stream_payload_size: DEFAULT_STREAM_PAYLOAD_SIZE,
            preview_length: DEFAULT_PREVIEW_LENGTH,
            device_info_topic: DEVICE_INFO_TOPIC.to_string(),
            history_depth: None,
        }
    }
}

impl LinkConfig {
    /// Defaults overridden by `DDSLINK_*` variables.
    ///
    /// Malformed values are logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok());
        config
    }

    /// Parse a TOML file; missing keys keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// `DDSLINK_CONFIG_FILE` (if set), then environment overrides, validated.
    pub fn load() -> Result<Self> {
        let mut config = match env::var(ENV_CONFIG_FILE).ok().filter(|s| !s.is_empty()) {
            Some(path) => {
                log::debug!("[CONFIG] Loading {}", path);
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (an environment stand-in).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        fn parsed<T: std::str::FromStr>(key: &str, value: Option<String>) -> Option<T> {
            let value = value?;
            match value.trim().parse::<T>() {
                Ok(v) => Some(v),
                Err(_) => {
                    log::warn!("[CONFIG] Ignoring {}={:?}: not a number", key, value);
                    None
                }
            }
        }

        if let Some(v) = parsed(ENV_POLL_INTERVAL_MS, lookup(ENV_POLL_INTERVAL_MS)) {
            self.poll_interval_ms = v;
        }
        if let Some(v) = parsed(ENV_WRITER_WAIT_MS, lookup(ENV_WRITER_WAIT_MS)) {
            self.writer_wait_ms = v;
        }
        if let Some(v) = parsed(ENV_STREAM_INTERVAL_MS, lookup(ENV_STREAM_INTERVAL_MS)) {
            self.stream_interval_ms = v;
        }
        if let Some(v) = parsed(ENV_STREAM_PAYLOAD_SIZE, lookup(ENV_STREAM_PAYLOAD_SIZE)) {
            self.stream_payload_size = v;
        }
        if let Some(v) = parsed(ENV_PREVIEW_LENGTH, lookup(ENV_PREVIEW_LENGTH)) {
            self.preview_length = v;
        }
        if let Some(topic) = lookup(ENV_DEVICE_INFO_TOPIC) {
            self.device_info_topic = topic.trim().to_string();
        }
        if let Some(v) = parsed(ENV_HISTORY_DEPTH, lookup(ENV_HISTORY_DEPTH)) {
            self.history_depth = Some(v);
        }
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be > 0".into()));
        }
        if self.stream_interval_ms == 0 {
            return Err(Error::Config("stream_interval_ms must be > 0".into()));
        }
        if self.stream_payload_size == 0 {
            return Err(Error::Config(
                "stream_payload_size must be > 0 (empty frames are invalid)".into(),
            ));
        }
        if self.preview_length < MIN_SHORTEN_LENGTH {
            return Err(Error::Config(format!(
                "preview_length must be >= {}",
                MIN_SHORTEN_LENGTH
            )));
        }
        if self.device_info_topic.is_empty() {
            return Err(Error::Config("device_info_topic must not be empty".into()));
        }
        if self.history_depth == Some(0) {
            return Err(Error::Config("history_depth must be > 0".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn writer_wait(&self) -> Duration {
        Duration::from_millis(self.writer_wait_ms)
    }

    pub fn stream_interval(&self) -> Duration {
        Duration::from_millis(self.stream_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_match_constants() {
        let config = LinkConfig::default();
        assert_eq!(config.poll_interval(), DEFAULT_POLL_INTERVAL);
        assert_eq!(config.writer_wait(), DEFAULT_WRITER_WAIT);
        assert_eq!(config.stream_interval(), DEFAULT_STREAM_INTERVAL);
        assert_eq!(config.stream_payload_size, 2048);
        assert_eq!(config.preview_length, 96);
        assert_eq!(config.device_info_topic, DEVICE_INFO_TOPIC);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overrides_apply_and_bad_values_are_ignored() {
        let vars: HashMap<&str, &str> = [
            (ENV_POLL_INTERVAL_MS, "20"),
            (ENV_STREAM_INTERVAL_MS, "not-a-number"),
            (ENV_DEVICE_INFO_TOPIC, " lab/devices "),
            (ENV_HISTORY_DEPTH, "8"),
            (ENV_PREVIEW_LENGTH, ""),
        ]
        .into_iter()
        .collect();

        let mut config = LinkConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.poll_interval(), Duration::from_millis(20));
        assert_eq!(config.stream_interval(), DEFAULT_STREAM_INTERVAL);
        assert_eq!(config.device_info_topic, "lab/devices");
        assert_eq!(config.history_depth, Some(8));
        assert_eq!(config.preview_length, DEFAULT_PREVIEW_LENGTH);
    }

    #[test]
    fn toml_file_keeps_defaults_for_missing_keys() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "poll_interval_ms = 100").expect("write");
        writeln!(file, "device_info_topic = \"lab/device-info\"").expect("write");

        let config = LinkConfig::from_file(file.path()).expect("load");
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.device_info_topic, "lab/device-info");
        assert_eq!(config.writer_wait(), DEFAULT_WRITER_WAIT);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            LinkConfig::from_toml_str("preview_length = 3"),
            Err(Error::Config(_))
        ));
        assert!(LinkConfig::from_toml_str("poll_interval_ms = 0").is_err());
        assert!(LinkConfig::from_toml_str("history_depth = 0").is_err());
        assert!(LinkConfig::from_toml_str("poll_interval_ms = \"fast\"").is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = LinkConfig::from_file(dir.path().join("absent.toml")).expect_err("missing");
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn toml_round_trip() {
        let config = LinkConfig {
            history_depth: Some(4),
            ..LinkConfig::default()
        };
        let text = toml::to_string(&config).expect("serialize");
        assert_eq!(LinkConfig::from_toml_str(&text).expect("parse"), config);
    }
}
