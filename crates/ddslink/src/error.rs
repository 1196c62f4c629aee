// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Errors returned by ddslink operations.

use std::time::Duration;
use thiserror::Error;

/// Errors returned by readers, writers, the device watcher and transports.
///
/// # Example
///
/// ```rust,no_run
/// use ddslink::{Error, LoopbackBus, TopicReader, FlexibleMsg};
/// use std::time::Duration;
///
/// let participant = LoopbackBus::new().participant("doc");
/// let reader = TopicReader::<FlexibleMsg>::open(participant, "doc/topic")?;
///
/// match reader.read_timeout(Duration::from_millis(10)) {
///     Err(Error::Timeout { what, .. }) => println!("nothing on {}", what),
///     Err(e) => println!("other error: {}", e),
///     Ok(sample) => println!("got {}", sample.msg.json_string()),
/// }
/// # Ok::<(), ddslink::Error>(())
/// ```
#[derive(Debug, Error)]
pub enum Error {
    // ========================================================================
    // Waiting
    // ========================================================================
    /// A bounded wait expired before its condition was met.
    #[error("timed out after {waited:?} waiting for {what}")]
    Timeout {
        /// What was being waited for (e.g. "1 writers on 'realsense/e2h'").
        what: String,
        /// The timeout that elapsed.
        waited: Duration,
    },

    // ========================================================================
    // Transport contract
    // ========================================================================
    /// The transport signaled data availability but produced no valid sample.
    #[error("protocol violation on '{topic}': {reason}")]
    ProtocolViolation {
        /// Topic the notification was received on.
        topic: String,
        /// What went wrong.
        reason: String,
    },

    /// The underlying publish/subscribe call failed.
    #[error("transport error: {0}")]
    Transport(String),

    // ========================================================================
    // Entity lifecycle
    // ========================================================================
    /// An entity could not be constructed (e.g. invalid participant).
    #[error("invalid construction: {0}")]
    InvalidConstruction(String),

    /// Operation not allowed in the entity's current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    // ========================================================================
    // Data
    // ========================================================================
    /// A payload could not be encoded or decoded.
    #[error("codec error for '{type_name}': {reason}")]
    Codec {
        /// Message type name.
        type_name: &'static str,
        /// What went wrong.
        reason: String,
    },

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // Configuration
    // ========================================================================
    /// Configuration is invalid or could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O error with underlying cause.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a [`Error::Timeout`].
    pub fn timeout(what: impl Into<String>, waited: Duration) -> Self {
        Error::Timeout {
            what: what.into(),
            waited,
        }
    }

    /// Build a [`Error::Codec`].
    pub fn codec(type_name: &'static str, reason: impl Into<String>) -> Self {
        Error::Codec {
            type_name,
            reason: reason.into(),
        }
    }

    /// True for [`Error::Timeout`].
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}

/// Convenient alias for results using the crate [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_display_names_the_wait() {
        let err = Error::timeout("2 readers on 'ops'", Duration::from_secs(3));
        assert!(err.is_timeout());
        assert_eq!(
            err.to_string(),
            "timed out after 3s waiting for 2 readers on 'ops'"
        );
    }

    #[test]
    fn codec_display() {
        let err = Error::codec("OpPayload", "buffer too short: 12 bytes");
        assert!(!err.is_timeout());
        assert_eq!(
            err.to_string(),
            "codec error for 'OpPayload': buffer too short: 12 bytes"
        );
    }

    #[test]
    fn json_errors_convert() {
        let parse: core::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
    }
}
