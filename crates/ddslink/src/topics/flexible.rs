// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema-less message: a format tag, a version and an opaque body.
//!
//! Wire layout: `format: u8 | version: u32 LE | body...`.

use super::{Cursor, Message};
use crate::error::{Error, Result};
use crate::text::shorten_json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// How the body of a [`FlexibleMsg`] is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFormat {
    /// UTF-8 JSON text.
    #[default]
    Json,
    /// Application-defined bytes.
    Custom,
}

impl DataFormat {
    fn to_raw(self) -> u8 {
        match self {
            DataFormat::Json => 0,
            DataFormat::Custom => 2,
        }
    }

    fn from_raw(raw: u8) -> Result<Self> {
        match raw {
            0 => Ok(DataFormat::Json),
            2 => Ok(DataFormat::Custom),
            1 => Err(Error::codec(FlexibleMsg::TYPE_NAME, "CBOR bodies are not supported")),
            other => Err(Error::codec(
                FlexibleMsg::TYPE_NAME,
                format!("unknown data format {}", other),
            )),
        }
    }
}

/// A JSON (or custom) document sent as-is.
///
/// An empty body marks the message invalid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlexibleMsg {
    pub format: DataFormat,
    pub version: u32,
    pub data: Vec<u8>,
}

impl FlexibleMsg {
    /// JSON message holding `value`.
    pub fn from_json(value: &Value) -> Self {
        Self {
            format: DataFormat::Json,
            version: 0,
            data: value.to_string().into_bytes(),
        }
    }

    /// JSON message holding any serializable value.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self {
            format: DataFormat::Json,
            version: 0,
            data: serde_json::to_vec(value)?,
        })
    }

    /// Message with an application-defined body.
    pub fn custom(data: Vec<u8>, version: u32) -> Self {
        Self {
            format: DataFormat::Custom,
            version,
            data,
        }
    }

    /// Parse the body as JSON.
    pub fn json_data(&self) -> Result<Value> {
        self.deserialize()
    }

    /// Parse the body as JSON into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        if self.format != DataFormat::Json {
            return Err(Error::codec(
                Self::TYPE_NAME,
                format!("body is {:?}, not JSON", self.format),
            ));
        }
        Ok(serde_json::from_slice(&self.data)?)
    }

    /// The body as text; custom bodies render as a byte count.
    pub fn json_string(&self) -> String {
        match self.format {
            DataFormat::Json => String::from_utf8_lossy(&self.data).into_owned(),
            DataFormat::Custom => format!("<custom v{}: {} bytes>", self.version, self.data.len()),
        }
    }

    pub fn invalidate(&mut self) {
        self.data.clear();
    }
}

impl From<Value> for FlexibleMsg {
    fn from(value: Value) -> Self {
        Self::from_json(&value)
    }
}

impl Message for FlexibleMsg {
    const TYPE_NAME: &'static str = "FlexibleMsg";

    fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(5 + self.data.len());
        out.push(self.format.to_raw());
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.data);
        Ok(out)
    }

    fn decode(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(Self::TYPE_NAME, data);
        let format = DataFormat::from_raw(cursor.u8()?)?;
        let version = cursor.u32()?;
        let body = cursor.rest().to_vec();
        Ok(Self {
            format,
            version,
            data: body,
        })
    }

    fn is_valid(&self) -> bool {
        !self.data.is_empty()
    }

    fn preview(&self, max_length: usize) -> String {
        shorten_json(&self.json_string(), max_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_body_survives_the_wire() {
        let msg = FlexibleMsg::from_json(&json!({"id": "ping", "n": [1, 2, 3]}));
        let decoded = FlexibleMsg::decode(&msg.encode().expect("encode")).expect("decode");
        assert_eq!(decoded, msg);
        assert_eq!(decoded.json_data().expect("json")["n"][2], 3);
    }

    #[test]
    fn typed_bodies() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Ping {
            seq: u32,
        }
        let msg = FlexibleMsg::from_serialize(&Ping { seq: 9 }).expect("serialize");
        assert_eq!(msg.json_string(), r#"{"seq":9}"#);
        assert_eq!(msg.deserialize::<Ping>().expect("deserialize"), Ping { seq: 9 });
    }

    #[test]
    fn custom_bodies_are_not_json() {
        let msg = FlexibleMsg::custom(vec![0xde, 0xad], 3);
        assert!(msg.is_valid());
        assert!(msg.json_data().is_err());
        assert_eq!(msg.json_string(), "<custom v3: 2 bytes>");
    }

    #[test]
    fn empty_body_is_invalid() {
        let mut msg = FlexibleMsg::from_json(&json!([1]));
        assert!(msg.is_valid());
        msg.invalidate();
        assert!(!msg.is_valid());
        assert!(!FlexibleMsg::default().is_valid());
    }

    #[test]
    fn unknown_formats_fail_to_decode() {
        assert!(FlexibleMsg::decode(&[1, 0, 0, 0, 0, b'x']).is_err());
        assert!(FlexibleMsg::decode(&[7, 0, 0, 0, 0]).is_err());
        assert!(FlexibleMsg::decode(&[0, 0]).is_err());
    }

    #[test]
    fn preview_shortens_structurally() {
        let msg = FlexibleMsg::from_json(&json!({"a": 1, "b": "x", "c": [1, 2, 3, 4, 5, 6, 7, 8, 9]}));
        assert_eq!(msg.json_string(), r#"{"a":1,"b":"x","c":[1,2,3,4,5,6,7,8,9]}"#);
        assert_eq!(msg.preview(27), r#"{"a":1,"b":"x","c":[ ... ]}"#);
        assert_eq!(msg.preview(30), r#"{"a":1,"b":"x","c":[1,2 ... ]}"#);
    }
}
