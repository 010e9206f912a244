//! The decoded value returned by every deserialization path.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A decoded record value.
///
/// Registry-format payloads decode to whatever the data-format decoder
/// produces; secondary deserializers return whichever variant fits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum DecodedValue {
    /// Raw bytes, passed through untouched.
    Bytes(Vec<u8>),
    /// UTF-8 text.
    Text(String),
    /// A structured document (JSON bodies, Avro records rendered as JSON).
    Json(serde_json::Value),
}

impl DecodedValue {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Vec<u8>> for DecodedValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<String> for DecodedValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<serde_json::Value> for DecodedValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Self::Text(s) => write!(f, "{s}"),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let v = DecodedValue::from(vec![0x00, 0x01]);
        assert_eq!(v.as_bytes(), Some(&[0x00, 0x01][..]));
        assert!(v.as_text().is_none());
        assert_eq!(v.to_string(), "0x0001");
    }

    #[test]
    fn json_display() {
        let v = DecodedValue::from(serde_json::json!({"name": "Bob"}));
        assert_eq!(v.to_string(), r#"{"name":"Bob"}"#);
        assert_eq!(v.as_json().unwrap()["name"], "Bob");
    }

    #[test]
    fn serde_tagging() {
        let json = serde_json::to_string(&DecodedValue::Text("hi".into())).unwrap();
        assert_eq!(json, r#"{"type":"text","value":"hi"}"#);
    }
}
