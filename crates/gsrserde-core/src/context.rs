//! Per-message decode context handed to every deserializer.

use serde::{Deserialize, Serialize};

/// Which part of a Kafka record is being deserialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageComponent {
    Key,
    #[default]
    Value,
}

/// Metadata about the record being deserialized.
/// Mirrors the serialization context of the Kafka client the payload came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializationContext {
    /// Key or value.
    pub component: MessageComponent,
    /// Topic the record was consumed from. Empty when unknown.
    pub topic: String,
    /// Record headers, in wire order.
    #[serde(default)]
    pub headers: Vec<(String, Vec<u8>)>,
}

impl SerializationContext {
    /// A context with no topic and no headers.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Context for the value part of a record on `topic`.
    pub fn value(topic: impl Into<String>) -> Self {
        Self {
            component: MessageComponent::Value,
            topic: topic.into(),
            headers: Vec::new(),
        }
    }

    /// Context for the key part of a record on `topic`.
    pub fn key(topic: impl Into<String>) -> Self {
        Self {
            component: MessageComponent::Key,
            ..Self::value(topic)
        }
    }

    /// Attach a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Value of the first header named `name`.
    pub fn header(&self, name: &str) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context() {
        let ctx = SerializationContext::empty();
        assert_eq!(ctx.topic, "");
        assert_eq!(ctx.component, MessageComponent::Value);
        assert!(ctx.headers.is_empty());
    }

    #[test]
    fn header_lookup() {
        let ctx = SerializationContext::key("orders")
            .with_header("trace-id", b"abc".to_vec())
            .with_header("trace-id", b"def".to_vec());
        assert_eq!(ctx.component, MessageComponent::Key);
        assert_eq!(ctx.header("trace-id"), Some(&b"abc"[..]));
        assert_eq!(ctx.header("missing"), None);
    }
}
