//! Stock secondary deserializers, registered in every
//! [`FallbackRegistry::with_builtins`](crate::FallbackRegistry::with_builtins).

use async_trait::async_trait;
use bytes::Bytes;
use gsrserde_core::{AsyncDeserializer, BoxError, DecodedValue, Deserializer, SerializationContext};

use crate::registry::FallbackRegistry;

/// Id of [`ByteArrayDeserializer`].
pub const BYTE_ARRAY: &str = "gsrserde::ByteArrayDeserializer";
/// Id of [`Utf8Deserializer`].
pub const UTF8: &str = "gsrserde::Utf8Deserializer";
/// Id of [`JsonDeserializer`].
pub const JSON: &str = "gsrserde::JsonDeserializer";

/// Returns the payload bytes unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteArrayDeserializer;

impl Deserializer for ByteArrayDeserializer {
    fn deserialize(
        &self,
        data: &[u8],
        is_null: bool,
        _ctx: &SerializationContext,
    ) -> Result<Option<DecodedValue>, BoxError> {
        if is_null {
            return Ok(None);
        }
        Ok(Some(DecodedValue::Bytes(data.to_vec())))
    }
}

#[async_trait]
impl AsyncDeserializer for ByteArrayDeserializer {
    async fn deserialize_async(
        &self,
        data: Bytes,
        is_null: bool,
        _ctx: &SerializationContext,
    ) -> Result<Option<DecodedValue>, BoxError> {
        if is_null {
            return Ok(None);
        }
        Ok(Some(DecodedValue::Bytes(data.to_vec())))
    }
}

/// Decodes the payload as UTF-8 text. Invalid UTF-8 is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Deserializer;

impl Deserializer for Utf8Deserializer {
    fn deserialize(
        &self,
        data: &[u8],
        is_null: bool,
        _ctx: &SerializationContext,
    ) -> Result<Option<DecodedValue>, BoxError> {
        if is_null {
            return Ok(None);
        }
        let text = std::str::from_utf8(data)?;
        Ok(Some(DecodedValue::Text(text.to_string())))
    }
}

#[async_trait]
impl AsyncDeserializer for Utf8Deserializer {
    async fn deserialize_async(
        &self,
        data: Bytes,
        is_null: bool,
        ctx: &SerializationContext,
    ) -> Result<Option<DecodedValue>, BoxError> {
        Deserializer::deserialize(self, &data, is_null, ctx)
    }
}

/// Parses the payload as a JSON document. Blocking only.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDeserializer;

impl Deserializer for JsonDeserializer {
    fn deserialize(
        &self,
        data: &[u8],
        is_null: bool,
        _ctx: &SerializationContext,
    ) -> Result<Option<DecodedValue>, BoxError> {
        if is_null {
            return Ok(None);
        }
        let value: serde_json::Value = serde_json::from_slice(data)?;
        Ok(Some(DecodedValue::Json(value)))
    }
}

pub(crate) fn register_builtins(registry: &FallbackRegistry) {
    let results = [
        registry.register_both::<ByteArrayDeserializer>(BYTE_ARRAY),
        registry.register_both::<Utf8Deserializer>(UTF8),
        registry.register_sync::<JsonDeserializer>(JSON),
    ];
    for result in results {
        if let Err(e) = result {
            tracing::warn!("skipping built-in secondary deserializer: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> SerializationContext {
        SerializationContext::empty()
    }

    #[test]
    fn byte_array_is_identity() {
        let out = Deserializer::deserialize(&ByteArrayDeserializer, &[0x00, 0x01], false, &ctx())
            .unwrap();
        assert_eq!(out, Some(DecodedValue::Bytes(vec![0x00, 0x01])));
    }

    #[test]
    fn null_flag_yields_none() {
        let out = Deserializer::deserialize(&Utf8Deserializer, b"ignored", true, &ctx()).unwrap();
        assert_eq!(out, None);
    }

    #[test]
    fn utf8_rejects_invalid_bytes() {
        assert!(Deserializer::deserialize(&Utf8Deserializer, &[0xff, 0xfe], false, &ctx()).is_err());
    }

    #[test]
    fn json_parses_document() {
        let out = JsonDeserializer
            .deserialize(br#"{"beat": 3}"#, false, &ctx())
            .unwrap()
            .unwrap();
        assert_eq!(out.as_json().unwrap()["beat"], 3);
    }

    #[tokio::test]
    async fn async_utf8_matches_sync() {
        let sync = Deserializer::deserialize(&Utf8Deserializer, b"hello", false, &ctx()).unwrap();
        let asynchronous = Utf8Deserializer
            .deserialize_async(Bytes::from_static(b"hello"), false, &ctx())
            .await
            .unwrap();
        assert_eq!(sync, asynchronous);
    }
}
