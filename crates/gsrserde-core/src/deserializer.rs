//! The Kafka deserializer capability family.
//!
//! A secondary deserializer is "from Kafka" when it implements at least one
//! of [`Deserializer`] (blocking) or [`AsyncDeserializer`] (non-blocking).
//! Both traits are object-safe so implementations can be held as
//! `Arc<dyn Deserializer>` / `Arc<dyn AsyncDeserializer>`.

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::BoxFuture;

use crate::context::SerializationContext;
use crate::error::{BoxError, SerDeError};
use crate::value::DecodedValue;

/// Future returned by the non-blocking decode paths of this crate family.
pub type DecodeFuture = BoxFuture<'static, Result<Option<DecodedValue>, SerDeError>>;

/// Blocking deserializer: turns the raw bytes of a record into a value.
pub trait Deserializer: Send + Sync {
    /// `is_null` is set when the record carried no payload at all.
    /// Returning `Ok(None)` means "decoded to null".
    fn deserialize(
        &self,
        data: &[u8],
        is_null: bool,
        ctx: &SerializationContext,
    ) -> Result<Option<DecodedValue>, BoxError>;
}

/// Non-blocking deserializer.
#[async_trait]
pub trait AsyncDeserializer: Send + Sync {
    async fn deserialize_async(
        &self,
        data: Bytes,
        is_null: bool,
        ctx: &SerializationContext,
    ) -> Result<Option<DecodedValue>, BoxError>;
}

/// Closures can be used as blocking deserializers.
impl<F> Deserializer for F
where
    F: Fn(&[u8], bool, &SerializationContext) -> Result<Option<DecodedValue>, BoxError>
        + Send
        + Sync,
{
    fn deserialize(
        &self,
        data: &[u8],
        is_null: bool,
        ctx: &SerializationContext,
    ) -> Result<Option<DecodedValue>, BoxError> {
        self(data, is_null, ctx)
    }
}
