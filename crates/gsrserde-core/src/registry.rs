//! Collaborator traits for the registry decode path.
//!
//! The dispatching deserializer only needs these three operations from the
//! schema registry side; concrete implementations live in
//! `gsrserde-registry` or in the application.

use std::sync::Arc;

use crate::config::DispatchConfiguration;
use crate::error::BoxError;
use crate::schema::{DataFormat, SchemaDescriptor};
use crate::value::DecodedValue;

/// Understands the registry wire framing of a payload.
pub trait RegistryDecoder: Send + Sync {
    /// Whether `data` is a well-formed registry payload.
    fn can_decode(&self, data: &[u8]) -> bool;

    /// Strip the registry framing and return the payload body.
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, BoxError>;

    /// Resolve the schema the payload was written with.
    fn decode_schema(&self, data: &[u8]) -> Result<SchemaDescriptor, BoxError>;
}

/// Decodes a payload body written in one specific data format.
pub trait DataFormatDecoder: Send + Sync {
    fn deserialize(&self, body: &[u8], schema: &SchemaDescriptor) -> Result<DecodedValue, BoxError>;
}

/// Selects the [`DataFormatDecoder`] for a data format.
pub trait DataFormatDecoderFactory: Send + Sync {
    fn get_decoder(
        &self,
        format: DataFormat,
        config: &DispatchConfiguration,
    ) -> Result<Arc<dyn DataFormatDecoder>, BoxError>;
}
