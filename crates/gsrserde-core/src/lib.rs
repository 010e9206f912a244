//! # gsrserde-core
//!
//! Core traits, types, and error kinds shared across all GsrSerDe crates.
//! The dispatching Kafka deserializer, the secondary (fallback) deserializer
//! binding, and the reference registry collaborators are all built on top of
//! the interfaces defined here.

pub mod config;
pub mod context;
pub mod deserializer;
pub mod error;
pub mod registry;
pub mod schema;
pub mod value;

pub use config::{CompressionType, ConfigMap, DispatchConfiguration, SecondaryDeserializerSetting};
pub use context::{MessageComponent, SerializationContext};
pub use deserializer::{AsyncDeserializer, DecodeFuture, Deserializer};
pub use error::{BoxError, ErrorKind, RegistryError, SerDeError};
pub use registry::{DataFormatDecoder, DataFormatDecoderFactory, RegistryDecoder};
pub use schema::{DataFormat, SchemaDescriptor};
pub use value::DecodedValue;

/// First byte of every payload written in the schema registry wire format.
///
/// Payloads that do not start with this byte are routed to the secondary
/// deserializer.
pub const HEADER_VERSION_BYTE: u8 = 3;
