//! # gsrserde-registry
//!
//! Reference implementations of the registry-side collaborators used by the
//! dispatching deserializer:
//!
//! - [`WireFrame`] parses and encodes the registry wire frame
//! - [`MemorySchemaRegistry`] stores schemas by version id and implements
//!   [`RegistryDecoder`](gsrserde_core::RegistryDecoder)
//! - [`DefaultDataFormatDecoderFactory`] maps a data format to its body decoder

pub mod formats;
pub mod memory;
pub mod wire;

pub use formats::{DefaultDataFormatDecoderFactory, JsonDataFormatDecoder};
pub use memory::MemorySchemaRegistry;
pub use wire::{WireFrame, COMPRESSION_NONE, COMPRESSION_ZLIB, HEADER_LEN};
