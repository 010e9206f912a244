//! # gsrserde-kafka
//!
//! The dispatching Kafka deserializer. Payloads written in the schema
//! registry wire format are decoded through the registry collaborators;
//! all other payloads go to a secondary deserializer resolved by id at
//! configuration time.

pub mod dispatcher;
pub mod metrics;

pub use dispatcher::{GlueSchemaRegistryKafkaDeserializer, GlueSchemaRegistryKafkaDeserializerBuilder};
pub use metrics::DispatchMetrics;
