//! # gsrserde-observability
//!
//! OpenTelemetry-based observability for GsrSerDe.
//!
//! ## Built-in metrics
//! - `gsrserde.registry_decoded`: counter, tagged with topic
//! - `gsrserde.secondary_decoded`: counter, tagged with topic
//! - `gsrserde.null_payloads`: counter, tagged with topic
//! - `gsrserde.decode_errors`: counter, tagged with topic + error_kind
//! - `gsrserde.decode_latency_ms`: histogram
//!
//! ## Structured logging
//! JSON-structured or human-readable logs, levels configurable per crate.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::GsrSerDeMetrics;
pub use tracing_setup::{init_tracing, LogConfig};
