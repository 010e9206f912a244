//! GsrSerDe metrics definitions.
//!
//! All metrics use OpenTelemetry conventions and are exported by whatever
//! meter provider the application installs.

use gsrserde_core::ErrorKind;
use gsrserde_kafka::DispatchMetrics;
use opentelemetry::{
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};

/// Central metrics handle for GsrSerDe.
#[derive(Clone)]
pub struct GsrSerDeMetrics {
    pub registry_decoded: Counter<u64>,
    pub secondary_decoded: Counter<u64>,
    pub null_payloads: Counter<u64>,
    pub decode_errors: Counter<u64>,
    pub decode_latency_ms: Histogram<f64>,
}

impl GsrSerDeMetrics {
    pub fn new(meter: &Meter) -> Self {
        Self {
            registry_decoded: meter
                .u64_counter("gsrserde.registry_decoded")
                .with_description("Registry-format payloads decoded")
                .build(),
            secondary_decoded: meter
                .u64_counter("gsrserde.secondary_decoded")
                .with_description("Payloads decoded by the secondary deserializer")
                .build(),
            null_payloads: meter
                .u64_counter("gsrserde.null_payloads")
                .with_description("Null or empty payloads returned as null")
                .build(),
            decode_errors: meter
                .u64_counter("gsrserde.decode_errors")
                .with_description("Payloads that failed to decode")
                .build(),
            decode_latency_ms: meter
                .f64_histogram("gsrserde.decode_latency_ms")
                .with_description("Time to decode a single payload in milliseconds")
                .build(),
        }
    }

    pub fn record_latency(&self, ms: f64, topic: &str) {
        self.decode_latency_ms
            .record(ms, &[KeyValue::new("topic", topic.to_string())]);
    }

    /// Export a dispatcher snapshot, e.g. the counts accumulated since the
    /// previous export. Zero counts are skipped; errors keep their kind.
    pub fn record_snapshot(&self, topic: &str, snapshot: &DispatchMetrics) {
        let attrs = [KeyValue::new("topic", topic.to_string())];
        for (counter, count) in [
            (&self.registry_decoded, snapshot.registry_decoded),
            (&self.secondary_decoded, snapshot.secondary_decoded),
            (&self.null_payloads, snapshot.null_payloads),
        ] {
            if count > 0 {
                counter.add(count, &attrs);
            }
        }
        for (kind, count) in error_counts(snapshot) {
            self.decode_errors.add(
                count,
                &[
                    KeyValue::new("topic", topic.to_string()),
                    KeyValue::new("error_kind", kind.as_str()),
                ],
            );
        }
    }
}

/// Non-zero error counts by kind.
fn error_counts(snapshot: &DispatchMetrics) -> impl Iterator<Item = (ErrorKind, u64)> + '_ {
    snapshot
        .errors_by_kind
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(kind, count)| (*kind, *count))
}
