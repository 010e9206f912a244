//! Per-dispatcher outcome counters.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use gsrserde_core::{DecodedValue, ErrorKind, SerDeError};

/// Metrics snapshot for one dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchMetrics {
    /// Registry-format payloads decoded successfully.
    pub registry_decoded: u64,
    /// Payloads decoded successfully by the secondary deserializer.
    pub secondary_decoded: u64,
    /// Null or zero-length payloads short-circuited to `None`.
    pub null_payloads: u64,
    /// Failed decodes on either path.
    pub decode_errors: u64,
    /// `decode_errors` broken down by error kind.
    pub errors_by_kind: BTreeMap<ErrorKind, u64>,
}

impl DispatchMetrics {
    /// Every payload seen, whatever its outcome.
    pub fn total(&self) -> u64 {
        self.registry_decoded + self.secondary_decoded + self.null_payloads + self.decode_errors
    }
}

/// Which decode path a payload took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecodeRoute {
    Registry,
    Secondary,
}

pub(crate) fn record_null(metrics: &Mutex<DispatchMetrics>) {
    metrics.lock().unwrap_or_else(PoisonError::into_inner).null_payloads += 1;
}

pub(crate) fn record_outcome(
    metrics: &Mutex<DispatchMetrics>,
    route: DecodeRoute,
    result: &Result<Option<DecodedValue>, SerDeError>,
) {
    let mut m = metrics.lock().unwrap_or_else(PoisonError::into_inner);
    match (route, result) {
        (_, Err(e)) => {
            m.decode_errors += 1;
            *m.errors_by_kind.entry(e.kind()).or_default() += 1;
        }
        (DecodeRoute::Registry, Ok(_)) => m.registry_decoded += 1,
        (DecodeRoute::Secondary, Ok(_)) => m.secondary_decoded += 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_are_counted_per_route() {
        let metrics = Mutex::new(DispatchMetrics::default());
        record_outcome(&metrics, DecodeRoute::Registry, &Ok(None));
        record_outcome(&metrics, DecodeRoute::Secondary, &Ok(None));
        record_outcome(&metrics, DecodeRoute::Secondary, &Err(SerDeError::not_bound()));
        record_outcome(&metrics, DecodeRoute::Registry, &Err(SerDeError::decode_failure("x", None)));
        record_outcome(&metrics, DecodeRoute::Secondary, &Err(SerDeError::not_bound()));
        record_null(&metrics);

        let snapshot = metrics.lock().unwrap().clone();
        assert_eq!(snapshot.registry_decoded, 1);
        assert_eq!(snapshot.secondary_decoded, 1);
        assert_eq!(snapshot.decode_errors, 3);
        assert_eq!(snapshot.errors_by_kind[&ErrorKind::NotBound], 2);
        assert_eq!(snapshot.errors_by_kind[&ErrorKind::DecodeFailure], 1);
        assert!(!snapshot.errors_by_kind.contains_key(&ErrorKind::DelegationFailure));
        assert_eq!(snapshot.null_payloads, 1);
        assert_eq!(snapshot.total(), 6);
    }
}
