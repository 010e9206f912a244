//! `GlueSchemaRegistryKafkaDeserializer`: routes each payload either through
//! the schema registry decode path or to the secondary deserializer.
//!
//! Routing looks at the first byte only. Payloads starting with
//! [`HEADER_VERSION_BYTE`] go to the registry path; everything else goes to
//! the bound [`SecondaryDeserializer`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use bytes::Bytes;
use futures::future::{self, FutureExt};
use gsrserde_core::{
    ConfigMap, DataFormatDecoderFactory, DecodeFuture, DecodedValue, DispatchConfiguration,
    RegistryDecoder, SerDeError, SerializationContext, HEADER_VERSION_BYTE,
};
use gsrserde_fallback::{FallbackRegistry, SecondaryDeserializer};
use tracing::{debug, info, trace, warn};

use crate::metrics::{record_null, record_outcome, DecodeRoute, DispatchMetrics};

/// Configuration and binding, always swapped together.
struct DispatchState {
    configuration: Arc<DispatchConfiguration>,
    secondary: Option<Arc<SecondaryDeserializer>>,
}

/// The registry-side collaborators. Cheap to clone into a blocking task.
#[derive(Clone)]
struct RegistryPath {
    decoder: Arc<dyn RegistryDecoder>,
    formats: Arc<dyn DataFormatDecoderFactory>,
}

impl RegistryPath {
    /// Run the four registry steps. A panicking collaborator is reported as
    /// `DecodeFailure`, the same on the blocking and non-blocking paths.
    fn decode(
        &self,
        configuration: &DispatchConfiguration,
        topic: &str,
        data: &[u8],
    ) -> Result<Option<DecodedValue>, SerDeError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.decode_steps(configuration, topic, data)))
            .unwrap_or_else(|_| {
                warn!(topic, "registry decoder panicked");
                Err(SerDeError::decode_failure(SerDeError::REGISTRY_DECODER_PANICKED, None))
            })
    }

    fn decode_steps(
        &self,
        configuration: &DispatchConfiguration,
        topic: &str,
        data: &[u8],
    ) -> Result<Option<DecodedValue>, SerDeError> {
        if !self.decoder.can_decode(data) {
            return Err(SerDeError::decode_failure(SerDeError::CANNOT_DECODE, None));
        }

        let body = self
            .decoder
            .decode(data)
            .map_err(|e| SerDeError::decode_failure("Failed to strip registry framing", Some(e)))?;
        let schema = self
            .decoder
            .decode_schema(data)
            .map_err(|e| SerDeError::decode_failure("Failed to resolve payload schema", Some(e)))?;
        let format_decoder = self
            .formats
            .get_decoder(schema.data_format, configuration)
            .map_err(|e| {
                SerDeError::decode_failure(
                    format!("No decoder for data format {}", schema.data_format),
                    Some(e),
                )
            })?;
        let value = format_decoder.deserialize(&body, &schema).map_err(|e| {
            SerDeError::decode_failure(
                format!("Failed to decode {} payload body", schema.data_format),
                Some(e),
            )
        })?;

        trace!(
            topic,
            schema = %schema.schema_name,
            format = %schema.data_format,
            "decoded registry payload"
        );
        Ok(Some(value))
    }
}

/// `true` unless the payload starts with the registry header byte.
fn should_use_secondary(data: &[u8]) -> bool {
    data.first() != Some(&HEADER_VERSION_BYTE)
}

/// Kafka deserializer for schema registry payloads with a secondary
/// deserializer for everything else.
///
/// Built with [`GlueSchemaRegistryKafkaDeserializer::builder`]. All decode
/// methods take `&self`; one instance serves any number of concurrent calls.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use gsrserde_core::{ConfigMap, SerializationContext};
/// use gsrserde_kafka::GlueSchemaRegistryKafkaDeserializer;
/// use gsrserde_registry::{DefaultDataFormatDecoderFactory, MemorySchemaRegistry};
///
/// let mut configs = ConfigMap::new();
/// configs.insert("secondaryDeserializer".into(), "gsrserde::Utf8Deserializer".into());
///
/// let deserializer = GlueSchemaRegistryKafkaDeserializer::builder(
///     Arc::new(MemorySchemaRegistry::new()),
///     Arc::new(DefaultDataFormatDecoderFactory::new()),
/// )
/// .build(&configs)
/// .unwrap();
///
/// let value = deserializer
///     .deserialize(b"legacy", false, &SerializationContext::value("orders"))
///     .unwrap();
/// ```
pub struct GlueSchemaRegistryKafkaDeserializer {
    registry: RegistryPath,
    fallbacks: Arc<FallbackRegistry>,
    state: RwLock<Arc<DispatchState>>,
    metrics: Arc<Mutex<DispatchMetrics>>,
}

impl GlueSchemaRegistryKafkaDeserializer {
    /// Start building a deserializer around the two registry collaborators.
    pub fn builder(
        registry_decoder: Arc<dyn RegistryDecoder>,
        formats: Arc<dyn DataFormatDecoderFactory>,
    ) -> GlueSchemaRegistryKafkaDeserializerBuilder {
        GlueSchemaRegistryKafkaDeserializerBuilder {
            registry_decoder,
            formats,
            fallbacks: None,
        }
    }

    /// Replace the configuration and secondary deserializer binding.
    ///
    /// The new state is built completely before it is installed. On error
    /// the previous configuration and binding stay in effect.
    pub fn configure(&self, configs: &ConfigMap) -> Result<(), SerDeError> {
        let configuration = DispatchConfiguration::from_map(configs)?;

        let secondary = if configuration.secondary_deserializer().is_present() {
            let mut binding = SecondaryDeserializer::build(Arc::clone(&self.fallbacks));
            if !binding.validate_and_init(configuration.secondary_deserializer())? {
                warn!(
                    "rejecting secondary deserializer {:?}: not a Kafka deserializer",
                    binding.type_name()
                );
                return Err(SerDeError::invalid_configuration(
                    SerDeError::SECONDARY_NOT_FROM_KAFKA,
                ));
            }
            Some(Arc::new(binding))
        } else {
            None
        };

        info!(
            "configured deserializer (secondary: {})",
            secondary
                .as_ref()
                .and_then(|s| s.type_name())
                .unwrap_or("none")
        );

        let next = Arc::new(DispatchState {
            configuration: Arc::new(configuration),
            secondary,
        });
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;
        Ok(())
    }

    /// Blocking decode.
    ///
    /// Null or empty payloads return `Ok(None)` without touching any
    /// collaborator.
    pub fn deserialize(
        &self,
        data: &[u8],
        is_null: bool,
        ctx: &SerializationContext,
    ) -> Result<Option<DecodedValue>, SerDeError> {
        if is_null || data.is_empty() {
            record_null(&self.metrics);
            return Ok(None);
        }

        let state = self.snapshot();
        let (route, result) = if should_use_secondary(data) {
            debug!(topic = %ctx.topic, "routing payload to secondary deserializer");
            let result = match &state.secondary {
                Some(secondary) => secondary.deserialize(data, is_null, ctx),
                None => Err(SerDeError::not_bound()),
            };
            (DecodeRoute::Secondary, result)
        } else {
            let result = self.registry.decode(&state.configuration, &ctx.topic, data);
            (DecodeRoute::Registry, result)
        };

        record_outcome(&self.metrics, route, &result);
        result
    }

    /// Non-blocking decode.
    ///
    /// Non-registry payloads are handed to the secondary deserializer's own
    /// future. Registry payloads are decoded on the blocking pool of the
    /// current tokio runtime. Without a runtime the decode runs when the
    /// returned future is first polled and blocks the polling thread.
    pub fn deserialize_async(
        &self,
        data: Bytes,
        is_null: bool,
        ctx: SerializationContext,
    ) -> DecodeFuture {
        if is_null || data.is_empty() {
            record_null(&self.metrics);
            return future::ready(Ok(None)).boxed();
        }

        let state = self.snapshot();
        let metrics = Arc::clone(&self.metrics);

        if should_use_secondary(&data) {
            debug!(topic = %ctx.topic, "routing payload to secondary deserializer");
            let delegated = match &state.secondary {
                Some(secondary) => secondary.deserialize_async(data, is_null, ctx),
                None => Err(SerDeError::not_bound()),
            };
            return match delegated {
                Ok(fut) => fut
                    .inspect(move |result| record_outcome(&metrics, DecodeRoute::Secondary, result))
                    .boxed(),
                Err(e) => {
                    let result = Err(e);
                    record_outcome(&metrics, DecodeRoute::Secondary, &result);
                    future::ready(result).boxed()
                }
            };
        }

        let registry = self.registry.clone();
        let configuration = Arc::clone(&state.configuration);
        let work = move || {
            let result = registry.decode(&configuration, &ctx.topic, &data);
            record_outcome(&metrics, DecodeRoute::Registry, &result);
            result
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let task = handle.spawn_blocking(work);
                async move {
                    match task.await {
                        Ok(result) => result,
                        // Panics are caught inside the task, so this is cancellation.
                        Err(e) => Err(SerDeError::decode_failure(
                            "Registry decode task was cancelled",
                            Some(Box::new(e)),
                        )),
                    }
                }
                .boxed()
            }
            Err(_) => async move { work() }.boxed(),
        }
    }

    /// Decode a registry-format payload directly, without first-byte routing.
    ///
    /// `None` data decodes to `None`.
    pub fn deserialize_for_topic(
        &self,
        topic: &str,
        data: Option<&[u8]>,
    ) -> Result<Option<DecodedValue>, SerDeError> {
        let Some(data) = data else {
            record_null(&self.metrics);
            return Ok(None);
        };
        let state = self.snapshot();
        let result = self.registry.decode(&state.configuration, topic, data);
        record_outcome(&self.metrics, DecodeRoute::Registry, &result);
        result
    }

    /// Drop the held secondary deserializer instance, keeping the rest of the
    /// configuration. Later non-registry payloads fail with `NotBound`.
    pub fn clear_secondary_deserializer(&self) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let configuration = Arc::clone(&guard.configuration);
        let secondary = guard.secondary.as_ref().map(|current| {
            let mut cleared = SecondaryDeserializer::clone(current);
            cleared.clear();
            Arc::new(cleared)
        });
        debug!("cleared secondary deserializer");
        *guard = Arc::new(DispatchState {
            configuration,
            secondary,
        });
    }

    /// The active configuration.
    pub fn configuration(&self) -> Arc<DispatchConfiguration> {
        Arc::clone(&self.snapshot().configuration)
    }

    /// Whether a secondary deserializer instance is currently held.
    pub fn has_secondary_deserializer(&self) -> bool {
        self.snapshot()
            .secondary
            .as_ref()
            .is_some_and(|s| s.is_bound())
    }

    /// Id of the held secondary deserializer.
    pub fn secondary_deserializer_id(&self) -> Option<String> {
        self.snapshot()
            .secondary
            .as_ref()
            .and_then(|s| s.type_name().map(str::to_string))
    }

    /// Returns a snapshot of current metrics.
    pub fn metrics(&self) -> DispatchMetrics {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn snapshot(&self) -> Arc<DispatchState> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Builder for [`GlueSchemaRegistryKafkaDeserializer`].
pub struct GlueSchemaRegistryKafkaDeserializerBuilder {
    registry_decoder: Arc<dyn RegistryDecoder>,
    formats: Arc<dyn DataFormatDecoderFactory>,
    fallbacks: Option<Arc<FallbackRegistry>>,
}

impl GlueSchemaRegistryKafkaDeserializerBuilder {
    /// Resolve secondary deserializer ids against `registry` instead of
    /// [`FallbackRegistry::global`].
    pub fn fallback_registry(mut self, registry: Arc<FallbackRegistry>) -> Self {
        self.fallbacks = Some(registry);
        self
    }

    /// Build and configure in one step.
    pub fn build(self, configs: &ConfigMap) -> Result<GlueSchemaRegistryKafkaDeserializer, SerDeError> {
        let deserializer = GlueSchemaRegistryKafkaDeserializer {
            registry: RegistryPath {
                decoder: self.registry_decoder,
                formats: self.formats,
            },
            fallbacks: self.fallbacks.unwrap_or_else(FallbackRegistry::global),
            state: RwLock::new(Arc::new(DispatchState {
                configuration: Arc::new(DispatchConfiguration::default()),
                secondary: None,
            })),
            metrics: Arc::new(Mutex::new(DispatchMetrics::default())),
        };
        deserializer.configure(configs)?;
        Ok(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_by_first_byte() {
        assert!(!should_use_secondary(&[HEADER_VERSION_BYTE, 0x00]));
        assert!(!should_use_secondary(&[HEADER_VERSION_BYTE]));
        assert!(should_use_secondary(&[0x00, HEADER_VERSION_BYTE]));
        assert!(should_use_secondary(&[0x04]));
        assert!(should_use_secondary(&[]));
    }
}
