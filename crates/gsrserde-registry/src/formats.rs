//! Data-format decoder table.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use gsrserde_core::{
    BoxError, DataFormat, DataFormatDecoder, DataFormatDecoderFactory, DecodedValue,
    DispatchConfiguration, RegistryError, SchemaDescriptor,
};
use tracing::trace;

/// Decodes JSON payload bodies into [`DecodedValue::Json`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDataFormatDecoder;

impl DataFormatDecoder for JsonDataFormatDecoder {
    fn deserialize(&self, body: &[u8], schema: &SchemaDescriptor) -> Result<DecodedValue, BoxError> {
        trace!("decoding {} byte JSON body for {}", body.len(), schema.schema_name);
        let value: serde_json::Value = serde_json::from_slice(body).map_err(RegistryError::from)?;
        Ok(DecodedValue::Json(value))
    }
}

/// Per-format decoder table. JSON is available out of the box; Avro and
/// Protobuf decoders are supplied by the application via
/// [`register`](Self::register).
pub struct DefaultDataFormatDecoderFactory {
    decoders: RwLock<HashMap<DataFormat, Arc<dyn DataFormatDecoder>>>,
}

impl DefaultDataFormatDecoderFactory {
    pub fn new() -> Self {
        let mut decoders: HashMap<DataFormat, Arc<dyn DataFormatDecoder>> = HashMap::new();
        decoders.insert(DataFormat::Json, Arc::new(JsonDataFormatDecoder));
        Self {
            decoders: RwLock::new(decoders),
        }
    }

    /// Install (or replace) the decoder for `format`.
    pub fn register(&self, format: DataFormat, decoder: Arc<dyn DataFormatDecoder>) {
        self.decoders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(format, decoder);
    }

    pub fn supports(&self, format: DataFormat) -> bool {
        self.decoders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&format)
    }
}

impl Default for DefaultDataFormatDecoderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl DataFormatDecoderFactory for DefaultDataFormatDecoderFactory {
    fn get_decoder(
        &self,
        format: DataFormat,
        config: &DispatchConfiguration,
    ) -> Result<Arc<dyn DataFormatDecoder>, BoxError> {
        if let Some(configured) = config.data_format() {
            if configured != format {
                trace!("payload format {format} differs from configured {configured}");
            }
        }
        self.decoders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&format)
            .cloned()
            .ok_or_else(|| {
                RegistryError::UnsupportedDataFormat {
                    format: format.to_string(),
                }
                .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl DataFormatDecoder for Upper {
        fn deserialize(&self, body: &[u8], _: &SchemaDescriptor) -> Result<DecodedValue, BoxError> {
            Ok(DecodedValue::Text(String::from_utf8_lossy(body).to_uppercase()))
        }
    }

    fn config() -> DispatchConfiguration {
        DispatchConfiguration::default()
    }

    #[test]
    fn json_is_built_in() {
        let factory = DefaultDataFormatDecoderFactory::new();
        assert!(factory.supports(DataFormat::Json));
        let schema = SchemaDescriptor::new("Employee", "{}", DataFormat::Json);
        let decoder = factory.get_decoder(DataFormat::Json, &config()).unwrap();
        let value = decoder.deserialize(br#"{"id": 7}"#, &schema).unwrap();
        assert_eq!(value.as_json().unwrap()["id"], 7);
    }

    #[test]
    fn invalid_json_body_is_error() {
        let schema = SchemaDescriptor::new("Employee", "{}", DataFormat::Json);
        assert!(JsonDataFormatDecoder.deserialize(b"{", &schema).is_err());
    }

    #[test]
    fn unregistered_format() {
        let factory = DefaultDataFormatDecoderFactory::new();
        let err = factory.get_decoder(DataFormat::Avro, &config()).err().unwrap();
        assert_eq!(err.to_string(), "No decoder registered for data format AVRO");
    }

    #[test]
    fn register_custom_decoder() {
        let factory = DefaultDataFormatDecoderFactory::new();
        factory.register(DataFormat::Protobuf, Arc::new(Upper));
        let schema = SchemaDescriptor::new("Trade.proto", "", DataFormat::Protobuf);
        let decoder = factory.get_decoder(DataFormat::Protobuf, &config()).unwrap();
        assert_eq!(
            decoder.deserialize(b"abc", &schema).unwrap(),
            DecodedValue::Text("ABC".into())
        );
    }
}
