//! Dispatcher configuration.
//!
//! Built once from a string → value mapping and never mutated afterwards;
//! reconfiguring builds a fresh [`DispatchConfiguration`] and replaces the old
//! one as a whole.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::SerDeError;
use crate::schema::DataFormat;

/// Raw configuration options as handed over by the Kafka client.
pub type ConfigMap = HashMap<String, Value>;

/// Recognised option keys.
pub mod keys {
    /// Id of the secondary deserializer used for non-registry payloads.
    pub const SECONDARY_DESERIALIZER: &str = "secondaryDeserializer";
    pub const DATA_FORMAT: &str = "dataFormat";
    pub const COMPRESSION_TYPE: &str = "compressionType";
    pub const REGION: &str = "region";
    pub const ENDPOINT: &str = "endpoint";
    pub const REGISTRY_NAME: &str = "registry.name";
}

/// State of the secondary deserializer option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "id", rename_all = "snake_case")]
pub enum SecondaryDeserializerSetting {
    /// The key is not present at all.
    #[default]
    Absent,
    /// The key is present with a null value.
    Null,
    /// The key names a deserializer id.
    Named(String),
}

impl SecondaryDeserializerSetting {
    pub fn from_map(configs: &ConfigMap) -> Self {
        match configs.get(keys::SECONDARY_DESERIALIZER) {
            None => Self::Absent,
            Some(Value::Null) => Self::Null,
            Some(Value::String(id)) => Self::Named(id.clone()),
            // Non-string scalars are looked up by their textual form.
            Some(other) => Self::Named(other.to_string()),
        }
    }

    /// Whether the option key was supplied at all.
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

/// Compression applied to registry payload bodies by the producer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompressionType {
    #[default]
    None,
    Zlib,
}

/// Immutable dispatcher configuration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchConfiguration {
    secondary_deserializer: SecondaryDeserializerSetting,
    data_format: Option<DataFormat>,
    compression: CompressionType,
    region: Option<String>,
    endpoint: Option<String>,
    registry_name: Option<String>,
    raw: ConfigMap,
}

impl DispatchConfiguration {
    /// Build a configuration from raw options.
    ///
    /// Unknown keys are kept verbatim in [`raw`](Self::raw) for collaborators.
    pub fn from_map(configs: &ConfigMap) -> Result<Self, SerDeError> {
        let data_format = match optional_string(configs, keys::DATA_FORMAT)? {
            Some(s) => Some(s.parse::<DataFormat>().map_err(|e| {
                SerDeError::invalid_configuration(format!("Invalid {}: {e}", keys::DATA_FORMAT))
            })?),
            None => None,
        };

        let compression = match optional_string(configs, keys::COMPRESSION_TYPE)? {
            None => CompressionType::None,
            Some(s) => match s.trim().to_ascii_uppercase().as_str() {
                "NONE" => CompressionType::None,
                "ZLIB" => CompressionType::Zlib,
                _ => {
                    return Err(SerDeError::invalid_configuration(format!(
                        "Invalid {}: '{s}'",
                        keys::COMPRESSION_TYPE
                    )))
                }
            },
        };

        Ok(Self {
            secondary_deserializer: SecondaryDeserializerSetting::from_map(configs),
            data_format,
            compression,
            region: optional_string(configs, keys::REGION)?,
            endpoint: optional_string(configs, keys::ENDPOINT)?,
            registry_name: optional_string(configs, keys::REGISTRY_NAME)?,
            raw: configs.clone(),
        })
    }

    pub fn secondary_deserializer(&self) -> &SecondaryDeserializerSetting {
        &self.secondary_deserializer
    }

    pub fn data_format(&self) -> Option<DataFormat> {
        self.data_format
    }

    pub fn compression(&self) -> CompressionType {
        self.compression
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn registry_name(&self) -> Option<&str> {
        self.registry_name.as_deref()
    }

    /// All options exactly as supplied.
    pub fn raw(&self) -> &ConfigMap {
        &self.raw
    }

    /// A single raw option.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }
}

/// Read a string option; null counts as absent, other types are rejected.
fn optional_string(configs: &ConfigMap, key: &str) -> Result<Option<String>, SerDeError> {
    match configs.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(SerDeError::invalid_configuration(format!(
            "Invalid {key}: expected a string, got {other}"
        ))),
    }
}
