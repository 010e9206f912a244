//! In-memory schema store implementing [`RegistryDecoder`].
//!
//! Suitable for testing, CLI use, and deployments where the schema set is
//! known up front. Thread-safe via `Arc<RwLock<Inner>>`.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use gsrserde_core::{BoxError, RegistryDecoder, RegistryError, SchemaDescriptor};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::wire::WireFrame;

#[derive(Default)]
struct Inner {
    /// Schema version id → schema
    schemas: HashMap<Uuid, SchemaDescriptor>,
}

/// One entry of a JSON schema file.
#[derive(Debug, Deserialize)]
struct SchemaEntry {
    id: Uuid,
    #[serde(flatten)]
    descriptor: SchemaDescriptor,
}

/// Thread-safe in-memory schema registry.
#[derive(Clone, Default)]
pub struct MemorySchemaRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl MemorySchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema under its schema version id.
    pub fn add(&self, id: Uuid, schema: SchemaDescriptor) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.schemas.contains_key(&id) {
            return Err(RegistryError::AlreadyExists { id: id.to_string() });
        }
        debug!("registered schema {} ({}) as {id}", schema.schema_name, schema.data_format);
        inner.schemas.insert(id, schema);
        Ok(())
    }

    pub fn get(&self, id: &Uuid) -> Option<SchemaDescriptor> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .schemas
            .get(id)
            .cloned()
    }

    /// Load a JSON array of `{ "id", "schema_name", "schema_def", "data_format" }`
    /// objects. Returns the number of schemas added.
    pub fn load_json(&self, json: &str) -> Result<usize, RegistryError> {
        let entries: Vec<SchemaEntry> = serde_json::from_str(json)?;
        let count = entries.len();
        for entry in entries {
            self.add(entry.id, entry.descriptor)?;
        }
        Ok(count)
    }

    /// Returns the total number of schemas stored.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .schemas
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RegistryDecoder for MemorySchemaRegistry {
    fn can_decode(&self, data: &[u8]) -> bool {
        WireFrame::parse(data).is_ok()
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, BoxError> {
        let frame = WireFrame::parse(data)?;
        Ok(frame.uncompressed_body()?.to_vec())
    }

    fn decode_schema(&self, data: &[u8]) -> Result<SchemaDescriptor, BoxError> {
        let frame = WireFrame::parse(data)?;
        self.get(&frame.schema_version_id).ok_or_else(|| {
            RegistryError::SchemaNotFound {
                id: frame.schema_version_id.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsrserde_core::DataFormat;

    fn employee() -> SchemaDescriptor {
        SchemaDescriptor::new("Employee", r#"{"type":"object"}"#, DataFormat::Json)
    }

    #[test]
    fn add_and_get() {
        let reg = MemorySchemaRegistry::new();
        let id = Uuid::new_v4();
        reg.add(id, employee()).unwrap();
        assert_eq!(reg.get(&id), Some(employee()));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn duplicate_id_rejected() {
        let reg = MemorySchemaRegistry::new();
        let id = Uuid::new_v4();
        reg.add(id, employee()).unwrap();
        assert!(matches!(
            reg.add(id, employee()).unwrap_err(),
            RegistryError::AlreadyExists { .. }
        ));
    }

    #[test]
    fn load_json_entries() {
        let reg = MemorySchemaRegistry::new();
        let n = reg
            .load_json(
                r#"[
                    {"id": "b7b4a7f0-0ba0-4bd4-a1cb-3b4e0f7a8a11", "schema_name": "Order",
                     "schema_def": "{}", "data_format": "JSON"},
                    {"id": "0c2a5a4e-1f4a-4c43-9a0c-7f0e3c0d2b22", "schema_name": "Trade.proto",
                     "schema_def": "", "data_format": "PROTOBUF", "additional_info": "Trade"}
                ]"#,
            )
            .unwrap();
        assert_eq!(n, 2);
        let id = Uuid::parse_str("0c2a5a4e-1f4a-4c43-9a0c-7f0e3c0d2b22").unwrap();
        let trade = reg.get(&id).unwrap();
        assert_eq!(trade.data_format, DataFormat::Protobuf);
        assert_eq!(trade.additional_info.as_deref(), Some("Trade"));
    }

    #[test]
    fn decode_and_decode_schema() {
        let reg = MemorySchemaRegistry::new();
        let id = Uuid::new_v4();
        reg.add(id, employee()).unwrap();

        let bytes = WireFrame::encode(id, b"{}");
        assert!(reg.can_decode(&bytes));
        assert_eq!(reg.decode(&bytes).unwrap(), b"{}");
        assert_eq!(reg.decode_schema(&bytes).unwrap(), employee());
    }

    #[test]
    fn unknown_schema_id() {
        let reg = MemorySchemaRegistry::new();
        let bytes = WireFrame::encode(Uuid::new_v4(), b"{}");
        assert!(reg.can_decode(&bytes));
        assert!(reg.decode_schema(&bytes).is_err());
    }

    #[test]
    fn cannot_decode_non_frames() {
        let reg = MemorySchemaRegistry::new();
        assert!(!reg.can_decode(&[0x03, 0x00]));
        assert!(!reg.can_decode(b"plain text payload that is long"));
    }
}
