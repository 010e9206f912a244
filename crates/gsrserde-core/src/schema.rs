//! Schema descriptor types resolved from registry-format payloads.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Data format a registered schema is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataFormat {
    Avro,
    Json,
    Protobuf,
}

impl DataFormat {
    pub const ALL: [DataFormat; 3] = [DataFormat::Avro, DataFormat::Json, DataFormat::Protobuf];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Avro => "AVRO",
            Self::Json => "JSON",
            Self::Protobuf => "PROTOBUF",
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a data format name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDataFormat(pub String);

impl fmt::Display for UnknownDataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown data format '{}'", self.0)
    }
}

impl std::error::Error for UnknownDataFormat {}

impl FromStr for DataFormat {
    type Err = UnknownDataFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AVRO" => Ok(Self::Avro),
            "JSON" => Ok(Self::Json),
            "PROTOBUF" => Ok(Self::Protobuf),
            _ => Err(UnknownDataFormat(s.to_string())),
        }
    }
}

/// The schema associated with a registry-format payload.
///
/// Empty strings are legal for every text field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// Registered schema name, e.g. `"Employee.proto"`.
    pub schema_name: String,
    /// Schema definition text in the schema's own format.
    pub schema_def: String,
    /// Format of the schema and of the payload body.
    pub data_format: DataFormat,
    /// Format-specific extra information (e.g. a protobuf message name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

impl SchemaDescriptor {
    pub fn new(
        schema_name: impl Into<String>,
        schema_def: impl Into<String>,
        data_format: DataFormat,
    ) -> Self {
        Self {
            schema_name: schema_name.into(),
            schema_def: schema_def.into(),
            data_format,
            additional_info: None,
        }
    }

    pub fn with_additional_info(mut self, info: impl Into<String>) -> Self {
        self.additional_info = Some(info.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_data_format_case_insensitive() {
        assert_eq!("avro".parse::<DataFormat>().unwrap(), DataFormat::Avro);
        assert_eq!(" Json ".parse::<DataFormat>().unwrap(), DataFormat::Json);
        assert_eq!("PROTOBUF".parse::<DataFormat>().unwrap(), DataFormat::Protobuf);
        assert!("xml".parse::<DataFormat>().is_err());
    }

    #[test]
    fn descriptor_accessors() {
        let schema = SchemaDescriptor::new(
            "Employee.proto",
            "message Employee { string name = 1; int32 rank = 2;}",
            DataFormat::Protobuf,
        );
        assert_eq!(schema.schema_name, "Employee.proto");
        assert_eq!(schema.data_format.to_string(), "PROTOBUF");
        assert!(schema.additional_info.is_none());
    }

    #[test]
    fn descriptor_accepts_empty_strings() {
        let schema = SchemaDescriptor::new("", "", DataFormat::Json);
        assert_eq!(schema.schema_name, "");
        assert_eq!(schema.schema_def, "");
    }

    #[test]
    fn descriptor_serde_roundtrip() {
        let schema = SchemaDescriptor::new("People", "{}", DataFormat::Avro)
            .with_additional_info("test.People");
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains(r#""data_format":"AVRO""#));
        let back: SchemaDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schema);
    }
}
