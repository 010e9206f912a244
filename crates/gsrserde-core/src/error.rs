//! Error types for the GsrSerDe decode pipeline.

use std::fmt;
use thiserror::Error;

/// Boxed error used wherever a collaborator or third-party deserializer
/// reports a failure across a trait boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Discriminant of a [`SerDeError`], convenient for matching and metrics tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    InvalidConfiguration,
    ResolutionFailure,
    NotBound,
    DelegationFailure,
    DecodeFailure,
}

impl ErrorKind {
    /// Stable snake_case label (used as a metrics attribute).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration => "invalid_configuration",
            Self::ResolutionFailure => "resolution_failure",
            Self::NotBound => "not_bound",
            Self::DelegationFailure => "delegation_failure",
            Self::DecodeFailure => "decode_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the dispatching deserializer and the secondary
/// deserializer binding.
///
/// Every variant carries a human-readable message; variants that wrap a
/// lower-level failure keep it as `source`.
#[derive(Debug, Error)]
pub enum SerDeError {
    /// The secondary deserializer option is null, or names a type that is not
    /// a Kafka deserializer.
    #[error("{message}")]
    InvalidConfiguration { message: String },

    /// The configured secondary deserializer id cannot be resolved or its
    /// constructor failed.
    #[error("{message}")]
    ResolutionFailure {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A non-registry payload arrived but no secondary deserializer is held.
    #[error("{message}")]
    NotBound { message: String },

    /// The held secondary deserializer lacks the requested capability, or
    /// invoking it failed.
    #[error("{message}")]
    DelegationFailure {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A registry-format payload could not be decoded.
    #[error("{message}")]
    DecodeFailure {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl SerDeError {
    pub const INVALID_SECONDARY_CONFIGURATION: &'static str =
        "Invalid secondary de-serializer configuration.";
    pub const SECONDARY_NOT_CONFIGURED: &'static str =
        "No secondary de-serializer is configured.";
    pub const SECONDARY_NOT_FROM_KAFKA: &'static str =
        "The secondary deserializer is not from Kafka";
    pub const SECONDARY_NOT_RESOLVED: &'static str =
        "Can't find the class or instantiate it.";
    pub const SECONDARY_NOT_FOUND: &'static str = "Didn't find secondary deserializer.";
    pub const SECONDARY_NOT_INVOKED: &'static str =
        "Can't find method called deserialize or invoke it.";
    pub const CANNOT_DECODE: &'static str = "Byte data cannot be decoded";
    pub const REGISTRY_DECODER_PANICKED: &'static str = "Registry decoder panicked";

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub fn resolution_failure(message: impl Into<String>, source: Option<BoxError>) -> Self {
        Self::ResolutionFailure {
            message: message.into(),
            source,
        }
    }

    pub fn not_bound() -> Self {
        Self::NotBound {
            message: Self::SECONDARY_NOT_FOUND.into(),
        }
    }

    pub fn delegation_failure(source: Option<BoxError>) -> Self {
        Self::DelegationFailure {
            message: Self::SECONDARY_NOT_INVOKED.into(),
            source,
        }
    }

    pub fn decode_failure(message: impl Into<String>, source: Option<BoxError>) -> Self {
        Self::DecodeFailure {
            message: message.into(),
            source,
        }
    }

    /// Returns the discriminant of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfiguration { .. } => ErrorKind::InvalidConfiguration,
            Self::ResolutionFailure { .. } => ErrorKind::ResolutionFailure,
            Self::NotBound { .. } => ErrorKind::NotBound,
            Self::DelegationFailure { .. } => ErrorKind::DelegationFailure,
            Self::DecodeFailure { .. } => ErrorKind::DecodeFailure,
        }
    }

    /// The human-readable message, without the cause chain.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidConfiguration { message }
            | Self::ResolutionFailure { message, .. }
            | Self::NotBound { message }
            | Self::DelegationFailure { message, .. }
            | Self::DecodeFailure { message, .. } => message,
        }
    }
}

/// Errors from the reference registry collaborators (wire frame parsing,
/// schema store, data-format decoders).
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Frame too short: {len} bytes, need at least {min}")]
    FrameTooShort { len: usize, min: usize },

    #[error("Unknown header version byte: {0:#04x}")]
    UnknownHeaderVersion(u8),

    #[error("Unsupported compression byte: {0:#04x}")]
    UnsupportedCompression(u8),

    #[error("Schema version {id} not found")]
    SchemaNotFound { id: String },

    #[error("Schema version {id} already exists")]
    AlreadyExists { id: String },

    #[error("No decoder registered for data format {format}")]
    UnsupportedDataFormat { format: String },

    #[error("Invalid schema version id: {0}")]
    InvalidSchemaVersionId(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
