//! # gsrserde-fallback
//!
//! Secondary deserializers for payloads that are not in the schema registry
//! wire format.
//!
//! Implementations are registered under a string id together with the
//! capability tags they declare (blocking, non-blocking or both). A
//! [`SecondaryDeserializer`] resolves one id at configuration time, checks
//! the tags and keeps the instance for every later decode.
//!
//! ```
//! use gsrserde_core::{SecondaryDeserializerSetting, SerializationContext};
//! use gsrserde_fallback::{builtin, FallbackRegistry, SecondaryDeserializer};
//!
//! let mut binding = SecondaryDeserializer::build(FallbackRegistry::global());
//! let setting = SecondaryDeserializerSetting::Named(builtin::UTF8.to_string());
//! assert!(binding.validate_and_init(&setting).unwrap());
//!
//! let value = binding
//!     .deserialize(b"legacy", false, &SerializationContext::value("orders"))
//!     .unwrap();
//! assert_eq!(value.unwrap().as_text(), Some("legacy"));
//! ```

pub mod binding;
pub mod builtin;
pub mod capability;
pub mod registry;

pub use binding::SecondaryDeserializer;
pub use builtin::{ByteArrayDeserializer, JsonDeserializer, Utf8Deserializer};
pub use capability::{Capabilities, FallbackInstance};
pub use registry::{FallbackRegistry, RegistrationError};
