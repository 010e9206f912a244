//! Declared capability tags and the instantiated fallback object.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use gsrserde_core::{AsyncDeserializer, Deserializer};

/// Capability tags a fallback registration declares up front.
///
/// A registration is "from Kafka" when it declares at least one of the two
/// deserializer capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Capabilities {
    sync: bool,
    asynchronous: bool,
}

impl Capabilities {
    pub const NONE: Self = Self { sync: false, asynchronous: false };
    pub const SYNC: Self = Self { sync: true, asynchronous: false };
    pub const ASYNC: Self = Self { sync: false, asynchronous: true };
    pub const BOTH: Self = Self { sync: true, asynchronous: true };

    pub fn supports_sync(&self) -> bool {
        self.sync
    }

    pub fn supports_async(&self) -> bool {
        self.asynchronous
    }

    /// `true` if at least one Kafka deserializer capability is declared.
    pub fn is_kafka_compatible(&self) -> bool {
        self.sync || self.asynchronous
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match (self.sync, self.asynchronous) {
            (true, true) => "sync+async",
            (true, false) => "sync",
            (false, true) => "async",
            (false, false) => "none",
        };
        f.write_str(s)
    }
}

/// An instantiated fallback deserializer.
///
/// Holds whichever deserializer capabilities the object actually provides.
/// An instance built with [`FallbackInstance::opaque`] provides neither.
#[derive(Clone, Default)]
pub struct FallbackInstance {
    sync: Option<Arc<dyn Deserializer>>,
    asynchronous: Option<Arc<dyn AsyncDeserializer>>,
    opaque: Option<Arc<dyn Any + Send + Sync>>,
}

impl FallbackInstance {
    /// An instance implementing only the blocking capability.
    pub fn sync<T: Deserializer + 'static>(deserializer: T) -> Self {
        let sync: Arc<dyn Deserializer> = Arc::new(deserializer);
        Self {
            sync: Some(sync),
            ..Self::default()
        }
    }

    /// An instance implementing only the non-blocking capability.
    pub fn asynchronous<T: AsyncDeserializer + 'static>(deserializer: T) -> Self {
        let asynchronous: Arc<dyn AsyncDeserializer> = Arc::new(deserializer);
        Self {
            asynchronous: Some(asynchronous),
            ..Self::default()
        }
    }

    /// An instance implementing both capabilities, sharing one object.
    pub fn both<T: Deserializer + AsyncDeserializer + 'static>(deserializer: T) -> Self {
        let shared = Arc::new(deserializer);
        let sync: Arc<dyn Deserializer> = shared.clone();
        let asynchronous: Arc<dyn AsyncDeserializer> = shared;
        Self {
            sync: Some(sync),
            asynchronous: Some(asynchronous),
            opaque: None,
        }
    }

    /// An object that implements no deserializer capability at all.
    pub fn opaque<T: Any + Send + Sync>(object: T) -> Self {
        Self {
            opaque: Some(Arc::new(object)),
            ..Self::default()
        }
    }

    pub fn as_sync(&self) -> Option<&Arc<dyn Deserializer>> {
        self.sync.as_ref()
    }

    pub fn as_async(&self) -> Option<&Arc<dyn AsyncDeserializer>> {
        self.asynchronous.as_ref()
    }

    /// The opaque object, if this instance was built with [`opaque`](Self::opaque).
    pub fn as_any(&self) -> Option<&(dyn Any + Send + Sync)> {
        self.opaque.as_deref()
    }

    /// Capabilities the object really provides (may differ from what was declared).
    pub fn provided(&self) -> Capabilities {
        Capabilities {
            sync: self.sync.is_some(),
            asynchronous: self.asynchronous.is_some(),
        }
    }
}

impl fmt::Debug for FallbackInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackInstance")
            .field("provided", &self.provided())
            .field("opaque", &self.opaque.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{ByteArrayDeserializer, JsonDeserializer};

    #[test]
    fn capability_flags() {
        assert!(!Capabilities::NONE.is_kafka_compatible());
        assert!(Capabilities::SYNC.is_kafka_compatible());
        assert!(Capabilities::ASYNC.is_kafka_compatible());
        assert!(Capabilities::BOTH.supports_sync() && Capabilities::BOTH.supports_async());
        assert_eq!(Capabilities::BOTH.to_string(), "sync+async");
        assert_eq!(Capabilities::NONE.to_string(), "none");
    }

    #[test]
    fn provided_reflects_constructor() {
        assert_eq!(FallbackInstance::sync(JsonDeserializer).provided(), Capabilities::SYNC);
        assert_eq!(
            FallbackInstance::both(ByteArrayDeserializer).provided(),
            Capabilities::BOTH
        );
        let opaque = FallbackInstance::opaque(String::from("not a deserializer"));
        assert_eq!(opaque.provided(), Capabilities::NONE);
        assert!(opaque.as_any().is_some());
        assert!(opaque.as_sync().is_none());
    }
}
