//! Id → constructor table for secondary deserializers.
//!
//! Every registration declares its capability tags up front, so binding a
//! secondary deserializer is a map lookup plus a tag check.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use gsrserde_core::{AsyncDeserializer, BoxError, Deserializer, SerDeError};
use thiserror::Error;
use tracing::debug;

use crate::builtin::register_builtins;
use crate::capability::{Capabilities, FallbackInstance};

/// Errors raised while registering or looking up a secondary deserializer.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Secondary deserializer id must not be empty")]
    EmptyId,

    #[error("Secondary deserializer '{id}' is already registered")]
    AlreadyRegistered { id: String },

    #[error("No secondary deserializer registered under '{id}'")]
    NotRegistered { id: String },
}

type Factory = Arc<dyn Fn() -> Result<FallbackInstance, BoxError> + Send + Sync>;

#[derive(Clone)]
struct Registration {
    capabilities: Capabilities,
    factory: Factory,
}

/// Thread-safe registry of secondary deserializer constructors.
pub struct FallbackRegistry {
    entries: RwLock<HashMap<String, Registration>>,
}

impl FallbackRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// A registry pre-populated with the stock deserializers in [`crate::builtin`].
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        register_builtins(&registry);
        registry
    }

    /// Process-wide registry, populated with the built-ins on first use.
    pub fn global() -> Arc<FallbackRegistry> {
        static GLOBAL: OnceLock<Arc<FallbackRegistry>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(FallbackRegistry::with_builtins()))
            .clone()
    }

    /// Register a zero-argument constructor under `id`.
    ///
    /// `capabilities` is what the registration claims to implement; it is what
    /// binding validates against.
    pub fn register<F>(
        &self,
        id: impl Into<String>,
        capabilities: Capabilities,
        factory: F,
    ) -> Result<(), RegistrationError>
    where
        F: Fn() -> Result<FallbackInstance, BoxError> + Send + Sync + 'static,
    {
        let id = id.into();
        if id.is_empty() {
            return Err(RegistrationError::EmptyId);
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&id) {
            return Err(RegistrationError::AlreadyRegistered { id });
        }
        debug!(%id, %capabilities, "registered secondary deserializer");
        entries.insert(
            id,
            Registration {
                capabilities,
                factory: Arc::new(factory),
            },
        );
        Ok(())
    }

    /// Register a blocking deserializer built with `T::default()`.
    pub fn register_sync<T>(&self, id: impl Into<String>) -> Result<(), RegistrationError>
    where
        T: Deserializer + Default + 'static,
    {
        self.register(id, Capabilities::SYNC, || Ok(FallbackInstance::sync(T::default())))
    }

    /// Register a non-blocking deserializer built with `T::default()`.
    pub fn register_async<T>(&self, id: impl Into<String>) -> Result<(), RegistrationError>
    where
        T: AsyncDeserializer + Default + 'static,
    {
        self.register(id, Capabilities::ASYNC, || {
            Ok(FallbackInstance::asynchronous(T::default()))
        })
    }

    /// Register a deserializer implementing both capabilities.
    pub fn register_both<T>(&self, id: impl Into<String>) -> Result<(), RegistrationError>
    where
        T: Deserializer + AsyncDeserializer + Default + 'static,
    {
        self.register(id, Capabilities::BOTH, || Ok(FallbackInstance::both(T::default())))
    }

    /// Look up `id` and run its constructor.
    ///
    /// Fails with `ResolutionFailure` when the id is unknown (the empty id
    /// included) or the constructor returns an error.
    pub fn resolve(&self, id: &str) -> Result<(Capabilities, FallbackInstance), SerDeError> {
        let registration = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| {
                SerDeError::resolution_failure(
                    SerDeError::SECONDARY_NOT_RESOLVED,
                    Some(Box::new(RegistrationError::NotRegistered { id: id.to_string() })),
                )
            })?;

        // A panicking constructor is a resolution failure, not a crash.
        let built = panic::catch_unwind(AssertUnwindSafe(|| (registration.factory)()))
            .unwrap_or_else(|_| Err(format!("constructor for '{id}' panicked").into()));
        let instance = built
            .map_err(|e| SerDeError::resolution_failure(SerDeError::SECONDARY_NOT_RESOLVED, Some(e)))?;
        Ok((registration.capabilities, instance))
    }

    /// Declared capabilities of `id`, without instantiating it.
    pub fn capabilities_of(&self, id: &str) -> Option<Capabilities> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map(|r| r.capabilities)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.capabilities_of(id).is_some()
    }

    /// All registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<String> = entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{self, ByteArrayDeserializer};
    use gsrserde_core::ErrorKind;

    #[test]
    fn builtins_present() {
        let reg = FallbackRegistry::with_builtins();
        assert_eq!(
            reg.ids(),
            vec![builtin::BYTE_ARRAY, builtin::JSON, builtin::UTF8]
        );
        assert_eq!(reg.capabilities_of(builtin::JSON), Some(Capabilities::SYNC));
        assert_eq!(reg.capabilities_of(builtin::BYTE_ARRAY), Some(Capabilities::BOTH));
    }

    #[test]
    fn duplicate_rejected() {
        let reg = FallbackRegistry::new();
        reg.register_sync::<ByteArrayDeserializer>("bytes").unwrap();
        let err = reg.register_sync::<ByteArrayDeserializer>("bytes").unwrap_err();
        assert!(matches!(err, RegistrationError::AlreadyRegistered { .. }));
    }

    #[test]
    fn empty_id_rejected() {
        let reg = FallbackRegistry::new();
        let err = reg.register_sync::<ByteArrayDeserializer>("").unwrap_err();
        assert!(matches!(err, RegistrationError::EmptyId));
    }

    #[test]
    fn resolve_unknown_is_resolution_failure() {
        let reg = FallbackRegistry::with_builtins();
        let err = reg.resolve("com.example.Missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResolutionFailure);
        assert_eq!(err.to_string(), SerDeError::SECONDARY_NOT_RESOLVED);
    }

    #[test]
    fn resolve_failing_constructor() {
        let reg = FallbackRegistry::new();
        reg.register("broken", Capabilities::SYNC, || Err("boom".into()))
            .unwrap();
        let err = reg.resolve("broken").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResolutionFailure);
    }

    #[test]
    fn resolve_panicking_constructor() {
        let reg = FallbackRegistry::new();
        reg.register("panics", Capabilities::SYNC, || panic!("no zero-arg constructor"))
            .unwrap();
        let err = reg.resolve("panics").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResolutionFailure);
    }

    #[test]
    fn resolve_runs_constructor_each_time() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let reg = FallbackRegistry::new();
        reg.register("counted", Capabilities::SYNC, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(FallbackInstance::sync(ByteArrayDeserializer))
        })
        .unwrap();
        reg.resolve("counted").unwrap();
        reg.resolve("counted").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn global_is_shared() {
        let a = FallbackRegistry::global();
        let b = FallbackRegistry::global();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.contains(builtin::UTF8));
    }
}
