//! The secondary deserializer binding.
//!
//! A [`SecondaryDeserializer`] resolves a fallback deserializer by id from a
//! [`FallbackRegistry`], checks its declared capability tags, and holds the
//! single instance used for every non-registry payload afterwards.

use std::sync::Arc;

use bytes::Bytes;
use futures::FutureExt;
use gsrserde_core::{
    DecodeFuture, DecodedValue, SecondaryDeserializerSetting, SerDeError, SerializationContext,
};
use tracing::{debug, warn};

use crate::capability::{Capabilities, FallbackInstance};
use crate::registry::FallbackRegistry;

#[derive(Debug, Clone)]
enum BindingState {
    Unbound,
    Bound {
        id: String,
        capabilities: Capabilities,
        instance: FallbackInstance,
    },
}

/// Holds one resolved fallback deserializer.
#[derive(Debug, Clone)]
pub struct SecondaryDeserializer {
    registry: Arc<FallbackRegistry>,
    state: BindingState,
}

impl SecondaryDeserializer {
    /// An unbound binding resolving ids against `registry`.
    pub fn build(registry: Arc<FallbackRegistry>) -> Self {
        Self {
            registry,
            state: BindingState::Unbound,
        }
    }

    /// Resolve and instantiate the configured deserializer.
    ///
    /// Returns `Ok(true)` when the resolved registration declares at least one
    /// deserializer capability and `Ok(false)` otherwise. The instance is held
    /// in both cases; callers gate on the boolean.
    ///
    /// Any error leaves the binding unbound.
    pub fn validate_and_init(
        &mut self,
        setting: &SecondaryDeserializerSetting,
    ) -> Result<bool, SerDeError> {
        self.state = BindingState::Unbound;

        let id = match setting {
            SecondaryDeserializerSetting::Absent => {
                return Err(SerDeError::invalid_configuration(
                    SerDeError::SECONDARY_NOT_CONFIGURED,
                ))
            }
            SecondaryDeserializerSetting::Null => {
                return Err(SerDeError::invalid_configuration(
                    SerDeError::INVALID_SECONDARY_CONFIGURATION,
                ))
            }
            SecondaryDeserializerSetting::Named(id) => id,
        };

        let (capabilities, instance) = self.registry.resolve(id)?;
        let compatible = capabilities.is_kafka_compatible();
        if compatible {
            debug!(%id, %capabilities, "bound secondary deserializer");
        } else {
            warn!("secondary deserializer {id} declares no deserializer capability");
        }

        self.state = BindingState::Bound {
            id: id.clone(),
            capabilities,
            instance,
        };
        Ok(compatible)
    }

    /// Drop the held instance. Later decodes fail with `NotBound`.
    pub fn clear(&mut self) {
        self.state = BindingState::Unbound;
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.state, BindingState::Bound { .. })
    }

    /// Id of the bound deserializer.
    pub fn type_name(&self) -> Option<&str> {
        match &self.state {
            BindingState::Bound { id, .. } => Some(id),
            BindingState::Unbound => None,
        }
    }

    /// Declared capabilities of the bound deserializer.
    pub fn capabilities(&self) -> Option<Capabilities> {
        match &self.state {
            BindingState::Bound { capabilities, .. } => Some(*capabilities),
            BindingState::Unbound => None,
        }
    }

    fn instance(&self) -> Result<&FallbackInstance, SerDeError> {
        match &self.state {
            BindingState::Bound { instance, .. } => Ok(instance),
            BindingState::Unbound => Err(SerDeError::not_bound()),
        }
    }

    /// Blocking decode through the held instance.
    pub fn deserialize(
        &self,
        data: &[u8],
        is_null: bool,
        ctx: &SerializationContext,
    ) -> Result<Option<DecodedValue>, SerDeError> {
        let sync = self
            .instance()?
            .as_sync()
            .ok_or_else(|| SerDeError::delegation_failure(None))?;
        sync.deserialize(data, is_null, ctx)
            .map_err(|e| SerDeError::delegation_failure(Some(e)))
    }

    /// Non-blocking decode through the held instance.
    ///
    /// Missing binding or capability is reported before any future is built.
    /// The returned future runs the instance's own async decode; its failures
    /// surface as `DelegationFailure`.
    pub fn deserialize_async(
        &self,
        data: Bytes,
        is_null: bool,
        ctx: SerializationContext,
    ) -> Result<DecodeFuture, SerDeError> {
        let asynchronous = self
            .instance()?
            .as_async()
            .cloned()
            .ok_or_else(|| SerDeError::delegation_failure(None))?;
        Ok(async move {
            asynchronous
                .deserialize_async(data, is_null, &ctx)
                .await
                .map_err(|e| SerDeError::delegation_failure(Some(e)))
        }
        .boxed())
    }
}
