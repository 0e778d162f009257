use std::any::type_name;
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::serialization::errors::SerializationError;
use crate::serialization::event_dispatcher::{EventDispatcher, SerializationEvent, SerializationEventKind};
use crate::serialization::handler_registry::HandlerRegistry;
use crate::serialization::metadata_locator::MetadataLocator;
use crate::serialization::naming::{translate_keys, PropertyNamingStrategy};

/// The configured serializer produced by [`SerializerBuilder::build`].
///
/// The runtime is intentionally thin: handlers override serde_json on a
/// per-type basis, subscribers observe and may rewrite the value tree, and
/// the naming strategy rewrites serialized field names.
///
/// [`SerializerBuilder::build`]: crate::serialization::SerializerBuilder::build
pub struct Serializer {
  cache_dir: Option<PathBuf>,
  debug: bool,
  naming_strategy: Arc<dyn PropertyNamingStrategy>,
  metadata: MetadataLocator,
  handlers: Arc<HandlerRegistry>,
  events: Arc<EventDispatcher>,
}

impl Serializer {
  pub(crate) fn from_parts(
    cache_dir: Option<PathBuf>,
    debug: bool,
    naming_strategy: Arc<dyn PropertyNamingStrategy>,
    metadata: MetadataLocator,
    handlers: Arc<HandlerRegistry>,
    events: Arc<EventDispatcher>,
  ) -> Self {
    debug!(
      handlers = handlers.len(),
      subscribers = events.len(),
      metadata_dirs = metadata.directories().len(),
      "serializer built"
    );
    Serializer {
      cache_dir,
      debug,
      naming_strategy,
      metadata,
      handlers,
      events,
    }
  }

  pub fn cache_dir(&self) -> Option<&Path> {
    self.cache_dir.as_deref()
  }

  pub fn debug(&self) -> bool {
    self.debug
  }

  pub fn metadata(&self) -> &MetadataLocator {
    &self.metadata
  }

  pub fn handler_registry(&self) -> &HandlerRegistry {
    &self.handlers
  }

  pub fn event_dispatcher(&self) -> &EventDispatcher {
    &self.events
  }

  pub fn serialize<T>(&self, value: &T) -> Result<String, SerializationError>
  where
    T: Serialize + Send + Sync + 'static, {
    let type_name = type_name::<T>();
    let payload = match self.handlers.handler_for(type_name) {
      Some(handler) => handler.serialize(value)?,
      None => serde_json::to_value(value).map_err(|e| SerializationError::SerializeFailed(e.to_string()))?,
    };

    let mut event = SerializationEvent::new(SerializationEventKind::PreSerialize, type_name, payload);
    self.events.dispatch(&mut event);

    let translated = translate_keys(self.naming_strategy.as_ref(), event.into_payload());
    let mut event = SerializationEvent::new(SerializationEventKind::PostSerialize, type_name, translated);
    self.events.dispatch(&mut event);

    let rendered = if self.debug {
      serde_json::to_string_pretty(event.payload())
    } else {
      serde_json::to_string(event.payload())
    }
    .map_err(|e| SerializationError::SerializeFailed(e.to_string()))?;
    debug!(type_name, bytes = rendered.len(), "value serialized");
    Ok(rendered)
  }

  pub fn deserialize<T>(&self, data: &str) -> Result<T, SerializationError>
  where
    T: DeserializeOwned + Send + Sync + 'static, {
    let type_name = type_name::<T>();
    let value: Value = serde_json::from_str(data).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))?;

    let mut event = SerializationEvent::new(SerializationEventKind::PreDeserialize, type_name, value);
    self.events.dispatch(&mut event);
    let value = event.into_payload();

    let result = match self.handlers.handler_for(type_name) {
      Some(handler) => {
        let boxed = handler.deserialize(&value)?;
        *boxed
          .downcast::<T>()
          .map_err(|_| SerializationError::InvalidHandlerPayload {
            type_name: type_name.to_string(),
            reason: "handler returned a different type".to_string(),
          })?
      }
      None => {
        serde_json::from_value(value.clone()).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))?
      }
    };

    let mut event = SerializationEvent::new(SerializationEventKind::PostDeserialize, type_name, value);
    self.events.dispatch(&mut event);
    Ok(result)
  }
}

impl Debug for Serializer {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Serializer")
      .field("cache_dir", &self.cache_dir)
      .field("debug", &self.debug)
      .field("metadata", &self.metadata)
      .field("handlers", &self.handlers)
      .field("events", &self.events)
      .finish()
  }
}

static_assertions::assert_impl_all!(Serializer: Send, Sync);
