use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::serialization::event_dispatcher::EventDispatcher;
use crate::serialization::handler_registry::HandlerRegistry;
use crate::serialization::metadata_locator::{MetadataDirectory, MetadataLocator};
use crate::serialization::naming::{IdenticalPropertyNamingStrategy, PropertyNamingStrategy};
use crate::serialization::serializer_impl::Serializer;

/// Accumulates serializer configuration ahead of a single [`build`] call.
///
/// Metadata directories keep the order they were added in; that order is
/// their lookup precedence. The cache directory is recorded as-is and never
/// created here.
///
/// [`build`]: SerializerBuilder::build
pub struct SerializerBuilder {
  cache_dir: Option<PathBuf>,
  debug: bool,
  naming_strategy: Arc<dyn PropertyNamingStrategy>,
  metadata_dirs: Vec<MetadataDirectory>,
  handler_registry: Option<Arc<HandlerRegistry>>,
  event_dispatcher: Option<Arc<EventDispatcher>>,
}

impl SerializerBuilder {
  pub fn new() -> Self {
    SerializerBuilder {
      cache_dir: None,
      debug: false,
      naming_strategy: Arc::new(IdenticalPropertyNamingStrategy),
      metadata_dirs: Vec::new(),
      handler_registry: None,
      event_dispatcher: None,
    }
  }

  pub fn set_cache_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
    self.cache_dir = Some(dir.into());
    self
  }

  pub fn set_debug(&mut self, debug: bool) -> &mut Self {
    self.debug = debug;
    self
  }

  pub fn set_property_naming_strategy(&mut self, strategy: Arc<dyn PropertyNamingStrategy>) -> &mut Self {
    self.naming_strategy = strategy;
    self
  }

  pub fn add_metadata_dir(&mut self, dir: impl Into<PathBuf>, namespace: impl Into<String>) -> &mut Self {
    self.metadata_dirs.push(MetadataDirectory::new(dir, namespace));
    self
  }

  pub fn set_handler_registry(&mut self, registry: Arc<HandlerRegistry>) -> &mut Self {
    self.handler_registry = Some(registry);
    self
  }

  pub fn set_event_dispatcher(&mut self, dispatcher: Arc<EventDispatcher>) -> &mut Self {
    self.event_dispatcher = Some(dispatcher);
    self
  }

  pub fn cache_dir(&self) -> Option<&Path> {
    self.cache_dir.as_deref()
  }

  pub fn debug(&self) -> bool {
    self.debug
  }

  pub fn metadata_dirs(&self) -> &[MetadataDirectory] {
    &self.metadata_dirs
  }

  pub fn handler_registry(&self) -> Option<&Arc<HandlerRegistry>> {
    self.handler_registry.as_ref()
  }

  pub fn event_dispatcher(&self) -> Option<&Arc<EventDispatcher>> {
    self.event_dispatcher.as_ref()
  }

  /// Produces the serializer. Aggregates that were never injected fall back
  /// to empty ones so a builder is usable standalone, outside a container.
  pub fn build(&self) -> Serializer {
    Serializer::from_parts(
      self.cache_dir.clone(),
      self.debug,
      self.naming_strategy.clone(),
      MetadataLocator::new(self.metadata_dirs.clone()),
      self.handler_registry.clone().unwrap_or_default(),
      self.event_dispatcher.clone().unwrap_or_default(),
    )
  }
}

impl Default for SerializerBuilder {
  fn default() -> Self {
    Self::new()
  }
}

impl Debug for SerializerBuilder {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SerializerBuilder")
      .field("cache_dir", &self.cache_dir)
      .field("debug", &self.debug)
      .field("metadata_dirs", &self.metadata_dirs)
      .field("handler_registry", &self.handler_registry)
      .field("event_dispatcher", &self.event_dispatcher)
      .finish()
  }
}

static_assertions::assert_impl_all!(SerializerBuilder: Send, Sync);
