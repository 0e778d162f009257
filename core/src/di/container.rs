use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::di::capability::{CapabilityRef, CapabilityTag};
use crate::di::errors::WiringError;
use crate::di::service_definition::ServiceDefinition;
use crate::serialization::{EventSubscriber, SubscribingHandler};

/// The compiled service graph.
///
/// Instances are created on first access and memoized for the container's
/// lifetime; a second `get` for the same name always returns the same `Arc`.
/// The `OnceCell` guard keeps that true even if a container is ever shared
/// across threads.
pub struct Container {
  definitions: Vec<ServiceDefinition>,
  index: HashMap<String, usize>,
  instances: Vec<OnceCell<Arc<dyn Any + Send + Sync>>>,
}

impl Container {
  pub(crate) fn new(definitions: Vec<ServiceDefinition>, index: HashMap<String, usize>) -> Self {
    let instances = definitions.iter().map(|_| OnceCell::new()).collect();
    Container {
      definitions,
      index,
      instances,
    }
  }

  pub fn has_service(&self, name: &str) -> bool {
    self.index.contains_key(name)
  }

  pub fn service_names(&self) -> impl Iterator<Item = &str> {
    self.definitions.iter().map(|definition| definition.name())
  }

  pub fn len(&self) -> usize {
    self.definitions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.definitions.is_empty()
  }

  /// Resolves a service by name, instantiating it on first access.
  pub fn get<T>(&self, name: &str) -> Result<Arc<T>, WiringError>
  where
    T: Send + Sync + 'static, {
    self.instance(name)?.downcast::<T>().map_err(|_| WiringError::TypeMismatch {
      service: name.to_string(),
      expected: type_name::<T>(),
    })
  }

  /// Resolves a service through its subscribing-handler capability binding.
  pub fn resolve_subscribing_handler(&self, name: &str) -> Result<Arc<dyn SubscribingHandler>, WiringError> {
    match self.resolve_capability(name, CapabilityTag::SubscribingHandler)? {
      CapabilityRef::Handler(handler) => Ok(handler),
      CapabilityRef::Subscriber(_) => Err(self.capability_mismatch(name, CapabilityTag::SubscribingHandler)),
    }
  }

  /// Resolves a service through its event-subscriber capability binding.
  pub fn resolve_event_subscriber(&self, name: &str) -> Result<Arc<dyn EventSubscriber>, WiringError> {
    match self.resolve_capability(name, CapabilityTag::EventSubscriber)? {
      CapabilityRef::Subscriber(subscriber) => Ok(subscriber),
      CapabilityRef::Handler(_) => Err(self.capability_mismatch(name, CapabilityTag::EventSubscriber)),
    }
  }

  fn resolve_capability(&self, name: &str, tag: CapabilityTag) -> Result<CapabilityRef, WiringError> {
    let slot = self.slot(name)?;
    let binding = self.definitions[slot]
      .capability(tag)
      .ok_or_else(|| self.capability_mismatch(name, tag))?;
    let instance = self.instance(name)?;
    binding.cast(instance).ok_or_else(|| self.capability_mismatch(name, tag))
  }

  fn instance(&self, name: &str) -> Result<Arc<dyn Any + Send + Sync>, WiringError> {
    let slot = self.slot(name)?;
    // A factory resolving its own service would re-enter this cell; that is a
    // definition cycle and a build bug, not a supported path.
    self.instances[slot]
      .get_or_try_init(|| {
        debug!(service = name, "instantiating service");
        self.definitions[slot].instantiate(self)
      })
      .map(Arc::clone)
  }

  fn slot(&self, name: &str) -> Result<usize, WiringError> {
    self
      .index
      .get(name)
      .copied()
      .ok_or_else(|| WiringError::ServiceNotFound(name.to_string()))
  }

  fn capability_mismatch(&self, name: &str, tag: CapabilityTag) -> WiringError {
    WiringError::CapabilityMismatch {
      service: name.to_string(),
      capability: tag.as_str(),
    }
  }
}

impl Debug for Container {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Container").field("services", &self.definitions.len()).finish()
  }
}

static_assertions::assert_impl_all!(Container: Send, Sync);
