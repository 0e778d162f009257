use std::any::{type_name, Any, TypeId};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::di::capability::{CapabilityBinding, CapabilityTag};
use crate::di::container::Container;
use crate::di::errors::WiringError;
use crate::serialization::{EventSubscriber, SubscribingHandler};

type FactoryFn = Arc<dyn Fn(&Container) -> Result<Box<dyn Any + Send + Sync>, WiringError> + Send + Sync>;
type SetupFn = Arc<dyn Fn(&mut (dyn Any + Send + Sync), &Container) -> Result<(), WiringError> + Send + Sync>;

/// A declarative recipe for one container-managed service: how to construct
/// it, which setup steps run after construction, and which capabilities it
/// exposes to the wiring phase.
///
/// Setup steps run in the order they were appended, once, right after the
/// factory produced the instance and before it is memoized. A setup step
/// that errors surfaces as [`WiringError::SetupFailed`] naming the service.
pub struct ServiceDefinition {
  name: String,
  type_name: &'static str,
  type_id: TypeId,
  factory: FactoryFn,
  setups: Vec<SetupFn>,
  capabilities: Vec<CapabilityBinding>,
}

impl ServiceDefinition {
  pub fn new<T, F>(name: impl Into<String>, factory: F) -> Self
  where
    T: Send + Sync + 'static,
    F: Fn(&Container) -> Result<T, WiringError> + Send + Sync + 'static, {
    ServiceDefinition {
      name: name.into(),
      type_name: type_name::<T>(),
      type_id: TypeId::of::<T>(),
      factory: Arc::new(move |container| {
        factory(container).map(|value| Box::new(value) as Box<dyn Any + Send + Sync>)
      }),
      setups: Vec::new(),
      capabilities: Vec::new(),
    }
  }

  pub fn from_instance<T>(name: impl Into<String>, instance: T) -> Self
  where
    T: Clone + Send + Sync + 'static, {
    Self::new(name, move |_| Ok(instance.clone()))
  }

  pub fn with_setup<T, F>(mut self, setup: F) -> Self
  where
    T: Send + Sync + 'static,
    F: Fn(&mut T, &Container) -> Result<(), WiringError> + Send + Sync + 'static, {
    self.add_setup(setup);
    self
  }

  pub fn add_setup<T, F>(&mut self, setup: F) -> &mut Self
  where
    T: Send + Sync + 'static,
    F: Fn(&mut T, &Container) -> Result<(), WiringError> + Send + Sync + 'static, {
    let service = self.name.clone();
    self.setups.push(Arc::new(move |instance, container| {
      let target = instance.downcast_mut::<T>().ok_or_else(|| WiringError::TypeMismatch {
        service: service.clone(),
        expected: type_name::<T>(),
      })?;
      setup(target, container).map_err(|source| WiringError::SetupFailed {
        service: service.clone(),
        reason: source.to_string(),
      })
    }));
    self
  }

  /// Declares that this service satisfies the subscribing-handler capability.
  pub fn expose_subscribing_handler<T>(mut self) -> Self
  where
    T: SubscribingHandler, {
    self.capabilities.push(CapabilityBinding::subscribing_handler::<T>());
    self
  }

  /// Declares that this service satisfies the event-subscriber capability.
  pub fn expose_event_subscriber<T>(mut self) -> Self
  where
    T: EventSubscriber, {
    self.capabilities.push(CapabilityBinding::event_subscriber::<T>());
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  pub fn has_capability(&self, tag: CapabilityTag) -> bool {
    self.capabilities.iter().any(|binding| binding.tag() == tag)
  }

  pub(crate) fn type_id(&self) -> TypeId {
    self.type_id
  }

  pub(crate) fn capability(&self, tag: CapabilityTag) -> Option<&CapabilityBinding> {
    self.capabilities.iter().find(|binding| binding.tag() == tag)
  }

  pub(crate) fn capabilities(&self) -> &[CapabilityBinding] {
    &self.capabilities
  }

  pub(crate) fn instantiate(&self, container: &Container) -> Result<Arc<dyn Any + Send + Sync>, WiringError> {
    let mut instance = (self.factory)(container)?;
    for setup in &self.setups {
      setup(instance.as_mut(), container)?;
    }
    Ok(Arc::from(instance))
  }
}

impl Debug for ServiceDefinition {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ServiceDefinition")
      .field("name", &self.name)
      .field("type_name", &self.type_name)
      .field("setups", &self.setups.len())
      .field("capabilities", &self.capabilities)
      .finish()
  }
}

static_assertions::assert_impl_all!(ServiceDefinition: Send, Sync);
