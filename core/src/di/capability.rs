use std::any::{Any, TypeId};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use crate::serialization::{EventSubscriber, SubscribingHandler};

/// Marker capabilities a service may expose to take part in wiring.
///
/// Matching is by capability, never by service name; these tags are the only
/// extension point the wiring phase recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityTag {
  SubscribingHandler,
  EventSubscriber,
}

impl CapabilityTag {
  pub fn as_str(&self) -> &'static str {
    match self {
      CapabilityTag::SubscribingHandler => "SubscribingHandler",
      CapabilityTag::EventSubscriber => "EventSubscriber",
    }
  }
}

impl Display for CapabilityTag {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A capability view over an instantiated service.
#[derive(Clone)]
pub enum CapabilityRef {
  Handler(Arc<dyn SubscribingHandler>),
  Subscriber(Arc<dyn EventSubscriber>),
}

type CastFn = Arc<dyn Fn(Arc<dyn Any + Send + Sync>) -> Option<CapabilityRef> + Send + Sync>;

/// Binds a capability tag to the coercion applied when the service instance
/// is handed to an aggregate. The coercion captures the concrete service type
/// at declaration time, so no reflection scan is ever needed.
#[derive(Clone)]
pub struct CapabilityBinding {
  tag: CapabilityTag,
  service_type: TypeId,
  cast: CastFn,
}

impl CapabilityBinding {
  pub(crate) fn subscribing_handler<T>() -> Self
  where
    T: SubscribingHandler, {
    CapabilityBinding {
      tag: CapabilityTag::SubscribingHandler,
      service_type: TypeId::of::<T>(),
      cast: Arc::new(|instance| {
        instance
          .downcast::<T>()
          .ok()
          .map(|handler| CapabilityRef::Handler(handler as Arc<dyn SubscribingHandler>))
      }),
    }
  }

  pub(crate) fn event_subscriber<T>() -> Self
  where
    T: EventSubscriber, {
    CapabilityBinding {
      tag: CapabilityTag::EventSubscriber,
      service_type: TypeId::of::<T>(),
      cast: Arc::new(|instance| {
        instance
          .downcast::<T>()
          .ok()
          .map(|subscriber| CapabilityRef::Subscriber(subscriber as Arc<dyn EventSubscriber>))
      }),
    }
  }

  pub fn tag(&self) -> CapabilityTag {
    self.tag
  }

  pub(crate) fn service_type(&self) -> TypeId {
    self.service_type
  }

  pub(crate) fn cast(&self, instance: Arc<dyn Any + Send + Sync>) -> Option<CapabilityRef> {
    (self.cast)(instance)
  }
}

impl Debug for CapabilityBinding {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CapabilityBinding").field("tag", &self.tag).finish()
  }
}

static_assertions::assert_impl_all!(CapabilityBinding: Send, Sync);
