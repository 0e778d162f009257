use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::serialization::errors::SerializationError;

/// A handler that takes over (de)serialization for one named type.
///
/// Implementing this trait is one of the two capability markers the wiring
/// phase recognizes; declare it on a service definition with
/// `expose_subscribing_handler` and the extension collects it automatically.
pub trait SubscribingHandler: Debug + Send + Sync + 'static {
  /// Fully qualified name of the type this handler subscribes to, as
  /// reported by `std::any::type_name`.
  fn type_name(&self) -> &str;

  fn serialize(&self, value: &(dyn Any + Send + Sync)) -> Result<Value, SerializationError>;

  fn deserialize(&self, value: &Value) -> Result<Box<dyn Any + Send + Sync>, SerializationError>;
}

/// Ordered collection of subscribing handlers.
///
/// Registration order is dispatch precedence: when two handlers subscribe to
/// the same type, the most recently registered one wins. Earlier handlers
/// stay listed for introspection.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
  handlers: Vec<Arc<dyn SubscribingHandler>>,
}

impl HandlerRegistry {
  pub fn new() -> Self {
    HandlerRegistry { handlers: Vec::new() }
  }

  pub fn register_subscribing_handler(&mut self, handler: Arc<dyn SubscribingHandler>) {
    debug!(type_name = handler.type_name(), "subscribing handler registered");
    self.handlers.push(handler);
  }

  pub fn handler_for(&self, type_name: &str) -> Option<&Arc<dyn SubscribingHandler>> {
    self.handlers.iter().rev().find(|handler| handler.type_name() == type_name)
  }

  pub fn handlers(&self) -> &[Arc<dyn SubscribingHandler>] {
    &self.handlers
  }

  pub fn len(&self) -> usize {
    self.handlers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.handlers.is_empty()
  }
}

impl Debug for HandlerRegistry {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("HandlerRegistry").field("handlers", &self.handlers.len()).finish()
  }
}

static_assertions::assert_impl_all!(HandlerRegistry: Send, Sync);
