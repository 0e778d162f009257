use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

/// Lifecycle points surrounding one (de)serialization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SerializationEventKind {
  /// Value tree produced, naming strategy not yet applied.
  PreSerialize,
  /// Final tree, about to be rendered.
  PostSerialize,
  /// Incoming tree, before any handler runs.
  PreDeserialize,
  /// Incoming tree after the target value was produced.
  PostDeserialize,
}

/// Event handed to subscribers; the payload may be rewritten in place.
#[derive(Debug, Clone)]
pub struct SerializationEvent {
  kind: SerializationEventKind,
  type_name: String,
  payload: Value,
}

impl SerializationEvent {
  pub fn new(kind: SerializationEventKind, type_name: impl Into<String>, payload: Value) -> Self {
    SerializationEvent {
      kind,
      type_name: type_name.into(),
      payload,
    }
  }

  pub fn kind(&self) -> SerializationEventKind {
    self.kind
  }

  pub fn type_name(&self) -> &str {
    &self.type_name
  }

  pub fn payload(&self) -> &Value {
    &self.payload
  }

  pub fn payload_mut(&mut self) -> &mut Value {
    &mut self.payload
  }

  pub fn set_payload(&mut self, payload: Value) {
    self.payload = payload;
  }

  pub fn into_payload(self) -> Value {
    self.payload
  }
}

/// The second capability marker: services implementing this are collected
/// into the event dispatcher during wiring.
pub trait EventSubscriber: Debug + Send + Sync + 'static {
  /// Event kinds this subscriber observes.
  fn subscribed_events(&self) -> Vec<SerializationEventKind>;

  fn on_event(&self, event: &mut SerializationEvent);
}

/// Notifies subscribers in registration order.
#[derive(Clone, Default)]
pub struct EventDispatcher {
  subscribers: Vec<Arc<dyn EventSubscriber>>,
}

impl EventDispatcher {
  pub fn new() -> Self {
    EventDispatcher { subscribers: Vec::new() }
  }

  pub fn add_subscriber(&mut self, subscriber: Arc<dyn EventSubscriber>) {
    debug!(events = ?subscriber.subscribed_events(), "event subscriber registered");
    self.subscribers.push(subscriber);
  }

  pub fn dispatch(&self, event: &mut SerializationEvent) {
    for subscriber in &self.subscribers {
      if subscriber.subscribed_events().contains(&event.kind()) {
        subscriber.on_event(event);
      }
    }
  }

  pub fn subscribers(&self) -> &[Arc<dyn EventSubscriber>] {
    &self.subscribers
  }

  pub fn len(&self) -> usize {
    self.subscribers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.subscribers.is_empty()
  }
}

impl Debug for EventDispatcher {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("EventDispatcher").field("subscribers", &self.subscribers.len()).finish()
  }
}

static_assertions::assert_impl_all!(EventDispatcher: Send, Sync);
