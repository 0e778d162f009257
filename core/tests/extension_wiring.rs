use std::any::{type_name, Any};
use std::sync::{Arc, Mutex};

use rstest::rstest;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use serwire_core_rs::{
  Compiler, EventDispatcher, EventSubscriber, HandlerRegistry, SerializationConfig, SerializationError,
  SerializationEvent, SerializationEventKind, SerializationExtension, Serializer, SerializerBuilder,
  ServiceDefinition, SubscribingHandler,
};

fn init_tracing() {
  let _ = tracing_subscriber::fmt().with_env_filter("serwire_core_rs=debug").try_init();
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Appointment {
  title: String,
  at: String,
}

#[derive(Debug, Clone, Default)]
struct AppointmentHandler;

impl SubscribingHandler for AppointmentHandler {
  fn type_name(&self) -> &str {
    type_name::<Appointment>()
  }

  fn serialize(&self, value: &(dyn Any + Send + Sync)) -> Result<Value, SerializationError> {
    let appointment = value
      .downcast_ref::<Appointment>()
      .ok_or_else(|| SerializationError::InvalidHandlerPayload {
        type_name: type_name::<Appointment>().to_string(),
        reason: "expected an Appointment".to_string(),
      })?;
    Ok(json!({ "summary": format!("{} @ {}", appointment.title, appointment.at) }))
  }

  fn deserialize(&self, value: &Value) -> Result<Box<dyn Any + Send + Sync>, SerializationError> {
    let summary = value
      .get("summary")
      .and_then(Value::as_str)
      .ok_or_else(|| SerializationError::DeserializeFailed("missing summary".to_string()))?;
    let (title, at) = summary
      .split_once(" @ ")
      .ok_or_else(|| SerializationError::DeserializeFailed("malformed summary".to_string()))?;
    Ok(Box::new(Appointment {
      title: title.to_string(),
      at: at.to_string(),
    }))
  }
}

#[derive(Debug, Clone, Default)]
struct AuditSubscriber {
  seen: Arc<Mutex<Vec<SerializationEventKind>>>,
}

impl EventSubscriber for AuditSubscriber {
  fn subscribed_events(&self) -> Vec<SerializationEventKind> {
    vec![SerializationEventKind::PreSerialize, SerializationEventKind::PostSerialize]
  }

  fn on_event(&self, event: &mut SerializationEvent) {
    self.seen.lock().unwrap().push(event.kind());
  }
}

/// Satisfies both capability markers at once.
#[derive(Debug, Clone, Default)]
struct LegacyBridge;

impl SubscribingHandler for LegacyBridge {
  fn type_name(&self) -> &str {
    "legacy.Record"
  }

  fn serialize(&self, _value: &(dyn Any + Send + Sync)) -> Result<Value, SerializationError> {
    Ok(json!(null))
  }

  fn deserialize(&self, _value: &Value) -> Result<Box<dyn Any + Send + Sync>, SerializationError> {
    Ok(Box::new(()))
  }
}

impl EventSubscriber for LegacyBridge {
  fn subscribed_events(&self) -> Vec<SerializationEventKind> {
    vec![SerializationEventKind::PostDeserialize]
  }

  fn on_event(&self, _event: &mut SerializationEvent) {}
}

/// Handler whose subscribed type name is chosen per instance.
#[derive(Debug, Clone)]
struct TaggedHandler {
  type_name: &'static str,
}

impl SubscribingHandler for TaggedHandler {
  fn type_name(&self) -> &str {
    self.type_name
  }

  fn serialize(&self, _value: &(dyn Any + Send + Sync)) -> Result<Value, SerializationError> {
    Ok(json!(self.type_name))
  }

  fn deserialize(&self, _value: &Value) -> Result<Box<dyn Any + Send + Sync>, SerializationError> {
    Ok(Box::new(()))
  }
}

fn compiler_with_extension(config: SerializationConfig, debug: bool, temp_dir: &std::path::Path) -> Compiler {
  let mut compiler = Compiler::new();
  compiler.add_extension(SerializationExtension::new(config, debug, temp_dir));
  compiler
}

#[test]
fn empty_mapping_still_yields_a_serializer() {
  init_tracing();
  let temp = tempfile::tempdir().unwrap();
  let container = compiler_with_extension(SerializationConfig::new(), false, temp.path())
    .compile()
    .unwrap();

  let serializer = container.get::<Serializer>(SerializationExtension::SERIALIZER).unwrap();
  assert_eq!(
    serializer.cache_dir(),
    Some(temp.path().join("cache").join("serializer").as_path())
  );
  assert!(!serializer.debug());
}

#[test]
fn serializer_is_built_once_and_memoized() {
  init_tracing();
  let temp = tempfile::tempdir().unwrap();
  let container = compiler_with_extension(SerializationConfig::new(), false, temp.path())
    .compile()
    .unwrap();

  let first = container.get::<Serializer>(SerializationExtension::SERIALIZER).unwrap();
  let second = container.get::<Serializer>(SerializationExtension::SERIALIZER).unwrap();
  assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn handler_only_and_dual_capability_services_are_wired() {
  init_tracing();
  let temp = tempfile::tempdir().unwrap();
  let mut compiler = compiler_with_extension(SerializationConfig::new(), false, temp.path());
  compiler
    .builder_mut()
    .add_definition(
      ServiceDefinition::from_instance("app.appointment_handler", AppointmentHandler)
        .expose_subscribing_handler::<AppointmentHandler>(),
    )
    .unwrap();
  compiler
    .builder_mut()
    .add_definition(
      ServiceDefinition::from_instance("app.legacy_bridge", LegacyBridge)
        .expose_subscribing_handler::<LegacyBridge>()
        .expose_event_subscriber::<LegacyBridge>(),
    )
    .unwrap();
  let container = compiler.compile().unwrap();

  let registry = container
    .get::<HandlerRegistry>(SerializationExtension::HANDLER_REGISTRY)
    .unwrap();
  let dispatcher = container
    .get::<EventDispatcher>(SerializationExtension::EVENT_DISPATCHER)
    .unwrap();
  assert_eq!(registry.len(), 2);
  assert_eq!(dispatcher.len(), 1);
}

#[test]
fn handlers_are_registered_in_declaration_order() {
  init_tracing();
  let temp = tempfile::tempdir().unwrap();
  let mut compiler = compiler_with_extension(SerializationConfig::new(), false, temp.path());
  for (service, type_name) in [
    ("app.charlie", "app.Charlie"),
    ("app.alpha", "app.Alpha"),
    ("app.bravo", "app.Bravo"),
  ] {
    compiler
      .builder_mut()
      .add_definition(
        ServiceDefinition::from_instance(service, TaggedHandler { type_name })
          .expose_subscribing_handler::<TaggedHandler>(),
      )
      .unwrap();
  }
  let container = compiler.compile().unwrap();

  let registry = container
    .get::<HandlerRegistry>(SerializationExtension::HANDLER_REGISTRY)
    .unwrap();
  let names: Vec<&str> = registry.handlers().iter().map(|handler| handler.type_name()).collect();
  assert_eq!(names, vec!["app.Charlie", "app.Alpha", "app.Bravo"]);
}

#[rstest]
#[case(&[("App.Model", "/app/src/Model"), ("App.Dto", "/app/src/Dto")])]
#[case(&[("App.Dto", "/app/src/Dto"), ("App.Model", "/app/src/Model")])]
fn mapping_order_becomes_metadata_precedence(#[case] mapping: &[(&str, &str)]) {
  init_tracing();
  let temp = tempfile::tempdir().unwrap();
  let mut config = SerializationConfig::new();
  for (namespace, dir) in mapping {
    config = config.with_mapping(*namespace, *dir);
  }
  let container = compiler_with_extension(config, false, temp.path()).compile().unwrap();

  let builder = container
    .get::<SerializerBuilder>(SerializationExtension::SERIALIZER_BUILDER)
    .unwrap();
  let namespaces: Vec<&str> = builder.metadata_dirs().iter().map(|dir| dir.namespace()).collect();
  let expected: Vec<&str> = mapping.iter().map(|(namespace, _)| *namespace).collect();
  assert_eq!(namespaces, expected);
}

#[test]
fn missing_mapping_key_fails_before_any_build() {
  let err = SerializationConfig::from_json("{}").unwrap_err();
  assert!(err.to_string().contains("mapping"));
}

#[test]
fn wired_serializer_uses_handlers_and_subscribers() {
  init_tracing();
  let temp = tempfile::tempdir().unwrap();
  let audit = AuditSubscriber::default();
  let mut compiler = compiler_with_extension(SerializationConfig::new(), false, temp.path());
  compiler
    .builder_mut()
    .add_definition(
      ServiceDefinition::from_instance("app.appointment_handler", AppointmentHandler)
        .expose_subscribing_handler::<AppointmentHandler>(),
    )
    .unwrap();
  compiler
    .builder_mut()
    .add_definition(
      ServiceDefinition::from_instance("app.audit", audit.clone()).expose_event_subscriber::<AuditSubscriber>(),
    )
    .unwrap();
  let container = compiler.compile().unwrap();

  let serializer = container.get::<Serializer>(SerializationExtension::SERIALIZER).unwrap();
  let appointment = Appointment {
    title: "standup".to_string(),
    at: "09:00".to_string(),
  };

  let rendered = serializer.serialize(&appointment).unwrap();
  assert_eq!(rendered, r#"{"summary":"standup @ 09:00"}"#);
  assert_eq!(serializer.deserialize::<Appointment>(&rendered).unwrap(), appointment);
  assert_eq!(
    *audit.seen.lock().unwrap(),
    vec![SerializationEventKind::PreSerialize, SerializationEventKind::PostSerialize]
  );
}

#[test]
fn metadata_lookup_follows_mapping_precedence() {
  init_tracing();
  let temp = tempfile::tempdir().unwrap();
  let config = SerializationConfig::new()
    .with_mapping("app.model", "/app/src/Model")
    .with_mapping("app", "/app/src/Fallback");
  let container = compiler_with_extension(config, false, temp.path()).compile().unwrap();

  let serializer = container.get::<Serializer>(SerializationExtension::SERIALIZER).unwrap();
  assert_eq!(
    serializer.metadata().locate("app.model.User"),
    Some(std::path::PathBuf::from("/app/src/Model/User.json"))
  );
  assert_eq!(
    serializer.metadata().locate("app.other.Thing"),
    Some(std::path::PathBuf::from("/app/src/Fallback/other.Thing.json"))
  );
}
