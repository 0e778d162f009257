use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::di::{CapabilityTag, CompileError, CompilerExtension, ContainerBuilder, ServiceDefinition, WiringError};
use crate::serialization::config::SerializationConfig;
use crate::serialization::event_dispatcher::EventDispatcher;
use crate::serialization::handler_registry::HandlerRegistry;
use crate::serialization::naming::IdenticalPropertyNamingStrategy;
use crate::serialization::serializer_builder::SerializerBuilder;
use crate::serialization::serializer_impl::Serializer;

/// Registers the serializer service and wires every subscribing handler and
/// event subscriber declared anywhere in the container into it.
///
/// `load_configuration` declares the serializer builder (cache dir, debug
/// flag, naming strategy, metadata directories in mapping order) plus the
/// lazily built serializer. `before_compile` runs once all extensions have
/// declared their services; it creates the two aggregates, appends one
/// registration setup per discovered service in container declaration order,
/// and injects both aggregates into the builder definition.
pub struct SerializationExtension {
  config: SerializationConfig,
  debug_mode: bool,
  temp_dir: PathBuf,
}

impl SerializationExtension {
  pub const SERIALIZER_BUILDER: &'static str = "serialization.serializer_builder";
  pub const SERIALIZER: &'static str = "serialization.serializer";
  pub const HANDLER_REGISTRY: &'static str = "serialization.handler_registry";
  pub const EVENT_DISPATCHER: &'static str = "serialization.event_dispatcher";

  pub fn new(config: SerializationConfig, debug_mode: bool, temp_dir: impl Into<PathBuf>) -> Self {
    SerializationExtension {
      config,
      debug_mode,
      temp_dir: temp_dir.into(),
    }
  }
}

impl CompilerExtension for SerializationExtension {
  fn name(&self) -> &str {
    "serialization"
  }

  fn load_configuration(&mut self, builder: &mut ContainerBuilder) -> Result<(), CompileError> {
    let cache_dir = self.temp_dir.join("cache").join("serializer");
    let debug_mode = self.debug_mode;

    let mut serializer_builder =
      ServiceDefinition::new::<SerializerBuilder, _>(Self::SERIALIZER_BUILDER, |_| Ok(SerializerBuilder::new()))
        .with_setup::<SerializerBuilder, _>(move |b, _| {
          b.set_cache_dir(cache_dir.clone());
          Ok(())
        })
        .with_setup::<SerializerBuilder, _>(move |b, _| {
          b.set_debug(debug_mode);
          Ok(())
        })
        .with_setup::<SerializerBuilder, _>(|b, _| {
          b.set_property_naming_strategy(Arc::new(IdenticalPropertyNamingStrategy));
          Ok(())
        });

    // One setup per mapping entry, in mapping order; this order is metadata
    // directory precedence and must not be reordered.
    for entry in self.config.mapping() {
      let dir = entry.dir.clone();
      let namespace = entry.namespace.clone();
      serializer_builder.add_setup::<SerializerBuilder, _>(move |b, _| {
        b.add_metadata_dir(dir.clone(), namespace.clone());
        Ok(())
      });
    }

    builder.add_definition(serializer_builder)?;

    builder.add_definition(ServiceDefinition::new::<Serializer, _>(Self::SERIALIZER, |container| {
      let serializer_builder = container.get::<SerializerBuilder>(Self::SERIALIZER_BUILDER)?;
      Ok(serializer_builder.build())
    }))?;

    Ok(())
  }

  fn before_compile(&mut self, builder: &mut ContainerBuilder) -> Result<(), CompileError> {
    let handler_names = builder.find_by_capability(CapabilityTag::SubscribingHandler);
    let subscriber_names = builder.find_by_capability(CapabilityTag::EventSubscriber);
    debug!(
      handlers = handler_names.len(),
      subscribers = subscriber_names.len(),
      "wiring discovered services"
    );

    let mut handler_registry =
      ServiceDefinition::new::<HandlerRegistry, _>(Self::HANDLER_REGISTRY, |_| Ok(HandlerRegistry::new()));
    for name in handler_names {
      handler_registry.add_setup::<HandlerRegistry, _>(move |registry, container| {
        registry.register_subscribing_handler(container.resolve_subscribing_handler(&name)?);
        Ok(())
      });
    }
    builder.add_definition(handler_registry)?;

    let mut event_dispatcher =
      ServiceDefinition::new::<EventDispatcher, _>(Self::EVENT_DISPATCHER, |_| Ok(EventDispatcher::new()));
    for name in subscriber_names {
      event_dispatcher.add_setup::<EventDispatcher, _>(move |dispatcher, container| {
        dispatcher.add_subscriber(container.resolve_event_subscriber(&name)?);
        Ok(())
      });
    }
    builder.add_definition(event_dispatcher)?;

    let serializer_builder = builder
      .get_definition_mut(Self::SERIALIZER_BUILDER)
      .ok_or_else(|| WiringError::ServiceNotFound(Self::SERIALIZER_BUILDER.to_string()))?;
    serializer_builder.add_setup::<SerializerBuilder, _>(|b, container| {
      b.set_handler_registry(container.get::<HandlerRegistry>(Self::HANDLER_REGISTRY)?);
      Ok(())
    });
    serializer_builder.add_setup::<SerializerBuilder, _>(|b, container| {
      b.set_event_dispatcher(container.get::<EventDispatcher>(Self::EVENT_DISPATCHER)?);
      Ok(())
    });

    Ok(())
  }
}
