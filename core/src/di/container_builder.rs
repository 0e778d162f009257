use std::collections::HashMap;

use tracing::debug;

use crate::di::capability::CapabilityTag;
use crate::di::container::Container;
use crate::di::errors::WiringError;
use crate::di::service_definition::ServiceDefinition;

/// Accumulates service definitions during the registration phase.
///
/// Definitions keep their declaration order, and every scan over them is
/// stable. Downstream dispatch precedence is derived from this order, so it
/// must be reproducible across builds given the same declarations.
#[derive(Debug, Default)]
pub struct ContainerBuilder {
  definitions: Vec<ServiceDefinition>,
  index: HashMap<String, usize>,
}

impl ContainerBuilder {
  pub fn new() -> Self {
    ContainerBuilder {
      definitions: Vec::new(),
      index: HashMap::new(),
    }
  }

  pub fn add_definition(&mut self, definition: ServiceDefinition) -> Result<(), WiringError> {
    // Reject a capability binding whose type does not match the factory's
    // concrete type here, so it fails the build instead of the first resolve.
    for binding in definition.capabilities() {
      if binding.service_type() != definition.type_id() {
        return Err(WiringError::CapabilityMismatch {
          service: definition.name().to_string(),
          capability: binding.tag().as_str(),
        });
      }
    }
    if self.index.contains_key(definition.name()) {
      return Err(WiringError::DuplicateDefinition(definition.name().to_string()));
    }
    debug!(service = definition.name(), type_name = definition.type_name(), "service declared");
    self.index.insert(definition.name().to_string(), self.definitions.len());
    self.definitions.push(definition);
    Ok(())
  }

  pub fn has_definition(&self, name: &str) -> bool {
    self.index.contains_key(name)
  }

  pub fn get_definition(&self, name: &str) -> Option<&ServiceDefinition> {
    self.index.get(name).map(|slot| &self.definitions[*slot])
  }

  pub fn get_definition_mut(&mut self, name: &str) -> Option<&mut ServiceDefinition> {
    let slot = *self.index.get(name)?;
    Some(&mut self.definitions[slot])
  }

  pub fn definitions(&self) -> impl Iterator<Item = &ServiceDefinition> {
    self.definitions.iter()
  }

  /// Names of all services exposing the given capability, in declaration
  /// order. Never sorted.
  pub fn find_by_capability(&self, tag: CapabilityTag) -> Vec<String> {
    self
      .definitions
      .iter()
      .filter(|definition| definition.has_capability(tag))
      .map(|definition| definition.name().to_string())
      .collect()
  }

  pub fn len(&self) -> usize {
    self.definitions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.definitions.is_empty()
  }

  pub(crate) fn build(self) -> Container {
    Container::new(self.definitions, self.index)
  }
}
