use std::fmt;
use std::path::PathBuf;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Configuration-schema failures. Raised while loading, before any service is
/// instantiated; fatal to the container build.
#[derive(Debug, Error)]
pub enum ConfigurationError {
  #[error("invalid serialization configuration: {0}")]
  Parse(#[from] serde_json::Error),
  #[error("configuration key 'mapping' is required")]
  MissingMapping,
  #[error("mapping contains an empty namespace")]
  EmptyNamespace,
  #[error("mapping for namespace '{namespace}' has an empty directory")]
  EmptyDirectory { namespace: String },
}

/// One namespace to directory pair from the `mapping` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataMapping {
  pub namespace: String,
  pub dir: PathBuf,
}

/// Validated configuration for the serialization extension.
///
/// Mapping entries keep their declaration order; it becomes metadata
/// directory precedence downstream and is never re-sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerializationConfig {
  mapping: Vec<MetadataMapping>,
}

impl SerializationConfig {
  pub fn new() -> Self {
    SerializationConfig { mapping: Vec::new() }
  }

  pub fn with_mapping(mut self, namespace: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
    self.mapping.push(MetadataMapping {
      namespace: namespace.into(),
      dir: dir.into(),
    });
    self
  }

  pub fn mapping(&self) -> &[MetadataMapping] {
    &self.mapping
  }

  /// Parses the configuration block from JSON. The `mapping` object keeps
  /// document order because entries are visited as the document streams, not
  /// collected into an intermediate map.
  pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
    let raw: RawConfig = serde_json::from_str(json)?;
    let mapping = raw.mapping.ok_or(ConfigurationError::MissingMapping)?;
    let config = SerializationConfig { mapping: mapping.0 };
    config.validate()?;
    Ok(config)
  }

  fn validate(&self) -> Result<(), ConfigurationError> {
    for entry in &self.mapping {
      if entry.namespace.is_empty() {
        return Err(ConfigurationError::EmptyNamespace);
      }
      if entry.dir.as_os_str().is_empty() {
        return Err(ConfigurationError::EmptyDirectory {
          namespace: entry.namespace.clone(),
        });
      }
    }
    Ok(())
  }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
  #[serde(default)]
  mapping: Option<OrderedMapping>,
}

struct OrderedMapping(Vec<MetadataMapping>);

impl<'de> Deserialize<'de> for OrderedMapping {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>, {
    struct MappingVisitor;

    impl<'de> Visitor<'de> for MappingVisitor {
      type Value = OrderedMapping;

      fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of namespace to directory path")
      }

      fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
      where
        A: MapAccess<'de>, {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((namespace, dir)) = access.next_entry::<String, String>()? {
          entries.push(MetadataMapping {
            namespace,
            dir: PathBuf::from(dir),
          });
        }
        Ok(OrderedMapping(entries))
      }
    }

    deserializer.deserialize_map(MappingVisitor)
  }
}

static_assertions::assert_impl_all!(SerializationConfig: Send, Sync);
