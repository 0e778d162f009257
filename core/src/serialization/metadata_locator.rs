use std::path::{Path, PathBuf};

/// One namespace to metadata-directory registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataDirectory {
  namespace: String,
  dir: PathBuf,
}

impl MetadataDirectory {
  pub fn new(dir: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
    MetadataDirectory {
      namespace: namespace.into(),
      dir: dir.into(),
    }
  }

  pub fn namespace(&self) -> &str {
    &self.namespace
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }
}

/// Resolves type names to candidate metadata files.
///
/// Directories are consulted in registration order and the first namespace
/// prefixing the type name wins. This is why mapping order must survive from
/// configuration to wiring untouched. Resolution is pure path computation;
/// whether the file exists is the caller's concern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataLocator {
  directories: Vec<MetadataDirectory>,
}

impl MetadataLocator {
  pub fn new(directories: Vec<MetadataDirectory>) -> Self {
    MetadataLocator { directories }
  }

  pub fn directories(&self) -> &[MetadataDirectory] {
    &self.directories
  }

  /// Candidate metadata file for a type name. Namespace separators `::` and
  /// `.` are treated as equivalent; the match must end on a separator
  /// boundary.
  pub fn locate(&self, type_name: &str) -> Option<PathBuf> {
    let canonical = type_name.replace("::", ".");
    for entry in &self.directories {
      let namespace = entry.namespace().replace("::", ".");
      let Some(rest) = canonical.strip_prefix(namespace.as_str()) else {
        continue;
      };
      let Some(rest) = rest.strip_prefix('.') else {
        continue;
      };
      if rest.is_empty() {
        continue;
      }
      return Some(entry.dir().join(format!("{rest}.json")));
    }
    None
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use super::*;

  fn locator() -> MetadataLocator {
    MetadataLocator::new(vec![
      MetadataDirectory::new("/app/src/Model", "app.model"),
      MetadataDirectory::new("/app/src/ModelOverride", "app.model"),
      MetadataDirectory::new("/app/src/Dto", "app.dto"),
    ])
  }

  #[test]
  fn first_registered_namespace_wins() {
    assert_eq!(
      locator().locate("app.model.User"),
      Some(PathBuf::from("/app/src/Model/User.json"))
    );
  }

  #[test]
  fn later_namespaces_are_reachable() {
    assert_eq!(
      locator().locate("app.dto.UserDto"),
      Some(PathBuf::from("/app/src/Dto/UserDto.json"))
    );
  }

  #[test]
  fn rust_path_separators_are_accepted() {
    assert_eq!(
      locator().locate("app::model::User"),
      Some(PathBuf::from("/app/src/Model/User.json"))
    );
  }

  #[test]
  fn prefix_must_end_on_a_boundary() {
    let locator = MetadataLocator::new(vec![MetadataDirectory::new("/dirs/app", "app")]);
    assert_eq!(locator.locate("application.User"), None);
    assert_eq!(locator.locate("app"), None);
  }

  #[test]
  fn unmapped_type_resolves_to_none() {
    assert_eq!(locator().locate("other.Thing"), None);
  }
}
