use tracing::{debug, info};

use crate::di::container::Container;
use crate::di::container_builder::ContainerBuilder;
use crate::di::errors::CompileError;

/// A module that contributes service definitions to the container build.
///
/// The compiler runs `load_configuration` for every extension before any
/// extension's `before_compile`, so finalization always observes the complete
/// registration set. Extensions that only declare services can rely on the
/// default `before_compile`.
pub trait CompilerExtension: Send {
  fn name(&self) -> &str;

  /// First phase: declare services and apply static configuration.
  fn load_configuration(&mut self, builder: &mut ContainerBuilder) -> Result<(), CompileError>;

  /// Second phase: inspect the full service set and finish wiring.
  fn before_compile(&mut self, _builder: &mut ContainerBuilder) -> Result<(), CompileError> {
    Ok(())
  }
}

/// Drives the two-phase build and freezes the result into a [`Container`].
#[derive(Default)]
pub struct Compiler {
  extensions: Vec<Box<dyn CompilerExtension>>,
  builder: ContainerBuilder,
}

impl Compiler {
  pub fn new() -> Self {
    Compiler {
      extensions: Vec::new(),
      builder: ContainerBuilder::new(),
    }
  }

  pub fn add_extension(&mut self, extension: impl CompilerExtension + 'static) -> &mut Self {
    self.extensions.push(Box::new(extension));
    self
  }

  /// Host applications declare their own services here; they are visible to
  /// every extension's `before_compile` scan.
  pub fn builder_mut(&mut self) -> &mut ContainerBuilder {
    &mut self.builder
  }

  pub fn compile(mut self) -> Result<Container, CompileError> {
    for extension in &mut self.extensions {
      debug!(extension = extension.name(), "load configuration");
      extension.load_configuration(&mut self.builder)?;
    }
    for extension in &mut self.extensions {
      debug!(extension = extension.name(), "before compile");
      extension.before_compile(&mut self.builder)?;
    }
    info!(services = self.builder.len(), "container compiled");
    Ok(self.builder.build())
  }
}

impl std::fmt::Debug for Compiler {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Compiler")
      .field("extensions", &self.extensions.len())
      .field("declared", &self.builder.len())
      .finish()
  }
}
