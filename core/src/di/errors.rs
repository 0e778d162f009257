use thiserror::Error;

use crate::serialization::ConfigurationError;

/// Build-time wiring failures. Every variant aborts the container build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WiringError {
  #[error("Service not found: {0}")]
  ServiceNotFound(String),
  #[error("Duplicate definition: {0}")]
  DuplicateDefinition(String),
  #[error("Type mismatch for service '{service}': expected {expected}")]
  TypeMismatch { service: String, expected: &'static str },
  #[error("Service '{service}' does not satisfy capability {capability}")]
  CapabilityMismatch { service: String, capability: &'static str },
  #[error("Setup failed for service '{service}': {reason}")]
  SetupFailed { service: String, reason: String },
}

/// Umbrella error for the two-phase compile.
#[derive(Debug, Error)]
pub enum CompileError {
  #[error(transparent)]
  Configuration(#[from] ConfigurationError),
  #[error(transparent)]
  Wiring(#[from] WiringError),
}

static_assertions::assert_impl_all!(WiringError: Send, Sync);
static_assertions::assert_impl_all!(CompileError: Send, Sync);
