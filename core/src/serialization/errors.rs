use thiserror::Error;

/// Runtime (de)serialization failures. Wiring failures live in
/// [`crate::di::WiringError`]; nothing here is retried or recovered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializationError {
  #[error("serialization failed: {0}")]
  SerializeFailed(String),
  #[error("deserialization failed: {0}")]
  DeserializeFailed(String),
  #[error("handler for type '{type_name}' produced an invalid payload: {reason}")]
  InvalidHandlerPayload { type_name: String, reason: String },
}

static_assertions::assert_impl_all!(SerializationError: Send, Sync);
