//! Serializer service registration and wiring for two-phase container builds.

pub mod di;
pub mod serialization;

pub use di::*;
pub use serialization::*;
