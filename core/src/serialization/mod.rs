//! Serializer library surface plus the extension that wires it into a
//! container build.

mod config;
mod errors;
mod event_dispatcher;
mod extension;
mod handler_registry;
mod metadata_locator;
mod naming;
mod serializer_builder;
mod serializer_impl;

pub use self::{
    config::*,
    errors::*,
    event_dispatcher::*,
    extension::*,
    handler_registry::*,
    metadata_locator::*,
    naming::*,
    serializer_builder::*,
    serializer_impl::*,
};
