mod capability;
mod compiler;
mod container;
mod container_builder;
mod errors;
mod service_definition;

pub use self::{
    capability::*,
    compiler::*,
    container::*,
    container_builder::*,
    errors::*,
    service_definition::*,
};
