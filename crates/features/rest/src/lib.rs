//! Global configuration of the REST DSL, bound from `camel.rest.*` properties.
mod configuration;
mod error;
mod maps;

pub use configuration::{HostNameResolver, RestBindingMode, RestConfiguration};
pub use error::{RestError, RestErrorExt};
pub use maps::MapOptions;

/// Prefix of REST properties in a properties file.
pub const PROPERTIES_PREFIX: &str = "camel.rest.";
