//! Everything a configurer implementation usually needs.

pub use crate::{
    BindReport, ConfigureError, ConfigurerChain, Endpoint, EndpointOptions, EndpointUri, ExchangePattern,
    OptionInfo, Projection, Properties, PropertyBinder, PropertyConfigurer, PropertyEnum,
    PropertyRegistry, ReferenceResolver, RegistryBuilder, RegistryError,
};
pub use knob_domain::{ObjectRef, PropertyType, PropertyValue};
