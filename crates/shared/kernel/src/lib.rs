//! Property configuration kernel shared by every endpoint and configuration class.
//! Keep this crate free of component specifics; it provides the registry, coercion, binding and URI plumbing.
//!
//! ## Declaring options
//! ```rust
//! use knob_kernel::{NoReferences, PropertyConfigurer, RegistryBuilder};
//!
//! #[derive(Default)]
//! struct Glance { api_version: Option<String> }
//!
//! let registry = RegistryBuilder::<Glance>::new("openstack-glance")
//!     .string("apiVersion", |t, v| t.api_version = Some(v), |t| t.api_version.clone())
//!     .build()
//!     .unwrap();
//!
//! let mut glance = Glance::default();
//! assert!(registry.configure(&NoReferences, &mut glance, "apiversion", "v2".into(), false).unwrap());
//! assert_eq!(glance.api_version.as_deref(), Some("v2"));
//! ```
//!
//! ## Enumerated options
//! ```rust
//! knob_kernel::config_enum! {
//!     pub enum Operation as "GlanceOperation" {
//!         Create => "create",
//!         Get => "get",
//!     }
//! }
//!
//! use knob_kernel::PropertyEnum;
//! assert_eq!(Operation::from_constant("get"), Some(Operation::Get));
//! ```
mod binding;
mod builder;
mod coerce;
pub mod config;
mod configurer;
mod descriptor;
mod endpoint;
mod error;
pub mod prelude;
mod registry;
mod resolver;
mod uri;

pub use binding::{BindError, BindErrorExt, BindReport, Properties, PropertyBinder};
pub use builder::RegistryBuilder;
pub use coerce::{coerce, parse_boolean, reference_name};
pub use configurer::{ConfigurerChain, Projection, PropertyConfigurer};
pub use descriptor::{OptionInfo, PropertyDescriptor, PropertyEnum, PropertyMeta};
pub use endpoint::{Endpoint, EndpointError, EndpointErrorExt, EndpointOptions, ExchangePattern};
pub use error::{ConfigureError, ConfigureErrorExt, RegistryError, RegistryErrorExt};
pub use knob_domain as domain;
pub use registry::PropertyRegistry;
pub use resolver::{BeanRegistry, NoReferences, ReferenceResolver};
pub use uri::{EndpointUri, EndpointUriBuilder, MASK, UriError};

/// Declares a Rust enum usable as the value type of an enumerated option.
///
/// Each variant is paired with the constant accepted in URIs and property files.
/// The generated type implements [`PropertyEnum`] and [`std::fmt::Display`].
#[macro_export]
macro_rules! config_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident as $type_name:literal {
            $( $(#[$variant_meta:meta])* $variant:ident => $constant:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$variant_meta])* $variant ),+
        }

        impl $crate::PropertyEnum for $name {
            const TYPE: $crate::domain::EnumType =
                $crate::domain::EnumType::new($type_name, &[$($constant),+]);

            fn from_constant(constant: &str) -> ::core::option::Option<Self> {
                match constant {
                    $( $constant => ::core::option::Option::Some(Self::$variant), )+
                    _ => ::core::option::Option::None,
                }
            }

            fn constant(self) -> &'static str {
                match self {
                    $( Self::$variant => $constant, )+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str($crate::PropertyEnum::constant(*self))
            }
        }
    };
}
