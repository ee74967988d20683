use crate::error::ConfigureError;
use knob_domain::{EnumType, PropertyType, PropertyValue};
use serde::Serialize;
use std::fmt;

pub(crate) type Setter<T> =
    Box<dyn Fn(&mut T, PropertyValue) -> Result<(), ConfigureError> + Send + Sync>;
pub(crate) type Getter<T> = Box<dyn Fn(&T) -> Option<PropertyValue> + Send + Sync>;

/// Descriptive metadata of an option, used for listings and URI sanitizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMeta {
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<&'static str>,
    /// Values are masked when an endpoint URI is rendered for logs.
    pub secret: bool,
}

/// Introspection view of one option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionInfo {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: PropertyType,
    #[serde(flatten)]
    pub meta: PropertyMeta,
}

/// A Rust enum usable as the value type of an enumerated option.
///
/// Usually implemented through [`crate::config_enum!`].
pub trait PropertyEnum: Copy + Send + Sync + 'static {
    const TYPE: EnumType;

    fn from_constant(constant: &str) -> Option<Self>;

    fn constant(self) -> &'static str;
}

/// One registered property: canonical name, declared type and typed accessor pair.
///
/// Descriptors are created by [`crate::RegistryBuilder`] and never change afterwards.
pub struct PropertyDescriptor<T> {
    pub(crate) name: &'static str,
    pub(crate) aliases: Vec<&'static str>,
    pub(crate) ty: PropertyType,
    pub(crate) meta: PropertyMeta,
    pub(crate) setter: Setter<T>,
    pub(crate) getter: Getter<T>,
}

impl<T> PropertyDescriptor<T> {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Extra spellings accepted besides the canonical name and its lower-cased form.
    #[must_use]
    pub fn aliases(&self) -> &[&'static str] {
        &self.aliases
    }

    #[must_use]
    pub const fn ty(&self) -> PropertyType {
        self.ty
    }

    #[must_use]
    pub const fn meta(&self) -> &PropertyMeta {
        &self.meta
    }

    #[must_use]
    pub const fn info(&self) -> OptionInfo {
        OptionInfo { name: self.name, ty: self.ty, meta: self.meta }
    }

    /// Invokes the setter with an already coerced value.
    ///
    /// # Errors
    /// Returns [`ConfigureError::Internal`] if `value` does not have the declared shape.
    pub fn set(&self, target: &mut T, value: PropertyValue) -> Result<(), ConfigureError> {
        (self.setter)(target, value)
    }

    /// Invokes the getter; `None` when the property currently holds no value.
    pub fn get(&self, target: &T) -> Option<PropertyValue> {
        (self.getter)(target)
    }
}

impl<T> fmt::Debug for PropertyDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}
