//! # Configurer Errors
//!
//! [`ConfigureError`] is raised while applying a single value; [`RegistryError`] while
//! declaring a registry. An unknown property name is deliberately not an error: the
//! configurer answers `Ok(false)` so callers can fall through to the next one.

use knob_domain::PropertyType;
use std::borrow::Cow;

/// Failure to apply a value to a known property.
#[derive(Debug, thiserror::Error)]
pub enum ConfigureError {
    /// The raw value could not be converted to the declared type.
    #[error(
        "Cannot convert value of property '{property}' to {expected}{}: {message}",
        format_context(.context)
    )]
    TypeCoercion {
        property: Cow<'static, str>,
        expected: PropertyType,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// An enum constant or object reference could not be resolved.
    #[error(
        "Unresolved reference '{reference}' for property '{property}' of type {expected}{}",
        format_context(.context)
    )]
    UnresolvedReference {
        property: Cow<'static, str>,
        reference: Cow<'static, str>,
        expected: PropertyType,
        context: Option<Cow<'static, str>>,
    },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal configurer error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Failure to declare a property registry.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    /// One spelling was claimed by two different properties.
    #[error("Duplicate property name '{name}'{}", format_context(.context))]
    DuplicateName { name: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A property declaration is unusable (empty name, enum without constants, ...).
    #[error("Invalid property declaration{}: {message}", format_context(.context))]
    InvalidDeclaration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

pub trait ConfigureErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, ConfigureError>;
}

impl<T> ConfigureErrorExt<T> for Result<T, ConfigureError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                ConfigureError::TypeCoercion { context: c, .. }
                | ConfigureError::UnresolvedReference { context: c, .. }
                | ConfigureError::Internal { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

pub trait RegistryErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, RegistryError>;
}

impl<T> RegistryErrorExt<T> for Result<T, RegistryError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                RegistryError::DuplicateName { context: c, .. }
                | RegistryError::InvalidDeclaration { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

impl From<&'static str> for ConfigureError {
    #[inline]
    fn from(s: &'static str) -> Self {
        Self::Internal { message: Cow::Borrowed(s), context: None }
    }
}

impl From<String> for ConfigureError {
    #[inline]
    fn from(s: String) -> Self {
        Self::Internal { message: Cow::Owned(s), context: None }
    }
}

pub(crate) fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
