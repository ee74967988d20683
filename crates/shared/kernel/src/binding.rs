//! # Property Binding
//!
//! Applies a whole map of named values to one target, the way an endpoint applies the
//! query of its URI or a configuration class applies its `camel.rest.*` keys.

use crate::configurer::PropertyConfigurer;
use crate::error::{ConfigureError, format_context};
use crate::resolver::ReferenceResolver;
use knob_domain::PropertyValue;
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Named raw values, iterated in key order.
pub type Properties = BTreeMap<String, PropertyValue>;

#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("Bind error{}: {source}", format_context(.context))]
    Configure {
        #[source]
        source: ConfigureError,
        context: Option<Cow<'static, str>>,
    },

    /// Names no configurer recognized; the known ones have been applied.
    #[error("Unknown properties{}: {}", format_context(.context), .names.join(", "))]
    UnknownProperties { names: Vec<String>, context: Option<Cow<'static, str>> },
}

pub trait BindErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, BindError>;
}

impl<T> BindErrorExt<T> for Result<T, BindError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                BindError::Configure { context: c, .. } | BindError::UnknownProperties { context: c, .. } => {
                    *c = Some(context.into());
                },
            }
            e
        })
    }
}

impl<T> BindErrorExt<T> for Result<T, ConfigureError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, BindError> {
        self.map_err(|source| BindError::Configure { source, context: Some(context.into()) })
    }
}

impl From<ConfigureError> for BindError {
    #[inline]
    fn from(source: ConfigureError) -> Self {
        Self::Configure { source, context: None }
    }
}

/// Outcome of a successful [`PropertyBinder::bind`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Keys that were applied, without the prefix.
    pub applied: Vec<String>,
    /// Keys no configurer recognized, without the prefix.
    pub unknown: Vec<String>,
    /// Keys outside the prefix, left alone.
    pub skipped: usize,
}

impl BindReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unknown.is_empty()
    }
}

/// Policy for applying a property map.
///
/// Defaults: case-insensitive names, unknown names are fatal, no prefix.
///
/// # Example
/// ```rust
/// use knob_kernel::{NoReferences, Properties, PropertyBinder, RegistryBuilder};
///
/// #[derive(Default)]
/// struct Rest { port: i32 }
///
/// let registry = RegistryBuilder::<Rest>::new("rest")
///     .int("port", |t, v| t.port = v, |t| t.port)
///     .build()
///     .unwrap();
///
/// let mut properties = Properties::new();
/// properties.insert("camel.rest.port".into(), "8080".into());
/// properties.insert("camel.main.name".into(), "demo".into());
///
/// let mut rest = Rest::default();
/// let report = PropertyBinder::new()
///     .with_prefix("camel.rest.")
///     .bind(&NoReferences, &registry, &mut rest, properties)
///     .unwrap();
///
/// assert_eq!(rest.port, 8080);
/// assert_eq!(report.skipped, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyBinder {
    ignore_case: bool,
    fail_on_unknown: bool,
    prefix: Option<String>,
}

impl Default for PropertyBinder {
    fn default() -> Self {
        Self { ignore_case: true, fail_on_unknown: true, prefix: None }
    }
}

impl PropertyBinder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    #[must_use]
    pub const fn fail_on_unknown(mut self, fail_on_unknown: bool) -> Self {
        self.fail_on_unknown = fail_on_unknown;
        self
    }

    /// Only keys starting with `prefix` are bound; the prefix is stripped first.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Applies `properties` to `target` in key order.
    ///
    /// # Errors
    /// Returns [`BindError::Configure`] on the first value that cannot be applied (the
    /// failing key is recorded as context), and [`BindError::UnknownProperties`] when
    /// unknown names remain and the binder fails on them.
    pub fn bind<T, C>(
        &self,
        resolver: &dyn ReferenceResolver,
        configurer: &C,
        target: &mut T,
        properties: Properties,
    ) -> Result<BindReport, BindError>
    where
        C: PropertyConfigurer<T> + ?Sized,
    {
        let mut report = BindReport::default();

        for (key, value) in properties {
            let name = match self.prefix.as_deref() {
                Some(prefix) => match key.strip_prefix(prefix) {
                    Some(name) if !name.is_empty() => name,
                    _ => {
                        report.skipped += 1;
                        continue;
                    },
                },
                None => key.as_str(),
            };

            let applied = configurer
                .configure(resolver, target, name, value, self.ignore_case)
                .context(key.clone())?;

            if applied {
                debug!(property = name, "Property bound");
                report.applied.push(name.to_owned());
            } else {
                report.unknown.push(name.to_owned());
            }
        }

        if !report.unknown.is_empty() {
            if self.fail_on_unknown {
                return Err(BindError::UnknownProperties {
                    names: report.unknown,
                    context: self.prefix.clone().map(Cow::Owned),
                });
            }
            warn!(unknown = ?report.unknown, "Ignoring unknown properties");
        }

        Ok(report)
    }
}
