use crate::descriptor::OptionInfo;
use crate::error::ConfigureError;
use crate::resolver::ReferenceResolver;
use knob_domain::{PropertyType, PropertyValue};
use std::fmt;
use std::sync::Arc;

/// Applies named, loosely typed values to a target of type `T`.
///
/// An unknown name is not an error: [`configure`](Self::configure) answers `Ok(false)`
/// and leaves the target untouched, so several configurers can be tried in turn.
pub trait PropertyConfigurer<T>: Send + Sync {
    /// Coerces `value` to the declared type of `name` and assigns it.
    ///
    /// Returns `Ok(true)` if the property is known and was set.
    ///
    /// # Errors
    /// Returns [`ConfigureError`] if the value cannot be coerced or a reference cannot
    /// be resolved. The target is left unchanged in that case.
    fn configure(
        &self,
        resolver: &dyn ReferenceResolver,
        target: &mut T,
        name: &str,
        value: PropertyValue,
        ignore_case: bool,
    ) -> Result<bool, ConfigureError>;

    /// Introspection view of `name`, if it is known.
    fn option_info(&self, name: &str, ignore_case: bool) -> Option<OptionInfo>;

    fn option_type(&self, name: &str, ignore_case: bool) -> Option<PropertyType> {
        self.option_info(name, ignore_case).map(|info| info.ty)
    }

    /// Current value of `name`; `None` if the name is unknown or the property is unset.
    fn option_value(&self, target: &T, name: &str, ignore_case: bool) -> Option<PropertyValue>;

    /// Every canonical option, in declaration order.
    fn options(&self) -> Vec<OptionInfo>;
}

impl<T, C> PropertyConfigurer<T> for &C
where
    C: PropertyConfigurer<T> + ?Sized,
{
    fn configure(
        &self,
        resolver: &dyn ReferenceResolver,
        target: &mut T,
        name: &str,
        value: PropertyValue,
        ignore_case: bool,
    ) -> Result<bool, ConfigureError> {
        (**self).configure(resolver, target, name, value, ignore_case)
    }

    fn option_info(&self, name: &str, ignore_case: bool) -> Option<OptionInfo> {
        (**self).option_info(name, ignore_case)
    }

    fn option_value(&self, target: &T, name: &str, ignore_case: bool) -> Option<PropertyValue> {
        (**self).option_value(target, name, ignore_case)
    }

    fn options(&self) -> Vec<OptionInfo> {
        (**self).options()
    }
}

impl<T, C> PropertyConfigurer<T> for Arc<C>
where
    C: PropertyConfigurer<T> + ?Sized,
{
    fn configure(
        &self,
        resolver: &dyn ReferenceResolver,
        target: &mut T,
        name: &str,
        value: PropertyValue,
        ignore_case: bool,
    ) -> Result<bool, ConfigureError> {
        (**self).configure(resolver, target, name, value, ignore_case)
    }

    fn option_info(&self, name: &str, ignore_case: bool) -> Option<OptionInfo> {
        (**self).option_info(name, ignore_case)
    }

    fn option_value(&self, target: &T, name: &str, ignore_case: bool) -> Option<PropertyValue> {
        (**self).option_value(target, name, ignore_case)
    }

    fn options(&self) -> Vec<OptionInfo> {
        (**self).options()
    }
}

/// Ordered fall-through over several configurers of the same target.
///
/// The first link that knows a name handles it; links further down never see it.
///
/// # Example
/// ```rust
/// use knob_kernel::{ConfigurerChain, NoReferences, PropertyConfigurer, RegistryBuilder};
///
/// #[derive(Default)]
/// struct Target { name: Option<String>, port: i32 }
///
/// let names = RegistryBuilder::<Target>::new("names")
///     .string("name", |t, v| t.name = Some(v), |t| t.name.clone())
///     .build()
///     .unwrap();
/// let ports = RegistryBuilder::<Target>::new("ports")
///     .int("port", |t, v| t.port = v, |t| t.port)
///     .build()
///     .unwrap();
///
/// let chain = ConfigurerChain::new().with(names).with(ports);
/// let mut target = Target::default();
/// assert!(chain.configure(&NoReferences, &mut target, "port", "8080".into(), false).unwrap());
/// assert_eq!(target.port, 8080);
/// ```
pub struct ConfigurerChain<T> {
    links: Vec<Box<dyn PropertyConfigurer<T>>>,
}

impl<T> ConfigurerChain<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { links: Vec::new() }
    }

    /// Appends a link; earlier links take precedence.
    #[must_use]
    pub fn with(mut self, configurer: impl PropertyConfigurer<T> + 'static) -> Self {
        self.links.push(Box::new(configurer));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl<T> Default for ConfigurerChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PropertyConfigurer<T> for ConfigurerChain<T> {
    fn configure(
        &self,
        resolver: &dyn ReferenceResolver,
        target: &mut T,
        name: &str,
        value: PropertyValue,
        ignore_case: bool,
    ) -> Result<bool, ConfigureError> {
        match self.links.iter().find(|link| link.option_info(name, ignore_case).is_some()) {
            Some(link) => link.configure(resolver, target, name, value, ignore_case),
            None => Ok(false),
        }
    }

    fn option_info(&self, name: &str, ignore_case: bool) -> Option<OptionInfo> {
        self.links.iter().find_map(|link| link.option_info(name, ignore_case))
    }

    fn option_value(&self, target: &T, name: &str, ignore_case: bool) -> Option<PropertyValue> {
        self.links
            .iter()
            .find(|link| link.option_info(name, ignore_case).is_some())
            .and_then(|link| link.option_value(target, name, ignore_case))
    }

    fn options(&self) -> Vec<OptionInfo> {
        let mut merged: Vec<OptionInfo> = Vec::new();
        for info in self.links.iter().flat_map(|link| link.options()) {
            if !merged.iter().any(|known| known.name == info.name) {
                merged.push(info);
            }
        }
        merged
    }
}

impl<T> fmt::Debug for ConfigurerChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurerChain").field("links", &self.links.len()).finish()
    }
}

/// Exposes a configurer of `Inner` on an `Outer` that embeds it.
///
/// Shared option groups (producer or consumer options) are declared once on their own
/// struct and attached to each endpoint through a projection.
pub struct Projection<Outer, Inner, C> {
    inner: C,
    get: fn(&Outer) -> &Inner,
    get_mut: fn(&mut Outer) -> &mut Inner,
}

impl<Outer, Inner, C> Projection<Outer, Inner, C>
where
    C: PropertyConfigurer<Inner>,
{
    pub const fn new(inner: C, get: fn(&Outer) -> &Inner, get_mut: fn(&mut Outer) -> &mut Inner) -> Self {
        Self { inner, get, get_mut }
    }
}

impl<Outer, Inner, C> PropertyConfigurer<Outer> for Projection<Outer, Inner, C>
where
    C: PropertyConfigurer<Inner>,
{
    fn configure(
        &self,
        resolver: &dyn ReferenceResolver,
        target: &mut Outer,
        name: &str,
        value: PropertyValue,
        ignore_case: bool,
    ) -> Result<bool, ConfigureError> {
        self.inner.configure(resolver, (self.get_mut)(target), name, value, ignore_case)
    }

    fn option_info(&self, name: &str, ignore_case: bool) -> Option<OptionInfo> {
        self.inner.option_info(name, ignore_case)
    }

    fn option_value(&self, target: &Outer, name: &str, ignore_case: bool) -> Option<PropertyValue> {
        self.inner.option_value((self.get)(target), name, ignore_case)
    }

    fn options(&self) -> Vec<OptionInfo> {
        self.inner.options()
    }
}

impl<Outer, Inner, C> fmt::Debug for Projection<Outer, Inner, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projection")
            .field("outer", &std::any::type_name::<Outer>())
            .field("inner", &std::any::type_name::<Inner>())
            .finish_non_exhaustive()
    }
}
