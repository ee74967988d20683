use crate::coerce::coerce;
use crate::configurer::PropertyConfigurer;
use crate::descriptor::{OptionInfo, PropertyDescriptor};
use crate::error::ConfigureError;
use crate::resolver::ReferenceResolver;
use fxhash::FxHashMap;
use knob_domain::PropertyValue;
use std::borrow::Cow;
use std::fmt;
use tracing::trace;

/// The read-only dispatch table of one target type.
///
/// Every accepted spelling maps to exactly one [`PropertyDescriptor`]. Built once by
/// [`crate::RegistryBuilder`], then shared freely between threads: lookups never lock.
pub struct PropertyRegistry<T> {
    component: &'static str,
    descriptors: Vec<PropertyDescriptor<T>>,
    index: FxHashMap<Box<str>, usize>,
}

impl<T> PropertyRegistry<T> {
    pub(crate) const fn new(
        component: &'static str,
        descriptors: Vec<PropertyDescriptor<T>>,
        index: FxHashMap<Box<str>, usize>,
    ) -> Self {
        Self { component, descriptors, index }
    }

    /// Name of the component or configuration class this registry describes.
    #[must_use]
    pub const fn component(&self) -> &'static str {
        self.component
    }

    /// Resolves a property name.
    ///
    /// With `ignore_case` the name is lower-cased first; otherwise it must match one of
    /// the registered spellings exactly.
    #[must_use]
    pub fn lookup(&self, name: &str, ignore_case: bool) -> Option<&PropertyDescriptor<T>> {
        let key: Cow<'_, str> =
            if ignore_case { Cow::Owned(name.to_lowercase()) } else { Cow::Borrowed(name) };
        self.index.get(key.as_ref()).and_then(|&pos| self.descriptors.get(pos))
    }

    /// Descriptors in declaration order.
    pub fn descriptors(&self) -> impl ExactSizeIterator<Item = &PropertyDescriptor<T>> {
        self.descriptors.iter()
    }

    /// Every accepted spelling, in no particular order.
    pub fn spellings(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(|k| &**k)
    }

    /// Number of registered properties (not spellings).
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl<T> PropertyConfigurer<T> for PropertyRegistry<T> {
    fn configure(
        &self,
        resolver: &dyn ReferenceResolver,
        target: &mut T,
        name: &str,
        value: PropertyValue,
        ignore_case: bool,
    ) -> Result<bool, ConfigureError> {
        let Some(descriptor) = self.lookup(name, ignore_case) else {
            trace!(component = self.component, name, "Property not handled");
            return Ok(false);
        };

        let value = coerce(descriptor.name(), &descriptor.ty(), value, resolver)?;
        descriptor.set(target, value)?;

        trace!(component = self.component, property = descriptor.name(), "Property configured");
        Ok(true)
    }

    fn option_info(&self, name: &str, ignore_case: bool) -> Option<OptionInfo> {
        self.lookup(name, ignore_case).map(PropertyDescriptor::info)
    }

    fn option_value(&self, target: &T, name: &str, ignore_case: bool) -> Option<PropertyValue> {
        self.lookup(name, ignore_case).and_then(|d| d.get(target))
    }

    fn options(&self) -> Vec<OptionInfo> {
        self.descriptors.iter().map(PropertyDescriptor::info).collect()
    }
}

impl<T> fmt::Debug for PropertyRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("component", &self.component)
            .field("descriptors", &self.descriptors)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::{NoReferences, PropertyConfigurer, RegistryBuilder};
    use knob_domain::{PropertyType, PropertyValue};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Glance {
        api_version: Option<String>,
        lazy_start_producer: bool,
    }

    fn registry() -> crate::PropertyRegistry<Glance> {
        RegistryBuilder::<Glance>::new("glance")
            .string("apiVersion", |t, v| t.api_version = Some(v), |t| t.api_version.clone())
            .boolean("lazyStartProducer", |t, v| t.lazy_start_producer = v, |t| t.lazy_start_producer)
            .build()
            .expect("registry builds")
    }

    #[test]
    fn lower_cased_spelling_matches_without_ignore_case() {
        let registry = registry();
        assert_eq!(registry.lookup("apiversion", false).map(|d| d.name()), Some("apiVersion"));
        assert_eq!(registry.lookup("apiVersion", false).map(|d| d.name()), Some("apiVersion"));
        assert!(registry.lookup("APIVERSION", false).is_none());
        assert_eq!(registry.lookup("APIVERSION", true).map(|d| d.name()), Some("apiVersion"));
    }

    #[test]
    fn unknown_names_leave_target_untouched() {
        let registry = registry();
        let mut target = Glance::default();
        let before = target.clone();

        let handled = registry
            .configure(&NoReferences, &mut target, "doesNotExist", "x".into(), false)
            .expect("unknown is not an error");

        assert!(!handled);
        assert_eq!(target, before);
        assert!(registry.option_type("doesNotExist", false).is_none());
        assert!(registry.option_value(&target, "doesNotExist", false).is_none());
    }

    #[test]
    fn options_follow_declaration_order() {
        let registry = registry();
        let names: Vec<_> = registry.options().iter().map(|o| o.name).collect();
        assert_eq!(names, ["apiVersion", "lazyStartProducer"]);
        assert_eq!(registry.option_type("lazystartproducer", false), Some(PropertyType::Boolean));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.spellings().count(), 4);
    }

    #[test]
    fn getter_reports_unset_values_as_none() {
        let registry = registry();
        let target = Glance::default();
        assert!(registry.option_value(&target, "apiVersion", false).is_none());
        assert_eq!(
            registry.option_value(&target, "lazyStartProducer", false),
            Some(PropertyValue::Boolean(false))
        );
    }
}
