use crate::descriptor::{Getter, PropertyDescriptor, PropertyEnum, PropertyMeta, Setter};
use crate::error::{ConfigureError, RegistryError};
use crate::registry::PropertyRegistry;
use fxhash::FxHashMap;
use knob_domain::{ObjectRef, ObjectType, PropertyType, PropertyValue};
use std::any::Any;
use std::borrow::Cow;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Declares the properties of one target type.
///
/// Each typed method registers a property with its setter and getter; the metadata
/// methods ([`description`](Self::description), [`secret`](Self::secret), ...) apply to
/// the property registered last. The canonical name and its lower-cased spelling are
/// always accepted, as is every [`alias`](Self::alias).
///
/// # Example
/// ```rust
/// use knob_kernel::RegistryBuilder;
///
/// #[derive(Default)]
/// struct Endpoint {
///     api_version: Option<String>,
///     lazy_start_producer: bool,
/// }
///
/// let registry = RegistryBuilder::<Endpoint>::new("glance")
///     .string("apiVersion", |t, v| t.api_version = Some(v), |t| t.api_version.clone())
///     .boolean("lazyStartProducer", |t, v| t.lazy_start_producer = v, |t| t.lazy_start_producer)
///     .default_value("false")
///     .build()
///     .unwrap();
///
/// assert!(registry.lookup("apiversion", false).is_some());
/// ```
#[must_use = "The builder must be finished with `build` to produce a registry"]
pub struct RegistryBuilder<T> {
    component: &'static str,
    descriptors: Vec<PropertyDescriptor<T>>,
    orphan_metadata: bool,
}

impl<T> fmt::Debug for RegistryBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("component", &self.component)
            .field("descriptors", &self.descriptors)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> RegistryBuilder<T> {
    pub fn new(component: &'static str) -> Self {
        Self { component, descriptors: Vec::new(), orphan_metadata: false }
    }

    pub fn boolean<G>(
        self,
        name: &'static str,
        set: impl Fn(&mut T, bool) + Send + Sync + 'static,
        get: impl Fn(&T) -> G + Send + Sync + 'static,
    ) -> Self
    where
        G: Into<Option<bool>>,
    {
        self.typed(name, PropertyType::Boolean, set, get, |v| v.as_bool(), PropertyValue::Boolean)
    }

    pub fn string<G>(
        self,
        name: &'static str,
        set: impl Fn(&mut T, String) + Send + Sync + 'static,
        get: impl Fn(&T) -> G + Send + Sync + 'static,
    ) -> Self
    where
        G: Into<Option<String>>,
    {
        self.typed(
            name,
            PropertyType::String,
            set,
            get,
            |v| match v {
                PropertyValue::String(s) => Some(s),
                _ => None,
            },
            PropertyValue::String,
        )
    }

    pub fn int<G>(
        self,
        name: &'static str,
        set: impl Fn(&mut T, i32) + Send + Sync + 'static,
        get: impl Fn(&T) -> G + Send + Sync + 'static,
    ) -> Self
    where
        G: Into<Option<i32>>,
    {
        self.typed(
            name,
            PropertyType::Int,
            set,
            get,
            |v| match v {
                PropertyValue::Int(i) => Some(i),
                _ => None,
            },
            PropertyValue::Int,
        )
    }

    pub fn long<G>(
        self,
        name: &'static str,
        set: impl Fn(&mut T, i64) + Send + Sync + 'static,
        get: impl Fn(&T) -> G + Send + Sync + 'static,
    ) -> Self
    where
        G: Into<Option<i64>>,
    {
        self.typed(
            name,
            PropertyType::Long,
            set,
            get,
            |v| match v {
                PropertyValue::Long(i) => Some(i),
                _ => None,
            },
            PropertyValue::Long,
        )
    }

    pub fn double<G>(
        self,
        name: &'static str,
        set: impl Fn(&mut T, f64) + Send + Sync + 'static,
        get: impl Fn(&T) -> G + Send + Sync + 'static,
    ) -> Self
    where
        G: Into<Option<f64>>,
    {
        self.typed(name, PropertyType::Double, set, get, |v| v.as_f64(), PropertyValue::Double)
    }

    /// Registers an option whose value is one of the constants of `E`.
    pub fn enumeration<E, G>(
        self,
        name: &'static str,
        set: impl Fn(&mut T, E) + Send + Sync + 'static,
        get: impl Fn(&T) -> G + Send + Sync + 'static,
    ) -> Self
    where
        E: PropertyEnum,
        G: Into<Option<E>>,
    {
        self.typed(
            name,
            PropertyType::Enum(E::TYPE),
            set,
            get,
            |v| v.as_str().and_then(E::from_constant),
            |e| PropertyValue::Enum(Cow::Borrowed(e.constant())),
        )
    }

    /// Registers an option holding a shared `O`, bound directly or looked up by name.
    pub fn object<O, G>(
        self,
        name: &'static str,
        set: impl Fn(&mut T, Arc<O>) + Send + Sync + 'static,
        get: impl Fn(&T) -> G + Send + Sync + 'static,
    ) -> Self
    where
        O: Any + Send + Sync,
        G: Into<Option<Arc<O>>>,
    {
        self.typed(
            name,
            PropertyType::Object(ObjectType::of::<O>()),
            set,
            get,
            |v| v.as_object().and_then(ObjectRef::downcast::<O>),
            |o| PropertyValue::Object(ObjectRef::from_arc(o)),
        )
    }

    /// Accepts an additional spelling for the last registered property.
    pub fn alias(self, spelling: &'static str) -> Self {
        self.with_last(|d| d.aliases.push(spelling))
    }

    pub fn description(self, text: &'static str) -> Self {
        self.with_last(|d| d.meta.description = text)
    }

    pub fn default_value(self, text: &'static str) -> Self {
        self.with_last(|d| d.meta.default_value = Some(text))
    }

    pub fn group(self, group: &'static str) -> Self {
        self.with_last(|d| d.meta.group = Some(group))
    }

    /// Marks the last registered property as sensitive (passwords, tokens).
    pub fn secret(self) -> Self {
        self.with_last(|d| d.meta.secret = true)
    }

    /// Adds a check on coerced values of the last registered property. A rejected value
    /// fails with [`ConfigureError::TypeCoercion`] and leaves the target untouched.
    pub fn check(
        self,
        check: impl Fn(&PropertyValue) -> Result<(), Cow<'static, str>> + Send + Sync + 'static,
    ) -> Self {
        self.with_last(|d| {
            let (name, ty) = (d.name, d.ty);
            let inner = std::mem::replace(&mut d.setter, Box::new(|_, _| Ok(())));
            d.setter = Box::new(move |target, value| {
                check(&value).map_err(|message| ConfigureError::TypeCoercion {
                    property: name.into(),
                    expected: ty,
                    message,
                    context: None,
                })?;
                inner(target, value)
            });
        })
    }

    /// Validates the declarations and builds the spelling index.
    ///
    /// # Errors
    /// Returns [`RegistryError::DuplicateName`] if one spelling maps to two properties,
    /// and [`RegistryError::InvalidDeclaration`] for empty names, enums without
    /// constants, or metadata given before any property.
    pub fn build(self) -> Result<PropertyRegistry<T>, RegistryError> {
        if self.orphan_metadata {
            return Err(RegistryError::InvalidDeclaration {
                message: "metadata declared before any property".into(),
                context: Some(self.component.into()),
            });
        }

        let mut index: FxHashMap<Box<str>, usize> = FxHashMap::default();

        for (pos, descriptor) in self.descriptors.iter().enumerate() {
            validate(descriptor).map_err(|message| RegistryError::InvalidDeclaration {
                message,
                context: Some(self.component.into()),
            })?;

            let spellings = std::iter::once(descriptor.name).chain(descriptor.aliases.iter().copied());
            for spelling in spellings {
                for key in [spelling.to_owned(), spelling.to_lowercase()] {
                    match index.entry(key.into_boxed_str()) {
                        Entry::Occupied(entry) if *entry.get() != pos => {
                            return Err(RegistryError::DuplicateName {
                                name: entry.key().to_string().into(),
                                context: Some(self.component.into()),
                            });
                        },
                        Entry::Occupied(_) => {},
                        Entry::Vacant(entry) => {
                            entry.insert(pos);
                        },
                    }
                }
            }
        }

        debug!(
            component = self.component,
            options = self.descriptors.len(),
            spellings = index.len(),
            "Property registry built"
        );

        Ok(PropertyRegistry::new(self.component, self.descriptors, index))
    }

    fn typed<V, G>(
        mut self,
        name: &'static str,
        ty: PropertyType,
        set: impl Fn(&mut T, V) + Send + Sync + 'static,
        get: impl Fn(&T) -> G + Send + Sync + 'static,
        extract: fn(PropertyValue) -> Option<V>,
        wrap: fn(V) -> PropertyValue,
    ) -> Self
    where
        V: 'static,
        G: Into<Option<V>>,
    {
        let setter: Setter<T> = Box::new(move |target, value| {
            let shape = value.type_name();
            let typed = extract(value).ok_or_else(|| ConfigureError::Internal {
                message: format!("setter of '{name}' expects {ty}, got {shape}").into(),
                context: None,
            })?;
            set(target, typed);
            Ok(())
        });
        let getter: Getter<T> = Box::new(move |target| get(target).into().map(wrap));

        self.descriptors.push(PropertyDescriptor {
            name,
            aliases: Vec::new(),
            ty,
            meta: PropertyMeta::default(),
            setter,
            getter,
        });
        self
    }

    fn with_last(mut self, apply: impl FnOnce(&mut PropertyDescriptor<T>)) -> Self {
        match self.descriptors.last_mut() {
            Some(descriptor) => apply(descriptor),
            None => self.orphan_metadata = true,
        }
        self
    }
}

fn validate<T>(descriptor: &PropertyDescriptor<T>) -> Result<(), Cow<'static, str>> {
    if descriptor.name.trim().is_empty() {
        return Err("property name cannot be empty".into());
    }
    if descriptor.aliases.iter().any(|a| a.trim().is_empty()) {
        return Err(format!("alias of '{}' cannot be empty", descriptor.name).into());
    }
    if let PropertyType::Enum(e) = descriptor.ty
        && e.constants.is_empty()
    {
        return Err(format!("enum '{}' of '{}' has no constants", e.name, descriptor.name).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NoReferences, PropertyConfigurer};

    #[derive(Debug, Default)]
    struct Target {
        name: Option<String>,
        other: Option<String>,
    }

    #[test]
    fn builder_debug_names_the_component() {
        let builder = RegistryBuilder::<Target>::new("timer").string(
            "name",
            |t, v| t.name = Some(v),
            |t| t.name.clone(),
        );
        let rendered = format!("{builder:?}");
        assert!(rendered.starts_with("RegistryBuilder"), "{rendered}");
        assert!(rendered.contains("\"timer\""), "{rendered}");
    }

    #[test]
    fn checks_reject_values_before_the_setter_runs() {
        let registry = RegistryBuilder::<Target>::new("test")
            .string("name", |t, v| t.name = Some(v), |t| t.name.clone())
            .check(|v| match v.as_str() {
                Some(s) if s.is_empty() => Err("cannot be empty".into()),
                _ => Ok(()),
            })
            .build()
            .expect("registry builds");
        let mut target = Target::default();

        let err = registry.configure(&NoReferences, &mut target, "name", "".into(), false).expect_err("empty");
        assert!(matches!(err, ConfigureError::TypeCoercion { ref property, .. } if property == "name"), "{err}");
        assert!(target.name.is_none());
        assert!(registry.configure(&NoReferences, &mut target, "name", "tick".into(), false).expect("valid"));
        assert_eq!(target.name.as_deref(), Some("tick"));
    }

    #[test]
    fn duplicate_spellings_are_rejected() {
        let err = RegistryBuilder::<Target>::new("test")
            .string("name", |t, v| t.name = Some(v), |t| t.name.clone())
            .string("other", |t, v| t.other = Some(v), |t| t.other.clone())
            .alias("Name")
            .build()
            .expect_err("lower-cased alias collides with 'name'");

        assert!(matches!(err, RegistryError::DuplicateName { ref name, .. } if name == "name"));
    }

    #[test]
    fn metadata_before_any_property_is_rejected() {
        let err = RegistryBuilder::<Target>::new("test")
            .secret()
            .string("name", |t, v| t.name = Some(v), |t| t.name.clone())
            .build()
            .expect_err("orphan metadata");

        assert!(matches!(err, RegistryError::InvalidDeclaration { .. }));
    }

    #[test]
    fn empty_names_are_rejected() {
        let err = RegistryBuilder::<Target>::new("test")
            .string(" ", |t, v| t.name = Some(v), |t| t.name.clone())
            .build()
            .expect_err("empty name");

        assert!(err.to_string().contains("cannot be empty"), "{err}");
    }

    #[test]
    fn setter_rejects_uncoerced_shapes() {
        let registry = RegistryBuilder::<Target>::new("test")
            .string("name", |t, v| t.name = Some(v), |t| t.name.clone())
            .build()
            .expect("registry builds");
        let descriptor = registry.lookup("name", false).expect("registered");

        let mut target = Target::default();
        let err = descriptor.set(&mut target, PropertyValue::Int(1)).expect_err("shape mismatch");

        assert!(matches!(err, ConfigureError::Internal { .. }));
        assert!(target.name.is_none());
    }
}
