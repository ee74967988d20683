use serde::{Serialize, Serializer};
use std::any::{Any, TypeId, type_name};
use std::fmt;

/// The declared type of a configurable property.
///
/// Every descriptor carries exactly one of these tags; coercion turns loosely typed
/// input into a [`crate::PropertyValue`] of the matching shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    Boolean,
    String,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    Double,
    Enum(EnumType),
    Object(ObjectType),
}

impl PropertyType {
    /// Human-readable type name, as shown in option listings and error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Int => "int",
            Self::Long => "long",
            Self::Double => "double",
            Self::Enum(e) => e.name,
            Self::Object(o) => o.short_name(),
        }
    }

    /// Returns `true` for the plain scalar types that never need a registry lookup.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::Enum(_) | Self::Object(_))
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for PropertyType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

/// A closed set of string constants accepted by an enumerated option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumType {
    pub name: &'static str,
    pub constants: &'static [&'static str],
}

impl EnumType {
    #[must_use]
    pub const fn new(name: &'static str, constants: &'static [&'static str]) -> Self {
        Self { name, constants }
    }

    /// Finds the canonical constant for `text`.
    ///
    /// An exact match wins; otherwise the first ASCII case-insensitive match is used.
    #[must_use]
    pub fn resolve(&self, text: &str) -> Option<&'static str> {
        self.constants
            .iter()
            .copied()
            .find(|c| *c == text)
            .or_else(|| self.constants.iter().copied().find(|c| c.eq_ignore_ascii_case(text)))
    }
}

/// Identity of a Rust type accepted by an object-reference option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectType {
    name: &'static str,
    id: TypeId,
}

impl ObjectType {
    #[must_use]
    pub fn of<T: Any>() -> Self {
        Self { name: type_name::<T>(), id: TypeId::of::<T>() }
    }

    /// Fully qualified type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path (`knob_glance::OpenstackConfig` -> `OpenstackConfig`).
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }

    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODES: EnumType = EnumType::new("BindingMode", &["off", "auto", "json", "xml", "json_xml"]);

    #[test]
    fn enum_resolution_prefers_exact_match() {
        assert_eq!(MODES.resolve("json"), Some("json"));
        assert_eq!(MODES.resolve("JSON"), Some("json"));
        assert_eq!(MODES.resolve("Json_Xml"), Some("json_xml"));
        assert_eq!(MODES.resolve("yaml"), None);
    }

    #[test]
    fn object_type_short_name_strips_path() {
        struct Config;
        let ty = ObjectType::of::<Config>();
        assert_eq!(ty.short_name(), "Config");
        assert_eq!(ty.id(), TypeId::of::<Config>());
    }

    #[test]
    fn type_names_are_stable() {
        assert_eq!(PropertyType::Boolean.to_string(), "boolean");
        assert_eq!(PropertyType::Long.name(), "long");
        assert_eq!(PropertyType::Enum(MODES).name(), "BindingMode");
        assert!(PropertyType::Int.is_scalar());
        assert!(!PropertyType::Enum(MODES).is_scalar());
    }
}
