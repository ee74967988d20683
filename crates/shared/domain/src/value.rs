use crate::types::{ObjectType, PropertyType};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// A shared, type-erased handle to an object bound to an object-reference option.
///
/// The handle remembers the concrete type it was created from, so checking it against
/// a declared [`ObjectType`] never needs to inspect the value itself.
#[derive(Clone)]
pub struct ObjectRef {
    ty: ObjectType,
    value: Arc<dyn Any + Send + Sync>,
}

impl ObjectRef {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self { ty: ObjectType::of::<T>(), value }
    }

    #[must_use]
    pub const fn object_type(&self) -> ObjectType {
        self.ty
    }

    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.ty.id() == TypeId::of::<T>()
    }

    /// Returns the shared value if it is a `T`.
    #[must_use]
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    /// Returns `true` if both handles point at the same allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.value), Arc::as_ptr(&other.value))
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef").field("type", &self.ty.name()).finish_non_exhaustive()
    }
}

/// A loosely typed property value.
///
/// Raw input usually arrives as [`PropertyValue::String`] (URI query, properties file);
/// already typed input uses the matching variant. After coercion the value always has
/// the shape of the declared [`PropertyType`].
#[derive(Debug, Clone)]
pub enum PropertyValue {
    Boolean(bool),
    String(String),
    Int(i32),
    Long(i64),
    Double(f64),
    /// A canonical enum constant.
    Enum(Cow<'static, str>),
    Object(ObjectRef),
}

impl PropertyValue {
    /// Short name of the value's shape, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::String(_) => "string",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Double(_) => "double",
            Self::Enum(_) => "enum",
            Self::Object(_) => "object",
        }
    }

    /// Returns `true` if this value already has the shape `ty` declares.
    #[must_use]
    pub fn matches(&self, ty: &PropertyType) -> bool {
        match (self, ty) {
            (Self::Boolean(_), PropertyType::Boolean)
            | (Self::String(_), PropertyType::String)
            | (Self::Int(_), PropertyType::Int)
            | (Self::Long(_), PropertyType::Long)
            | (Self::Double(_), PropertyType::Double) => true,
            (Self::Enum(v), PropertyType::Enum(e)) => e.constants.contains(&v.as_ref()),
            (Self::Object(o), PropertyType::Object(t)) => o.object_type().id() == t.id(),
            _ => false,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view of `Int` and `Long` values.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v as i64),
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Enum(v) => f.write_str(v),
            Self::Object(o) => write!(f, "<{}>", o.object_type().short_name()),
        }
    }
}

// --- Conversions ---

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<ObjectRef> for PropertyValue {
    fn from(value: ObjectRef) -> Self {
        Self::Object(value)
    }
}

// --- Serde ---

impl Serialize for PropertyValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Boolean(v) => serializer.serialize_bool(*v),
            Self::String(v) => serializer.serialize_str(v),
            Self::Int(v) => serializer.serialize_i32(*v),
            Self::Long(v) => serializer.serialize_i64(*v),
            Self::Double(v) => serializer.serialize_f64(*v),
            Self::Enum(v) => serializer.serialize_str(v),
            Self::Object(_) => serializer.collect_str(self),
        }
    }
}

impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(PropertyValueVisitor)
    }
}

struct PropertyValueVisitor;

impl Visitor<'_> for PropertyValueVisitor {
    type Value = PropertyValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean, number, or string property value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(PropertyValue::Boolean(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(i32::try_from(v).map_or(PropertyValue::Long(v), PropertyValue::Int))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v).map_err(|_| E::custom(format!("integer {v} exceeds the long range"))).map(
            |v| i32::try_from(v).map_or(PropertyValue::Long(v), PropertyValue::Int),
        )
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(PropertyValue::Double(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(PropertyValue::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(PropertyValue::String(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EnumType;

    #[derive(Debug, PartialEq)]
    struct Endpoint(u16);

    #[test]
    fn object_ref_downcasts_to_origin_type() {
        let handle = ObjectRef::new(Endpoint(8080));
        assert!(handle.is::<Endpoint>());
        assert!(!handle.is::<String>());
        assert_eq!(handle.downcast::<Endpoint>().as_deref(), Some(&Endpoint(8080)));
        assert!(handle.downcast::<String>().is_none());
    }

    #[test]
    fn doubles_compare_bitwise() {
        assert_eq!(PropertyValue::Double(f64::NAN), PropertyValue::Double(f64::NAN));
        assert_eq!(PropertyValue::Double(0.25), PropertyValue::from(0.25));
        assert_ne!(PropertyValue::Double(0.0), PropertyValue::Double(-0.0));
    }

    #[test]
    fn object_equality_is_identity() {
        let a = ObjectRef::new(Endpoint(1));
        let b = ObjectRef::new(Endpoint(1));
        assert_eq!(PropertyValue::Object(a.clone()), PropertyValue::Object(a.clone()));
        assert_ne!(PropertyValue::Object(a), PropertyValue::Object(b));
    }

    #[test]
    fn matches_checks_declared_shape() {
        const LEVELS: EnumType = EnumType::new("Level", &["info", "debug"]);
        assert!(PropertyValue::Int(1).matches(&PropertyType::Int));
        assert!(!PropertyValue::Int(1).matches(&PropertyType::Long));
        assert!(PropertyValue::Enum("info".into()).matches(&PropertyType::Enum(LEVELS)));
        assert!(!PropertyValue::Enum("INFO".into()).matches(&PropertyType::Enum(LEVELS)));
        let object = PropertyValue::Object(ObjectRef::new(Endpoint(1)));
        assert!(object.matches(&PropertyType::Object(ObjectType::of::<Endpoint>())));
        assert!(!object.matches(&PropertyType::Object(ObjectType::of::<String>())));
    }

    #[test]
    fn display_renders_raw_text() {
        assert_eq!(PropertyValue::from(true).to_string(), "true");
        assert_eq!(PropertyValue::from(-42).to_string(), "-42");
        assert_eq!(PropertyValue::from("v2").to_string(), "v2");
        assert_eq!(PropertyValue::Object(ObjectRef::new(Endpoint(1))).to_string(), "<Endpoint>");
    }
}
