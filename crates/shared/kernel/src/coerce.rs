//! # Type Coercion
//!
//! Converts loosely typed input into the shape of a declared [`PropertyType`].
//!
//! | Declared type | Accepted input |
//! |---------------|----------------|
//! | `boolean` | `Boolean`, or `"true"`/`"false"` in any ASCII case |
//! | `string` | `String`, `Enum`, and scalar values rendered as text |
//! | `int`, `long` | integers within range, decimal strings (no surrounding whitespace) |
//! | `double` | finite numbers, float strings (`NaN` and infinities are rejected) |
//! | enum | a declared constant, exact match first, then case-insensitive |
//! | object | an `Object` of the declared type, or a bean name (`#bean:x`, `#x`, `x`) |
//!
//! Values of the wrong shape fail with [`ConfigureError::TypeCoercion`]; enum constants
//! and bean names that cannot be resolved fail with [`ConfigureError::UnresolvedReference`].

use crate::error::ConfigureError;
use crate::resolver::ReferenceResolver;
use knob_domain::{EnumType, ObjectType, PropertyType, PropertyValue};
use std::borrow::Cow;
use std::str::FromStr;

/// Coerces `value` to `ty` on behalf of `property`.
///
/// # Errors
/// Returns [`ConfigureError::TypeCoercion`] for malformed or out-of-range input and
/// [`ConfigureError::UnresolvedReference`] when an enum constant or bean name does not
/// resolve.
pub fn coerce(
    property: &str,
    ty: &PropertyType,
    value: PropertyValue,
    resolver: &dyn ReferenceResolver,
) -> Result<PropertyValue, ConfigureError> {
    let mismatch = |message: String| ConfigureError::TypeCoercion {
        property: property.to_owned().into(),
        expected: *ty,
        message: message.into(),
        context: None,
    };

    match ty {
        PropertyType::Boolean => to_boolean(value).map(PropertyValue::Boolean).map_err(mismatch),
        PropertyType::String => to_string(value).map(PropertyValue::String).map_err(mismatch),
        PropertyType::Int => to_int(value).map(PropertyValue::Int).map_err(mismatch),
        PropertyType::Long => to_long(value).map(PropertyValue::Long).map_err(mismatch),
        PropertyType::Double => to_double(value).map(PropertyValue::Double).map_err(mismatch),
        PropertyType::Enum(e) => to_enum(property, e, value, mismatch),
        PropertyType::Object(o) => to_object(property, o, value, resolver, mismatch),
    }
}

/// Parses the canonical boolean spellings, ignoring ASCII case.
#[must_use]
pub fn parse_boolean(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Strips the `#bean:` or `#` prefix from a reference.
#[must_use]
pub fn reference_name(text: &str) -> &str {
    text.strip_prefix("#bean:").or_else(|| text.strip_prefix('#')).unwrap_or(text)
}

fn to_boolean(value: PropertyValue) -> Result<bool, String> {
    match value {
        PropertyValue::Boolean(b) => Ok(b),
        PropertyValue::String(s) => {
            parse_boolean(&s).ok_or_else(|| format!("'{s}' is not a boolean (expected true or false)"))
        },
        other => Err(format!("a {} value cannot be used as a boolean", other.type_name())),
    }
}

fn to_string(value: PropertyValue) -> Result<String, String> {
    match value {
        PropertyValue::String(s) => Ok(s),
        PropertyValue::Enum(s) => Ok(s.into_owned()),
        PropertyValue::Object(o) => {
            Err(format!("an object of type {} cannot be used as a string", o.object_type().name()))
        },
        scalar => Ok(scalar.to_string()),
    }
}

fn to_int(value: PropertyValue) -> Result<i32, String> {
    match value {
        PropertyValue::Int(v) => Ok(v),
        PropertyValue::Long(v) => i32::try_from(v).map_err(|_| format!("{v} is out of int range")),
        PropertyValue::String(s) => parse_number(&s, "int"),
        other => Err(format!("a {} value cannot be used as an int", other.type_name())),
    }
}

fn to_long(value: PropertyValue) -> Result<i64, String> {
    match value {
        PropertyValue::Int(v) => Ok(i64::from(v)),
        PropertyValue::Long(v) => Ok(v),
        PropertyValue::String(s) => parse_number(&s, "long"),
        other => Err(format!("a {} value cannot be used as a long", other.type_name())),
    }
}

#[allow(clippy::cast_precision_loss)]
fn to_double(value: PropertyValue) -> Result<f64, String> {
    let double = match value {
        PropertyValue::Double(v) => v,
        PropertyValue::Int(v) => f64::from(v),
        PropertyValue::Long(v) => v as f64,
        PropertyValue::String(s) => {
            let v: f64 = parse_number(&s, "double")?;
            if !v.is_finite() {
                return Err(format!("'{s}' is out of double range"));
            }
            v
        },
        other => return Err(format!("a {} value cannot be used as a double", other.type_name())),
    };

    if double.is_finite() { Ok(double) } else { Err(format!("{double} is out of double range")) }
}

fn parse_number<N>(text: &str, kind: &str) -> Result<N, String>
where
    N: FromStr,
    N::Err: std::fmt::Display,
{
    text.parse::<N>().map_err(|e| format!("'{text}' is not a valid {kind}: {e}"))
}

fn to_enum(
    property: &str,
    ty: &EnumType,
    value: PropertyValue,
    mismatch: impl FnOnce(String) -> ConfigureError,
) -> Result<PropertyValue, ConfigureError> {
    let text = match value {
        PropertyValue::String(s) => Cow::Owned(s),
        PropertyValue::Enum(s) => s,
        other => {
            return Err(mismatch(format!("a {} value cannot be used as {}", other.type_name(), ty.name)));
        },
    };

    ty.resolve(&text).map(|c| PropertyValue::Enum(Cow::Borrowed(c))).ok_or_else(|| {
        ConfigureError::UnresolvedReference {
            property: property.to_owned().into(),
            reference: text.into_owned().into(),
            expected: PropertyType::Enum(*ty),
            context: Some(format!("expected one of: {}", ty.constants.join(", ")).into()),
        }
    })
}

fn to_object(
    property: &str,
    ty: &ObjectType,
    value: PropertyValue,
    resolver: &dyn ReferenceResolver,
    mismatch: impl FnOnce(String) -> ConfigureError,
) -> Result<PropertyValue, ConfigureError> {
    match value {
        PropertyValue::Object(o) if o.object_type().id() == ty.id() => Ok(PropertyValue::Object(o)),
        PropertyValue::Object(o) => Err(mismatch(format!(
            "an object of type {} cannot be used as {}",
            o.object_type().name(),
            ty.name()
        ))),
        PropertyValue::String(reference) => {
            let unresolved = |context: &'static str| ConfigureError::UnresolvedReference {
                property: property.to_owned().into(),
                reference: reference.clone().into(),
                expected: PropertyType::Object(*ty),
                context: Some(context.into()),
            };
            let bean =
                resolver.lookup(reference_name(&reference)).ok_or_else(|| unresolved("no such bean"))?;
            if bean.object_type().id() == ty.id() {
                Ok(PropertyValue::Object(bean))
            } else {
                Err(unresolved("bean has a different type"))
            }
        },
        other => Err(mismatch(format!("a {} value cannot be used as {}", other.type_name(), ty.name()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{BeanRegistry, NoReferences};
    use knob_domain::ObjectRef;

    const LEVELS: EnumType = EnumType::new("LoggingLevel", &["TRACE", "DEBUG", "INFO"]);

    #[derive(Debug)]
    struct Config;

    fn coerce_plain(ty: PropertyType, value: impl Into<PropertyValue>) -> Result<PropertyValue, ConfigureError> {
        coerce("prop", &ty, value.into(), &NoReferences)
    }

    #[test]
    fn booleans_accept_canonical_spellings_only() {
        assert_eq!(coerce_plain(PropertyType::Boolean, "TRUE").ok(), Some(PropertyValue::Boolean(true)));
        assert_eq!(coerce_plain(PropertyType::Boolean, "false").ok(), Some(PropertyValue::Boolean(false)));
        assert_eq!(coerce_plain(PropertyType::Boolean, true).ok(), Some(PropertyValue::Boolean(true)));
        for bad in ["yes", "1", "", " true"] {
            let err = coerce_plain(PropertyType::Boolean, bad).expect_err("not a boolean");
            assert!(matches!(err, ConfigureError::TypeCoercion { .. }), "{bad}: {err}");
        }
        assert!(coerce_plain(PropertyType::Boolean, 1).is_err());
    }

    #[test]
    fn strings_pass_through_and_render_scalars() {
        assert_eq!(coerce_plain(PropertyType::String, "v2").ok(), Some(PropertyValue::from("v2")));
        assert_eq!(coerce_plain(PropertyType::String, 42).ok(), Some(PropertyValue::from("42")));
        assert_eq!(coerce_plain(PropertyType::String, false).ok(), Some(PropertyValue::from("false")));
        let object = PropertyValue::Object(ObjectRef::new(Config));
        assert!(coerce("prop", &PropertyType::String, object, &NoReferences).is_err());
    }

    #[test]
    fn integers_check_range_and_syntax() {
        assert_eq!(coerce_plain(PropertyType::Int, "-17").ok(), Some(PropertyValue::Int(-17)));
        assert_eq!(coerce_plain(PropertyType::Int, "+8").ok(), Some(PropertyValue::Int(8)));
        assert_eq!(coerce_plain(PropertyType::Int, 7_i64).ok(), Some(PropertyValue::Int(7)));
        assert!(coerce_plain(PropertyType::Int, "2147483648").is_err());
        assert!(coerce_plain(PropertyType::Int, 2_147_483_648_i64).is_err());
        assert!(coerce_plain(PropertyType::Int, "12abc").is_err());
        assert!(coerce_plain(PropertyType::Int, " 12").is_err());
        assert!(coerce_plain(PropertyType::Int, 1.5).is_err());

        assert_eq!(coerce_plain(PropertyType::Long, "2147483648").ok(), Some(PropertyValue::Long(2_147_483_648)));
        assert_eq!(coerce_plain(PropertyType::Long, 5).ok(), Some(PropertyValue::Long(5)));
        assert!(coerce_plain(PropertyType::Long, "9223372036854775808").is_err());
    }

    #[test]
    fn doubles_widen_numbers() {
        assert_eq!(coerce_plain(PropertyType::Double, "0.25").ok(), Some(PropertyValue::Double(0.25)));
        assert_eq!(coerce_plain(PropertyType::Double, 3).ok(), Some(PropertyValue::Double(3.0)));
        assert!(coerce_plain(PropertyType::Double, "fast").is_err());
    }

    #[test]
    fn doubles_must_be_finite() {
        for bad in ["1e999", "-1e999", "NaN", "inf", "-infinity"] {
            let err = coerce_plain(PropertyType::Double, bad).expect_err("not finite");
            assert!(matches!(err, ConfigureError::TypeCoercion { .. }), "{bad}: {err}");
        }
        assert!(coerce_plain(PropertyType::Double, f64::NAN).is_err());
        assert!(coerce_plain(PropertyType::Double, f64::NEG_INFINITY).is_err());
        assert_eq!(coerce_plain(PropertyType::Double, "1e308").ok(), Some(PropertyValue::Double(1e308)));
    }

    #[test]
    fn enums_resolve_to_canonical_constants() {
        let ty = PropertyType::Enum(LEVELS);
        assert_eq!(coerce_plain(ty, "debug").ok(), Some(PropertyValue::Enum("DEBUG".into())));

        let err = coerce_plain(ty, "verbose").expect_err("unknown constant");
        assert!(matches!(err, ConfigureError::UnresolvedReference { ref reference, .. } if reference == "verbose"));

        let err = coerce_plain(ty, 3).expect_err("wrong shape");
        assert!(matches!(err, ConfigureError::TypeCoercion { .. }));
    }

    #[test]
    fn objects_resolve_through_registry() {
        let ty = PropertyType::Object(ObjectType::of::<Config>());
        let beans = BeanRegistry::new();
        beans.bind("openstack", Config);
        beans.bind("number", 5_u8);

        for reference in ["#bean:openstack", "#openstack", "openstack"] {
            let value = coerce("config", &ty, reference.into(), &beans).expect("resolves");
            assert!(value.as_object().is_some_and(ObjectRef::is::<Config>), "{reference}");
        }

        let err = coerce("config", &ty, "#missing".into(), &beans).expect_err("no bean");
        assert!(matches!(err, ConfigureError::UnresolvedReference { .. }));
        let err = coerce("config", &ty, "#number".into(), &beans).expect_err("wrong bean type");
        assert!(matches!(err, ConfigureError::UnresolvedReference { .. }));

        let wrong = PropertyValue::Object(ObjectRef::new(5_u8));
        let err = coerce("config", &ty, wrong, &beans).expect_err("wrong object type");
        assert!(matches!(err, ConfigureError::TypeCoercion { .. }));
    }

    #[test]
    fn reference_prefixes_are_stripped() {
        assert_eq!(reference_name("#bean:pool"), "pool");
        assert_eq!(reference_name("#pool"), "pool");
        assert_eq!(reference_name("pool"), "pool");
    }
}
