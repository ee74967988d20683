//! # Endpoint URIs
//!
//! `scheme:path?name=value&...` where the query carries the endpoint options.
//! Values are form-url-decoded unless written as `RAW(...)` or `RAW{...}`, in which case
//! the text between the delimiters is kept literally (passwords with `&` or `+`).

use crate::binding::Properties;
use crate::configurer::PropertyConfigurer;
use crate::error::format_context;
use knob_domain::PropertyValue;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use percent_encoding::percent_decode_str;
use url::form_urlencoded;

/// Replacement text for secret option values.
pub const MASK: &str = "xxxxxx";

/// Option names masked even when no configurer marks them secret.
const SENSITIVE_NAMES: &[&str] =
    &["password", "passphrase", "secret", "token", "accesskey", "secretkey", "authorization"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UriError {
    #[error("Malformed endpoint URI{}: {message}", format_context(.context))]
    Malformed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl UriError {
    fn malformed(message: impl Into<Cow<'static, str>>, uri: &str) -> Self {
        Self::Malformed { message: message.into(), context: Some(uri.to_owned().into()) }
    }
}

/// A parsed endpoint URI.
///
/// # Example
/// ```rust
/// use knob_kernel::EndpointUri;
///
/// let uri: EndpointUri = "openstack-glance:localhost?username=admin&password=RAW(s3cr+t&)"
///     .parse()
///     .unwrap();
///
/// assert_eq!(uri.scheme(), "openstack-glance");
/// assert_eq!(uri.path(), "localhost");
/// assert_eq!(uri.get("password").and_then(|v| v.as_str()), Some("s3cr+t&"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointUri {
    scheme: String,
    path: String,
    properties: Properties,
}

impl EndpointUri {
    /// Parses `scheme:path[?query]`; a `//` after the scheme is accepted and dropped.
    ///
    /// # Errors
    /// Returns [`UriError::Malformed`] for a missing or invalid scheme, an empty option
    /// name, an unterminated `RAW(...)` value or escapes that do not decode to UTF-8.
    pub fn parse(text: &str) -> Result<Self, UriError> {
        let (scheme, rest) =
            text.split_once(':').ok_or_else(|| UriError::malformed("missing scheme separator ':'", text))?;
        validate_scheme(scheme).map_err(|m| UriError::malformed(m, text))?;

        let rest = rest.strip_prefix("//").unwrap_or(rest);
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

        let mut properties = Properties::new();
        for (name, value) in query_pairs(query).map_err(|m| UriError::malformed(m, text))? {
            properties.insert(name, PropertyValue::String(value));
        }

        Ok(Self { scheme: scheme.to_owned(), path: path.to_owned(), properties })
    }

    pub fn builder(scheme: impl Into<String>, path: impl Into<String>) -> EndpointUriBuilder {
        EndpointUriBuilder { scheme: scheme.into(), path: path.into(), properties: Properties::new() }
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query options, keyed by their name as written.
    #[must_use]
    pub const fn properties(&self) -> &Properties {
        &self.properties
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    #[must_use]
    pub fn into_parts(self) -> (String, String, Properties) {
        (self.scheme, self.path, self.properties)
    }

    /// Renders the URI with secret option values replaced by [`MASK`].
    ///
    /// An option is secret when `configurer` declares it so, or when its name is one of
    /// the usual credential names (`password`, `token`, ...).
    #[must_use]
    pub fn sanitized<T, C>(&self, configurer: &C) -> String
    where
        C: PropertyConfigurer<T> + ?Sized,
    {
        let masked = self.properties.iter().map(|(name, value)| {
            let secret = configurer.option_info(name, true).is_some_and(|info| info.meta.secret)
                || is_sensitive_name(name);
            let text = if secret { Cow::Borrowed(MASK) } else { Cow::Owned(value.to_string()) };
            (name.as_str(), text)
        });
        render(&self.scheme, &self.path, masked)
    }
}

impl fmt::Display for EndpointUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs = self.properties.iter().map(|(name, value)| (name.as_str(), Cow::Owned(value.to_string())));
        f.write_str(&render(&self.scheme, &self.path, pairs))
    }
}

impl FromStr for EndpointUri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Fluent construction of an [`EndpointUri`].
#[derive(Debug, Clone)]
#[must_use = "The builder must be finished with `build`"]
pub struct EndpointUriBuilder {
    scheme: String,
    path: String,
    properties: Properties,
}

impl EndpointUriBuilder {
    pub fn property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// # Errors
    /// Returns [`UriError::Malformed`] for an invalid scheme or an empty option name.
    pub fn build(self) -> Result<EndpointUri, UriError> {
        validate_scheme(&self.scheme).map_err(|m| UriError::malformed(m, &self.scheme))?;
        if self.properties.keys().any(String::is_empty) {
            return Err(UriError::malformed("option name cannot be empty", &self.scheme));
        }
        Ok(EndpointUri { scheme: self.scheme, path: self.path, properties: self.properties })
    }
}

fn validate_scheme(scheme: &str) -> Result<(), &'static str> {
    let mut chars = scheme.chars();
    match chars.next() {
        None => Err("scheme cannot be empty"),
        Some(c) if !c.is_ascii_alphabetic() => Err("scheme must start with a letter"),
        Some(_) if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) => Ok(()),
        Some(_) => Err("scheme contains invalid characters"),
    }
}

fn is_sensitive_name(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    SENSITIVE_NAMES.iter().any(|s| name.ends_with(s))
}

fn render<'a>(scheme: &str, path: &str, pairs: impl Iterator<Item = (&'a str, Cow<'a, str>)>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in pairs {
        serializer.append_pair(name, &value);
    }
    let query = serializer.finish();

    if query.is_empty() { format!("{scheme}:{path}") } else { format!("{scheme}:{path}?{query}") }
}

/// Splits a query into decoded pairs, honoring `RAW(...)` and `RAW{...}` values.
fn query_pairs(query: &str) -> Result<Vec<(String, String)>, Cow<'static, str>> {
    let mut pairs = Vec::new();
    let mut rest = query;

    while !rest.is_empty() {
        let Some(eq) = rest.find(['=', '&']).filter(|&i| rest.as_bytes()[i] == b'=') else {
            let (pair, tail) = rest.split_once('&').unwrap_or((rest, ""));
            push_decoded(&mut pairs, pair)?;
            rest = tail;
            continue;
        };

        let value = &rest[eq + 1..];
        if let Some(close) = raw_delimiter(value) {
            let end = raw_end(value, close)
                .ok_or_else(|| format!("unterminated RAW value for option '{}'", &rest[..eq]))?;
            let name = decode_component(&rest[..eq])?;
            if name.is_empty() {
                return Err("option name cannot be empty".into());
            }
            pairs.push((name, value[4..end].to_owned()));
            rest = value[end + 1..].strip_prefix('&').unwrap_or(&value[end + 1..]);
        } else {
            let end = value.find('&').map_or(rest.len(), |i| eq + 1 + i);
            push_decoded(&mut pairs, &rest[..end])?;
            rest = rest[end..].strip_prefix('&').unwrap_or("");
        }
    }

    Ok(pairs)
}

fn raw_delimiter(value: &str) -> Option<char> {
    if value.starts_with("RAW(") {
        Some(')')
    } else if value.starts_with("RAW{") {
        Some('}')
    } else {
        None
    }
}

/// Position of the delimiter closing a raw value: the first one followed by `&` or the end.
fn raw_end(value: &str, close: char) -> Option<usize> {
    value
        .match_indices(close)
        .map(|(i, _)| i)
        .find(|&i| i >= 4 && matches!(value.as_bytes().get(i + 1), None | Some(b'&')))
}

fn push_decoded(pairs: &mut Vec<(String, String)>, pair: &str) -> Result<(), Cow<'static, str>> {
    if pair.is_empty() {
        return Ok(());
    }
    let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
    let name = decode_component(name)?;
    if name.is_empty() {
        return Err(format!("option name cannot be empty in '{pair}'").into());
    }
    pairs.push((name, decode_component(value)?));
    Ok(())
}

/// Form-decodes `text`, rejecting escapes that do not decode to UTF-8.
fn decode_component(text: &str) -> Result<String, Cow<'static, str>> {
    percent_decode_str(&text.replace('+', " "))
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| "percent-escapes must decode to UTF-8".into())
}
