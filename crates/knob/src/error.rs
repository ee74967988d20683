use knob_kernel::{EndpointError, RegistryError, UriError};
use std::borrow::Cow;

/// Facade error type.
#[derive(Debug, thiserror::Error)]
pub enum KnobError {
    /// No endpoint is registered for the scheme.
    #[error("Unknown scheme '{scheme}'{}", format_context(.context))]
    UnknownScheme { scheme: String, context: Option<Cow<'static, str>> },

    #[error("Endpoint URI error{}: {source}", format_context(.context))]
    Uri {
        #[source]
        source: UriError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Endpoint error{}: {source}", format_context(.context))]
    Endpoint {
        #[source]
        source: EndpointError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Registry error{}: {source}", format_context(.context))]
    Registry {
        #[source]
        source: RegistryError,
        context: Option<Cow<'static, str>>,
    },

    /// Properties file could not be loaded.
    #[cfg(feature = "rest")]
    #[error("Configuration error{}: {source}", format_context(.context))]
    Config {
        #[source]
        source: knob_kernel::config::ConfigError,
        context: Option<Cow<'static, str>>,
    },

    #[cfg(feature = "rest")]
    #[error("REST configuration error{}: {source}", format_context(.context))]
    Rest {
        #[source]
        source: knob_rest::RestError,
        context: Option<Cow<'static, str>>,
    },
}

pub trait KnobErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, KnobError>;
}

impl<T> KnobErrorExt<T> for Result<T, KnobError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                KnobError::UnknownScheme { context: c, .. }
                | KnobError::Uri { context: c, .. }
                | KnobError::Endpoint { context: c, .. }
                | KnobError::Registry { context: c, .. } => *c = Some(context.into()),
                #[cfg(feature = "rest")]
                KnobError::Config { context: c, .. } | KnobError::Rest { context: c, .. } => {
                    *c = Some(context.into());
                },
            }
            e
        })
    }
}

impl<T> KnobErrorExt<T> for Result<T, EndpointError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, KnobError> {
        self.map_err(|source| KnobError::Endpoint { source, context: Some(context.into()) })
    }
}

impl<T> KnobErrorExt<T> for Result<T, RegistryError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, KnobError> {
        self.map_err(|source| KnobError::Registry { source, context: Some(context.into()) })
    }
}

#[cfg(feature = "rest")]
impl<T> KnobErrorExt<T> for Result<T, knob_kernel::config::ConfigError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, KnobError> {
        self.map_err(|source| KnobError::Config { source, context: Some(context.into()) })
    }
}

impl From<UriError> for KnobError {
    #[inline]
    fn from(source: UriError) -> Self {
        Self::Uri { source, context: None }
    }
}

impl From<EndpointError> for KnobError {
    #[inline]
    fn from(source: EndpointError) -> Self {
        Self::Endpoint { source, context: None }
    }
}

impl From<RegistryError> for KnobError {
    #[inline]
    fn from(source: RegistryError) -> Self {
        Self::Registry { source, context: None }
    }
}

#[cfg(feature = "rest")]
impl From<knob_rest::RestError> for KnobError {
    #[inline]
    fn from(source: knob_rest::RestError) -> Self {
        Self::Rest { source, context: None }
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
