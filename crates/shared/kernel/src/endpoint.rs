use crate::binding::{BindError, BindReport, PropertyBinder};
use crate::builder::RegistryBuilder;
use crate::configurer::PropertyConfigurer;
use crate::error::{ConfigureError, RegistryError, format_context};
use crate::registry::PropertyRegistry;
use crate::resolver::ReferenceResolver;
use crate::uri::EndpointUri;
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::debug;

crate::config_enum! {
    /// How a message flows through an endpoint.
    pub enum ExchangePattern as "ExchangePattern" {
        InOnly => "InOnly",
        InOut => "InOut",
        InOptionalOut => "InOptionalOut",
    }
}

/// Options shared by endpoints, attached through a [`crate::Projection`].
///
/// Producer-only endpoints attach [`producer_configurer`](Self::producer_configurer);
/// endpoints that also consume attach the full [`configurer`](Self::configurer).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EndpointOptions {
    pub lazy_start_producer: bool,
    pub bridge_error_handler: bool,
    pub exchange_pattern: Option<ExchangePattern>,
}

type Registry = LazyLock<Result<PropertyRegistry<EndpointOptions>, RegistryError>>;

static PRODUCER: Registry = LazyLock::new(|| producer_options(RegistryBuilder::new("endpoint")).build());

static ALL: Registry =
    LazyLock::new(|| consumer_options(producer_options(RegistryBuilder::new("endpoint"))).build());

fn producer_options(builder: RegistryBuilder<EndpointOptions>) -> RegistryBuilder<EndpointOptions> {
    builder
        .boolean("lazyStartProducer", |t, v| t.lazy_start_producer = v, |t| t.lazy_start_producer)
        .description(
            "Defer starting the producer until the first message is processed, so a \
             failing producer does not prevent the route from starting.",
        )
        .default_value("false")
        .group("producer (advanced)")
}

fn consumer_options(builder: RegistryBuilder<EndpointOptions>) -> RegistryBuilder<EndpointOptions> {
    builder
        .boolean("bridgeErrorHandler", |t, v| t.bridge_error_handler = v, |t| t.bridge_error_handler)
        .description("Route consumer exceptions through the routing error handler instead of logging them.")
        .default_value("false")
        .group("consumer (advanced)")
        .enumeration::<ExchangePattern, _>(
            "exchangePattern",
            |t, v| t.exchange_pattern = Some(v),
            |t| t.exchange_pattern,
        )
        .description("The exchange pattern used when the consumer creates an exchange.")
        .group("consumer (advanced)")
}

impl EndpointOptions {
    /// Producer and consumer options, for endpoints that do both.
    ///
    /// # Errors
    /// Returns the [`RegistryError`] raised while declaring the options.
    pub fn configurer() -> Result<&'static PropertyRegistry<Self>, RegistryError> {
        ALL.as_ref().map_err(Clone::clone)
    }

    /// Only `lazyStartProducer`, for producer-only endpoints.
    ///
    /// # Errors
    /// Returns the [`RegistryError`] raised while declaring the options.
    pub fn producer_configurer() -> Result<&'static PropertyRegistry<Self>, RegistryError> {
        PRODUCER.as_ref().map_err(Clone::clone)
    }
}

/// Failure to create an endpoint from its URI.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("Unexpected scheme '{found}', expected '{expected}'{}", format_context(.context))]
    Scheme { expected: &'static str, found: String, context: Option<Cow<'static, str>> },

    #[error("Missing endpoint path '{option}'{}", format_context(.context))]
    MissingPath { option: &'static str, context: Option<Cow<'static, str>> },

    #[error("Invalid endpoint path{}: {source}", format_context(.context))]
    Path {
        #[source]
        source: ConfigureError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Endpoint registry error{}: {source}", format_context(.context))]
    Registry {
        #[source]
        source: RegistryError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Endpoint options error{}: {source}", format_context(.context))]
    Options {
        #[source]
        source: BindError,
        context: Option<Cow<'static, str>>,
    },
}

pub trait EndpointErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, EndpointError>;
}

impl<T> EndpointErrorExt<T> for Result<T, EndpointError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                EndpointError::Scheme { context: c, .. }
                | EndpointError::MissingPath { context: c, .. }
                | EndpointError::Path { context: c, .. }
                | EndpointError::Registry { context: c, .. }
                | EndpointError::Options { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

impl From<RegistryError> for EndpointError {
    #[inline]
    fn from(source: RegistryError) -> Self {
        Self::Registry { source, context: None }
    }
}

impl From<BindError> for EndpointError {
    #[inline]
    fn from(source: BindError) -> Self {
        Self::Options { source, context: None }
    }
}

/// A configurable endpoint addressed by `scheme:path?options`.
///
/// The URI path is applied to [`PATH_OPTION`](Self::PATH_OPTION) like any other option,
/// so it is coerced and validated by the same registry.
pub trait Endpoint: Default + 'static {
    const SCHEME: &'static str;

    /// Option receiving the URI path (`host` in `openstack-glance:host`).
    const PATH_OPTION: &'static str;

    /// # Errors
    /// Returns the [`RegistryError`] raised while declaring the options.
    fn configurer() -> Result<&'static dyn PropertyConfigurer<Self>, RegistryError>;

    /// Creates an endpoint from `uri`, applying its path and query options.
    ///
    /// # Errors
    /// Returns [`EndpointError`] if the scheme does not match, the path is missing or
    /// invalid, or an option cannot be bound.
    fn from_uri(
        uri: &EndpointUri,
        resolver: &dyn ReferenceResolver,
        binder: &PropertyBinder,
    ) -> Result<(Self, BindReport), EndpointError> {
        if !uri.scheme().eq_ignore_ascii_case(Self::SCHEME) {
            return Err(EndpointError::Scheme {
                expected: Self::SCHEME,
                found: uri.scheme().to_owned(),
                context: None,
            });
        }
        if uri.path().is_empty() {
            return Err(EndpointError::MissingPath { option: Self::PATH_OPTION, context: Some(Self::SCHEME.into()) });
        }

        let configurer = Self::configurer()?;
        let mut endpoint = Self::default();

        let applied = configurer
            .configure(resolver, &mut endpoint, Self::PATH_OPTION, uri.path().into(), false)
            .map_err(|source| EndpointError::Path { source, context: Some(Self::SCHEME.into()) })?;
        if !applied {
            return Err(RegistryError::InvalidDeclaration {
                message: format!("path option '{}' is not declared", Self::PATH_OPTION).into(),
                context: Some(Self::SCHEME.into()),
            }
            .into());
        }

        let report = binder.bind(resolver, configurer, &mut endpoint, uri.properties().clone())?;
        debug!(scheme = Self::SCHEME, options = report.applied.len(), "Endpoint created");

        Ok((endpoint, report))
    }
}
