use crate::error::{KnobError, KnobErrorExt};
use knob_dns::DnsEndpoint;
use knob_glance::GlanceEndpoint;
use knob_kernel::domain::PropertyValue;
use knob_kernel::{
    BindReport, ConfigurerChain, Endpoint, EndpointUri, OptionInfo, PropertyBinder, ReferenceResolver, RegistryError,
};
use tracing::info;

/// Schemes with a registered endpoint.
pub const SCHEMES: &[&str] = &[knob_glance::SCHEME, knob_dns::SCHEME];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scheme {
    Glance,
    Dns,
}

impl Scheme {
    fn find(scheme: &str) -> Result<Self, KnobError> {
        if scheme.eq_ignore_ascii_case(knob_glance::SCHEME) {
            Ok(Self::Glance)
        } else if scheme.eq_ignore_ascii_case(knob_dns::SCHEME) {
            Ok(Self::Dns)
        } else {
            Err(KnobError::UnknownScheme { scheme: scheme.to_owned(), context: Some(SCHEMES.join(", ").into()) })
        }
    }
}

/// An endpoint configured from its URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfiguredEndpoint {
    Glance(GlanceEndpoint),
    Dns(DnsEndpoint),
}

impl ConfiguredEndpoint {
    #[must_use]
    pub const fn scheme(&self) -> &'static str {
        match self {
            Self::Glance(_) => knob_glance::SCHEME,
            Self::Dns(_) => knob_dns::SCHEME,
        }
    }

    /// Current value of every set option, in declaration order.
    ///
    /// # Errors
    /// Returns the [`RegistryError`] of the endpoint's configurer.
    pub fn values(&self) -> Result<Vec<(&'static str, PropertyValue)>, RegistryError> {
        match self {
            Self::Glance(endpoint) => values_of(endpoint),
            Self::Dns(endpoint) => values_of(endpoint),
        }
    }
}

fn values_of<E: Endpoint>(endpoint: &E) -> Result<Vec<(&'static str, PropertyValue)>, RegistryError> {
    let configurer = E::configurer()?;
    Ok(configurer
        .options()
        .into_iter()
        .filter_map(|option| configurer.option_value(endpoint, option.name, false).map(|v| (option.name, v)))
        .collect())
}

/// Options accepted by the endpoint of `scheme`.
///
/// # Errors
/// Returns [`KnobError::UnknownScheme`] for schemes without an endpoint.
pub fn options(scheme: &str) -> Result<Vec<OptionInfo>, KnobError> {
    let options = match Scheme::find(scheme)? {
        Scheme::Glance => GlanceEndpoint::configurer().context(knob_glance::SCHEME)?.options(),
        Scheme::Dns => DnsEndpoint::configurer().context(knob_dns::SCHEME)?.options(),
    };
    Ok(options)
}

/// Parses `uri` and configures the endpoint of its scheme.
///
/// # Errors
/// Returns [`KnobError::Uri`] for malformed URIs, [`KnobError::UnknownScheme`] for
/// schemes without an endpoint and [`KnobError::Endpoint`] when options cannot be applied.
pub fn configure(
    uri: &str,
    resolver: &dyn ReferenceResolver,
    binder: &PropertyBinder,
) -> Result<(ConfiguredEndpoint, BindReport), KnobError> {
    let uri = EndpointUri::parse(uri)?;
    let scheme = Scheme::find(uri.scheme())?;

    let (endpoint, report) = match scheme {
        Scheme::Glance => GlanceEndpoint::from_uri(&uri, resolver, binder)
            .map(|(e, report)| (ConfiguredEndpoint::Glance(e), report)),
        Scheme::Dns => {
            DnsEndpoint::from_uri(&uri, resolver, binder).map(|(e, report)| (ConfiguredEndpoint::Dns(e), report))
        },
    }
    .context(uri.scheme().to_owned())?;

    info!(scheme = endpoint.scheme(), applied = report.applied.len(), "Endpoint configured");
    Ok((endpoint, report))
}

/// Renders `uri` with credentials masked, for logs and error messages.
///
/// Options of known schemes are masked when declared secret; any scheme gets the usual
/// credential names (`password`, `token`, ...) masked.
///
/// # Errors
/// Returns [`KnobError::Uri`] for malformed URIs.
pub fn sanitize(uri: &str) -> Result<String, KnobError> {
    let uri = EndpointUri::parse(uri)?;
    let sanitized = match Scheme::find(uri.scheme()) {
        Ok(Scheme::Glance) => uri.sanitized(GlanceEndpoint::configurer()?),
        Ok(Scheme::Dns) => uri.sanitized(DnsEndpoint::configurer()?),
        Err(_) => uri.sanitized(&ConfigurerChain::<()>::new()),
    };
    Ok(sanitized)
}
