use crate::headers;
use knob_kernel::config_enum;
use knob_kernel::prelude::*;
use std::sync::LazyLock;
use tracing::debug;

config_enum! {
    /// The kind of lookup performed.
    pub enum DnsType as "DnsType" {
        Dig => "dig",
        Ip => "ip",
        Lookup => "lookup",
        Wikipedia => "wikipedia",
    }
}

impl DnsType {
    /// Headers that must be present on the message for this lookup.
    #[must_use]
    pub const fn required_headers(self) -> &'static [&'static str] {
        match self {
            Self::Dig => &[],
            Self::Ip => &[headers::DNS_DOMAIN],
            Self::Lookup => &[headers::DNS_NAME],
            Self::Wikipedia => &[headers::TERM],
        }
    }

    /// Headers consulted when present.
    #[must_use]
    pub const fn optional_headers(self) -> &'static [&'static str] {
        match self {
            Self::Dig => &[headers::DNS_CLASS, headers::DNS_NAME, headers::DNS_SERVER, headers::DNS_TYPE],
            Self::Lookup => &[headers::DNS_CLASS, headers::DNS_TYPE],
            Self::Ip | Self::Wikipedia => &[],
        }
    }
}

/// Producer performing DNS queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DnsEndpoint {
    pub dns_type: Option<DnsType>,
    pub options: EndpointOptions,
}

static CONFIGURER: LazyLock<Result<ConfigurerChain<DnsEndpoint>, RegistryError>> = LazyLock::new(|| {
    let own = RegistryBuilder::<DnsEndpoint>::new(crate::SCHEME)
        .enumeration::<DnsType, _>("dnsType", |t, v| t.dns_type = Some(v), |t| t.dns_type)
        .description("The type of the lookup.")
        .group("producer")
        .build()?;

    debug!(scheme = crate::SCHEME, "DNS configurer ready");

    Ok(ConfigurerChain::new().with(own).with(Projection::new(
        EndpointOptions::producer_configurer()?,
        endpoint_options,
        endpoint_options_mut,
    )))
});

const fn endpoint_options(endpoint: &DnsEndpoint) -> &EndpointOptions {
    &endpoint.options
}

const fn endpoint_options_mut(endpoint: &mut DnsEndpoint) -> &mut EndpointOptions {
    &mut endpoint.options
}

impl Endpoint for DnsEndpoint {
    const SCHEME: &'static str = crate::SCHEME;
    const PATH_OPTION: &'static str = "dnsType";

    fn configurer() -> Result<&'static dyn PropertyConfigurer<Self>, RegistryError> {
        match &*CONFIGURER {
            Ok(chain) => Ok(chain),
            Err(e) => Err(e.clone()),
        }
    }
}

impl DnsEndpoint {
    /// Required headers absent from `present`, for the configured lookup type.
    #[must_use]
    pub fn missing_headers<'a>(&self, present: impl IntoIterator<Item = &'a str>) -> Vec<&'static str> {
        let present: Vec<&str> = present.into_iter().collect();
        self.dns_type
            .map(DnsType::required_headers)
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(|header| !present.contains(header))
            .collect()
    }
}
