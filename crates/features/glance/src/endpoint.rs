use knob_kernel::prelude::*;
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Transport settings shared by OpenStack clients, bound by reference (`config=#openstack`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenstackConfig {
    pub connect_timeout_ms: u32,
    pub read_timeout_ms: u32,
    pub ssl_verification: bool,
}

impl Default for OpenstackConfig {
    fn default() -> Self {
        Self { connect_timeout_ms: 10_000, read_timeout_ms: 30_000, ssl_verification: true }
    }
}

/// Producer of the OpenStack image service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlanceEndpoint {
    pub host: Option<String>,
    pub api_version: Option<String>,
    pub config: Option<Arc<OpenstackConfig>>,
    pub domain: String,
    pub operation: Option<String>,
    pub password: Option<String>,
    pub project: Option<String>,
    pub username: Option<String>,
    pub options: EndpointOptions,
}

impl Default for GlanceEndpoint {
    fn default() -> Self {
        Self {
            host: None,
            api_version: None,
            config: None,
            domain: "default".to_owned(),
            operation: None,
            password: None,
            project: None,
            username: None,
            options: EndpointOptions::default(),
        }
    }
}

static CONFIGURER: LazyLock<Result<ConfigurerChain<GlanceEndpoint>, RegistryError>> = LazyLock::new(|| {
    let own = RegistryBuilder::<GlanceEndpoint>::new(crate::SCHEME)
        .string("host", |t, v| t.host = Some(v), |t| t.host.clone())
        .description("OpenStack host url")
        .group("producer")
        .string("apiVersion", |t, v| t.api_version = Some(v), |t| t.api_version.clone())
        .description("OpenStack API version")
        .default_value("V3")
        .group("producer")
        .object::<OpenstackConfig, _>("config", |t, v| t.config = Some(v), |t| t.config.clone())
        .description("OpenStack configuration")
        .group("producer")
        .string("domain", |t, v| t.domain = v, |t| t.domain.clone())
        .description("Authentication domain")
        .default_value("default")
        .group("producer")
        .string("operation", |t, v| t.operation = Some(v), |t| t.operation.clone())
        .description("The operation to do")
        .group("producer")
        .string("password", |t, v| t.password = Some(v), |t| t.password.clone())
        .description("OpenStack password")
        .group("security")
        .secret()
        .string("project", |t, v| t.project = Some(v), |t| t.project.clone())
        .description("The project ID")
        .group("producer")
        .string("username", |t, v| t.username = Some(v), |t| t.username.clone())
        .description("OpenStack username")
        .group("security")
        .secret()
        .build()?;

    debug!(scheme = crate::SCHEME, "Glance configurer ready");

    Ok(ConfigurerChain::new().with(own).with(Projection::new(
        EndpointOptions::producer_configurer()?,
        endpoint_options,
        endpoint_options_mut,
    )))
});

const fn endpoint_options(endpoint: &GlanceEndpoint) -> &EndpointOptions {
    &endpoint.options
}

const fn endpoint_options_mut(endpoint: &mut GlanceEndpoint) -> &mut EndpointOptions {
    &mut endpoint.options
}

impl Endpoint for GlanceEndpoint {
    const SCHEME: &'static str = crate::SCHEME;
    const PATH_OPTION: &'static str = "host";

    fn configurer() -> Result<&'static dyn PropertyConfigurer<Self>, RegistryError> {
        match &*CONFIGURER {
            Ok(chain) => Ok(chain),
            Err(e) => Err(e.clone()),
        }
    }
}

impl GlanceEndpoint {
    /// Whether `operation` is one of [`crate::operations::ALL`]; an unset operation is valid.
    #[must_use]
    pub fn has_known_operation(&self) -> bool {
        self.operation.as_deref().is_none_or(|op| crate::operations::ALL.contains(&op))
    }
}
