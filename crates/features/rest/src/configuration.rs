use crate::error::{RestError, RestErrorExt};
use crate::maps::MapOptions;
use knob_kernel::config_enum;
use knob_kernel::prelude::*;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, info};

config_enum! {
    /// How the REST service computes its host name when none is configured.
    #[derive(Default)]
    pub enum HostNameResolver as "RestHostNameResolver" {
        #[default]
        AllLocalIp => "allLocalIp",
        LocalIp => "localIp",
        LocalHostName => "localHostName",
    }
}

config_enum! {
    /// Binding of request and response bodies.
    #[derive(Default)]
    pub enum RestBindingMode as "RestBindingMode" {
        Auto => "auto",
        #[default]
        Off => "off",
        Json => "json",
        Xml => "xml",
        JsonXml => "json_xml",
    }
}

/// Global configuration of the REST DSL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestConfiguration {
    pub component: Option<String>,
    pub api_component: Option<String>,
    pub producer_component: Option<String>,
    pub scheme: String,
    pub host: Option<String>,
    pub api_host: Option<String>,
    pub use_x_forward_headers: bool,
    pub port: Option<i32>,
    pub producer_api_doc: Option<String>,
    pub context_path: Option<String>,
    pub api_context_path: Option<String>,
    pub api_context_route_id: Option<String>,
    pub api_vendor_extension: bool,
    pub host_name_resolver: HostNameResolver,
    pub binding_mode: RestBindingMode,
    pub binding_package_scan: Option<String>,
    pub skip_binding_on_error_code: bool,
    pub client_request_validation: bool,
    pub client_response_validation: bool,
    pub enable_cors: bool,
    pub inline_routes: bool,
    pub json_data_format: Option<String>,
    pub xml_data_format: Option<String>,
    pub component_properties: BTreeMap<String, String>,
    pub endpoint_properties: BTreeMap<String, String>,
    pub consumer_properties: BTreeMap<String, String>,
    pub data_format_properties: BTreeMap<String, String>,
    pub api_properties: BTreeMap<String, String>,
    pub cors_headers: BTreeMap<String, String>,
    pub validation_levels: BTreeMap<String, String>,
}

impl Default for RestConfiguration {
    fn default() -> Self {
        Self {
            component: None,
            api_component: None,
            producer_component: None,
            scheme: "http".to_owned(),
            host: None,
            api_host: None,
            use_x_forward_headers: false,
            port: None,
            producer_api_doc: None,
            context_path: None,
            api_context_path: None,
            api_context_route_id: None,
            api_vendor_extension: false,
            host_name_resolver: HostNameResolver::default(),
            binding_mode: RestBindingMode::default(),
            binding_package_scan: None,
            skip_binding_on_error_code: true,
            client_request_validation: false,
            client_response_validation: false,
            enable_cors: false,
            inline_routes: false,
            json_data_format: None,
            xml_data_format: None,
            component_properties: BTreeMap::new(),
            endpoint_properties: BTreeMap::new(),
            consumer_properties: BTreeMap::new(),
            data_format_properties: BTreeMap::new(),
            api_properties: BTreeMap::new(),
            cors_headers: BTreeMap::new(),
            validation_levels: BTreeMap::new(),
        }
    }
}

static CONFIGURER: LazyLock<Result<ConfigurerChain<RestConfiguration>, RegistryError>> = LazyLock::new(|| {
    let own = RegistryBuilder::<RestConfiguration>::new("rest")
        .string("component", |t, v| t.component = Some(v), |t| t.component.clone())
        .description("The REST transport component of the consumer, such as netty-http, jetty or servlet.")
        .group("consumer")
        .string("apiComponent", |t, v| t.api_component = Some(v), |t| t.api_component.clone())
        .description("The component serving the REST API documentation, such as openapi.")
        .group("consumer")
        .string("producerComponent", |t, v| t.producer_component = Some(v), |t| t.producer_component.clone())
        .description("The component used as REST producer.")
        .group("producer")
        .string("scheme", |t, v| t.scheme = v, |t| t.scheme.clone())
        .description("The scheme of the exposed REST service, usually http or https.")
        .default_value("http")
        .group("consumer")
        .string("host", |t, v| t.host = Some(v), |t| t.host.clone())
        .description("The host name of the exposed REST service.")
        .group("consumer")
        .string("apiHost", |t, v| t.api_host = Some(v), |t| t.api_host.clone())
        .description("Host name advertised in the API documentation instead of the computed one.")
        .group("consumer")
        .boolean("useXForwardHeaders", |t, v| t.use_x_forward_headers = v, |t| t.use_x_forward_headers)
        .description("Use X-Forward headers to compute the host names of the API documentation.")
        .default_value("false")
        .group("consumer")
        .int("port", |t, v| t.port = Some(v), |t| t.port)
        .description("The port number of the exposed REST service.")
        .group("consumer")
        .string("producerApiDoc", |t, v| t.producer_api_doc = Some(v), |t| t.producer_api_doc.clone())
        .description("Location of the API document the producer validates requests against.")
        .group("producer")
        .string("contextPath", |t, v| t.context_path = Some(v), |t| t.context_path.clone())
        .description("Leading context path of the REST services.")
        .group("consumer")
        .string("apiContextPath", |t, v| t.api_context_path = Some(v), |t| t.api_context_path.clone())
        .description("Leading context path of the REST API documentation.")
        .group("consumer")
        .string("apiContextRouteId", |t, v| t.api_context_route_id = Some(v), |t| {
            t.api_context_route_id.clone()
        })
        .description("Route id of the route serving the REST API documentation.")
        .group("consumer")
        .boolean("apiVendorExtension", |t, v| t.api_vendor_extension = v, |t| t.api_vendor_extension)
        .description("Include vendor extensions (x- keys) such as route ids in the API documentation.")
        .default_value("false")
        .group("consumer")
        .enumeration::<HostNameResolver, _>("hostNameResolver", |t, v| t.host_name_resolver = v, |t| {
            t.host_name_resolver
        })
        .description("Resolver of the host name when none is configured.")
        .default_value("allLocalIp")
        .group("consumer")
        .enumeration::<RestBindingMode, _>("bindingMode", |t, v| t.binding_mode = v, |t| t.binding_mode)
        .description("Binding of request and response bodies.")
        .default_value("off")
        .group("consumer")
        .string("bindingPackageScan", |t, v| t.binding_package_scan = Some(v), |t| {
            t.binding_package_scan.clone()
        })
        .description("Comma separated packages scanned for binding classes.")
        .group("consumer")
        .boolean("skipBindingOnErrorCode", |t, v| t.skip_binding_on_error_code = v, |t| {
            t.skip_binding_on_error_code
        })
        .description("Skip output binding when a custom HTTP error code header is present.")
        .default_value("true")
        .group("consumer")
        .boolean("clientRequestValidation", |t, v| t.client_request_validation = v, |t| {
            t.client_request_validation
        })
        .description("Validate content type, accept header and required parameters of client requests.")
        .default_value("false")
        .group("consumer")
        .boolean("clientResponseValidation", |t, v| t.client_response_validation = v, |t| {
            t.client_response_validation
        })
        .description("Validate status code, content type and headers of responses.")
        .default_value("false")
        .group("consumer")
        .boolean("enableCORS", |t, v| t.enable_cors = v, |t| t.enable_cors)
        .description("Add CORS headers to responses.")
        .default_value("false")
        .group("consumer")
        .boolean("inlineRoutes", |t, v| t.inline_routes = v, |t| t.inline_routes)
        .description("Inline the routes linked from REST services through direct endpoints.")
        .default_value("false")
        .group("consumer")
        .string("jsonDataFormat", |t, v| t.json_data_format = Some(v), |t| t.json_data_format.clone())
        .description("Name of the JSON data format used for binding.")
        .group("consumer")
        .string("xmlDataFormat", |t, v| t.xml_data_format = Some(v), |t| t.xml_data_format.clone())
        .description("Name of the XML data format used for binding.")
        .group("consumer")
        .build()?;

    debug!(options = own.len(), "REST configurer ready");

    Ok(ConfigurerChain::new().with(own).with(MapOptions))
});

impl RestConfiguration {
    /// The configurer of every REST option, map entries included.
    ///
    /// # Errors
    /// Returns the [`RegistryError`] raised while declaring the options.
    pub fn configurer() -> Result<&'static ConfigurerChain<Self>, RegistryError> {
        CONFIGURER.as_ref().map_err(Clone::clone)
    }

    /// Builds a configuration from `camel.rest.*` properties (or the binder's own prefix);
    /// other keys are skipped.
    ///
    /// # Errors
    /// Returns [`RestError::Bind`] if a value cannot be applied or unknown REST options
    /// remain and `binder` fails on them.
    pub fn from_properties(
        properties: Properties,
        resolver: &dyn ReferenceResolver,
        binder: PropertyBinder,
    ) -> Result<(Self, BindReport), RestError> {
        let configurer = Self::configurer()?;
        let binder =
            if binder.prefix().is_some() { binder } else { binder.with_prefix(crate::PROPERTIES_PREFIX) };

        let mut configuration = Self::default();
        let report =
            binder.bind(resolver, configurer, &mut configuration, properties).context("rest configuration")?;

        info!(applied = report.applied.len(), skipped = report.skipped, "REST configuration bound");
        Ok((configuration, report))
    }
}
