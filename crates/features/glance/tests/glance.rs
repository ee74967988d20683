use knob_glance::{GlanceEndpoint, OpenstackConfig, SCHEME};
use knob_kernel::domain::{PropertyType, PropertyValue};
use knob_kernel::{
    BeanRegistry, BindError, ConfigureError, Endpoint, EndpointError, EndpointUri, NoReferences, PropertyBinder,
};
use std::sync::Arc;

fn create(uri: &str) -> Result<GlanceEndpoint, EndpointError> {
    let uri = EndpointUri::parse(uri).expect("valid uri");
    GlanceEndpoint::from_uri(&uri, &NoReferences, &PropertyBinder::new()).map(|(endpoint, _)| endpoint)
}

#[test]
fn uri_options_are_applied() {
    let endpoint = create(
        "openstack-glance:keystone.local?username=admin&password=RAW(p&ss+word)&project=demo\
         &operation=getAll&apiVersion=V2&lazyStartProducer=true",
    )
    .expect("creates");

    assert_eq!(endpoint.host.as_deref(), Some("keystone.local"));
    assert_eq!(endpoint.username.as_deref(), Some("admin"));
    assert_eq!(endpoint.password.as_deref(), Some("p&ss+word"));
    assert_eq!(endpoint.project.as_deref(), Some("demo"));
    assert_eq!(endpoint.api_version.as_deref(), Some("V2"));
    assert_eq!(endpoint.domain, "default");
    assert!(endpoint.options.lazy_start_producer);
    assert!(endpoint.has_known_operation());
}

#[test]
fn option_names_ignore_case_by_default() {
    let endpoint = create("openstack-glance:h?APIVERSION=v2&Domain=corp").expect("creates");
    assert_eq!(endpoint.api_version.as_deref(), Some("v2"));
    assert_eq!(endpoint.domain, "corp");
}

#[test]
fn unknown_options_are_rejected_unless_lenient() {
    let err = create("openstack-glance:h?region=eu").expect_err("unknown option");
    assert!(matches!(err, EndpointError::Options { source: BindError::UnknownProperties { .. }, .. }));

    let uri = EndpointUri::parse("openstack-glance:h?region=eu&project=p").expect("valid uri");
    let (endpoint, report) =
        GlanceEndpoint::from_uri(&uri, &NoReferences, &PropertyBinder::new().fail_on_unknown(false))
            .expect("lenient");
    assert_eq!(report.unknown, ["region"]);
    assert_eq!(endpoint.project.as_deref(), Some("p"));
}

#[test]
fn invalid_shared_options_fail() {
    let err = create("openstack-glance:h?lazyStartProducer=notabool").expect_err("not a boolean");
    let EndpointError::Options { source: BindError::Configure { source, .. }, .. } = err else {
        panic!("unexpected error: {err}");
    };
    assert!(matches!(source, ConfigureError::TypeCoercion { .. }));
}

#[test]
fn config_is_resolved_from_beans() {
    let beans = BeanRegistry::new();
    let config = Arc::new(OpenstackConfig { read_timeout_ms: 5_000, ..OpenstackConfig::default() });
    beans.bind_ref("openstack", knob_kernel::domain::ObjectRef::from_arc(Arc::clone(&config)));

    let uri = EndpointUri::parse("openstack-glance:h?config=#openstack").expect("valid uri");
    let (endpoint, _) = GlanceEndpoint::from_uri(&uri, &beans, &PropertyBinder::new()).expect("creates");
    assert!(endpoint.config.is_some_and(|c| Arc::ptr_eq(&c, &config)));

    let err = GlanceEndpoint::from_uri(&uri, &NoReferences, &PropertyBinder::new()).expect_err("no bean");
    assert!(err.to_string().contains("#openstack"), "{err}");
}

#[test]
fn options_describe_the_endpoint() {
    let configurer = GlanceEndpoint::configurer().expect("registry builds");
    let names: Vec<_> = configurer.options().iter().map(|o| o.name).collect();
    assert_eq!(
        names,
        [
            "host",
            "apiVersion",
            "config",
            "domain",
            "operation",
            "password",
            "project",
            "username",
            "lazyStartProducer"
        ]
    );

    let config = configurer.option_info("config", false).expect("declared");
    assert!(matches!(config.ty, PropertyType::Object(o) if o.short_name() == "OpenstackConfig"));
    assert!(configurer.option_info("password", false).is_some_and(|i| i.meta.secret));
    assert_eq!(
        configurer.option_value(&GlanceEndpoint::default(), "domain", false),
        Some(PropertyValue::from("default"))
    );
    assert_eq!(
        configurer.option_value(&GlanceEndpoint::default(), "lazyStartProducer", false),
        Some(PropertyValue::Boolean(false))
    );
}

#[test]
fn consumer_options_are_not_handled() {
    let configurer = GlanceEndpoint::configurer().expect("registry builds");
    let mut endpoint = GlanceEndpoint::default();

    for name in ["bridgeErrorHandler", "exchangePattern"] {
        let handled = configurer.configure(&NoReferences, &mut endpoint, name, "true".into(), false).expect(name);
        assert!(!handled, "{name}");
    }
    assert_eq!(endpoint, GlanceEndpoint::default());
}

#[test]
fn sanitized_uri_masks_credentials() {
    let configurer = GlanceEndpoint::configurer().expect("registry builds");
    let uri = EndpointUri::builder(SCHEME, "h")
        .property("username", "admin")
        .property("password", "s3cret")
        .property("project", "demo")
        .build()
        .expect("valid uri");

    assert_eq!(
        uri.sanitized(configurer),
        "openstack-glance:h?password=xxxxxx&project=demo&username=xxxxxx"
    );
}
