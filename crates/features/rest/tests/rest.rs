use knob_kernel::domain::PropertyValue;
use knob_kernel::{BindError, NoReferences, Properties, PropertyBinder, PropertyConfigurer};
use knob_rest::{HostNameResolver, RestBindingMode, RestConfiguration, RestError};

fn properties(pairs: &[(&str, &str)]) -> Properties {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), PropertyValue::from(*v))).collect()
}

#[test]
fn defaults_match_the_declared_defaults() {
    let rest = RestConfiguration::default();
    let configurer = RestConfiguration::configurer().expect("registry builds");

    assert_eq!(rest.scheme, "http");
    assert!(rest.skip_binding_on_error_code);
    assert_eq!(rest.binding_mode, RestBindingMode::Off);
    assert_eq!(rest.host_name_resolver, HostNameResolver::AllLocalIp);

    for option in configurer.options() {
        let Some(default) = option.meta.default_value else { continue };
        let current = configurer.option_value(&rest, option.name, false).expect("has a value");
        assert_eq!(current.to_string(), default, "{}", option.name);
    }
}

#[test]
fn prefixed_properties_are_bound() {
    let (rest, report) = RestConfiguration::from_properties(
        properties(&[
            ("camel.rest.component", "netty-http"),
            ("camel.rest.port", "8080"),
            ("camel.rest.bindingMode", "json"),
            ("camel.rest.hostnameresolver", "localHostName"),
            ("camel.rest.enablecors", "true"),
            ("camel.rest.corsHeaders.Access-Control-Max-Age", "3600"),
            ("camel.rest.dataFormatProperties[prettyPrint]", "true"),
            ("camel.main.name", "demo"),
        ]),
        &NoReferences,
        PropertyBinder::new(),
    )
    .expect("binds");

    assert_eq!(rest.component.as_deref(), Some("netty-http"));
    assert_eq!(rest.port, Some(8080));
    assert_eq!(rest.binding_mode, RestBindingMode::Json);
    assert_eq!(rest.host_name_resolver, HostNameResolver::LocalHostName);
    assert!(rest.enable_cors);
    assert_eq!(rest.cors_headers.get("Access-Control-Max-Age").map(String::as_str), Some("3600"));
    assert_eq!(rest.data_format_properties.get("prettyPrint").map(String::as_str), Some("true"));

    assert_eq!(report.applied.len(), 7);
    assert_eq!(report.skipped, 1);
    assert!(report.is_complete());
}

#[test]
fn enum_constants_are_validated() {
    let err = RestConfiguration::from_properties(
        properties(&[("camel.rest.bindingMode", "yaml")]),
        &NoReferences,
        PropertyBinder::new(),
    )
    .expect_err("unknown binding mode");

    assert!(matches!(err, RestError::Bind { source: BindError::Configure { .. }, .. }), "{err}");
    assert!(err.to_string().contains("camel.rest.bindingMode"), "{err}");
}

#[test]
fn unknown_rest_options_can_be_tolerated() {
    let input = properties(&[("camel.rest.apiDocs", "true"), ("camel.rest.host", "0.0.0.0")]);

    let err = RestConfiguration::from_properties(input.clone(), &NoReferences, PropertyBinder::new())
        .expect_err("strict");
    assert!(matches!(err, RestError::Bind { source: BindError::UnknownProperties { .. }, .. }));

    let (rest, report) =
        RestConfiguration::from_properties(input, &NoReferences, PropertyBinder::new().fail_on_unknown(false))
            .expect("lenient");
    assert_eq!(rest.host.as_deref(), Some("0.0.0.0"));
    assert_eq!(report.unknown, ["apiDocs"]);
}

#[test]
fn options_list_scalar_and_map_options() {
    let configurer = RestConfiguration::configurer().expect("registry builds");
    let names: Vec<_> = configurer.options().iter().map(|o| o.name).collect();

    assert_eq!(names.len(), 30);
    assert_eq!(names.first(), Some(&"component"));
    assert_eq!(names.last(), Some(&"validationLevels"));
    assert!(configurer.option_info("corsHeaders.Origin", false).is_some());
    assert!(configurer.option_info("corsHeaders", false).is_none());
}

#[test]
fn binder_prefix_overrides_the_default_one() {
    let (rest, report) = RestConfiguration::from_properties(
        properties(&[("rest.contextPath", "/api"), ("camel.rest.contextPath", "/ignored")]),
        &NoReferences,
        PropertyBinder::new().with_prefix("rest."),
    )
    .expect("binds");

    assert_eq!(rest.context_path.as_deref(), Some("/api"));
    assert_eq!(report.skipped, 1);
}
