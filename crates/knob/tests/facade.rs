use knob::kernel::domain::PropertyValue;
use knob::kernel::{NoReferences, PropertyBinder};
use knob::{ConfiguredEndpoint, KnobError, SCHEMES};
use std::io::Write;

#[test]
fn every_scheme_lists_its_options() {
    for scheme in SCHEMES {
        let options = knob::options(scheme).expect("known scheme");
        assert!(options.iter().any(|o| o.name == "lazyStartProducer"), "{scheme}");
    }
    assert!(matches!(knob::options("ftp"), Err(KnobError::UnknownScheme { .. })));
}

#[test]
fn uris_are_dispatched_by_scheme() {
    let (endpoint, report) =
        knob::configure("dns:lookup?lazyStartProducer=true", &NoReferences, &PropertyBinder::new()).expect("dns");
    let ConfiguredEndpoint::Dns(dns) = &endpoint else { panic!("unexpected endpoint: {endpoint:?}") };
    assert_eq!(dns.dns_type.map(|t| t.to_string()).as_deref(), Some("lookup"));
    assert_eq!(report.applied, ["lazyStartProducer"]);

    let values = endpoint.values().expect("registry builds");
    assert!(values.contains(&("lazyStartProducer", PropertyValue::Boolean(true))), "{values:?}");

    let uri = "openstack-glance://keystone?project=demo";
    let (endpoint, _) = knob::configure(uri, &NoReferences, &PropertyBinder::new()).expect("glance");
    assert_eq!(endpoint.scheme(), "openstack-glance");
}

#[test]
fn configure_errors_keep_the_scheme() {
    let err = knob::configure("dns:lookup?bogus=1", &NoReferences, &PropertyBinder::new()).expect_err("unknown");
    assert!(matches!(err, KnobError::Endpoint { .. }), "{err}");
    assert!(err.to_string().contains("(dns)"), "{err}");

    let err = knob::configure("smtp:mail?user=a", &NoReferences, &PropertyBinder::new()).expect_err("no endpoint");
    assert!(matches!(err, KnobError::UnknownScheme { ref scheme, .. } if scheme == "smtp"));
}

#[test]
fn sanitize_masks_declared_and_conventional_secrets() {
    assert_eq!(
        knob::sanitize("openstack-glance:h?username=admin&password=s3cret").expect("valid"),
        "openstack-glance:h?password=xxxxxx&username=xxxxxx"
    );
    assert_eq!(
        knob::sanitize("smtp:mail?user=a&accessToken=t").expect("valid"),
        "smtp:mail?accessToken=xxxxxx&user=a"
    );
}

#[test]
fn rest_configuration_loads_from_a_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().expect("temp file");
    file.write_all(b"[camel.rest]\ncomponent = \"servlet\"\nport = 8443\nscheme = \"https\"\n")
        .expect("write properties");

    let (rest, report) = knob::load_rest(file.path(), PropertyBinder::new()).expect("loads");
    assert_eq!(rest.component.as_deref(), Some("servlet"));
    assert_eq!(rest.port, Some(8443));
    assert_eq!(rest.scheme, "https");
    assert!(report.is_complete());
    assert!(knob::features::is_enabled("rest"));
}
