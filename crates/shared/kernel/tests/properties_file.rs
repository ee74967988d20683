use knob_kernel::config::{ConfigError, load_config, load_properties};
use knob_kernel::domain::PropertyValue;
use knob_kernel::{NoReferences, PropertyBinder, RegistryBuilder};
use std::io::Write;
use tempfile::NamedTempFile;

const UNSET_PREFIX: &str = "KNOB_PROPERTIES_FILE_TEST";

fn toml_file(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().expect("temp file");
    file.write_all(content.as_bytes()).expect("write properties");
    file
}

#[test]
fn tables_flatten_into_dotted_properties() {
    let file = toml_file(
        r#"
        [camel.rest]
        host = "0.0.0.0"
        port = 8080
        bindingmode = "json"

        [camel.main]
        name = "demo"
        "#,
    );

    let properties = load_properties(Some(file.path()), UNSET_PREFIX).expect("loads");

    assert_eq!(properties.get("camel.rest.host"), Some(&PropertyValue::from("0.0.0.0")));
    assert_eq!(properties.get("camel.rest.port"), Some(&PropertyValue::Int(8080)));
    assert_eq!(properties.get("camel.main.name"), Some(&PropertyValue::from("demo")));
    assert_eq!(properties.len(), 4);
}

#[test]
fn loaded_properties_bind_under_a_prefix() {
    #[derive(Default)]
    struct Rest {
        port: i32,
        host: Option<String>,
    }

    let registry = RegistryBuilder::<Rest>::new("rest")
        .int("port", |t, v| t.port = v, |t| t.port)
        .string("host", |t, v| t.host = Some(v), |t| t.host.clone())
        .build()
        .expect("registry builds");

    let file = toml_file("[camel.rest]\nport = 9090\nhost = \"localhost\"\n\n[other]\nkey = true\n");
    let properties = load_properties(Some(file.path()), UNSET_PREFIX).expect("loads");

    let mut rest = Rest::default();
    let report = PropertyBinder::new()
        .with_prefix("camel.rest.")
        .bind(&NoReferences, &registry, &mut rest, properties)
        .expect("binds");

    assert_eq!(rest.port, 9090);
    assert_eq!(rest.host.as_deref(), Some("localhost"));
    assert_eq!(report.skipped, 1);
}

#[test]
fn arrays_are_unsupported() {
    let file = toml_file("[camel.rest]\nhosts = [\"a\", \"b\"]\n");
    let err = load_properties(Some(file.path()), UNSET_PREFIX).expect_err("arrays");
    assert!(matches!(err, ConfigError::Unsupported { .. }), "{err}");
}

#[test]
fn missing_files_are_config_errors() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = load_properties(Some(dir.path().join("absent.toml")), UNSET_PREFIX).expect_err("missing");
    assert!(matches!(err, ConfigError::Config { .. }), "{err}");
}

#[test]
fn typed_configs_deserialize() {
    #[derive(serde::Deserialize)]
    struct Shell {
        prefix: String,
    }

    let file = toml_file("prefix = \"camel.rest.\"\n");
    let shell: Shell = load_config(Some(file.path())).expect("loads");
    assert_eq!(shell.prefix, "camel.rest.");
}
