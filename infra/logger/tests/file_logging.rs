use knob_kernel::Properties;
use knob_kernel::domain::PropertyValue;
use knob_logger::{Logger, LoggerSettings};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn settings_from_properties_write_json_files() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let properties: Properties = [
        ("knob.logger.console", PropertyValue::Boolean(false)),
        ("knob.logger.json", PropertyValue::Boolean(true)),
        ("knob.logger.path", PropertyValue::from(log_dir.display().to_string())),
        ("knob.logger.maxFiles", PropertyValue::Int(2)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v))
    .collect();

    let logger = Logger::from_settings("knob-file-logging", LoggerSettings::from_properties(properties)?)?;
    assert!(logger.guard().is_some());

    tracing::info!(scheme = "dns", "hello from the file logger");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(&log_file)?;
    let line = contents.lines().find(|l| l.contains("hello from the file logger")).expect("event written");
    assert!(line.starts_with('{'), "expected a JSON line, got {line}");
    assert!(line.contains("\"scheme\":\"dns\""), "{line}");

    Ok(())
}
