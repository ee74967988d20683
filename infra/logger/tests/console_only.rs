use knob_logger::{LevelFilter, Logger};

#[test]
fn console_logger_has_no_file_guard() {
    let logger = Logger::builder()
        .name("knob-console-only")
        .console(true)
        .level(LevelFilter::WARN)
        .init()
        .expect("logger should initialize");

    assert!(logger.guard().is_none(), "console-only logger should not create a file guard");
}
