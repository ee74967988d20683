//! # Logger
//!
//! Tracing setup shared by knob tools: a compact console layer on stderr, an optional
//! rolling file layer written through a non-blocking worker, and environment-based
//! filtering. Settings can be given in code through [`Logger::builder`] or read from
//! `knob.logger.*` properties into [`LoggerSettings`].
//!
//! Use [`LoggerBuilder::env_filter`] to set per-target filters
//! (e.g., `"knob_kernel=trace,knob_rest=debug"`), in addition to `RUST_LOG`.
//!
//! ## Example
//!
//! ```rust
//! # use knob_logger::{Logger, LevelFilter};
//!
//! let _logger = Logger::builder()
//!     .name("knob")
//!     .console(true)
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;
mod settings;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use crate::settings::{LogLevel, LoggerSettings, PROPERTIES_PREFIX};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Sealed;
use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug)]
struct LoggerConfig {
    settings: LoggerSettings,
    rotation: Rotation,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self { settings: LoggerSettings::default(), rotation: Rotation::DAILY }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);
#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// A builder for configuring and initializing the global tracing subscriber.
///
/// File options ([`max_files`](LoggerBuilder::max_files), [`json`](LoggerBuilder::json))
/// only become available once a [`path`](LoggerBuilder::path) is set.
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName, F: Sealed = NoFile> {
    config: LoggerConfig,
    name: N,
    file_state: PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<NoName, F> {
    /// Sets the name of the logger, used as the prefix of rolled files.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName, F> {
        LoggerBuilder { name: WithName(name.into()), config: self.config, file_state: PhantomData }
    }
}

impl LoggerBuilder<WithName, WithFile> {
    /// Configures the maximum number of log files to keep.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.config.settings.max_files = max;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.config.rotation = rotation;
        self
    }

    /// Writes file events as JSON lines.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self) -> Self {
        self.config.settings.json = true;
        self
    }
}

impl<F: Sealed> LoggerBuilder<WithName, F> {
    /// Configures the minimum level to be emitted.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn level(mut self, level: LevelFilter) -> Self {
        self.config.settings.level = level.into();
        self
    }

    /// Adds an explicit env filter (e.g., `knob_kernel=trace`).
    ///
    /// Invalid filters will cause [`LoggerBuilder::init`] to return an error.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.settings.filter = Some(filter.into());
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.settings.console = enabled;
        self
    }

    /// Sets the directory of rolling log files.
    pub fn path(self, path: impl Into<PathBuf>) -> LoggerBuilder<WithName, WithFile> {
        let mut config = self.config;
        config.settings.path = Some(path.into());
        LoggerBuilder { config, name: self.name, file_state: PhantomData }
    }

    /// Consumes the builder and initializes the global tracing subscriber.
    ///
    /// The returned [`Logger`] holds the [`WorkerGuard`] of the file writer; keep it
    /// alive until shutdown so buffered events are flushed.
    ///
    /// # Errors
    /// Returns [`LoggerError::Subscriber`] if a global subscriber has already been set.
    /// Returns [`LoggerError::InvalidConfiguration`] for invalid builder settings.
    pub fn init(self) -> Result<Logger, LoggerError> {
        install(&self.name.0, self.config)
    }
}

/// A handle to the initialized logging system.
///
/// Holds the background worker guard. Drop it only when the application is shutting down.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Returns a new [`LoggerBuilder`] to configure the global tracing subscriber.
    ///
    /// ```rust
    /// use knob_logger::{LevelFilter, Logger};
    ///
    /// let _logger = Logger::builder()
    ///     .name("knob")
    ///     .level(LevelFilter::DEBUG)
    ///     .init()
    ///     .unwrap();
    /// ```
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { config: LoggerConfig::default(), name: NoName, file_state: PhantomData }
    }

    /// Initializes the global subscriber from settings read out of properties.
    ///
    /// # Errors
    /// Same as [`LoggerBuilder::init`].
    pub fn from_settings(name: &str, settings: LoggerSettings) -> Result<Self, LoggerError> {
        install(name, LoggerConfig { settings, rotation: Rotation::DAILY })
    }

    /// Returns a reference to the underlying worker guard, if present.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}

fn install(name: &str, config: LoggerConfig) -> Result<Logger, LoggerError> {
    validate_config(&config.settings, name)?;

    let settings = config.settings;
    let env_filter = build_env_filter(&settings)?;

    let mut layers = Vec::new();

    if settings.console {
        layers.push(layer().compact().with_writer(std::io::stderr).with_ansi(true).boxed());
    }

    let guard = if let Some(path) = settings.path {
        fs::create_dir_all(&path).context(format!("Failed to create path: {}", path.display()))?;

        let file_appender = RollingFileAppender::builder()
            .rotation(config.rotation)
            .filename_prefix(name)
            .filename_suffix(LOG_FILE_SUFFIX)
            .max_log_files(settings.max_files)
            .build(path)?;

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let file_layer = layer().with_writer(non_blocking).with_ansi(false);

        layers.push(if settings.json { file_layer.json().boxed() } else { file_layer.boxed() });
        Some(guard)
    } else {
        None
    };

    if layers.is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "No logging layers enabled. Enable console or file output.".into(),
            context: None,
        });
    }

    tracing_subscriber::registry().with(env_filter).with(layers).try_init()?;

    Ok(Logger { guard })
}

fn validate_config(settings: &LoggerSettings, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }

    if settings.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "maxFiles must be greater than zero".into(),
            context: None,
        });
    }

    Ok(())
}

fn build_env_filter(settings: &LoggerSettings) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(settings.level_filter().into());
    settings.filter.as_ref().map_or_else(
        || Ok(builder.from_env_lossy()),
        |filter| {
            builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{filter}': {e}").into(),
                context: None,
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn builder_starts_from_default_settings() {
        let builder = Logger::builder().name("knob-test").env_filter("knob=debug");
        assert!(builder.config.settings.console);
        assert_eq!(builder.config.settings.level, LogLevel::Info);
        assert_eq!(builder.config.settings.filter.as_deref(), Some("knob=debug"));
        assert!(builder.config.settings.path.is_none());
    }

    #[test]
    fn file_options_are_recorded() {
        let tmp_dir = tempdir().expect("temp dir");
        let log_dir = tmp_dir.path().join("logs");
        let builder = Logger::builder()
            .name("knob-test")
            .path(log_dir.clone())
            .max_files(5)
            .json()
            .level(LevelFilter::DEBUG);

        assert_eq!(builder.config.settings.level, LogLevel::Debug);
        assert_eq!(builder.config.settings.max_files, 5);
        assert!(builder.config.settings.json);
        assert_eq!(builder.config.settings.path.as_deref(), Some(log_dir.as_path()));
    }

    #[test]
    fn invalid_settings_are_rejected_before_install() {
        let no_layers = LoggerSettings { console: false, ..LoggerSettings::default() };
        let err = Logger::from_settings("knob-test", no_layers).expect_err("nothing to write to");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }), "{err}");

        let no_files = LoggerSettings { max_files: 0, ..LoggerSettings::default() };
        assert!(Logger::from_settings("knob-test", no_files).is_err());

        assert!(Logger::from_settings(" ", LoggerSettings::default()).is_err());

        let bad_filter = LoggerSettings { filter: Some("knob=loud".into()), ..LoggerSettings::default() };
        assert!(Logger::from_settings("knob-test", bad_filter).is_err());
    }
}
