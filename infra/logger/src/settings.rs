use crate::error::{LoggerError, LoggerErrorExt};
use knob_kernel::config_enum;
use knob_kernel::prelude::*;
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::Level;
use tracing::level_filters::LevelFilter;

/// Prefix of logger properties in a properties file.
pub const PROPERTIES_PREFIX: &str = "knob.logger.";

const DEFAULT_MAX_FILES: usize = 10;

config_enum! {
    /// Minimum level of emitted events.
    #[derive(Default)]
    pub enum LogLevel as "LogLevel" {
        Off => "off",
        Error => "error",
        Warn => "warn",
        #[default]
        Info => "info",
        Debug => "debug",
        Trace => "trace",
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => Self::OFF,
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

impl From<LevelFilter> for LogLevel {
    fn from(filter: LevelFilter) -> Self {
        match filter.into_level() {
            None => Self::Off,
            Some(Level::ERROR) => Self::Error,
            Some(Level::WARN) => Self::Warn,
            Some(Level::INFO) => Self::Info,
            Some(Level::DEBUG) => Self::Debug,
            Some(_) => Self::Trace,
        }
    }
}

/// Logger settings as they appear in properties files (`knob.logger.level=debug`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerSettings {
    pub level: LogLevel,
    pub console: bool,
    pub json: bool,
    pub path: Option<PathBuf>,
    pub max_files: usize,
    pub filter: Option<String>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            console: true,
            json: false,
            path: None,
            max_files: DEFAULT_MAX_FILES,
            filter: None,
        }
    }
}

static CONFIGURER: LazyLock<Result<PropertyRegistry<LoggerSettings>, RegistryError>> = LazyLock::new(|| {
    RegistryBuilder::<LoggerSettings>::new("logger")
        .enumeration::<LogLevel, _>("level", |t, v| t.level = v, |t| t.level)
        .description("Minimum level of emitted events")
        .default_value("info")
        .boolean("console", |t, v| t.console = v, |t| t.console)
        .description("Write events to the console")
        .default_value("true")
        .boolean("json", |t, v| t.json = v, |t| t.json)
        .description("Write file events as JSON lines")
        .default_value("false")
        .string("path", |t, v| t.path = Some(PathBuf::from(v)), |t| {
            t.path.as_ref().map(|p| p.display().to_string())
        })
        .description("Directory of rolling log files")
        .int("maxFiles", |t, v| t.max_files = usize::try_from(v).unwrap_or_default(), |t| {
            i32::try_from(t.max_files).ok()
        })
        .description("Number of rolled files kept")
        .default_value("10")
        .check(|v| match v {
            PropertyValue::Int(n) if *n < 1 => Err(format!("must be at least 1, got {n}").into()),
            _ => Ok(()),
        })
        .string("filter", |t, v| t.filter = Some(v), |t| t.filter.clone())
        .description("Per-target filter directives, e.g. knob_kernel=trace")
        .alias("envFilter")
        .build()
});

impl LoggerSettings {
    /// # Errors
    /// Returns the [`RegistryError`] raised while declaring the settings.
    pub fn configurer() -> Result<&'static PropertyRegistry<Self>, RegistryError> {
        CONFIGURER.as_ref().map_err(Clone::clone)
    }

    /// Reads `knob.logger.*` properties; other keys are skipped and unknown logger
    /// options are rejected.
    ///
    /// # Errors
    /// Returns [`LoggerError::Settings`] if a value cannot be applied.
    pub fn from_properties(properties: Properties) -> Result<Self, LoggerError> {
        let configurer = Self::configurer()?;
        let mut settings = Self::default();

        PropertyBinder::new()
            .with_prefix(PROPERTIES_PREFIX)
            .bind(&knob_kernel::NoReferences, configurer, &mut settings, properties)
            .context("knob.logger")?;

        Ok(settings)
    }

    #[must_use]
    pub fn level_filter(&self) -> LevelFilter {
        self.level.into()
    }
}
