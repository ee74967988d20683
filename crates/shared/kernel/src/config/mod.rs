use crate::binding::Properties;
use crate::error::format_context;
use config::{Config, Environment, File};
use knob_domain::PropertyValue;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default configuration file, resolved relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "knob";

/// Prefix of environment overrides (`KNOB__LOGGER__LEVEL`).
pub const ENV_PREFIX: &str = "KNOB";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config {
        #[source]
        source: config::ConfigError,
        context: Option<Cow<'static, str>>,
    },

    /// The file holds a shape that cannot become a property value.
    #[error("Unsupported property value{}: {message}", format_context(.context))]
    Unsupported { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Property value error{}: {source}", format_context(.context))]
    Value {
        #[source]
        source: serde_json::Error,
        context: Option<Cow<'static, str>>,
    },
}

pub trait ConfigErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, ConfigError>;
}

impl<T> ConfigErrorExt<T> for Result<T, ConfigError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                ConfigError::Config { context: c, .. }
                | ConfigError::Unsupported { context: c, .. }
                | ConfigError::Value { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

impl<T> ConfigErrorExt<T> for Result<T, config::ConfigError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, ConfigError> {
        self.map_err(|source| ConfigError::Config { source, context: Some(context.into()) })
    }
}

impl<T> ConfigErrorExt<T> for Result<T, serde_json::Error> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, ConfigError> {
        self.map_err(|source| ConfigError::Value { source, context: Some(context.into()) })
    }
}

impl From<config::ConfigError> for ConfigError {
    #[inline]
    fn from(source: config::ConfigError) -> Self {
        Self::Config { source, context: None }
    }
}

/// A reusable configuration loader that combines file-based settings with environment overrides.
///
/// This function implements a layered configuration strategy:
/// 1. **Base File**: Loads settings from a file (e.g., `knob.toml`). If no path is provided, it defaults to `"knob"`.
/// 2. **Environment Overrides**: Overlays values from environment variables prefixed with `KNOB__`.
///    Nested structures are accessed using double underscores (e.g., `KNOB__LOGGER__LEVEL` maps to `logger.level`).
///
/// # Errors
/// This function will return an error if:
/// * The specified (or default) configuration file cannot be found.
/// * The content of the file does not match the structure of type `T`.
///
/// # Example
/// ```rust
/// use knob_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct ShellConfig {
///     prefix: String,
/// }
///
/// let cfg: ShellConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = effective_path(path);

    let builder = Config::builder().add_source(File::from(effective_path.as_path()).required(true)).add_source(
        Environment::with_prefix(ENV_PREFIX).separator("__").convert_case(config::Case::Snake),
    );

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

/// Loads a flat property map from a file overlaid with `<env_prefix>__` variables.
///
/// Nested tables become dotted keys (`[camel.rest] port = 8080` yields
/// `camel.rest.port`); scalars keep their type, environment values arrive as strings.
/// Empty values are dropped.
///
/// # Errors
/// Returns [`ConfigError::Config`] if the sources cannot be read, and
/// [`ConfigError::Unsupported`] if the file contains arrays.
pub fn load_properties(path: Option<impl AsRef<Path>>, env_prefix: &str) -> Result<Properties, ConfigError> {
    let effective_path = effective_path(path);

    info!("Loading properties from {}", effective_path.display());

    let tree = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(Environment::with_prefix(env_prefix).separator("__"))
        .build()
        .context("Failed to build properties")?
        .try_deserialize::<Value>()
        .context("Failed to read properties")?;

    let mut properties = Properties::new();
    match tree {
        Value::Object(_) => flatten("", tree, &mut properties)?,
        Value::Null => {},
        other => {
            return Err(ConfigError::Unsupported {
                message: format!("expected a table of properties, found {other}").into(),
                context: Some(effective_path.display().to_string().into()),
            });
        },
    }
    Ok(properties)
}

/// Flattens a JSON tree into dotted keys.
///
/// # Errors
/// Returns [`ConfigError::Unsupported`] for arrays.
pub fn flatten(prefix: &str, value: Value, properties: &mut Properties) -> Result<(), ConfigError> {
    match value {
        Value::Null => {},
        Value::Object(entries) => {
            for (key, value) in entries {
                let key = if prefix.is_empty() { key } else { format!("{prefix}.{key}") };
                flatten(&key, value, properties)?;
            }
        },
        Value::Array(_) => {
            return Err(ConfigError::Unsupported {
                message: "lists cannot be bound to a single property".into(),
                context: Some(prefix.to_owned().into()),
            });
        },
        scalar => {
            let value = serde_json::from_value::<PropertyValue>(scalar).context(prefix.to_owned())?;
            properties.insert(prefix.to_owned(), value);
        },
    }
    Ok(())
}

fn effective_path(path: Option<impl AsRef<Path>>) -> PathBuf {
    path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf())
}
