//! Facade crate for knob endpoints and shared modules.
//! Re-exports domain/kernel primitives and dispatches endpoint URIs to the endpoint of
//! their scheme. Keep this crate thin: it composes other crates, it does not declare options.
//!
//! ## Usage
//! - [`configure`] an endpoint from its URI, [`options`] to list what a scheme accepts.
//! - [`sanitize`] a URI before logging it.
//! - With the `rest` feature, [`load_rest`] binds the REST DSL configuration from a file.

mod error;
mod schemes;

pub use crate::error::{KnobError, KnobErrorExt};
pub use crate::schemes::{ConfiguredEndpoint, SCHEMES, configure, options, sanitize};
pub use knob_domain as domain;
pub use knob_kernel as kernel;

/// Feature registry for runtime introspection.
pub mod features {
    pub use knob_dns as dns;
    pub use knob_glance as glance;
    #[cfg(feature = "rest")]
    pub use knob_rest as rest;

    /// Build-time enabled features.
    pub const ENABLED: &[&str] = &[
        "glance",
        "dns",
        #[cfg(feature = "rest")]
        "rest",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Loads a properties file, overlaid with `KNOB__*` environment variables, and binds the
/// REST DSL configuration from it.
///
/// # Errors
/// Returns [`KnobError::Config`] if the file cannot be read and [`KnobError::Rest`] if the
/// REST properties cannot be bound.
#[cfg(feature = "rest")]
pub fn load_rest(
    path: &std::path::Path,
    binder: kernel::PropertyBinder,
) -> Result<(features::rest::RestConfiguration, kernel::BindReport), KnobError> {
    let properties = kernel::config::load_properties(Some(path), kernel::config::ENV_PREFIX)
        .context(path.display().to_string())?;

    tracing::debug!(count = properties.len(), path = %path.display(), "Properties loaded");

    Ok(features::rest::RestConfiguration::from_properties(properties, &kernel::NoReferences, binder)?)
}
