use crate::configuration::RestConfiguration;
use knob_kernel::coerce;
use knob_kernel::prelude::*;
use knob_kernel::{PropertyMeta, ReferenceResolver};
use std::collections::BTreeMap;
use tracing::trace;

/// The map-valued options of [`RestConfiguration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MapKind {
    Component,
    Endpoint,
    Consumer,
    DataFormat,
    Api,
    CorsHeaders,
    ValidationLevels,
}

impl MapKind {
    const ALL: [Self; 7] = [
        Self::Component,
        Self::Endpoint,
        Self::Consumer,
        Self::DataFormat,
        Self::Api,
        Self::CorsHeaders,
        Self::ValidationLevels,
    ];

    const fn name(self) -> &'static str {
        match self {
            Self::Component => "componentProperties",
            Self::Endpoint => "endpointProperties",
            Self::Consumer => "consumerProperties",
            Self::DataFormat => "dataFormatProperties",
            Self::Api => "apiProperties",
            Self::CorsHeaders => "corsHeaders",
            Self::ValidationLevels => "validationLevels",
        }
    }

    const fn description(self) -> &'static str {
        match self {
            Self::Component => "Additional properties of the consumer component.",
            Self::Endpoint => "Additional properties of the consumer endpoints.",
            Self::Consumer => "Additional properties of the consumers.",
            Self::DataFormat => "Additional properties of the binding data formats.",
            Self::Api => "Additional properties of the API documentation.",
            Self::CorsHeaders => "CORS headers added to responses.",
            Self::ValidationLevels => "Validation levels per validation error kind.",
        }
    }

    const fn map(self, target: &RestConfiguration) -> &BTreeMap<String, String> {
        match self {
            Self::Component => &target.component_properties,
            Self::Endpoint => &target.endpoint_properties,
            Self::Consumer => &target.consumer_properties,
            Self::DataFormat => &target.data_format_properties,
            Self::Api => &target.api_properties,
            Self::CorsHeaders => &target.cors_headers,
            Self::ValidationLevels => &target.validation_levels,
        }
    }

    const fn map_mut(self, target: &mut RestConfiguration) -> &mut BTreeMap<String, String> {
        match self {
            Self::Component => &mut target.component_properties,
            Self::Endpoint => &mut target.endpoint_properties,
            Self::Consumer => &mut target.consumer_properties,
            Self::DataFormat => &mut target.data_format_properties,
            Self::Api => &mut target.api_properties,
            Self::CorsHeaders => &mut target.cors_headers,
            Self::ValidationLevels => &mut target.validation_levels,
        }
    }

    fn info(self) -> OptionInfo {
        OptionInfo {
            name: self.name(),
            ty: PropertyType::String,
            meta: PropertyMeta {
                description: self.description(),
                group: Some("consumer"),
                ..PropertyMeta::default()
            },
        }
    }

    /// Splits `corsHeaders.Origin` or `corsHeaders[Origin]` into the map and its key.
    fn split(name: &str, ignore_case: bool) -> Option<(Self, &str)> {
        Self::ALL.into_iter().find_map(|kind| {
            let prefix = kind.name();
            let head = name.get(..prefix.len())?;
            let matches = if ignore_case { head.eq_ignore_ascii_case(prefix) } else { head == prefix };
            if !matches {
                return None;
            }
            let rest = &name[prefix.len()..];
            let key = rest
                .strip_prefix('.')
                .or_else(|| rest.strip_prefix('[').and_then(|r| r.strip_suffix(']')))?;
            (!key.is_empty()).then_some((kind, key))
        })
    }
}

/// Configurer of the map-valued REST options.
///
/// Entries are addressed as `corsHeaders.Access-Control-Allow-Origin=*` or
/// `corsHeaders[Access-Control-Allow-Origin]=*`; the key keeps its spelling and every
/// value is stored as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapOptions;

impl MapOptions {
    /// Every map entry of `target` as `corsHeaders.Origin`-style name and value.
    #[must_use]
    pub fn entries(target: &RestConfiguration) -> Vec<(String, String)> {
        MapKind::ALL
            .into_iter()
            .flat_map(|kind| kind.map(target).iter().map(move |(k, v)| (format!("{}.{k}", kind.name()), v.clone())))
            .collect()
    }
}

impl PropertyConfigurer<RestConfiguration> for MapOptions {
    fn configure(
        &self,
        resolver: &dyn ReferenceResolver,
        target: &mut RestConfiguration,
        name: &str,
        value: PropertyValue,
        ignore_case: bool,
    ) -> Result<bool, ConfigureError> {
        let Some((kind, key)) = MapKind::split(name, ignore_case) else {
            return Ok(false);
        };

        let text = match coerce(name, &PropertyType::String, value, resolver)? {
            PropertyValue::String(text) => text,
            other => other.to_string(),
        };
        trace!(map = kind.name(), key, "Map entry configured");
        kind.map_mut(target).insert(key.to_owned(), text);
        Ok(true)
    }

    fn option_info(&self, name: &str, ignore_case: bool) -> Option<OptionInfo> {
        MapKind::split(name, ignore_case).map(|(kind, _)| kind.info())
    }

    fn option_value(
        &self,
        target: &RestConfiguration,
        name: &str,
        ignore_case: bool,
    ) -> Option<PropertyValue> {
        let (kind, key) = MapKind::split(name, ignore_case)?;
        kind.map(target).get(key).cloned().map(PropertyValue::String)
    }

    fn options(&self) -> Vec<OptionInfo> {
        MapKind::ALL.into_iter().map(MapKind::info).collect()
    }
}
