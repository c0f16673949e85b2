// SPDX-License-Identifier: MIT OR Apache-2.0

//! Properties a contributor declares about itself.
//!
//! `<ns>.config.import` lists further locations to import and
//! `<ns>.config.activate.on-profile` restricts the source to matching profiles.
//! This module also holds the checks for legacy and misplaced profile properties.

use crate::domain::{Activation, ActivationContext, ConfigDataLocation, ConfigDataOption, ConfigError, PropertyName, Result};
use crate::service::binder::Binder;
use crate::service::contributor::Contributor;

/// Properties bound from a single contributor.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::MapPropertySource;
/// use layercfg::service::binder::Binder;
/// use layercfg::service::properties::ConfigDataProperties;
/// use std::sync::Arc;
///
/// let source = MapPropertySource::from_pairs("test", [
///     ("app.config.import", "optional:file:./extra.yml"),
///     ("app.config.activate.on-profile", "prod"),
/// ]);
/// let binder = Binder::new(vec![Arc::new(source)]);
/// let properties = ConfigDataProperties::get(&binder, "app").unwrap().unwrap();
/// assert_eq!(properties.imports().len(), 1);
/// assert!(properties.is_profile_dependent());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigDataProperties {
    imports: Vec<ConfigDataLocation>,
    activation: Option<Activation>,
}

impl ConfigDataProperties {
    /// Creates properties from imports and an optional activation condition.
    pub fn new(imports: Vec<ConfigDataLocation>, activation: Option<Activation>) -> Self {
        Self { imports, activation }
    }

    /// Binds the properties, returning `None` if none are declared.
    ///
    /// # Errors
    ///
    /// Fails if binding fails or an on-profile expression is malformed.
    pub fn get(binder: &Binder, namespace: &str) -> Result<Option<Self>> {
        let imports = binder.bind_list(&format!("{}.config.import", namespace))?;
        let on_profile = binder.bind_list(&format!("{}.config.activate.on-profile", namespace))?;
        if imports.is_none() && on_profile.is_none() {
            return Ok(None);
        }
        let imports = ConfigDataLocation::parse_all(imports.unwrap_or_default());
        let activation = match on_profile {
            Some(expressions) if !expressions.is_empty() => Some(Activation::on_profiles(&expressions)?),
            _ => None,
        };
        Ok(Some(Self::new(imports, activation)))
    }

    /// Returns the declared imports.
    pub fn imports(&self) -> &[ConfigDataLocation] {
        &self.imports
    }

    /// Returns a copy without imports.
    pub fn without_imports(&self) -> Self {
        Self {
            imports: Vec::new(),
            activation: self.activation.clone(),
        }
    }

    /// Returns `true` if the activation condition depends on profiles.
    pub fn is_profile_dependent(&self) -> bool {
        self.activation
            .as_ref()
            .map_or(false, Activation::is_profile_dependent)
    }

    /// Returns `true` if there is no activation condition or it matches `context`.
    pub fn is_active(&self, context: Option<&ActivationContext>) -> bool {
        self.activation
            .as_ref()
            .map_or(true, |activation| activation.is_active(context))
    }
}

/// Fails if `<ns>.config.use-legacy-processing` is bound to `true`.
pub fn throw_if_legacy_processing_requested(binder: &Binder, namespace: &str) -> Result<()> {
    let property = format!("{}.config.use-legacy-processing", namespace);
    if binder.bind_bool(&property)? == Some(true) {
        return Err(ConfigError::LegacyProcessingRequested { property });
    }
    Ok(())
}

/// Warns about deprecated profile properties and rejects profile properties in
/// profile-specific imports.
pub fn check_invalid_properties(contributor: &Contributor, namespace: &str) -> Result<()> {
    let Some(source) = contributor.property_source() else {
        return Ok(());
    };
    let resource = contributor.resource().map(|r| r.to_string());
    let replacement = format!("{}.config.activate.on-profile", namespace);
    for deprecated in [format!("{}.profiles", namespace), format!("{}.profiles[0]", namespace)] {
        let name = PropertyName::parse(&deprecated)?;
        if source.get_property(&name).is_some() {
            let warning = ConfigError::InvalidProperty {
                property: deprecated,
                resource: resource.clone(),
                profile_specific: false,
                replacement: Some(replacement.clone()),
            };
            tracing::warn!("{}", warning);
        }
    }
    if contributor.is_from_profile_specific_import()
        && !contributor.has_option(ConfigDataOption::IgnoreProfiles)
    {
        for suffix in ["include", "active", "default"] {
            for index in ["", "[0]"] {
                let property = format!("{}.profiles.{}{}", namespace, suffix, index);
                let name = PropertyName::parse(&property)?;
                if source.get_property(&name).is_some() {
                    return Err(ConfigError::InvalidProperty {
                        property,
                        resource,
                        profile_specific: true,
                        replacement: None,
                    });
                }
            }
        }
    }
    Ok(())
}
