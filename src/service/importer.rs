// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolving import locations and loading the resulting resources.

use crate::domain::{ConfigDataLocation, ConfigError, ConfigResource, Profiles, ResolutionResult, Result};
use crate::ports::{ConfigData, ConfigDataLoader, LocationResolver, ResolverContext};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

/// What to do when a location or resource is not found.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NotFoundAction {
    /// Propagate the error.
    #[default]
    Fail,
    /// Log the error and continue.
    Ignore,
}

impl FromStr for NotFoundAction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(NotFoundAction::Fail),
            "ignore" => Ok(NotFoundAction::Ignore),
            other => Err(ConfigError::TypeConversionError {
                key: "on-not-found".to_string(),
                target_type: "NotFoundAction".to_string(),
                source: format!("unknown value '{}', expected 'fail' or 'ignore'", other).into(),
            }),
        }
    }
}

/// Applies `action` to a not-found `error`.
///
/// # Examples
///
/// ```rust
/// use layercfg::domain::ConfigError;
/// use layercfg::service::importer::{handle_not_found, NotFoundAction};
///
/// let missing = || ConfigError::LocationNotFound { location: "file:./missing/".to_string() };
/// assert!(handle_not_found(NotFoundAction::Ignore, missing()).is_ok());
/// assert!(handle_not_found(NotFoundAction::Fail, missing()).is_err());
/// ```
pub fn handle_not_found(action: NotFoundAction, error: ConfigError) -> Result<()> {
    match action {
        NotFoundAction::Fail => Err(error),
        NotFoundAction::Ignore => {
            tracing::debug!("Ignoring missing config data {}", error);
            Ok(())
        }
    }
}

/// The registered location resolvers, tried in order.
#[derive(Clone, Default)]
pub struct LocationResolvers {
    resolvers: Vec<Arc<dyn LocationResolver>>,
}

impl LocationResolvers {
    /// Creates the registry.
    pub fn new(resolvers: Vec<Arc<dyn LocationResolver>>) -> Self {
        Self { resolvers }
    }

    /// Resolves `location` with the first resolver that claims it.
    ///
    /// With `profiles`, profile-specific resources follow the plain ones.
    pub fn resolve(
        &self,
        context: &ResolverContext<'_>,
        location: &ConfigDataLocation,
        profiles: Option<&Profiles>,
    ) -> Result<Vec<ResolutionResult>> {
        let resolver = self
            .resolvers
            .iter()
            .find(|resolver| resolver.is_resolvable(context, location))
            .ok_or_else(|| ConfigError::UnsupportedLocation {
                location: location.to_string(),
            })?;
        let mut resolved: Vec<ResolutionResult> = resolver
            .resolve(context, location)?
            .into_iter()
            .map(|resource| ResolutionResult::new(location.clone(), resource, false))
            .collect();
        if let Some(profiles) = profiles {
            resolved.extend(
                resolver
                    .resolve_profile_specific(context, location, profiles)?
                    .into_iter()
                    .map(|resource| ResolutionResult::new(location.clone(), resource, true)),
            );
        }
        Ok(resolved)
    }
}

/// The registered loaders, tried in order.
#[derive(Clone, Default)]
pub struct ConfigDataLoaders {
    loaders: Vec<Arc<dyn ConfigDataLoader>>,
}

impl ConfigDataLoaders {
    /// Creates the registry.
    pub fn new(loaders: Vec<Arc<dyn ConfigDataLoader>>) -> Self {
        Self { loaders }
    }

    /// Loads `resource` with the first loader that accepts it.
    pub fn load(&self, resource: &ConfigResource) -> Result<ConfigData> {
        let loader = self
            .loaders
            .iter()
            .find(|loader| loader.is_loadable(resource))
            .ok_or_else(|| ConfigError::SourceError {
                source_name: resource.to_string(),
                message: "No loader found for resource".to_string(),
                source: None,
            })?;
        loader.load(resource)
    }
}

/// Resolves and loads imports, remembering what was loaded across passes.
pub struct Importer {
    resolvers: LocationResolvers,
    loaders: ConfigDataLoaders,
    not_found_action: NotFoundAction,
    loaded: HashSet<ConfigResource>,
    loaded_locations: HashSet<ConfigDataLocation>,
    optional_locations: HashSet<ConfigDataLocation>,
}

impl Importer {
    /// Creates an importer.
    pub fn new(not_found_action: NotFoundAction, resolvers: LocationResolvers, loaders: ConfigDataLoaders) -> Self {
        Self {
            resolvers,
            loaders,
            not_found_action,
            loaded: HashSet::new(),
            loaded_locations: HashSet::new(),
            optional_locations: HashSet::new(),
        }
    }

    /// Resolves `locations` and loads every resource not loaded before.
    ///
    /// Results are returned highest priority first.
    pub fn resolve_and_load(
        &mut self,
        profiles: Option<&Profiles>,
        context: &ResolverContext<'_>,
        locations: &[ConfigDataLocation],
    ) -> Result<Vec<(ResolutionResult, ConfigData)>> {
        let mut resolved = Vec::new();
        for location in locations {
            match self.resolvers.resolve(context, location, profiles) {
                Ok(results) => resolved.extend(results),
                Err(error) if error.is_not_found() => self.handle(error, location, None)?,
                Err(error) => return Err(error),
            }
        }
        self.load(resolved)
    }

    fn load(&mut self, candidates: Vec<ResolutionResult>) -> Result<Vec<(ResolutionResult, ConfigData)>> {
        let mut result = Vec::new();
        for candidate in candidates.into_iter().rev() {
            if candidate.resource.is_optional() {
                self.optional_locations.insert(candidate.location.clone());
            }
            if self.loaded.contains(&candidate.resource) {
                tracing::trace!("Skipping already loaded {}", candidate.resource);
                self.loaded_locations.insert(candidate.location.clone());
                continue;
            }
            match self.loaders.load(&candidate.resource) {
                Ok(data) => {
                    self.loaded.insert(candidate.resource.clone());
                    self.loaded_locations.insert(candidate.location.clone());
                    result.push((candidate, data));
                }
                Err(error) if error.is_not_found() => {
                    self.handle(error, &candidate.location, Some(&candidate.resource))?
                }
                Err(error) => return Err(error),
            }
        }
        Ok(result)
    }

    fn handle(&self, error: ConfigError, location: &ConfigDataLocation, resource: Option<&ConfigResource>) -> Result<()> {
        let error = error.with_location(&location.to_string());
        let action = if location.is_optional() || resource.map_or(false, ConfigResource::is_optional) {
            NotFoundAction::Ignore
        } else {
            self.not_found_action
        };
        handle_not_found(action, error)
    }

    /// Returns the action applied to mandatory locations.
    pub fn not_found_action(&self) -> NotFoundAction {
        self.not_found_action
    }

    /// Returns every location that produced a loaded (or already loaded) resource.
    pub fn loaded_locations(&self) -> &HashSet<ConfigDataLocation> {
        &self.loaded_locations
    }

    /// Returns every location that resolved to an optional resource.
    pub fn optional_locations(&self) -> &HashSet<ConfigDataLocation> {
        &self.optional_locations
    }
}
