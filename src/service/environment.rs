// SPDX-License-Identifier: MIT OR Apache-2.0

//! An in-memory [`Environment`].

use crate::domain::config_value::split_list;
use crate::domain::profiles::RESERVED_DEFAULT_PROFILE;
use crate::ports::{Environment, PropertySource};
use std::fmt;
use std::sync::Arc;

/// A plain ordered list of property sources plus profile lists.
///
/// When no active profiles were set programmatically, `<ns>.profiles.active` is
/// read from the sources; default profiles fall back to `<ns>.profiles.default`
/// in the same way.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::MapPropertySource;
/// use layercfg::ports::Environment;
/// use layercfg::service::StandardEnvironment;
/// use std::sync::Arc;
///
/// let env = StandardEnvironment::new()
///     .with_source(Arc::new(MapPropertySource::from_pairs("args", [("app.profiles.active", "dev, local")])));
/// assert_eq!(env.active_profiles(), ["dev", "local"]);
/// assert_eq!(env.default_profiles(), ["default"]);
/// ```
#[derive(Clone)]
pub struct StandardEnvironment {
    namespace: String,
    sources: Vec<Arc<dyn PropertySource>>,
    active_profiles: Vec<String>,
    default_profiles: Vec<String>,
}

impl StandardEnvironment {
    /// Creates an empty environment for the `app` namespace.
    pub fn new() -> Self {
        Self {
            namespace: "app".to_string(),
            sources: Vec::new(),
            active_profiles: Vec::new(),
            default_profiles: vec![RESERVED_DEFAULT_PROFILE.to_string()],
        }
    }

    /// Creates an environment holding command-line arguments and then system
    /// environment variables, as enabled by the crate features.
    pub fn system() -> Self {
        #[allow(unused_mut)]
        let mut env = Self::new();
        #[cfg(feature = "cli")]
        {
            env = env.with_source(Arc::new(crate::adapters::CommandLineAdapter::from_env_args()));
        }
        #[cfg(feature = "env")]
        {
            env = env.with_source(Arc::new(crate::adapters::EnvVarAdapter::new()));
        }
        env
    }

    /// Sets the namespace used for the profile property fallback.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Appends a source with the lowest priority.
    pub fn with_source(mut self, source: Arc<dyn PropertySource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Sets the active profiles.
    pub fn with_active_profiles<S: AsRef<str>>(mut self, profiles: &[S]) -> Self {
        self.active_profiles = profiles.iter().map(|p| p.as_ref().to_string()).collect();
        self
    }

    /// Sets the default profiles.
    pub fn with_default_profiles<S: AsRef<str>>(mut self, profiles: &[S]) -> Self {
        self.default_profiles = profiles.iter().map(|p| p.as_ref().to_string()).collect();
        self
    }

    /// Inserts a source with the highest priority.
    pub fn add_first(&mut self, source: Arc<dyn PropertySource>) {
        self.remove(source.name());
        self.sources.insert(0, source);
    }

    /// Returns the source called `name`.
    pub fn source(&self, name: &str) -> Option<&Arc<dyn PropertySource>> {
        self.sources.iter().find(|source| source.name() == name)
    }

    /// Returns the source names, highest priority first.
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|source| source.name().to_string()).collect()
    }

    fn profiles_property(&self, suffix: &str) -> Option<Vec<String>> {
        let value = self.get_property(&format!("{}.profiles.{}", self.namespace, suffix))?;
        let profiles = split_list(value.as_str(), ',');
        (!profiles.is_empty()).then_some(profiles)
    }
}

impl Default for StandardEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for StandardEnvironment {
    fn property_sources(&self) -> Vec<Arc<dyn PropertySource>> {
        self.sources.clone()
    }

    fn add_last(&mut self, source: Arc<dyn PropertySource>) {
        self.remove(source.name());
        self.sources.push(source);
    }

    fn remove(&mut self, name: &str) -> Option<Arc<dyn PropertySource>> {
        let position = self.sources.iter().position(|source| source.name() == name)?;
        Some(self.sources.remove(position))
    }

    fn active_profiles(&self) -> Vec<String> {
        if self.active_profiles.is_empty() {
            if let Some(profiles) = self.profiles_property("active") {
                return profiles;
            }
        }
        self.active_profiles.clone()
    }

    fn default_profiles(&self) -> Vec<String> {
        if self.default_profiles == [RESERVED_DEFAULT_PROFILE] {
            if let Some(profiles) = self.profiles_property("default") {
                return profiles;
            }
        }
        self.default_profiles.clone()
    }

    fn set_active_profiles(&mut self, profiles: &[String]) {
        tracing::debug!("Activating profiles [{}]", profiles.join(", "));
        self.active_profiles = profiles.to_vec();
    }

    fn set_default_profiles(&mut self, profiles: &[String]) {
        self.default_profiles = profiles.to_vec();
    }
}

impl fmt::Debug for StandardEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardEnvironment")
            .field("namespace", &self.namespace)
            .field("sources", &self.source_names())
            .field("active_profiles", &self.active_profiles)
            .field("default_profiles", &self.default_profiles)
            .finish()
    }
}
