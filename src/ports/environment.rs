// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment and update listener trait definitions.
//!
//! The environment is the host-side container the engine reads existing property
//! sources from and writes the resolved sources and profiles back into.

use crate::domain::{ConfigDataLocation, ConfigResource, ConfigValue, Profiles};
use crate::ports::source::PropertySource;
use std::sync::Arc;

/// A mutable, ordered collection of property sources plus profile lists.
///
/// Sources are ordered highest priority first.
pub trait Environment {
    /// Returns the property sources, highest priority first.
    fn property_sources(&self) -> Vec<Arc<dyn PropertySource>>;

    /// Appends a source with the lowest priority.
    fn add_last(&mut self, source: Arc<dyn PropertySource>);

    /// Removes the source called `name`, returning it.
    fn remove(&mut self, name: &str) -> Option<Arc<dyn PropertySource>>;

    /// Returns the programmatically set active profiles.
    fn active_profiles(&self) -> Vec<String>;

    /// Returns the programmatically set default profiles.
    fn default_profiles(&self) -> Vec<String>;

    /// Replaces the active profiles.
    fn set_active_profiles(&mut self, profiles: &[String]);

    /// Replaces the default profiles.
    fn set_default_profiles(&mut self, profiles: &[String]);

    /// Looks up a raw key in priority order.
    fn get_property(&self, key: &str) -> Option<ConfigValue> {
        self.property_sources()
            .iter()
            .find_map(|source| source.get(key))
    }

    /// Moves the source called `name` to the end, if present.
    fn move_to_end(&mut self, name: &str) {
        if let Some(source) = self.remove(name) {
            self.add_last(source);
        }
    }
}

/// Receives notifications while the engine applies its results.
///
/// Both methods default to doing nothing.
pub trait EnvironmentUpdateListener {
    /// Called for every imported property source added to the environment.
    fn on_property_source_added(
        &self,
        source: &Arc<dyn PropertySource>,
        location: Option<&ConfigDataLocation>,
        resource: Option<&ConfigResource>,
    ) {
        let _ = (source, location, resource);
    }

    /// Called once the resolved profiles have been applied.
    fn on_set_profiles(&self, profiles: &Profiles) {
        let _ = profiles;
    }
}
