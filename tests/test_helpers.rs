// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities and mock implementations for testing.
//!
//! This module provides helper functions and mock implementations
//! that can be used across different test files.

#![allow(dead_code)]

use layercfg::domain::{ConfigDataLocation, ConfigResource, ConfigValue, Profiles};
use layercfg::ports::{EnvironmentUpdateListener, PropertySource};
use std::collections::BTreeMap;
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// A mock property source for testing.
///
/// Keys are kept sorted so that `keys()` is deterministic.
#[derive(Debug, Clone, Default)]
pub struct MockPropertySource {
    name: String,
    values: BTreeMap<String, String>,
}

impl MockPropertySource {
    /// Creates a new, empty mock source.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    /// Adds a value to the mock source.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Removes a value from the mock source.
    pub fn remove_value(&mut self, key: &str) {
        self.values.remove(key);
    }
}

impl PropertySource for MockPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.values.get(key).map(|v| ConfigValue::from(v.as_str()))
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

/// Creates a temporary directory holding `files`, given as relative path and content.
///
/// Parent directories are created as needed.
pub fn create_config_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, content) in files {
        let path = dir.path().join(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    dir
}

/// Creates a mock source standing in for command-line arguments.
pub fn create_args_source(pairs: &[(&str, &str)]) -> Arc<dyn PropertySource> {
    let source = pairs
        .iter()
        .fold(MockPropertySource::new("args"), |source, (k, v)| source.with_value(*k, *v));
    Arc::new(source)
}

/// An update listener that records what it is told.
#[derive(Debug, Default)]
pub struct RecordingListener {
    added: Mutex<Vec<(String, Option<String>)>>,
    profiles: Mutex<Option<Vec<String>>>,
}

impl RecordingListener {
    /// Returns the names of the added sources, in order.
    pub fn added(&self) -> Vec<String> {
        self.added.lock().unwrap().iter().map(|(name, _)| name.clone()).collect()
    }

    /// Returns the location strings the added sources were imported from.
    pub fn locations(&self) -> Vec<Option<String>> {
        self.added.lock().unwrap().iter().map(|(_, l)| l.clone()).collect()
    }

    /// Returns the active profiles reported to the listener.
    pub fn active_profiles(&self) -> Option<Vec<String>> {
        self.profiles.lock().unwrap().clone()
    }
}

impl EnvironmentUpdateListener for RecordingListener {
    fn on_property_source_added(
        &self,
        source: &Arc<dyn PropertySource>,
        location: Option<&ConfigDataLocation>,
        _resource: Option<&ConfigResource>,
    ) {
        self.added
            .lock()
            .unwrap()
            .push((source.name().to_string(), location.map(|l| l.to_string())));
    }

    fn on_set_profiles(&self, profiles: &Profiles) {
        *self.profiles.lock().unwrap() = Some(profiles.active().to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layercfg::domain::PropertyName;

    #[test]
    fn test_mock_source_basic() {
        let source = MockPropertySource::new("test").with_value("key", "value");

        assert_eq!(source.name(), "test");
        assert_eq!(source.get("key").unwrap().as_str(), "value");
        assert!(source.get("missing").is_none());
    }

    #[test]
    fn test_mock_source_relaxed_lookup() {
        let source = MockPropertySource::new("test").with_value("server.max-threads", "8");

        let name = PropertyName::parse("server.maxthreads").unwrap();
        assert_eq!(source.get_property(&name).unwrap().as_str(), "8");
        assert!(source.contains_descendant_of(&PropertyName::parse("server").unwrap()));
    }

    #[test]
    fn test_mock_source_keys_sorted() {
        let mut source = MockPropertySource::new("test")
            .with_value("b", "2")
            .with_value("a", "1")
            .with_value("c", "3");
        source.remove_value("c");

        assert_eq!(source.keys(), ["a", "b"]);
    }

    #[test]
    fn test_create_config_tree() {
        let dir = create_config_tree(&[("app.properties", "a=1"), ("config/nested/app.yml", "a: 2")]);

        assert!(dir.path().join("app.properties").is_file());
        assert!(dir.path().join("config/nested/app.yml").is_file());
    }

    #[test]
    fn test_recording_listener() {
        let listener = RecordingListener::default();
        let source = create_args_source(&[("k", "v")]);
        let location = ConfigDataLocation::parse("optional:file:./").unwrap();
        listener.on_property_source_added(&source, Some(&location), None);

        assert_eq!(listener.added(), ["args"]);
        assert_eq!(listener.locations(), [Some("optional:file:./".to_string())]);
        assert!(listener.active_profiles().is_none());
    }
}
