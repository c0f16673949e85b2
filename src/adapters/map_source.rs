// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory property source adapter.
//!
//! Loaded documents, command-line arguments and programmatic defaults all end up
//! as a [`MapPropertySource`].

use crate::domain::{ConfigValue, PropertyName};
use crate::ports::PropertySource;
use once_cell::sync::OnceCell;
use std::collections::HashMap;

/// The conventional name of the lowest priority source holding programmatic defaults.
pub const DEFAULT_PROPERTIES: &str = "defaultProperties";

/// An ordered, immutable map of properties.
///
/// Later entries with the same key replace earlier ones but keep the original
/// position. Structured lookups adapt every key once and memoize the result.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::MapPropertySource;
/// use layercfg::ports::PropertySource;
/// use layercfg::domain::PropertyName;
///
/// let source = MapPropertySource::from_pairs("inline", [("app.Max_Size", "10")]);
/// let name = PropertyName::parse("app.max-size").unwrap();
/// assert_eq!(source.get_property(&name).unwrap().as_str(), "10");
/// ```
#[derive(Debug)]
pub struct MapPropertySource {
    name: String,
    entries: Vec<(String, ConfigValue)>,
    index: HashMap<String, usize>,
    names: OnceCell<Vec<(PropertyName, usize)>>,
}

impl MapPropertySource {
    /// Creates a source from ordered entries.
    pub fn new(name: impl Into<String>, entries: Vec<(String, String)>) -> Self {
        let mut ordered: Vec<(String, ConfigValue)> = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());
        for (key, value) in entries {
            match index.get(&key) {
                Some(&position) => ordered[position] = (key, ConfigValue::from(value)),
                None => {
                    index.insert(key.clone(), ordered.len());
                    ordered.push((key, ConfigValue::from(value)));
                }
            }
        }
        Self {
            name: name.into(),
            entries: ordered,
            index,
            names: OnceCell::new(),
        }
    }

    /// Creates a source from `(key, value)` pairs.
    pub fn from_pairs<I, K, V>(name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            name,
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn adapted_names(&self) -> &[(PropertyName, usize)] {
        self.names.get_or_init(|| {
            self.entries
                .iter()
                .enumerate()
                .map(|(i, (key, _))| (PropertyName::adapt(key, '.'), i))
                .filter(|(name, _)| !name.is_empty())
                .collect()
        })
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.index
            .get(key)
            .map(|&position| self.entries[position].1.clone())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }

    fn property_names(&self) -> Vec<PropertyName> {
        self.adapted_names()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn get_property(&self, name: &PropertyName) -> Option<ConfigValue> {
        if let Some(value) = self.get(name.as_str()) {
            return Some(value);
        }
        self.adapted_names()
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|&(_, position)| self.entries[position].1.clone())
    }

    fn contains_descendant_of(&self, name: &PropertyName) -> bool {
        self.adapted_names()
            .iter()
            .any(|(candidate, _)| name.is_ancestor_of(candidate))
    }
}
