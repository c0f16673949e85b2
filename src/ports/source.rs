// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property source trait definition.
//!
//! A property source is an immutable, named set of key/value pairs: one document
//! of a loaded file, the process environment, the command line or an in-memory
//! map. The engine looks values up either by their raw key or by a structured
//! [`PropertyName`].

use crate::domain::{ConfigValue, PropertyName};
use std::fmt;

/// A named set of properties.
///
/// Implementations must be `Send + Sync` so sources can be shared between the
/// contributor tree and the environment through `Arc`.
///
/// Only [`PropertySource::name`], [`PropertySource::get`] and
/// [`PropertySource::keys`] are required. The structured lookups have default
/// implementations that adapt every raw key with `.` as the separator.
///
/// # Examples
///
/// ```rust
/// use layercfg::ports::PropertySource;
/// use layercfg::domain::{ConfigValue, PropertyName};
///
/// #[derive(Debug)]
/// struct Fixed;
///
/// impl PropertySource for Fixed {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     fn get(&self, key: &str) -> Option<ConfigValue> {
///         (key == "server.maxConnections").then(|| ConfigValue::from("10"))
///     }
///
///     fn keys(&self) -> Vec<String> {
///         vec!["server.maxConnections".to_string()]
///     }
/// }
///
/// let name = PropertyName::parse("server.max-connections").unwrap();
/// assert_eq!(Fixed.get_property(&name).unwrap().as_str(), "10");
/// ```
pub trait PropertySource: Send + Sync + fmt::Debug {
    /// Returns the name of this source, used in logs and error messages.
    fn name(&self) -> &str;

    /// Looks up a value by its raw key.
    fn get(&self, key: &str) -> Option<ConfigValue>;

    /// Returns every raw key, in declaration order where the source has one.
    fn keys(&self) -> Vec<String>;

    /// Returns every key adapted to a [`PropertyName`].
    ///
    /// Keys that adapt to the empty name are dropped.
    fn property_names(&self) -> Vec<PropertyName> {
        self.keys()
            .iter()
            .map(|key| PropertyName::adapt(key, '.'))
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Looks up a value by structured name.
    ///
    /// The rendered name is tried as a raw key first, then every key whose adapted
    /// form equals `name`.
    fn get_property(&self, name: &PropertyName) -> Option<ConfigValue> {
        if let Some(value) = self.get(name.as_str()) {
            return Some(value);
        }
        self.keys()
            .into_iter()
            .find(|key| PropertyName::adapt(key, '.') == *name)
            .and_then(|key| self.get(&key))
    }

    /// Returns `true` if the source holds any property below `name`.
    fn contains_descendant_of(&self, name: &PropertyName) -> bool {
        self.property_names()
            .iter()
            .any(|candidate| name.is_ancestor_of(candidate))
    }
}
