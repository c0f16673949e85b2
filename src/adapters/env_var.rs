// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment variable property source adapter.
//!
//! Variables keep their raw names (`APP_PROFILES_ACTIVE`). Structured lookups map
//! a [`PropertyName`] such as `app.profiles.active` onto those names: elements are
//! joined with `_`, dashes are dropped and the result is upper-cased. Numeric
//! segments (`APP_HOSTS_0`) are treated as indices.

use crate::adapters::name_cache::{EvictionPolicy, NameCache};
use crate::domain::{ConfigValue, Form, PropertyName};
use crate::ports::PropertySource;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::env;

/// Maximum length for environment variable keys
const MAX_ENV_KEY_LEN: usize = 512;

/// Maximum length for environment variable values
const MAX_ENV_VALUE_LEN: usize = 1048576; // 1MB

/// Number of structured name mappings remembered per adapter
const LOOKUP_CACHE_CAPACITY: usize = 256;

/// The conventional name of the process environment source.
pub const SYSTEM_ENVIRONMENT: &str = "systemEnvironment";

#[derive(Debug)]
struct Snapshot {
    keys: Vec<String>,
    values: HashMap<String, String>,
    names: Vec<(PropertyName, String)>,
}

/// Property source adapter for environment variables.
///
/// Variables are read lazily, once, on first access.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::EnvVarAdapter;
/// use layercfg::ports::PropertySource;
/// use layercfg::domain::PropertyName;
///
/// let adapter = EnvVarAdapter::with_values([("APP_PROFILES_ACTIVE", "prod")]);
/// assert_eq!(adapter.get("app.profiles.active").unwrap().as_str(), "prod");
///
/// let name = PropertyName::parse("app.profiles.active").unwrap();
/// assert_eq!(adapter.get_property(&name).unwrap().as_str(), "prod");
/// ```
#[derive(Debug)]
pub struct EnvVarAdapter {
    name: String,
    prefix: Option<String>,
    snapshot: OnceCell<Snapshot>,
    lookups: NameCache<PropertyName, Option<String>>,
}

impl EnvVarAdapter {
    /// Creates an adapter over the whole process environment.
    pub fn new() -> Self {
        Self {
            name: SYSTEM_ENVIRONMENT.to_string(),
            prefix: None,
            snapshot: OnceCell::new(),
            lookups: NameCache::new(LOOKUP_CACHE_CAPACITY, EvictionPolicy::LeastRecentlyUsed),
        }
    }

    /// Creates an adapter that only sees variables starting with `prefix`.
    ///
    /// The prefix is stripped from the variable names.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use layercfg::adapters::EnvVarAdapter;
    ///
    /// let adapter = EnvVarAdapter::with_prefix("MYAPP_");
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::new()
        }
    }

    /// Creates an adapter with fixed values instead of the process environment.
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let adapter = Self::new();
        let pairs = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        // A fresh cell cannot already be set.
        let _ = adapter.snapshot.set(Snapshot::from_pairs(pairs));
        adapter
    }

    /// Overrides the source name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn snapshot(&self) -> &Snapshot {
        self.snapshot.get_or_init(|| {
            let snapshot = Snapshot::from_pairs(self.load());
            tracing::debug!(
                "Loaded {} environment variables (prefix={:?})",
                snapshot.keys.len(),
                self.prefix
            );
            snapshot
        })
    }

    fn load(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, value) in env::vars() {
            if key.len() > MAX_ENV_KEY_LEN || value.len() > MAX_ENV_VALUE_LEN {
                tracing::debug!(
                    "Skipping oversized environment variable: key_len={}, value_len={}",
                    key.len(),
                    value.len()
                );
                continue;
            }
            let key = match &self.prefix {
                Some(prefix) => match key.strip_prefix(prefix.as_str()) {
                    Some(stripped) => stripped.to_string(),
                    None => continue,
                },
                None => key,
            };
            pairs.push((key, value));
        }
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }

    fn resolve_key(&self, key: &str) -> Option<String> {
        let values = &self.snapshot().values;
        let check = |name: &str| -> Option<String> {
            let no_dot = name.replace('.', "_");
            let no_hyphen = name.replace('-', "_");
            let no_dot_no_hyphen = no_dot.replace('-', "_");
            [name.to_string(), no_dot, no_hyphen, no_dot_no_hyphen]
                .into_iter()
                .find(|candidate| values.contains_key(candidate))
        };
        check(key).or_else(|| {
            let upper = key.to_uppercase();
            if upper != key {
                check(&upper)
            } else {
                None
            }
        })
    }

    fn map_name(&self, name: &PropertyName) -> Option<String> {
        let snapshot = self.snapshot();
        let direct = [convert_name(name), convert_legacy_name(name)]
            .into_iter()
            .find(|candidate| snapshot.values.contains_key(candidate));
        direct.or_else(|| {
            snapshot
                .names
                .iter()
                .find(|(candidate, _)| candidate == name)
                .map(|(_, key)| key.clone())
        })
    }
}

impl Snapshot {
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let keys: Vec<String> = pairs.iter().map(|(k, _)| k.clone()).collect();
        let names = keys
            .iter()
            .map(|key| (adapt_variable_name(key), key.clone()))
            .filter(|(name, _)| !name.is_empty())
            .collect();
        Self {
            keys,
            values: pairs.into_iter().collect(),
            names,
        }
    }
}

/// Adapts an environment variable name to a structured name.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::env_var::adapt_variable_name;
/// use layercfg::domain::PropertyName;
///
/// assert_eq!(
///     adapt_variable_name("APP_HOSTS_0_NAME"),
///     PropertyName::parse("app.hosts[0].name").unwrap()
/// );
/// ```
pub fn adapt_variable_name(variable: &str) -> PropertyName {
    PropertyName::adapt_with(variable, '_', |element| {
        let lower = element.to_lowercase();
        if !lower.is_empty() && lower.chars().all(|c| c.is_ascii_digit()) {
            format!("[{}]", lower)
        } else {
            lower
        }
    })
}

fn convert_name(name: &PropertyName) -> String {
    join_elements(name, |element| element.replace('-', "").to_uppercase())
}

fn convert_legacy_name(name: &PropertyName) -> String {
    join_elements(name, |element| element.replace('-', "_").to_uppercase())
}

fn join_elements<F: Fn(&str) -> String>(name: &PropertyName, convert: F) -> String {
    (0..name.number_of_elements())
        .map(|i| convert(&name.element(i, Form::Original)))
        .collect::<Vec<_>>()
        .join("_")
}

impl Default for EnvVarAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertySource for EnvVarAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        let resolved = self.resolve_key(key)?;
        self.snapshot()
            .values
            .get(&resolved)
            .map(|v| ConfigValue::from(v.as_str()))
    }

    fn keys(&self) -> Vec<String> {
        self.snapshot().keys.clone()
    }

    fn property_names(&self) -> Vec<PropertyName> {
        self.snapshot()
            .names
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn get_property(&self, name: &PropertyName) -> Option<ConfigValue> {
        let key = self
            .lookups
            .get_or_insert_with(name, || self.map_name(name))?;
        self.snapshot()
            .values
            .get(&key)
            .map(|v| ConfigValue::from(v.as_str()))
    }

    fn contains_descendant_of(&self, name: &PropertyName) -> bool {
        self.snapshot()
            .names
            .iter()
            .any(|(candidate, _)| name.is_ancestor_of(candidate))
    }
}
