// SPDX-License-Identifier: MIT OR Apache-2.0

//! Binding of structured property names to values, lists and maps.
//!
//! A [`Binder`] looks a [`PropertyName`] up in its sources (highest priority first),
//! substitutes placeholders in the value and then passes the result through its
//! [`BindStage`] pipeline. Each stage sees the name and the value produced by the
//! previous stage and may rewrite the value or fail the bind.

use crate::domain::config_value::split_list;
use crate::domain::{ConfigValue, Form, PropertyName, Result};
use crate::ports::PropertySource;
use crate::service::placeholder::{resolve_placeholders, PlaceholderResolver};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A value produced by a bind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Bound {
    /// A single value
    Value(ConfigValue),
    /// A list, from a comma-delimited value or from indexed elements
    List(Vec<String>),
    /// A map of keys to lists
    Map(BTreeMap<String, Vec<String>>),
}

/// One step of the post-bind pipeline.
pub type BindStage = Arc<dyn Fn(&PropertyName, Bound) -> Result<Bound> + Send + Sync>;

/// Binds properties from an ordered list of sources.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::MapPropertySource;
/// use layercfg::service::binder::Binder;
/// use std::sync::Arc;
///
/// let source = MapPropertySource::from_pairs(
///     "test",
///     [("app.profiles.active", "dev, local"), ("app.profiles.group.prod[0]", "db")],
/// );
/// let binder = Binder::new(vec![Arc::new(source)]);
/// assert_eq!(binder.bind_list("app.profiles.active").unwrap(), Some(vec!["dev".to_string(), "local".to_string()]));
/// assert_eq!(binder.bind_map("app.profiles.group").unwrap()["prod"], ["db"]);
/// ```
#[derive(Clone)]
pub struct Binder {
    sources: Vec<Arc<dyn PropertySource>>,
    placeholders: Option<Arc<dyn PlaceholderResolver>>,
    stages: Vec<BindStage>,
}

impl Binder {
    /// Creates a binder over `sources`, highest priority first.
    pub fn new(sources: Vec<Arc<dyn PropertySource>>) -> Self {
        Self {
            sources,
            placeholders: None,
            stages: Vec::new(),
        }
    }

    /// Resolves `${}` placeholders in bound values with `resolver`.
    pub fn with_placeholders(mut self, resolver: Arc<dyn PlaceholderResolver>) -> Self {
        self.placeholders = Some(resolver);
        self
    }

    /// Appends a stage to the post-bind pipeline.
    pub fn with_stage(mut self, stage: BindStage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Returns the sources this binder reads.
    pub fn sources(&self) -> &[Arc<dyn PropertySource>] {
        &self.sources
    }

    /// Binds a single value.
    ///
    /// # Errors
    ///
    /// Fails if `name` is not a valid property name, if placeholder resolution
    /// fails or if a stage rejects the value.
    pub fn bind(&self, name: &str) -> Result<Option<ConfigValue>> {
        let name = PropertyName::parse(name)?;
        for source in &self.sources {
            if let Some(value) = source.get_property(&name) {
                let value = ConfigValue::new(self.resolve(value.as_str())?);
                return match self.run_stages(&name, Bound::Value(value))? {
                    Bound::Value(value) => Ok(Some(value)),
                    other => Ok(Some(ConfigValue::new(render(&other)))),
                };
            }
        }
        Ok(None)
    }

    /// Binds a boolean value.
    pub fn bind_bool(&self, name: &str) -> Result<Option<bool>> {
        self.bind(name)?.map(|value| value.as_bool(name)).transpose()
    }

    /// Binds a list.
    ///
    /// The first source holding either the name itself (a comma-delimited value)
    /// or indexed elements `name[i]` provides the whole list.
    pub fn bind_list(&self, name: &str) -> Result<Option<Vec<String>>> {
        let name = PropertyName::parse(name)?;
        for source in &self.sources {
            if let Some(list) = self.list_from_source(source.as_ref(), &name)? {
                return match self.run_stages(&name, Bound::List(list))? {
                    Bound::List(list) => Ok(Some(list)),
                    other => Ok(Some(vec![render(&other)])),
                };
            }
        }
        Ok(None)
    }

    /// Binds a map of lists keyed by the element following `name`.
    ///
    /// Keys are merged across sources; the highest priority source defining a key
    /// provides its list.
    pub fn bind_map(&self, name: &str) -> Result<BTreeMap<String, Vec<String>>> {
        let name = PropertyName::parse(name)?;
        let depth = name.number_of_elements();
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for source in &self.sources {
            if !source.contains_descendant_of(&name) {
                continue;
            }
            for candidate in source.property_names() {
                if !name.is_ancestor_of(&candidate) || candidate.is_indexed(depth) {
                    continue;
                }
                let key = candidate.element(depth, Form::Original).into_owned();
                if map.contains_key(&key) {
                    continue;
                }
                let entry = candidate.chop(depth + 1);
                if let Some(list) = self.list_from_source(source.as_ref(), &entry)? {
                    map.insert(key, list);
                }
            }
        }
        if map.is_empty() {
            return Ok(map);
        }
        match self.run_stages(&name, Bound::Map(map))? {
            Bound::Map(map) => Ok(map),
            _ => Ok(BTreeMap::new()),
        }
    }

    fn list_from_source(&self, source: &dyn PropertySource, name: &PropertyName) -> Result<Option<Vec<String>>> {
        if let Some(value) = source.get_property(name) {
            let resolved = self.resolve(value.as_str())?;
            return Ok(Some(split_list(&resolved, ',')));
        }
        let depth = name.number_of_elements();
        let mut indexed: Vec<(u64, PropertyName)> = source
            .property_names()
            .into_iter()
            .filter(|candidate| {
                candidate.number_of_elements() == depth + 1
                    && candidate.is_numeric_index(depth)
                    && name.is_parent_of(candidate)
            })
            .filter_map(|candidate| {
                let index = candidate.element(depth, Form::Original).parse::<u64>().ok()?;
                Some((index, candidate))
            })
            .collect();
        if indexed.is_empty() {
            return Ok(None);
        }
        indexed.sort_by_key(|(index, _)| *index);
        indexed.dedup_by_key(|(index, _)| *index);
        let mut list = Vec::with_capacity(indexed.len());
        for (_, element) in indexed {
            if let Some(value) = source.get_property(&element) {
                let value = ConfigValue::new(self.resolve(value.as_str())?);
                if let Bound::Value(value) = self.run_stages(&element, Bound::Value(value))? {
                    list.push(value.as_str().trim().to_string());
                }
            }
        }
        Ok(Some(list))
    }

    fn resolve(&self, value: &str) -> Result<String> {
        match &self.placeholders {
            Some(resolver) => resolve_placeholders(value, resolver.as_ref()),
            None => Ok(value.to_string()),
        }
    }

    fn run_stages(&self, name: &PropertyName, bound: Bound) -> Result<Bound> {
        self.stages.iter().try_fold(bound, |bound, stage| stage(name, bound))
    }
}

fn render(bound: &Bound) -> String {
    match bound {
        Bound::Value(value) => value.as_str().to_string(),
        Bound::List(list) => list.join(","),
        Bound::Map(map) => map
            .iter()
            .map(|(k, v)| format!("{}={}", k, v.join(",")))
            .collect::<Vec<_>>()
            .join(","),
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("sources", &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("placeholders", &self.placeholders.is_some())
            .field("stages", &self.stages.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MapPropertySource;
    use crate::domain::ConfigError;
    use crate::service::placeholder::SourcesPlaceholderResolver;

    fn source(name: &str, pairs: &[(&str, &str)]) -> Arc<dyn PropertySource> {
        Arc::new(MapPropertySource::from_pairs(name, pairs.iter().copied()))
    }

    #[test]
    fn test_bind_first_source_wins() {
        let binder = Binder::new(vec![source("high", &[("a.b", "1")]), source("low", &[("a.b", "2")])]);
        assert_eq!(binder.bind("a.b").unwrap().unwrap().as_str(), "1");
        assert!(binder.bind("a.c").unwrap().is_none());
    }

    #[test]
    fn test_bind_relaxed_source_key() {
        let binder = Binder::new(vec![source("s", &[("app.config.onNotFound", "ignore")])]);
        assert_eq!(binder.bind("app.config.on-not-found").unwrap().unwrap().as_str(), "ignore");
    }

    #[test]
    fn test_bind_invalid_name() {
        let binder = Binder::new(Vec::new());
        assert!(matches!(binder.bind("App.Name"), Err(ConfigError::InvalidName { .. })));
    }

    #[test]
    fn test_bind_bool() {
        let binder = Binder::new(vec![source("s", &[("flag", "true"), ("bad", "maybe")])]);
        assert_eq!(binder.bind_bool("flag").unwrap(), Some(true));
        assert!(binder.bind_bool("bad").is_err());
        assert_eq!(binder.bind_bool("missing").unwrap(), None);
    }

    #[test]
    fn test_bind_list_indexed_sorted_numerically() {
        let binder = Binder::new(vec![source(
            "s",
            &[("list[10]", "k"), ("list[2]", "c"), ("list[0]", "a")],
        )]);
        assert_eq!(binder.bind_list("list").unwrap().unwrap(), ["a", "c", "k"]);
    }

    #[test]
    fn test_bind_list_does_not_merge_sources() {
        let binder = Binder::new(vec![source("high", &[("list", "a,b")]), source("low", &[("list[0]", "z")])]);
        assert_eq!(binder.bind_list("list").unwrap().unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_bind_with_placeholders() {
        let sources = vec![source("s", &[("a", "${b}-x"), ("b", "y"), ("list", "${b},z")])];
        let binder = Binder::new(sources.clone())
            .with_placeholders(Arc::new(SourcesPlaceholderResolver::new(sources)));
        assert_eq!(binder.bind("a").unwrap().unwrap().as_str(), "y-x");
        assert_eq!(binder.bind_list("list").unwrap().unwrap(), ["y", "z"]);
    }

    #[test]
    fn test_bind_map_merges_keys() {
        let binder = Binder::new(vec![
            source("high", &[("g.prod", "db,cache")]),
            source("low", &[("g.prod[0]", "other"), ("g.dev[0]", "h2"), ("g.dev[1]", "mock")]),
        ]);
        let map = binder.bind_map("g").unwrap();
        assert_eq!(map["prod"], ["db", "cache"]);
        assert_eq!(map["dev"], ["h2", "mock"]);
    }

    #[derive(Debug)]
    struct OpaqueSource;

    impl PropertySource for OpaqueSource {
        fn name(&self) -> &str {
            "opaque"
        }

        fn get(&self, key: &str) -> Option<ConfigValue> {
            (key == "g.hidden").then(|| ConfigValue::new("x"))
        }

        fn keys(&self) -> Vec<String> {
            vec!["g.hidden".to_string()]
        }

        fn contains_descendant_of(&self, _name: &PropertyName) -> bool {
            false
        }
    }

    #[test]
    fn test_bind_map_skips_sources_without_descendants() {
        let binder = Binder::new(vec![Arc::new(OpaqueSource), source("s", &[("g.dev", "h2")])]);
        let map = binder.bind_map("g").unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), ["dev"]);
    }

    #[test]
    fn test_stage_can_rewrite_and_fail() {
        let upper: BindStage = Arc::new(|_: &PropertyName, bound: Bound| match bound {
            Bound::Value(value) => Ok(Bound::Value(ConfigValue::new(value.as_str().to_uppercase()))),
            other => Ok(other),
        });
        let deny: BindStage = Arc::new(|name: &PropertyName, bound: Bound| {
            if name.as_str() == "secret" {
                Err(ConfigError::InvalidProperty {
                    property: name.to_string(),
                    resource: None,
                    profile_specific: false,
                    replacement: None,
                })
            } else {
                Ok(bound)
            }
        });
        let binder = Binder::new(vec![source("s", &[("a", "x"), ("secret", "y")])])
            .with_stage(upper)
            .with_stage(deny);
        assert_eq!(binder.bind("a").unwrap().unwrap().as_str(), "X");
        assert!(matches!(binder.bind("secret"), Err(ConfigError::InvalidProperty { .. })));
    }
}
