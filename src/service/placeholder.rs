// SPDX-License-Identifier: MIT OR Apache-2.0

//! `${name}` placeholder substitution.
//!
//! A placeholder may carry a default after a colon (`${name:fallback}`) and may
//! nest (`${outer.${inner}}`). Placeholders that cannot be resolved are left in
//! the value verbatim.

use crate::domain::{ActivationContext, ConfigError, Result};
use crate::ports::PropertySource;
use crate::service::contributor::{Contributor, ContributorKind};
use std::collections::HashSet;
use std::sync::Arc;

const PREFIX: &str = "${";
const SUFFIX: &str = "}";
const SIMPLE_PREFIX: &str = "{";
const VALUE_SEPARATOR: char = ':';

/// Looks up the value of a single placeholder name.
pub trait PlaceholderResolver: Send + Sync {
    /// Resolves `placeholder` (the text between `${` and `}`).
    ///
    /// Returns `Ok(None)` when nothing provides a value.
    fn resolve_placeholder(&self, placeholder: &str) -> Result<Option<String>>;
}

/// Replaces every resolvable placeholder in `value`.
///
/// # Errors
///
/// Fails on circular references and on errors raised by the resolver.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::MapPropertySource;
/// use layercfg::service::placeholder::{resolve_placeholders, SourcesPlaceholderResolver};
/// use std::sync::Arc;
///
/// let source = MapPropertySource::from_pairs("test", [("host", "localhost"), ("port", "8080")]);
/// let resolver = SourcesPlaceholderResolver::new(vec![Arc::new(source)]);
/// let value = resolve_placeholders("http://${host}:${port}/${path:index}", &resolver).unwrap();
/// assert_eq!(value, "http://localhost:8080/index");
/// ```
pub fn resolve_placeholders(value: &str, resolver: &dyn PlaceholderResolver) -> Result<String> {
    let mut visited = HashSet::new();
    parse_string_value(value, resolver, &mut visited)
}

fn parse_string_value(
    value: &str,
    resolver: &dyn PlaceholderResolver,
    visited: &mut HashSet<String>,
) -> Result<String> {
    let Some(mut start) = value.find(PREFIX) else {
        return Ok(value.to_string());
    };
    let mut result = value.to_string();
    loop {
        let Some(end) = find_placeholder_end(&result, start) else {
            break;
        };
        let original = result[start + PREFIX.len()..end].to_string();
        if !visited.insert(original.clone()) {
            return Err(ConfigError::ParseError {
                message: format!("Circular placeholder reference '{}' in property definitions", original),
                source: None,
            });
        }
        let placeholder = parse_string_value(&original, resolver, visited)?;
        let mut resolved = resolver.resolve_placeholder(&placeholder)?;
        if resolved.is_none() {
            if let Some((actual, default)) = placeholder.split_once(VALUE_SEPARATOR) {
                resolved = match resolver.resolve_placeholder(actual)? {
                    Some(value) => Some(value),
                    None => Some(default.to_string()),
                };
            }
        }
        let next = match resolved {
            Some(resolved) => {
                let resolved = parse_string_value(&resolved, resolver, visited)?;
                result.replace_range(start..end + SUFFIX.len(), &resolved);
                find_from(&result, start + resolved.len())
            }
            None => find_from(&result, end + SUFFIX.len()),
        };
        visited.remove(&original);
        match next {
            Some(index) => start = index,
            None => break,
        }
    }
    Ok(result)
}

fn find_from(value: &str, from: usize) -> Option<usize> {
    value.get(from..)?.find(PREFIX).map(|i| i + from)
}

fn find_placeholder_end(value: &str, start: usize) -> Option<usize> {
    let bytes = value.as_bytes();
    let mut index = start + PREFIX.len();
    let mut nested = 0;
    while index < bytes.len() {
        if value[index..].starts_with(SUFFIX) {
            if nested > 0 {
                nested -= 1;
                index += SUFFIX.len();
            } else {
                return Some(index);
            }
        } else if value[index..].starts_with(SIMPLE_PREFIX) {
            nested += 1;
            index += SIMPLE_PREFIX.len();
        } else {
            index += 1;
        }
    }
    None
}

/// Resolves placeholders against a list of property sources, first match wins.
#[derive(Debug, Clone)]
pub struct SourcesPlaceholderResolver {
    sources: Vec<Arc<dyn PropertySource>>,
}

impl SourcesPlaceholderResolver {
    /// Creates a resolver over `sources`, highest priority first.
    pub fn new(sources: Vec<Arc<dyn PropertySource>>) -> Self {
        Self { sources }
    }
}

impl PlaceholderResolver for SourcesPlaceholderResolver {
    fn resolve_placeholder(&self, placeholder: &str) -> Result<Option<String>> {
        Ok(self
            .sources
            .iter()
            .find_map(|source| source.get(placeholder))
            .map(|value| value.as_str().to_string()))
    }
}

/// Resolves placeholders against the sources of a contributor tree.
///
/// Values held by inactive contributors are skipped, or rejected with
/// [`ConfigError::InactiveSourceAccess`] in strict mode. The contributor currently
/// being activated always counts as active.
///
/// With [`with_unbound_lookahead`](Self::with_unbound_lookahead), other unbound
/// contributors are bound on the fly to find out whether they are active.
#[derive(Debug, Clone)]
pub struct ContributorPlaceholderResolver {
    root: Arc<Contributor>,
    context: Option<ActivationContext>,
    active: Option<Arc<Contributor>>,
    fail_on_inactive: bool,
    namespace: Option<String>,
}

impl ContributorPlaceholderResolver {
    /// Creates a resolver over the tree rooted at `root`.
    pub fn new(
        root: Arc<Contributor>,
        context: Option<ActivationContext>,
        active: Option<Arc<Contributor>>,
        fail_on_inactive: bool,
    ) -> Self {
        Self {
            root,
            context,
            active,
            fail_on_inactive,
            namespace: None,
        }
    }

    /// Binds unbound contributors under `namespace` when checking whether they are active.
    pub fn with_unbound_lookahead(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    fn is_active(&self, contributor: &Arc<Contributor>) -> Result<bool> {
        if let Some(active) = &self.active {
            if Arc::ptr_eq(active, contributor) {
                return Ok(true);
            }
        }
        let context = self.context.as_ref();
        match &self.namespace {
            Some(namespace) if contributor.kind() == ContributorKind::UnboundImport => {
                let bound = contributor.bind_properties(&self.root, context, namespace, false)?;
                Ok(bound.is_active(context))
            }
            _ => Ok(contributor.is_active(context)),
        }
    }
}

impl PlaceholderResolver for ContributorPlaceholderResolver {
    fn resolve_placeholder(&self, placeholder: &str) -> Result<Option<String>> {
        let mut result = None;
        for contributor in self.root.iter() {
            let Some(source) = contributor.property_source() else {
                continue;
            };
            let Some(value) = source.get(placeholder) else {
                continue;
            };
            if !self.is_active(&contributor)? {
                if self.fail_on_inactive {
                    return Err(ConfigError::InactiveSourceAccess {
                        property: placeholder.to_string(),
                        source_name: source.name().to_string(),
                        resource: contributor.resource().map(|r| r.to_string()),
                    });
                }
                continue;
            }
            if result.is_none() {
                result = Some(value.as_str().to_string());
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MapPropertySource;

    fn resolver(pairs: &[(&str, &str)]) -> SourcesPlaceholderResolver {
        let source = MapPropertySource::from_pairs("test", pairs.iter().copied());
        SourcesPlaceholderResolver::new(vec![Arc::new(source)])
    }

    #[test]
    fn test_no_placeholders() {
        assert_eq!(resolve_placeholders("plain", &resolver(&[])).unwrap(), "plain");
    }

    #[test]
    fn test_simple_and_default() {
        let r = resolver(&[("a", "1")]);
        assert_eq!(resolve_placeholders("${a}-${b:2}", &r).unwrap(), "1-2");
        assert_eq!(resolve_placeholders("${b:}", &r).unwrap(), "");
    }

    #[test]
    fn test_unresolvable_left_verbatim() {
        let r = resolver(&[("a", "1")]);
        assert_eq!(resolve_placeholders("${missing} ${a}", &r).unwrap(), "${missing} 1");
    }

    #[test]
    fn test_nested_name() {
        let r = resolver(&[("env", "prod"), ("url.prod", "db-prod")]);
        assert_eq!(resolve_placeholders("${url.${env}}", &r).unwrap(), "db-prod");
    }

    #[test]
    fn test_resolved_value_is_resolved_again() {
        let r = resolver(&[("a", "${b}"), ("b", "done")]);
        assert_eq!(resolve_placeholders("${a}", &r).unwrap(), "done");
    }

    #[test]
    fn test_nested_default() {
        let r = resolver(&[("fallback", "f")]);
        assert_eq!(resolve_placeholders("${x:${fallback}}", &r).unwrap(), "f");
    }

    #[test]
    fn test_braces_inside_placeholder() {
        let r = resolver(&[]);
        assert_eq!(resolve_placeholders("${x:{a}}", &r).unwrap(), "{a}");
    }

    #[test]
    fn test_backslash_is_not_special() {
        let r = resolver(&[("a", "1")]);
        assert_eq!(resolve_placeholders("\\${a}", &r).unwrap(), "\\1");
    }

    #[test]
    fn test_circular_reference() {
        let r = resolver(&[("a", "${b}"), ("b", "${a}")]);
        let result = resolve_placeholders("${a}", &r);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_unterminated_placeholder() {
        let r = resolver(&[("a", "1")]);
        assert_eq!(resolve_placeholders("${a", &r).unwrap(), "${a");
    }
}
