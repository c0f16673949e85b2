// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config data locations.
//!
//! A location is a user supplied string such as `optional:file:./config/` that a
//! location resolver turns into zero or more loadable resources.

use crate::domain::config_value::split_list;
use std::fmt;

/// Prefix that marks a location as optional.
pub const OPTIONAL_PREFIX: &str = "optional:";

/// A configuration location, possibly marked optional.
///
/// Optional locations never produce not-found errors.
///
/// # Examples
///
/// ```
/// use layercfg::domain::location::ConfigDataLocation;
///
/// let location = ConfigDataLocation::parse("optional:file:./;file:./config/").unwrap();
/// assert!(location.is_optional());
///
/// let split = location.split();
/// assert_eq!(split.len(), 2);
/// assert!(split[0].is_optional());
/// assert_eq!(split[1].to_string(), "file:./config/");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConfigDataLocation {
    value: String,
    optional: bool,
}

impl ConfigDataLocation {
    /// Parses a location, returning `None` for blank input.
    pub fn parse(location: &str) -> Option<Self> {
        let location = location.trim();
        if location.is_empty() {
            return None;
        }
        let (optional, value) = match location.strip_prefix(OPTIONAL_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, location),
        };
        Some(Self {
            value: value.to_string(),
            optional,
        })
    }

    /// Parses every item of a list, skipping blanks.
    pub fn parse_all<I, S>(locations: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        locations
            .into_iter()
            .filter_map(|location| Self::parse(location.as_ref()))
            .collect()
    }

    /// Returns `true` if the location was marked with `optional:`.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns the location without the `optional:` prefix.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns `true` if the value starts with `prefix`.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.value.starts_with(prefix)
    }

    /// Returns the value with `prefix` removed, or the whole value if it is absent.
    pub fn non_prefixed_value(&self, prefix: &str) -> &str {
        self.value.strip_prefix(prefix).unwrap_or(&self.value)
    }

    /// Splits a `;` delimited location into its parts.
    ///
    /// The rendered location is split, so the `optional:` prefix of this location
    /// applies to the first part only and every later part carries its own.
    pub fn split(&self) -> Vec<Self> {
        self.split_on(';')
    }

    /// Splits the location on an arbitrary delimiter.
    pub fn split_on(&self, delimiter: char) -> Vec<Self> {
        Self::parse_all(split_list(&self.to_string(), delimiter))
    }
}

impl fmt::Display for ConfigDataLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            f.write_str(OPTIONAL_PREFIX)?;
        }
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blank() {
        assert!(ConfigDataLocation::parse("").is_none());
        assert!(ConfigDataLocation::parse("   ").is_none());
    }

    #[test]
    fn test_parse_mandatory() {
        let location = ConfigDataLocation::parse("file:./app.yml").unwrap();
        assert!(!location.is_optional());
        assert_eq!(location.value(), "file:./app.yml");
        assert_eq!(location.to_string(), "file:./app.yml");
    }

    #[test]
    fn test_parse_optional() {
        let location = ConfigDataLocation::parse("optional:classpath:/").unwrap();
        assert!(location.is_optional());
        assert_eq!(location.value(), "classpath:/");
        assert_eq!(location.to_string(), "optional:classpath:/");
    }

    #[test]
    fn test_prefix_helpers() {
        let location = ConfigDataLocation::parse("classpath:/config/").unwrap();
        assert!(location.has_prefix("classpath:"));
        assert_eq!(location.non_prefixed_value("classpath:"), "/config/");
        assert_eq!(location.non_prefixed_value("file:"), "classpath:/config/");
    }

    #[test]
    fn test_split_parses_each_part() {
        let location = ConfigDataLocation::parse("optional:a/;b/; ;optional:c/").unwrap();
        let parts = location.split();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].is_optional());
        assert!(!parts[1].is_optional());
        assert!(parts[2].is_optional());
        assert_eq!(parts[2].value(), "c/");
    }

    #[test]
    fn test_parse_all_skips_blank() {
        let parsed = ConfigDataLocation::parse_all(["a", "", "optional:b"]);
        assert_eq!(parsed.len(), 2);
        assert!(parsed[1].is_optional());
    }
}
