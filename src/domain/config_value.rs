// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw property values and their typed conversions.
//!
//! Every property source hands out [`ConfigValue`]s. The engine reads a handful of
//! them as booleans, enums or comma-delimited lists; everything else is left to
//! application code through [`ConfigValue::parse`].

use crate::domain::errors::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A property value as stored in a property source.
///
/// # Examples
///
/// ```
/// use layercfg::domain::config_value::ConfigValue;
///
/// let value = ConfigValue::from("dev, local ,,prod");
/// assert_eq!(value.as_list(), vec!["dev", "local", "prod"]);
/// assert_eq!(ConfigValue::from("8080").as_u64("server.port").unwrap(), 8080);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigValue(String);

impl ConfigValue {
    /// Creates a new `ConfigValue`.
    pub fn new(value: impl Into<String>) -> Self {
        ConfigValue(value.into())
    }

    /// Returns the value as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the value is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Splits a comma-delimited value into trimmed, non-empty items.
    ///
    /// # Examples
    ///
    /// ```
    /// use layercfg::domain::config_value::ConfigValue;
    ///
    /// assert!(ConfigValue::from("  ").as_list().is_empty());
    /// assert_eq!(ConfigValue::from("a").as_list(), vec!["a"]);
    /// ```
    pub fn as_list(&self) -> Vec<String> {
        split_list(&self.0, ',')
    }

    /// Converts the value to a boolean.
    ///
    /// Recognizes `true`/`yes`/`on`/`1` and `false`/`no`/`off`/`0`, ignoring case.
    pub fn as_bool(&self, key: &str) -> Result<bool> {
        match self.0.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(true),
            "false" | "no" | "0" | "off" => Ok(false),
            other => other
                .parse::<bool>()
                .map_err(|e| ConfigError::from_parse_bool_error(key.to_string(), e)),
        }
    }

    /// Converts the value to an `i64`.
    pub fn as_i64(&self, key: &str) -> Result<i64> {
        self.0
            .trim()
            .parse::<i64>()
            .map_err(|e| ConfigError::from_parse_int_error(key.to_string(), e))
    }

    /// Converts the value to a `u64`.
    pub fn as_u64(&self, key: &str) -> Result<u64> {
        self.0
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::from_parse_int_error(key.to_string(), e))
    }

    /// Parses the value into any type that implements `FromStr`.
    ///
    /// # Examples
    ///
    /// ```
    /// use layercfg::domain::config_value::ConfigValue;
    /// use std::net::IpAddr;
    ///
    /// let value = ConfigValue::from("127.0.0.1");
    /// let ip: IpAddr = value.parse("server.address").unwrap();
    /// assert_eq!(ip.to_string(), "127.0.0.1");
    /// ```
    pub fn parse<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.0
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::TypeConversionError {
                key: key.to_string(),
                target_type: std::any::type_name::<T>().to_string(),
                source: Box::new(e),
            })
    }
}

/// Splits `value` on `delimiter`, trimming items and dropping empty ones.
pub fn split_list(value: &str, delimiter: char) -> Vec<String> {
    value
        .split(delimiter)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue(s)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue(s.to_string())
    }
}

impl From<ConfigValue> for String {
    fn from(value: ConfigValue) -> Self {
        value.0
    }
}

impl AsRef<str> for ConfigValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
