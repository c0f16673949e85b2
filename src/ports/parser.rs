// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration parser trait definition.
//!
//! This module defines the `ConfigParser` trait, which turns the content of a
//! configuration file into one or more flat documents.

use crate::domain::Result;

/// One flat document: ordered `(key, value)` pairs.
pub type Document = Vec<(String, String)>;

/// A trait for parsing configuration files.
///
/// Parsers flatten nested structures using dot notation and sequences using
/// bracketed indices. A YAML structure like:
///
/// ```yaml
/// database:
///   hosts:
///     - alpha
///     - beta
/// ```
///
/// is parsed into `database.hosts[0] -> "alpha"` and `database.hosts[1] -> "beta"`.
///
/// Formats that support several documents per file return one [`Document`] per
/// document, in file order. Empty documents are returned as empty vectors so
/// document numbering stays stable.
///
/// # Examples
///
/// ```rust
/// use layercfg::ports::{ConfigParser, Document};
/// use layercfg::domain::Result;
///
/// struct LineParser;
///
/// impl ConfigParser for LineParser {
///     fn parse(&self, content: &str) -> Result<Vec<Document>> {
///         let document = content
///             .lines()
///             .filter_map(|line| line.split_once(' '))
///             .map(|(k, v)| (k.to_string(), v.to_string()))
///             .collect();
///         Ok(vec![document])
///     }
///
///     fn supported_extensions(&self) -> &[&str] {
///         &["lines"]
///     }
/// }
///
/// let documents = LineParser.parse("app.name demo").unwrap();
/// assert_eq!(documents[0][0].1, "demo");
/// ```
pub trait ConfigParser: Send + Sync {
    /// Parses configuration content into flat documents.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ConfigError::ParseError`] if the content is malformed.
    fn parse(&self, content: &str) -> Result<Vec<Document>>;

    /// Returns the file extensions (without the leading dot) this parser handles.
    ///
    /// Later extensions take priority over earlier ones when a directory is searched.
    fn supported_extensions(&self) -> &[&str];
}
