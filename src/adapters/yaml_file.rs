// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML configuration file parser.

use crate::domain::{ConfigError, Result};
use crate::ports::{ConfigParser, Document};
use serde::Deserialize;
use serde_yaml::Value;

/// Parser for YAML configuration files.
///
/// Nested mappings are flattened using dot notation and sequences using bracketed
/// indices. Every `---` separated document becomes its own [`Document`].
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::YamlParser;
/// use layercfg::ports::ConfigParser;
///
/// let yaml = "app:\n  name: demo\n  hosts: [a, b]\n---\napp:\n  name: other\n";
/// let documents = YamlParser::new().parse(yaml).unwrap();
/// assert_eq!(documents.len(), 2);
/// assert!(documents[0].contains(&("app.hosts[1]".to_string(), "b".to_string())));
/// ```
#[derive(Debug, Clone, Default)]
pub struct YamlParser;

impl YamlParser {
    /// Creates a new YAML parser.
    pub fn new() -> Self {
        YamlParser
    }

    fn flatten(value: &Value, prefix: &str, result: &mut Document) {
        match value {
            Value::Mapping(map) => {
                if map.is_empty() && !prefix.is_empty() {
                    result.push((prefix.to_string(), String::new()));
                }
                for (key, val) in map {
                    let Some(key) = scalar_to_string(key) else {
                        continue;
                    };
                    let path = if prefix.is_empty() {
                        key
                    } else if key.starts_with('[') {
                        format!("{}{}", prefix, key)
                    } else {
                        format!("{}.{}", prefix, key)
                    };
                    Self::flatten(val, &path, result);
                }
            }
            Value::Sequence(seq) => {
                if seq.is_empty() {
                    result.push((prefix.to_string(), String::new()));
                }
                for (i, val) in seq.iter().enumerate() {
                    Self::flatten(val, &format!("{}[{}]", prefix, i), result);
                }
            }
            Value::Tagged(tagged) => Self::flatten(&tagged.value, prefix, result),
            scalar => {
                if let Some(text) = scalar_to_string(scalar) {
                    result.push((prefix.to_string(), text));
                }
            }
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

impl ConfigParser for YamlParser {
    fn parse(&self, content: &str) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        for document in serde_yaml::Deserializer::from_str(content) {
            let value = Value::deserialize(document).map_err(|e| ConfigError::ParseError {
                message: format!("Failed to parse YAML: {}", e),
                source: Some(Box::new(e)),
            })?;
            let mut flat = Document::new();
            if !value.is_null() {
                Self::flatten(&value, "", &mut flat);
            }
            documents.push(flat);
        }
        Ok(documents)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yml", "yaml"]
    }
}
