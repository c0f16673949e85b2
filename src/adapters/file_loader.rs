// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loader for file resources produced by the standard location resolver.

use crate::adapters::map_source::MapPropertySource;
use crate::adapters::properties_file::PropertiesParser;
use crate::domain::{ConfigDataOption, ConfigDataOptions, ConfigError, ConfigResource, Result};
use crate::ports::{ConfigData, ConfigDataLoader, ConfigParser, PropertySource};
use std::fs;
use std::sync::Arc;

/// Maximum allowed size for a configuration file (10MB)
const MAX_CONFIG_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Loads file resources with the parser registered for their extension.
///
/// Each non-empty document of a file becomes one property source. Resources
/// resolved for a profile are marked [`ConfigDataOption::ProfileSpecific`].
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::FileConfigDataLoader;
/// use layercfg::domain::ConfigResource;
/// use layercfg::ports::ConfigDataLoader;
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("app.properties");
/// std::fs::write(&path, "app.name=demo\n").unwrap();
///
/// let loader = FileConfigDataLoader::with_default_parsers();
/// let resource = ConfigResource::file(&path, "properties", None, "file:./app.properties");
/// let data = loader.load(&resource).unwrap();
/// assert_eq!(data.len(), 1);
/// ```
#[derive(Clone)]
pub struct FileConfigDataLoader {
    parsers: Vec<Arc<dyn ConfigParser>>,
}

impl FileConfigDataLoader {
    /// Creates a loader using the given parsers, lowest priority first.
    pub fn new(parsers: Vec<Arc<dyn ConfigParser>>) -> Self {
        Self { parsers }
    }

    /// Creates a loader with every parser enabled by the crate features.
    pub fn with_default_parsers() -> Self {
        #[allow(unused_mut)]
        let mut parsers: Vec<Arc<dyn ConfigParser>> = vec![Arc::new(PropertiesParser::new())];
        #[cfg(feature = "yaml")]
        parsers.push(Arc::new(crate::adapters::yaml_file::YamlParser::new()));
        Self::new(parsers)
    }

    /// Adds a parser with a higher priority than the existing ones.
    pub fn with_parser(mut self, parser: Arc<dyn ConfigParser>) -> Self {
        self.parsers.push(parser);
        self
    }

    /// Returns the supported extensions in parser order.
    pub fn extensions(&self) -> Vec<String> {
        self.parsers
            .iter()
            .flat_map(|parser| parser.supported_extensions().iter())
            .map(|extension| extension.to_string())
            .collect()
    }

    fn parser_for(&self, extension: &str) -> Option<&Arc<dyn ConfigParser>> {
        self.parsers.iter().find(|parser| {
            parser
                .supported_extensions()
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(extension))
        })
    }

    fn read(resource: &ConfigResource) -> Result<String> {
        let path = resource.path();
        let metadata = fs::metadata(path).map_err(|e| ConfigError::SourceError {
            source_name: resource.to_string(),
            message: "Failed to read file metadata".to_string(),
            source: Some(Box::new(e)),
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::SourceError {
                source_name: resource.to_string(),
                message: format!(
                    "Configuration file too large: {} bytes (max {} bytes)",
                    metadata.len(),
                    MAX_CONFIG_FILE_SIZE
                ),
                source: None,
            });
        }
        fs::read_to_string(path).map_err(|e| ConfigError::SourceError {
            source_name: resource.to_string(),
            message: "Failed to read configuration file".to_string(),
            source: Some(Box::new(e)),
        })
    }
}

impl std::fmt::Debug for FileConfigDataLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigDataLoader")
            .field("extensions", &self.extensions())
            .finish()
    }
}

impl Default for FileConfigDataLoader {
    fn default() -> Self {
        Self::with_default_parsers()
    }
}

impl ConfigDataLoader for FileConfigDataLoader {
    fn is_loadable(&self, resource: &ConfigResource) -> bool {
        resource.is_empty_directory()
            || resource
                .extension()
                .map_or(false, |extension| self.parser_for(extension).is_some())
    }

    fn load(&self, resource: &ConfigResource) -> Result<ConfigData> {
        if resource.is_empty_directory() {
            return Ok(ConfigData::empty());
        }
        if !resource.exists() {
            return Err(ConfigError::ResourceNotFound {
                resource: resource.to_string(),
                location: None,
            });
        }
        let extension = resource.extension().unwrap_or_default();
        let parser = self.parser_for(extension).ok_or_else(|| ConfigError::UnknownFileExtension {
            location: resource.reference().to_string(),
        })?;
        let content = Self::read(resource)?;
        let documents: Vec<_> = parser
            .parse(&content)
            .map_err(|e| match e {
                ConfigError::ParseError { message, source } => ConfigError::ParseError {
                    message: format!("{} in {}", message, resource),
                    source,
                },
                other => other,
            })?
            .into_iter()
            .filter(|document| !document.is_empty())
            .collect();

        let base_name = format!("Config resource '{}' via location '{}'", resource, resource.location());
        let multiple = documents.len() > 1;
        let sources: Vec<Arc<dyn PropertySource>> = documents
            .into_iter()
            .enumerate()
            .map(|(i, document)| {
                let name = if multiple {
                    format!("{} (document #{})", base_name, i)
                } else {
                    base_name.clone()
                };
                Arc::new(MapPropertySource::new(name, document)) as Arc<dyn PropertySource>
            })
            .collect();
        tracing::debug!("Loaded {} property source(s) from {}", sources.len(), resource);

        let options = if resource.profile().is_some() {
            ConfigDataOptions::of(&[ConfigDataOption::ProfileSpecific])
        } else {
            ConfigDataOptions::NONE
        };
        Ok(ConfigData::new(sources, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> ConfigResource {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        let extension = name.rsplit('.').next().unwrap().to_string();
        ConfigResource::file(path, extension, None, format!("file:./{}", name))
    }

    #[test]
    fn test_load_properties() {
        let dir = TempDir::new().unwrap();
        let resource = write(&dir, "app.properties", "a=1\nb=2\n");
        let data = FileConfigDataLoader::with_default_parsers().load(&resource).unwrap();
        assert_eq!(data.len(), 1);
        let (source, options) = data.get(0).unwrap();
        assert!(options.is_empty());
        assert_eq!(source.get("b").unwrap().as_str(), "2");
        assert!(source.name().starts_with("Config resource 'file ["));
        assert!(!source.name().contains("document #"));
    }

    #[test]
    fn test_source_name_uses_import_location() {
        let dir = TempDir::new().unwrap();
        let resource = write(&dir, "app.properties", "a=1").with_location("optional:file:./");
        let data = FileConfigDataLoader::with_default_parsers().load(&resource).unwrap();
        let (source, _) = data.get(0).unwrap();
        assert!(source.name().ends_with("via location 'optional:file:./'"));
    }

    #[test]
    fn test_multiple_documents_skip_empty() {
        let dir = TempDir::new().unwrap();
        let resource = write(&dir, "app.properties", "a=1\n#---\n#---\nb=2\n");
        let data = FileConfigDataLoader::with_default_parsers().load(&resource).unwrap();
        assert_eq!(data.len(), 2);
        let names: Vec<&str> = data.sources().map(|s| s.name()).collect();
        assert!(names[0].ends_with("(document #0)"));
        assert!(names[1].ends_with("(document #1)"));
    }

    #[test]
    fn test_profile_specific_option() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app-dev.properties");
        fs::write(&path, "a=1").unwrap();
        let resource = ConfigResource::file(path, "properties", Some("dev".into()), "file:./app-dev.properties");
        let data = FileConfigDataLoader::with_default_parsers().load(&resource).unwrap();
        assert!(data.has_option(0, ConfigDataOption::ProfileSpecific));
    }

    #[test]
    fn test_missing_resource() {
        let resource = ConfigResource::file("/does/not/exist.properties", "properties", None, "x");
        let result = FileConfigDataLoader::with_default_parsers().load(&resource);
        assert!(matches!(result, Err(ConfigError::ResourceNotFound { .. })));
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        let resource = ConfigResource::empty_directory(dir.path(), "file:./");
        let loader = FileConfigDataLoader::with_default_parsers();
        assert!(loader.is_loadable(&resource));
        assert!(loader.load(&resource).unwrap().is_empty());
    }

    #[test]
    fn test_is_loadable_by_extension() {
        let loader = FileConfigDataLoader::new(vec![Arc::new(PropertiesParser::new())]);
        assert!(loader.is_loadable(&ConfigResource::file("a.properties", "properties", None, "a")));
        assert!(!loader.is_loadable(&ConfigResource::file("a.yml", "yml", None, "a")));
        assert_eq!(loader.extensions(), ["properties"]);
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_load_yaml_documents() {
        let dir = TempDir::new().unwrap();
        let resource = write(&dir, "app.yml", "a: 1\n---\napp:\n  name: x\n");
        let data = FileConfigDataLoader::with_default_parsers().load(&resource).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.get(1).unwrap().0.get("app.name").unwrap().as_str(), "x");
    }

    #[test]
    fn test_parse_error_names_resource() {
        let dir = TempDir::new().unwrap();
        let resource = write(&dir, "bad.properties", "x=\\u12");
        let result = FileConfigDataLoader::with_default_parsers().load(&resource);
        match result {
            Err(ConfigError::ParseError { message, .. }) => assert!(message.contains("bad.properties")),
            other => panic!("unexpected result: {:?}", other.map(|d| d.len())),
        }
    }
}
