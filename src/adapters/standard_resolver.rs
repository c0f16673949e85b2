// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem location resolver.
//!
//! Resolves `classpath:`, `file:` and plain path locations. Directory locations
//! (ending in `/`) are searched for `<name>[-<profile>].<ext>` for every config
//! name and parser extension. File locations need a known extension or an
//! extension hint such as `./app.conf[.yml]`. A directory ending in `*/` stands for
//! each of its immediate sub-directories.

use crate::domain::{ConfigDataLocation, ConfigError, ConfigResource, Profiles, Result};
use crate::ports::{LocationResolver, ResolverContext};
use directories::ProjectDirs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Prefix for locations relative to the resource root.
pub const CLASSPATH_PREFIX: &str = "classpath:";
/// Prefix for locations relative to the base directory.
pub const FILE_PREFIX: &str = "file:";
/// Prefix stripped before resolution.
pub const RESOURCE_PREFIX: &str = "resource:";
/// The config name used when none is configured.
pub const DEFAULT_CONFIG_NAME: &str = "app";

#[derive(Clone, Debug)]
struct Reference {
    location: ConfigDataLocation,
    directory: Option<String>,
    root: String,
    profile: Option<String>,
    extension: Option<String>,
    parser_extension: String,
}

impl Reference {
    fn resource_location(&self) -> String {
        let mut result = self.root.clone();
        if let Some(profile) = &self.profile {
            result.push('-');
            result.push_str(profile);
        }
        if let Some(extension) = &self.extension {
            result.push('.');
            result.push_str(extension);
        }
        result
    }

    fn is_skippable(&self) -> bool {
        self.location.is_optional() || self.directory.is_some() || self.profile.is_some()
    }
}

/// The standard, filesystem backed [`LocationResolver`].
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::StandardLocationResolver;
/// use layercfg::domain::ConfigDataLocation;
/// use layercfg::ports::{LocationResolver, ResolverContext};
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("app.yml"), "a: 1").unwrap();
///
/// let resolver = StandardLocationResolver::new(vec!["app".into()], vec!["yml".into()])
///     .unwrap()
///     .with_base_dir(dir.path());
/// let location = ConfigDataLocation::parse("file:./").unwrap();
/// let resources = resolver.resolve(&ResolverContext::new(), &location).unwrap();
/// assert_eq!(resources.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct StandardLocationResolver {
    config_names: Vec<String>,
    extensions: Vec<String>,
    resource_root: PathBuf,
    base_dir: PathBuf,
}

impl StandardLocationResolver {
    /// Creates a resolver for the given config names and parser extensions.
    ///
    /// Extensions are listed lowest priority first.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfigName`] if a name contains `*`.
    pub fn new(config_names: Vec<String>, extensions: Vec<String>) -> Result<Self> {
        let config_names = if config_names.is_empty() {
            vec![DEFAULT_CONFIG_NAME.to_string()]
        } else {
            config_names
        };
        if let Some(name) = config_names.iter().find(|name| name.contains('*')) {
            return Err(ConfigError::InvalidConfigName { name: name.clone() });
        }
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Ok(Self {
            config_names,
            extensions,
            resource_root: cwd.clone(),
            base_dir: cwd,
        })
    }

    /// Sets the directory `classpath:` locations are resolved against.
    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_root = root.into();
        self
    }

    /// Sets the directory relative `file:` and plain locations are resolved against.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Uses the platform configuration directory of an application as resource root.
    ///
    /// The root is left unchanged if no home directory can be determined.
    pub fn with_project_dirs(self, qualifier: &str, organization: &str, application: &str) -> Self {
        match ProjectDirs::from(qualifier, organization, application) {
            Some(dirs) => self.with_resource_root(dirs.config_dir()),
            None => {
                tracing::debug!(
                    "No project directories for {}.{}.{}, keeping resource root {}",
                    qualifier,
                    organization,
                    application,
                    self.resource_root.display()
                );
                self
            }
        }
    }

    /// Returns the config names searched in directories.
    pub fn config_names(&self) -> &[String] {
        &self.config_names
    }

    fn resource_location(&self, context: &ResolverContext<'_>, location: &ConfigDataLocation) -> String {
        let value = location.non_prefixed_value(RESOURCE_PREFIX);
        if value.starts_with('/') || has_url_prefix(value) {
            return value.to_string();
        }
        match context.parent() {
            Some(parent) => {
                let parent_location = parent.reference();
                let directory = match parent_location.rfind('/') {
                    Some(index) => &parent_location[..=index],
                    None => "",
                };
                format!("{}{}", directory, value)
            }
            None => value.to_string(),
        }
    }

    fn references(
        &self,
        location: &ConfigDataLocation,
        resource_location: &str,
        profile: Option<&str>,
    ) -> Result<Vec<Reference>> {
        if is_directory(resource_location) {
            Ok(self.references_for_directory(location, resource_location, profile))
        } else {
            self.references_for_file(location, resource_location, profile)
                .map(|reference| vec![reference])
        }
    }

    fn references_for_directory(
        &self,
        location: &ConfigDataLocation,
        directory: &str,
        profile: Option<&str>,
    ) -> Vec<Reference> {
        let mut references = Vec::new();
        for name in &self.config_names {
            let mut for_name: Vec<Reference> = Vec::new();
            for extension in &self.extensions {
                let reference = Reference {
                    location: location.clone(),
                    directory: Some(directory.to_string()),
                    root: format!("{}{}", directory, name),
                    profile: profile.map(str::to_string),
                    extension: Some(extension.clone()),
                    parser_extension: extension.clone(),
                };
                let key = reference.resource_location();
                if !for_name.iter().any(|r| r.resource_location() == key) {
                    for_name.insert(0, reference);
                }
            }
            references.extend(for_name);
        }
        references
    }

    fn references_for_file(
        &self,
        location: &ConfigDataLocation,
        file: &str,
        profile: Option<&str>,
    ) -> Result<Reference> {
        let (file, hinted) = match split_extension_hint(file) {
            Some((base, hint)) => (format!("{}{}", base, hint), true),
            None => (file.to_string(), false),
        };
        let lower = file.to_lowercase();
        for extension in &self.extensions {
            if lower.ends_with(&format!(".{}", extension.to_lowercase())) {
                let root = file[..file.len() - extension.len() - 1].to_string();
                return Ok(Reference {
                    location: location.clone(),
                    directory: None,
                    root,
                    profile: profile.map(str::to_string),
                    extension: (!hinted).then(|| extension.clone()),
                    parser_extension: extension.clone(),
                });
            }
        }
        Err(ConfigError::UnknownFileExtension {
            location: location.to_string(),
        })
    }

    fn to_path(&self, resource_location: &str) -> PathBuf {
        if let Some(rest) = resource_location.strip_prefix(CLASSPATH_PREFIX) {
            return self.resource_root.join(rest.trim_start_matches('/'));
        }
        let rest = resource_location
            .strip_prefix(FILE_PREFIX)
            .unwrap_or(resource_location);
        let path = Path::new(rest);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn resolve_references(&self, references: &[Reference]) -> Result<Vec<ConfigResource>> {
        let mut resolved = Vec::new();
        for reference in references {
            resolved.extend(self.resolve_reference(reference)?);
        }
        if resolved.is_empty() {
            for reference in references.iter().filter(|r| r.directory.is_some()) {
                for resource in self.resolve_empty_directories(reference)? {
                    if !resolved.contains(&resource) {
                        resolved.push(resource);
                    }
                }
            }
        }
        Ok(resolved)
    }

    fn resolve_reference(&self, reference: &Reference) -> Result<Vec<ConfigResource>> {
        let resource_location = reference.resource_location();
        let paths = if is_pattern(&resource_location) {
            self.pattern_paths(&resource_location, false)?
        } else {
            vec![self.to_path(&resource_location)]
        };
        let mut resolved = Vec::new();
        for path in paths {
            let resource = ConfigResource::file(
                path,
                reference.parser_extension.clone(),
                reference.profile.clone(),
                resource_location.clone(),
            )
            .with_location(reference.location.to_string());
            if !resource.exists() && reference.is_skippable() {
                tracing::trace!("Skipping missing resource {}", resource_location);
                continue;
            }
            resolved.push(resource);
        }
        Ok(resolved)
    }

    fn resolve_empty_directories(&self, reference: &Reference) -> Result<Vec<ConfigResource>> {
        let Some(directory) = reference.directory.as_deref() else {
            return Ok(Vec::new());
        };
        if !is_pattern(directory) {
            let path = self.to_path(directory);
            if directory.starts_with(CLASSPATH_PREFIX) || !path.is_dir() {
                return Ok(Vec::new());
            }
            return Ok(vec![ConfigResource::empty_directory(path, directory).with_location(reference.location.to_string())]);
        }
        let subdirectories = self.pattern_paths(directory, true)?;
        if subdirectories.is_empty() && !reference.location.is_optional() {
            return Err(ConfigError::LocationNotFound {
                location: reference.location.to_string(),
            });
        }
        Ok(subdirectories
            .into_iter()
            .filter(|path| path.is_dir())
            .map(|path| ConfigResource::empty_directory(path, directory).with_location(reference.location.to_string()))
            .collect())
    }

    /// Expands a `dir/*/file` or `dir/*/` pattern.
    fn pattern_paths(&self, pattern: &str, directories_only: bool) -> Result<Vec<PathBuf>> {
        if pattern.starts_with(CLASSPATH_PREFIX) {
            return Err(invalid_pattern(pattern, "classpath wildcard patterns cannot be used as a search location"));
        }
        if pattern.matches('*').count() != 1 {
            return Err(invalid_pattern(pattern, "search location cannot contain multiple wildcards"));
        }
        let Some(star) = pattern.find("*/") else {
            return Err(invalid_pattern(pattern, "search location must end with '*/'"));
        };
        let parent = &pattern[..star];
        let file_name = &pattern[star + 2..];
        if file_name.contains('/') || (directories_only && !file_name.is_empty()) {
            return Err(invalid_pattern(pattern, "search location must end with '*/'"));
        }
        let parent_path = self.to_path(parent);
        let mut subdirectories: Vec<PathBuf> = match std::fs::read_dir(&parent_path) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.is_dir())
                .filter(|path| {
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .map_or(false, |n| !n.starts_with(".."))
                })
                .collect(),
            Err(_) => Vec::new(),
        };
        subdirectories.sort();
        Ok(subdirectories
            .into_iter()
            .map(|dir| if file_name.is_empty() { dir } else { dir.join(file_name) })
            .collect())
    }
}

fn invalid_pattern(pattern: &str, message: &str) -> ConfigError {
    ConfigError::SourceError {
        source_name: "location-resolver".to_string(),
        message: format!("Invalid search location '{}': {}", pattern, message),
        source: None,
    }
}

fn is_directory(resource_location: &str) -> bool {
    resource_location.ends_with('/') || resource_location.ends_with(MAIN_SEPARATOR)
}

fn is_pattern(resource_location: &str) -> bool {
    resource_location.contains('*')
}

/// Matches a leading `scheme:` made of a letter followed by letters, digits or `*`.
fn has_url_prefix(value: &str) -> bool {
    let Some(colon) = value.find(':') else {
        return false;
    };
    let scheme = &value[..colon];
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '*')
}

fn url_scheme(value: &str) -> Option<&str> {
    if has_url_prefix(value) {
        value.find(':').map(|colon| &value[..=colon])
    } else {
        None
    }
}

/// Splits `path[.ext]` into `("path", ".ext")`.
fn split_extension_hint(file: &str) -> Option<(&str, &str)> {
    let body = file.strip_suffix(']')?;
    let open = body.rfind('[')?;
    let hint = &body[open + 1..];
    let word = hint.strip_prefix('.')?;
    if word.is_empty() || !word.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some((&body[..open], hint))
}

impl LocationResolver for StandardLocationResolver {
    fn is_resolvable(&self, _context: &ResolverContext<'_>, location: &ConfigDataLocation) -> bool {
        let value = location.non_prefixed_value(RESOURCE_PREFIX);
        match url_scheme(value) {
            None => true,
            Some(scheme) if scheme == CLASSPATH_PREFIX || scheme == FILE_PREFIX => true,
            // Windows drive letters
            Some(scheme) => scheme.len() == 2,
        }
    }

    fn resolve(
        &self,
        context: &ResolverContext<'_>,
        location: &ConfigDataLocation,
    ) -> Result<Vec<ConfigResource>> {
        let mut references: Vec<Reference> = Vec::new();
        for part in location.split() {
            let resource_location = self.resource_location(context, &part);
            for reference in self.references(&part, &resource_location, None)? {
                push_unique(&mut references, reference);
            }
        }
        self.resolve_references(&references)
    }

    fn resolve_profile_specific(
        &self,
        context: &ResolverContext<'_>,
        location: &ConfigDataLocation,
        profiles: &Profiles,
    ) -> Result<Vec<ConfigResource>> {
        let parts = location.split();
        let mut references: Vec<Reference> = Vec::new();
        for profile in profiles.accepted() {
            for part in &parts {
                let resource_location = self.resource_location(context, part);
                for reference in self.references(part, &resource_location, Some(profile))? {
                    push_unique(&mut references, reference);
                }
            }
        }
        self.resolve_references(&references)
    }
}

fn push_unique(references: &mut Vec<Reference>, reference: Reference) {
    let key = reference.resource_location();
    if !references.iter().any(|r| r.resource_location() == key) {
        references.push(reference);
    }
}
