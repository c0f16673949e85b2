// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resources, resolution results and per-source options.

use crate::domain::location::ConfigDataLocation;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Options that change how a loaded property source is processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConfigDataOption {
    /// Imports declared by the source are not processed.
    IgnoreImports,
    /// Profile properties declared by the source are not considered.
    IgnoreProfiles,
    /// The source was loaded from a profile-specific resource.
    ProfileSpecific,
}

impl ConfigDataOption {
    fn bit(self) -> u8 {
        match self {
            ConfigDataOption::IgnoreImports => 0b001,
            ConfigDataOption::IgnoreProfiles => 0b010,
            ConfigDataOption::ProfileSpecific => 0b100,
        }
    }
}

/// A small set of [`ConfigDataOption`]s.
///
/// # Examples
///
/// ```
/// use layercfg::domain::config_data::{ConfigDataOption, ConfigDataOptions};
///
/// let options = ConfigDataOptions::of(&[ConfigDataOption::ProfileSpecific]);
/// assert!(options.contains(ConfigDataOption::ProfileSpecific));
/// assert!(options.without(ConfigDataOption::ProfileSpecific).is_empty());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ConfigDataOptions(u8);

impl ConfigDataOptions {
    /// The empty option set.
    pub const NONE: ConfigDataOptions = ConfigDataOptions(0);

    /// Creates a set from a slice of options.
    pub fn of(options: &[ConfigDataOption]) -> Self {
        options
            .iter()
            .fold(Self::NONE, |acc, option| acc.with(*option))
    }

    /// Returns `true` if `option` is present.
    pub fn contains(self, option: ConfigDataOption) -> bool {
        self.0 & option.bit() != 0
    }

    /// Returns a copy with `option` added.
    pub fn with(self, option: ConfigDataOption) -> Self {
        ConfigDataOptions(self.0 | option.bit())
    }

    /// Returns a copy with `option` removed.
    pub fn without(self, option: ConfigDataOption) -> Self {
        ConfigDataOptions(self.0 & !option.bit())
    }

    /// Returns `true` if no options are set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// A loadable configuration resource produced by a location resolver.
///
/// Two resources are the same resource when they point at the same canonical path
/// and agree on whether they represent an empty directory; the profile and the
/// reference they were reached through do not matter.
#[derive(Clone, Debug)]
pub struct ConfigResource {
    path: PathBuf,
    identity: PathBuf,
    extension: Option<String>,
    profile: Option<String>,
    reference: String,
    location: Option<String>,
    optional: bool,
    empty_directory: bool,
}

impl ConfigResource {
    /// Creates a file resource.
    ///
    /// `extension` is the parser extension (without the dot) used to load it.
    pub fn file(
        path: impl Into<PathBuf>,
        extension: impl Into<String>,
        profile: Option<String>,
        reference: impl Into<String>,
    ) -> Self {
        let path = path.into();
        Self {
            identity: canonical(&path),
            path,
            extension: Some(extension.into()),
            profile,
            reference: reference.into(),
            location: None,
            optional: false,
            empty_directory: false,
        }
    }

    /// Creates a resource standing for an existing directory with no config files.
    pub fn empty_directory(path: impl Into<PathBuf>, reference: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            identity: canonical(&path),
            path,
            extension: None,
            profile: None,
            reference: reference.into(),
            location: None,
            optional: false,
            empty_directory: true,
        }
    }

    /// Records the import location the resource was resolved from.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Marks the resource as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Returns the file or directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the parser extension, absent for empty directories.
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// Returns the profile the resource was resolved for.
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Returns the reference string the resource was derived from.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Returns the import location, falling back to the reference when none was recorded.
    pub fn location(&self) -> &str {
        self.location.as_deref().unwrap_or(&self.reference)
    }

    /// Returns `true` if a missing resource should be ignored.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns `true` for empty directory resources.
    pub fn is_empty_directory(&self) -> bool {
        self.empty_directory
    }

    /// Returns `true` if the resource exists on disk.
    pub fn exists(&self) -> bool {
        if self.empty_directory {
            self.path.is_dir()
        } else {
            self.path.is_file()
        }
    }
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

impl PartialEq for ConfigResource {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity && self.empty_directory == other.empty_directory
    }
}

impl Eq for ConfigResource {}

impl Hash for ConfigResource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
        self.empty_directory.hash(state);
    }
}

impl fmt::Display for ConfigResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.empty_directory {
            write!(f, "directory [{}]", self.path.display())
        } else {
            write!(f, "file [{}]", self.path.display())
        }
    }
}

/// A resource together with the location it was resolved from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolutionResult {
    /// The location that was resolved
    pub location: ConfigDataLocation,
    /// The resolved resource
    pub resource: ConfigResource,
    /// Whether the resource was resolved for a specific profile
    pub profile_specific: bool,
}

impl ResolutionResult {
    /// Creates a new resolution result.
    pub fn new(location: ConfigDataLocation, resource: ConfigResource, profile_specific: bool) -> Self {
        Self {
            location,
            resource,
            profile_specific,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    #[test]
    fn test_options() {
        let options = ConfigDataOptions::NONE
            .with(ConfigDataOption::IgnoreImports)
            .with(ConfigDataOption::ProfileSpecific);
        assert!(options.contains(ConfigDataOption::IgnoreImports));
        assert!(!options.contains(ConfigDataOption::IgnoreProfiles));
        let options = options.without(ConfigDataOption::IgnoreImports);
        assert_eq!(options, ConfigDataOptions::of(&[ConfigDataOption::ProfileSpecific]));
    }

    #[test]
    fn test_resource_identity_uses_canonical_path() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("config")).unwrap();
        let file = dir.path().join("app.yml");
        std::fs::write(&file, "a: 1").unwrap();

        let direct = ConfigResource::file(&file, "yml", None, "file:./app.yml");
        let indirect = ConfigResource::file(
            dir.path().join("config").join("..").join("app.yml"),
            "yml",
            Some("dev".to_string()),
            "file:./config/../app.yml",
        );
        assert_eq!(direct, indirect);

        let mut set = HashSet::new();
        set.insert(direct);
        assert!(!set.insert(indirect));
    }

    #[test]
    fn test_empty_directory_differs_from_file() {
        let dir = TempDir::new().unwrap();
        let as_dir = ConfigResource::empty_directory(dir.path(), "file:./");
        let as_file = ConfigResource::file(dir.path(), "yml", None, "file:./");
        assert_ne!(as_dir, as_file);
        assert!(as_dir.exists());
        assert!(!as_file.exists());
        assert!(as_dir.to_string().starts_with("directory ["));
    }

    #[test]
    fn test_missing_resource() {
        let resource = ConfigResource::file("/does/not/exist.yml", "yml", None, "x").optional();
        assert!(!resource.exists());
        assert!(resource.is_optional());
        assert_eq!(resource.to_string(), "file [/does/not/exist.yml]");
    }

    #[test]
    fn test_location_falls_back_to_reference() {
        let resource = ConfigResource::file("app.yml", "yml", None, "file:./app.yml");
        assert_eq!(resource.location(), "file:./app.yml");
        let resource = resource.with_location("optional:file:./");
        assert_eq!(resource.location(), "optional:file:./");
        assert_eq!(resource.reference(), "file:./app.yml");
    }
}
