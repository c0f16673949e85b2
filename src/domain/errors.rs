// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the configuration engine.
//!
//! This module defines every error that can surface while parsing property names,
//! resolving locations, loading resources, binding properties or activating
//! profiles. All errors use `thiserror` for proper error handling and conversion.

use std::num::ParseIntError;
use std::str::ParseBoolError;
use thiserror::Error;

/// The main error type for configuration operations.
///
/// Not-found conditions ([`ConfigError::LocationNotFound`] and
/// [`ConfigError::ResourceNotFound`]) are routed through the engine's not-found
/// action and may be ignored. Every other variant aborts configuration loading.
///
/// # Examples
///
/// ```
/// use layercfg::domain::errors::ConfigError;
///
/// fn load() -> Result<(), ConfigError> {
///     Err(ConfigError::LocationNotFound {
///         location: "file:./missing/".to_string(),
///     })
/// }
///
/// assert!(load().unwrap_err().is_not_found());
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A property name could not be parsed in strict mode.
    #[error("Configuration property name '{name}' is not valid: invalid characters {invalid_chars:?}")]
    InvalidName {
        /// The raw name that failed to parse
        name: String,
        /// The characters that made the name invalid
        invalid_chars: Vec<char>,
    },

    /// A mandatory location resolved to nothing.
    #[error("Config data location '{location}' does not exist")]
    LocationNotFound {
        /// The location that was not found
        location: String,
    },

    /// A resolved resource could not be loaded because it does not exist.
    #[error("Config data resource '{resource}'{} does not exist", via_location(.location))]
    ResourceNotFound {
        /// Description of the missing resource
        resource: String,
        /// The location the resource was reached through, once known
        location: Option<String>,
    },

    /// No registered location resolver claims a location.
    #[error("Unsupported config data location '{location}'")]
    UnsupportedLocation {
        /// The unsupported location
        location: String,
    },

    /// A property was found only on a source that is not active.
    #[error("Inactive property source '{source_name}'{} cannot contain property '{property}'", imported_from(.resource))]
    InactiveSourceAccess {
        /// The property being accessed
        property: String,
        /// Name of the inactive property source
        source_name: String,
        /// The resource the source was imported from, if any
        resource: Option<String>,
    },

    /// A deprecated or context-forbidden property was bound.
    #[error("Property '{property}'{} is invalid{}{}",
        imported_from(.resource),
        profile_specific_suffix(.profile_specific),
        replaced_with(.replacement))]
    InvalidProperty {
        /// The offending property name
        property: String,
        /// The resource that declared the property, if any
        resource: Option<String>,
        /// Whether the property was found in a profile-specific resource
        profile_specific: bool,
        /// The property that should be used instead, if any
        replacement: Option<String>,
    },

    /// Legacy configuration processing was explicitly requested.
    #[error("Legacy config processing requested via '{property}'")]
    LegacyProcessingRequested {
        /// The property that requested legacy processing
        property: String,
    },

    /// A configured config name is not usable.
    #[error("Config name '{name}' cannot contain '*'")]
    InvalidConfigName {
        /// The rejected config name
        name: String,
    },

    /// A file location has an extension no parser understands.
    #[error("File extension of '{location}' is not known to any parser. If the location is meant to reference a directory, it must end in '/' or the platform path separator")]
    UnknownFileExtension {
        /// The location with the unknown extension
        location: String,
    },

    /// A profile activation expression is malformed.
    #[error("Malformed profile expression [{expression}]")]
    InvalidProfileExpression {
        /// The malformed expression
        expression: String,
    },

    /// Failed to convert a configuration value to the requested type.
    #[error(
        "Failed to convert configuration value for key '{key}' to type {target_type}: {source}"
    )]
    TypeConversionError {
        /// The key being converted
        key: String,
        /// The target type name
        target_type: String,
        /// The underlying conversion error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An error occurred in a configuration source or loader.
    #[error("Configuration source '{source_name}' error: {message}")]
    SourceError {
        /// The name of the source that encountered the error
        source_name: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failed to parse a configuration file or value.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// The error message
        message: String,
        /// The underlying parsing error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An I/O error occurred while reading configuration.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

fn via_location(location: &Option<String>) -> String {
    location
        .as_ref()
        .map(|l| format!(" via location '{}'", l))
        .unwrap_or_default()
}

fn imported_from(resource: &Option<String>) -> String {
    resource
        .as_ref()
        .map(|r| format!(" imported from location '{}'", r))
        .unwrap_or_default()
}

fn profile_specific_suffix(profile_specific: &bool) -> &'static str {
    if *profile_specific {
        " in a profile specific resource"
    } else {
        ""
    }
}

fn replaced_with(replacement: &Option<String>) -> String {
    replacement
        .as_ref()
        .map(|r| format!(" and should be replaced with '{}'", r))
        .unwrap_or_default()
}

impl ConfigError {
    /// Returns `true` for the not-found family handled by the not-found action.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ConfigError::LocationNotFound { .. } | ConfigError::ResourceNotFound { .. }
        )
    }

    /// Attaches the originating location to a [`ConfigError::ResourceNotFound`].
    ///
    /// Other variants are returned unchanged.
    pub fn with_location(self, location: &str) -> Self {
        match self {
            ConfigError::ResourceNotFound { resource, .. } => ConfigError::ResourceNotFound {
                resource,
                location: Some(location.to_string()),
            },
            other => other,
        }
    }

    /// Creates a TypeConversionError from a ParseIntError.
    pub fn from_parse_int_error(key: String, err: ParseIntError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "integer".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a TypeConversionError from a ParseBoolError.
    pub fn from_parse_bool_error(key: String, err: ParseBoolError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "boolean".to_string(),
            source: Box::new(err),
        }
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_name_error() {
        let error = ConfigError::InvalidName {
            name: "foo.Bar".to_string(),
            invalid_chars: vec!['B'],
        };
        assert!(error.to_string().contains("foo.Bar"));
        assert!(error.to_string().contains("'B'"));
    }

    #[test]
    fn test_resource_not_found_with_location() {
        let error = ConfigError::ResourceNotFound {
            resource: "file [app.yml]".to_string(),
            location: None,
        };
        assert_eq!(
            error.to_string(),
            "Config data resource 'file [app.yml]' does not exist"
        );
        let error = error.with_location("optional:file:./");
        assert_eq!(
            error.to_string(),
            "Config data resource 'file [app.yml]' via location 'optional:file:./' does not exist"
        );
    }

    #[test]
    fn test_with_location_leaves_other_variants() {
        let error = ConfigError::UnsupportedLocation {
            location: "http://x".to_string(),
        }
        .with_location("somewhere");
        assert!(matches!(error, ConfigError::UnsupportedLocation { .. }));
    }

    #[test]
    fn test_is_not_found() {
        assert!(ConfigError::LocationNotFound {
            location: "x".to_string()
        }
        .is_not_found());
        assert!(!ConfigError::LegacyProcessingRequested {
            property: "app.config.use-legacy-processing".to_string()
        }
        .is_not_found());
    }

    #[test]
    fn test_invalid_property_message() {
        let error = ConfigError::InvalidProperty {
            property: "app.profiles.active".to_string(),
            resource: Some("file [app-dev.yml]".to_string()),
            profile_specific: true,
            replacement: None,
        };
        assert_eq!(
            error.to_string(),
            "Property 'app.profiles.active' imported from location 'file [app-dev.yml]' is invalid in a profile specific resource"
        );
    }

    #[test]
    fn test_inactive_source_access_message() {
        let error = ConfigError::InactiveSourceAccess {
            property: "app.profiles.include".to_string(),
            source_name: "app-prod.yml".to_string(),
            resource: None,
        };
        assert_eq!(
            error.to_string(),
            "Inactive property source 'app-prod.yml' cannot contain property 'app.profiles.include'"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = ConfigError::from(io_error);
        assert!(matches!(error, ConfigError::IoError(_)));
    }

    #[test]
    fn test_from_parse_bool_error() {
        let parse_err = "not_a_bool".parse::<bool>().unwrap_err();
        let error = ConfigError::from_parse_bool_error("test.key".to_string(), parse_err);
        assert!(matches!(error, ConfigError::TypeConversionError { .. }));
        assert!(error.to_string().contains("boolean"));
    }
}
