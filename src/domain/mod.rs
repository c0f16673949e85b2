// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core types.
//!
//! Property names, locations, resources, profiles and errors. Nothing in this
//! module performs I/O beyond resource existence checks.

pub mod activation;
pub mod config_data;
pub mod config_value;
pub mod errors;
pub mod location;
pub mod profiles;
pub mod property_name;

// Re-export commonly used types
pub use activation::{Activation, ActivationContext};
pub use config_data::{ConfigDataOption, ConfigDataOptions, ConfigResource, ResolutionResult};
pub use config_value::ConfigValue;
pub use errors::{ConfigError, Result};
pub use location::ConfigDataLocation;
pub use profiles::{ProfileExpression, ProfileInputs, ProfileSetting, Profiles};
pub use property_name::{ElementKind, Form, PropertyName};
