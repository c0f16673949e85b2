// SPDX-License-Identifier: MIT OR Apache-2.0

//! A layered configuration resolution engine.
//!
//! This crate discovers, loads and merges layered configuration sources (files,
//! environment variables, command-line arguments, in-memory maps) into a single
//! ordered list of property sources, with profile-conditional inclusion and
//! `${...}` placeholder interpolation.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Core types (`PropertyName`, `Profiles`, `ConfigDataLocation`,
//!   `ConfigResource`, errors)
//! - **Ports**: Trait definitions that define interfaces (`PropertySource`,
//!   `ConfigParser`, `LocationResolver`, `ConfigDataLoader`, `Environment`)
//! - **Adapters**: Implementations for specific sources and formats (env vars, CLI,
//!   `.properties`, YAML, filesystem locations)
//! - **Service**: The contributor tree, binder and the engine that orchestrates
//!   everything
//!
//! # How resolution works
//!
//! The engine starts from the sources already present in the environment and a
//! set of initial import locations (`<ns>.config.location`,
//! `<ns>.config.additional-location` and `<ns>.config.import`). Every loaded
//! document may import further locations and may restrict itself to profiles with
//! `<ns>.config.activate.on-profile`. Once enough of the tree is bound, the active
//! profiles are computed and profile-specific files such as `app-prod.yml` are
//! loaded. Finally every active imported source is appended to the environment.
//!
//! # Feature Flags
//!
//! - `yaml`: Enable YAML file support (default)
//! - `env`: Enable environment variable support (default)
//! - `cli`: Enable command-line argument support (default)
//! - `full`: Enable all features
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use layercfg::prelude::*;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let mut env = StandardEnvironment::system();
//! let profiles = ConfigDataEnvironmentBuilder::new()
//!     .build(&env)?
//!     .process_and_apply(&mut env)?;
//!
//! println!("active profiles: {:?}", profiles.active());
//! if let Some(port) = env.get_property("server.port") {
//!     println!("port: {}", port.as_u64("server.port")?);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::domain::{ConfigDataLocation, ConfigError, ConfigValue, Profiles, PropertyName, Result};
    pub use crate::ports::{ConfigDataLoader, ConfigParser, Environment, LocationResolver, PropertySource};
    pub use crate::service::{ConfigDataEnvironment, ConfigDataEnvironmentBuilder, StandardEnvironment};

    pub use crate::adapters::{FileConfigDataLoader, MapPropertySource, PropertiesParser, StandardLocationResolver};

    // Re-export adapters based on feature flags
    #[cfg(feature = "cli")]
    pub use crate::adapters::CommandLineAdapter;
    #[cfg(feature = "env")]
    pub use crate::adapters::EnvVarAdapter;
    #[cfg(feature = "yaml")]
    pub use crate::adapters::YamlParser;
}
