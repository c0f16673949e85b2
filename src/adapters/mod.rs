// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing concrete sources, parsers, resolvers and loaders.
//!
//! Each adapter implements one of the traits defined in the ports layer:
//! property sources for in-memory maps, environment variables and command-line
//! arguments, parsers for `.properties` and YAML files, and the filesystem
//! location resolver and loader used for `classpath:`/`file:` locations.

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "env")]
pub mod env_var;
pub mod file_loader;
pub mod map_source;
pub mod name_cache;
pub mod properties_file;
pub mod standard_resolver;
#[cfg(feature = "yaml")]
pub mod yaml_file;

// Re-export adapters based on feature flags
#[cfg(feature = "cli")]
pub use cli::CommandLineAdapter;
#[cfg(feature = "env")]
pub use env_var::EnvVarAdapter;
pub use file_loader::FileConfigDataLoader;
pub use map_source::MapPropertySource;
pub use name_cache::{EvictionPolicy, NameCache};
pub use properties_file::PropertiesParser;
pub use standard_resolver::StandardLocationResolver;
#[cfg(feature = "yaml")]
pub use yaml_file::YamlParser;
