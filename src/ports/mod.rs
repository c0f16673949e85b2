// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the trait definitions (ports) for property sources,
//! file parsers, location resolvers, resource loaders and the host environment.
//! They are implemented by adapters in the adapters layer and driven by the
//! service layer.

pub mod environment;
pub mod loader;
pub mod parser;
pub mod resolver;
pub mod source;

// Re-export commonly used types
pub use environment::{Environment, EnvironmentUpdateListener};
pub use loader::{ConfigData, ConfigDataLoader};
pub use parser::{ConfigParser, Document};
pub use resolver::{LocationResolver, ResolverContext};
pub use source::PropertySource;
