// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer containing the config data engine.
//!
//! This module holds the contributor tree and the passes that grow it, the binder
//! used to read structured properties from the tree, placeholder resolution and
//! the [`ConfigDataEnvironment`] that ties everything together.

pub mod binder;
pub mod contributor;
pub mod contributors;
pub mod engine;
pub mod environment;
pub mod importer;
pub mod placeholder;
pub mod properties;

// Re-export commonly used types
pub use binder::{BindStage, Binder, Bound};
pub use contributor::{Contributor, ContributorKind, ImportPhase};
pub use contributors::{BinderOption, ContributorTree};
pub use engine::{ConfigDataEnvironment, ConfigDataEnvironmentBuilder};
pub use environment::StandardEnvironment;
pub use importer::{Importer, NotFoundAction};
pub use placeholder::PlaceholderResolver;
pub use properties::ConfigDataProperties;
