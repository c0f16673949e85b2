// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config data loader trait definition and the loaded payload.

use crate::domain::{ConfigDataOption, ConfigDataOptions, ConfigResource, Result};
use crate::ports::source::PropertySource;
use std::sync::Arc;

/// The property sources loaded from one resource.
///
/// Sources are ordered highest priority first; each carries its own options.
#[derive(Clone, Debug, Default)]
pub struct ConfigData {
    sources: Vec<(Arc<dyn PropertySource>, ConfigDataOptions)>,
}

impl ConfigData {
    /// Config data with no property sources.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates config data where every source shares the same options.
    pub fn new(sources: Vec<Arc<dyn PropertySource>>, options: ConfigDataOptions) -> Self {
        Self {
            sources: sources.into_iter().map(|s| (s, options)).collect(),
        }
    }

    /// Creates config data with options chosen per source.
    pub fn with_options<F>(sources: Vec<Arc<dyn PropertySource>>, options: F) -> Self
    where
        F: Fn(&dyn PropertySource) -> ConfigDataOptions,
    {
        Self {
            sources: sources
                .into_iter()
                .map(|source| {
                    let opts = options(source.as_ref());
                    (source, opts)
                })
                .collect(),
        }
    }

    /// Returns the property sources in priority order.
    pub fn sources(&self) -> impl Iterator<Item = &Arc<dyn PropertySource>> {
        self.sources.iter().map(|(source, _)| source)
    }

    /// Returns the source at `index` together with its options.
    pub fn get(&self, index: usize) -> Option<(&Arc<dyn PropertySource>, ConfigDataOptions)> {
        self.sources.get(index).map(|(source, options)| (source, *options))
    }

    /// Returns the number of sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns `true` if there are no sources.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Returns `true` if the source at `index` carries `option`.
    pub fn has_option(&self, index: usize, option: ConfigDataOption) -> bool {
        self.get(index)
            .map_or(false, |(_, options)| options.contains(option))
    }
}

/// Loads resolved resources into [`ConfigData`].
///
/// Loaders are tried in registration order; the first that accepts a resource
/// loads it.
pub trait ConfigDataLoader: Send + Sync {
    /// Returns `true` if this loader can load `resource`.
    fn is_loadable(&self, resource: &ConfigResource) -> bool {
        let _ = resource;
        true
    }

    /// Loads `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ConfigError::ResourceNotFound`] when the resource
    /// does not exist, or a parse error when its content is malformed.
    fn load(&self, resource: &ConfigResource) -> Result<ConfigData>;
}
