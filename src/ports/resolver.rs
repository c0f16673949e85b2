// SPDX-License-Identifier: MIT OR Apache-2.0

//! Location resolver trait definition.
//!
//! A location resolver turns a [`ConfigDataLocation`] into concrete
//! [`ConfigResource`]s. Resolvers are tried in registration order and the first
//! one that claims a location resolves it.

use crate::domain::{ConfigDataLocation, ConfigResource, Profiles, Result};

/// Context handed to resolvers.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResolverContext<'a> {
    parent: Option<&'a ConfigResource>,
}

impl<'a> ResolverContext<'a> {
    /// Creates a context for locations that were not imported from a resource.
    pub fn new() -> Self {
        Self { parent: None }
    }

    /// Creates a context for locations imported from `parent`.
    pub fn with_parent(parent: Option<&'a ConfigResource>) -> Self {
        Self { parent }
    }

    /// Returns the resource that declared the import, if any.
    ///
    /// Relative locations are resolved against this resource.
    pub fn parent(&self) -> Option<&'a ConfigResource> {
        self.parent
    }
}

/// A strategy for resolving config data locations.
///
/// # Examples
///
/// ```rust
/// use layercfg::ports::{LocationResolver, ResolverContext};
/// use layercfg::domain::{ConfigDataLocation, ConfigResource, Result};
///
/// struct NothingResolver;
///
/// impl LocationResolver for NothingResolver {
///     fn is_resolvable(&self, _: &ResolverContext<'_>, location: &ConfigDataLocation) -> bool {
///         location.has_prefix("nothing:")
///     }
///
///     fn resolve(&self, _: &ResolverContext<'_>, _: &ConfigDataLocation) -> Result<Vec<ConfigResource>> {
///         Ok(Vec::new())
///     }
/// }
///
/// let location = ConfigDataLocation::parse("nothing:x").unwrap();
/// assert!(NothingResolver.is_resolvable(&ResolverContext::new(), &location));
/// ```
pub trait LocationResolver: Send + Sync {
    /// Returns `true` if this resolver handles `location`.
    fn is_resolvable(&self, context: &ResolverContext<'_>, location: &ConfigDataLocation) -> bool;

    /// Resolves `location` into profile-agnostic resources.
    ///
    /// # Errors
    ///
    /// May return [`crate::domain::ConfigError::LocationNotFound`], which the
    /// importer routes through the not-found action.
    fn resolve(
        &self,
        context: &ResolverContext<'_>,
        location: &ConfigDataLocation,
    ) -> Result<Vec<ConfigResource>>;

    /// Resolves `location` into profile-specific resources for the accepted profiles.
    ///
    /// The default implementation resolves nothing.
    fn resolve_profile_specific(
        &self,
        context: &ResolverContext<'_>,
        location: &ConfigDataLocation,
        profiles: &Profiles,
    ) -> Result<Vec<ConfigResource>> {
        let _ = (context, location, profiles);
        Ok(Vec::new())
    }
}
