// SPDX-License-Identifier: MIT OR Apache-2.0

//! The config data engine.
//!
//! [`ConfigDataEnvironment`] reads its settings from an [`Environment`], builds the
//! initial contributor tree, processes imports in three passes and finally
//! appends every active imported property source to the environment together
//! with the resolved profiles.
//!
//! The passes are:
//!
//! 1. Imports are processed without any activation context.
//! 2. Imports are processed again with a context that has no profiles, so
//!    contributors whose activation depends on profiles are inactive.
//! 3. Profiles are computed from the bound tree and imports are processed for the
//!    after-profile phase, which also loads profile-specific resources.

use crate::adapters::map_source::DEFAULT_PROPERTIES;
use crate::adapters::standard_resolver::DEFAULT_CONFIG_NAME;
use crate::adapters::{FileConfigDataLoader, StandardLocationResolver};
use crate::domain::{
    ActivationContext, ConfigDataLocation, ConfigDataOption, ConfigError, ProfileInputs, ProfileSetting, Profiles,
    PropertyName, Result,
};
use crate::ports::{ConfigDataLoader, ConfigParser, Environment, EnvironmentUpdateListener, LocationResolver, PropertySource};
use crate::service::binder::Binder;
use crate::service::contributor::{Contributor, ContributorKind};
use crate::service::contributors::{BinderOption, ContributorTree};
use crate::service::importer::{handle_not_found, ConfigDataLoaders, Importer, LocationResolvers, NotFoundAction};
use crate::service::placeholder::{ContributorPlaceholderResolver, SourcesPlaceholderResolver};
use crate::service::properties::{check_invalid_properties, throw_if_legacy_processing_requested};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// The namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "app";

/// The locations searched when `<ns>.config.location` is not set.
pub const DEFAULT_SEARCH_LOCATIONS: [&str; 2] = [
    "optional:classpath:/;optional:classpath:/config/",
    "optional:file:./;optional:file:./config/;optional:file:./config/*/",
];

/// Builds a [`ConfigDataEnvironment`].
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::MapPropertySource;
/// use layercfg::ports::Environment;
/// use layercfg::service::{ConfigDataEnvironmentBuilder, StandardEnvironment};
/// use std::sync::Arc;
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("app.properties"), "greeting=hello\n").unwrap();
///
/// let mut env = StandardEnvironment::new()
///     .with_source(Arc::new(MapPropertySource::from_pairs("args", [("name", "world")])));
/// let engine = ConfigDataEnvironmentBuilder::new()
///     .base_dir(dir.path())
///     .resource_root(dir.path())
///     .build(&env)
///     .unwrap();
/// engine.process_and_apply(&mut env).unwrap();
///
/// assert_eq!(env.get_property("greeting").unwrap().as_str(), "hello");
/// assert_eq!(env.get_property("name").unwrap().as_str(), "world");
/// ```
#[derive(Default)]
pub struct ConfigDataEnvironmentBuilder {
    namespace: Option<String>,
    additional_profiles: Vec<String>,
    resolvers: Vec<Arc<dyn LocationResolver>>,
    loaders: Vec<Arc<dyn ConfigDataLoader>>,
    parsers: Vec<Arc<dyn ConfigParser>>,
    listener: Option<Arc<dyn EnvironmentUpdateListener>>,
    resource_root: Option<PathBuf>,
    base_dir: Option<PathBuf>,
    project_dirs: Option<(String, String, String)>,
}

impl ConfigDataEnvironmentBuilder {
    /// Creates a builder with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the property namespace (`app` by default).
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Adds a profile that is always active.
    pub fn additional_profile(mut self, profile: impl Into<String>) -> Self {
        self.additional_profiles.push(profile.into());
        self
    }

    /// Adds a location resolver tried before the standard resolver.
    pub fn resolver(mut self, resolver: Arc<dyn LocationResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Adds a loader tried before the file loader.
    pub fn loader(mut self, loader: Arc<dyn ConfigDataLoader>) -> Self {
        self.loaders.push(loader);
        self
    }

    /// Adds a file format on top of the default parsers.
    pub fn parser(mut self, parser: Arc<dyn ConfigParser>) -> Self {
        self.parsers.push(parser);
        self
    }

    /// Sets the listener notified while results are applied.
    pub fn listener(mut self, listener: Arc<dyn EnvironmentUpdateListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Sets the directory `classpath:` locations resolve against.
    pub fn resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_root = Some(root.into());
        self
    }

    /// Sets the directory relative `file:` locations resolve against.
    pub fn base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Uses the platform config directory of an application as resource root.
    ///
    /// An explicit [`resource_root`](Self::resource_root) takes precedence.
    pub fn project_dirs(mut self, qualifier: &str, organization: &str, application: &str) -> Self {
        self.project_dirs = Some((qualifier.to_string(), organization.to_string(), application.to_string()));
        self
    }

    /// Reads the engine settings from `environment` and builds the initial tree.
    ///
    /// # Errors
    ///
    /// Fails if the namespace is not a valid property name, if legacy processing
    /// was requested, if `<ns>.config.on-not-found` is neither `fail` nor `ignore`
    /// or if a config name contains `*`.
    pub fn build(&self, environment: &dyn Environment) -> Result<ConfigDataEnvironment> {
        let namespace = self.namespace.clone().unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        if PropertyName::parse(&namespace)?.is_empty() {
            return Err(ConfigError::InvalidName {
                name: namespace,
                invalid_chars: Vec::new(),
            });
        }
        let sources = environment.property_sources();
        let binder = Binder::new(sources.clone())
            .with_placeholders(Arc::new(SourcesPlaceholderResolver::new(sources.clone())));
        throw_if_legacy_processing_requested(&binder, &namespace)?;

        let not_found_action = match binder.bind(&format!("{}.config.on-not-found", namespace))? {
            Some(value) => value.as_str().parse::<NotFoundAction>()?,
            None => NotFoundAction::default(),
        };

        let mut file_loader = FileConfigDataLoader::with_default_parsers();
        for parser in &self.parsers {
            file_loader = file_loader.with_parser(Arc::clone(parser));
        }
        let config_names = binder
            .bind_list(&format!("{}.config.name", namespace))?
            .unwrap_or_else(|| vec![DEFAULT_CONFIG_NAME.to_string()]);
        let mut standard = StandardLocationResolver::new(config_names, file_loader.extensions())?;
        if let Some((qualifier, organization, application)) = &self.project_dirs {
            standard = standard.with_project_dirs(qualifier, organization, application);
        }
        if let Some(root) = &self.resource_root {
            standard = standard.with_resource_root(root.clone());
        }
        if let Some(base_dir) = &self.base_dir {
            standard = standard.with_base_dir(base_dir.clone());
        }

        let mut resolvers = self.resolvers.clone();
        resolvers.push(Arc::new(standard));
        let mut loaders = self.loaders.clone();
        loaders.push(Arc::new(file_loader));

        let contributors = create_contributors(&binder, sources, &namespace)?;
        Ok(ConfigDataEnvironment {
            namespace,
            not_found_action,
            additional_profiles: self.additional_profiles.clone(),
            resolvers: LocationResolvers::new(resolvers),
            loaders: ConfigDataLoaders::new(loaders),
            listener: self.listener.clone(),
            contributors,
        })
    }
}

fn create_contributors(
    binder: &Binder,
    sources: Vec<Arc<dyn PropertySource>>,
    namespace: &str,
) -> Result<ContributorTree> {
    tracing::trace!("Building config data environment contributors");
    let mut contributors = Vec::with_capacity(sources.len() + 10);
    let mut default_properties = None;
    for source in sources {
        if source.name() == DEFAULT_PROPERTIES {
            default_properties = Some(source);
        } else {
            tracing::trace!("Creating wrapped config data contributor for '{}'", source.name());
            contributors.push(Contributor::of_existing(source));
        }
    }
    let property = |suffix: &str| format!("{}.config.{}", namespace, suffix);
    add_initial_imports(&mut contributors, bind_locations(binder, &property("import"))?);
    add_initial_imports(&mut contributors, bind_locations(binder, &property("additional-location"))?);
    let locations = bind_locations(binder, &property("location"))?
        .unwrap_or_else(|| ConfigDataLocation::parse_all(DEFAULT_SEARCH_LOCATIONS));
    add_initial_imports(&mut contributors, Some(locations));
    if let Some(source) = default_properties {
        tracing::trace!("Creating wrapped config data contributor for default property source");
        contributors.push(Contributor::of_existing(source));
    }
    Ok(ContributorTree::new(contributors, namespace))
}

fn bind_locations(binder: &Binder, name: &str) -> Result<Option<Vec<ConfigDataLocation>>> {
    Ok(binder.bind_list(name)?.map(ConfigDataLocation::parse_all))
}

fn add_initial_imports(contributors: &mut Vec<Arc<Contributor>>, locations: Option<Vec<ConfigDataLocation>>) {
    for location in locations.into_iter().flatten().rev() {
        tracing::trace!("Adding initial config data import from location '{}'", location);
        contributors.push(Contributor::of_initial_import(location));
    }
}

/// Resolves config data imports and applies them to an [`Environment`].
pub struct ConfigDataEnvironment {
    namespace: String,
    not_found_action: NotFoundAction,
    additional_profiles: Vec<String>,
    resolvers: LocationResolvers,
    loaders: ConfigDataLoaders,
    listener: Option<Arc<dyn EnvironmentUpdateListener>>,
    contributors: ContributorTree,
}

impl ConfigDataEnvironment {
    /// Returns a builder.
    pub fn builder() -> ConfigDataEnvironmentBuilder {
        ConfigDataEnvironmentBuilder::new()
    }

    /// Returns the initial contributor tree.
    pub fn contributors(&self) -> &ContributorTree {
        &self.contributors
    }

    /// Returns the configured not-found action.
    pub fn not_found_action(&self) -> NotFoundAction {
        self.not_found_action
    }

    /// Processes every import and applies the result to `environment`.
    ///
    /// Returns the resolved profiles, which are also set on the environment.
    ///
    /// # Errors
    ///
    /// Fails on the first error that is not absorbed by the not-found action.
    /// Nothing is applied to the environment in that case.
    pub fn process_and_apply(&self, environment: &mut dyn Environment) -> Result<Profiles> {
        let mut importer = Importer::new(self.not_found_action, self.resolvers.clone(), self.loaders.clone());

        tracing::trace!("Processing initial config data environment contributors without activation context");
        let contributors = self.contributors.with_processed_imports(&mut importer, None)?;

        tracing::trace!("Creating config data activation context from initial contributions");
        let context = ActivationContext::new();

        tracing::trace!("Processing config data environment contributors with initial activation context");
        let contributors = contributors.with_processed_imports(&mut importer, Some(&context))?;

        let context = self.with_profiles(&contributors, &context, &*environment)?;

        tracing::trace!("Processing config data environment contributors with profile activation context");
        let contributors = contributors.with_processed_imports(&mut importer, Some(&context))?;

        self.apply_to_environment(&contributors, &context, &importer, environment)
    }

    fn with_profiles(
        &self,
        contributors: &ContributorTree,
        context: &ActivationContext,
        environment: &dyn Environment,
    ) -> Result<ActivationContext> {
        tracing::trace!("Deducing profiles from current config data environment contributors");
        let binder = contributors.binder(
            Some(context),
            |contributor| !contributor.has_option(ConfigDataOption::IgnoreProfiles),
            &[BinderOption::FailOnBindToInactiveSource],
        );
        let mut additional = self.additional_profiles.clone();
        for profile in self.included_profiles(contributors, context)? {
            if !additional.contains(&profile) {
                additional.push(profile);
            }
        }
        let property = |suffix: &str| format!("{}.profiles.{}", self.namespace, suffix);
        let inputs = ProfileInputs {
            active: ProfileSetting {
                environment_property: environment.get_property(&property("active")).map(String::from),
                environment_profiles: environment.active_profiles(),
                bound: binder.bind_list(&property("active"))?,
            },
            default: ProfileSetting {
                environment_property: environment.get_property(&property("default")).map(String::from),
                environment_profiles: environment.default_profiles(),
                bound: binder.bind_list(&property("default"))?,
            },
            additional,
            groups: binder.bind_map(&property("group"))?,
        };
        Ok(context.with_profiles(Profiles::new(inputs)))
    }

    fn included_profiles(&self, contributors: &ContributorTree, context: &ActivationContext) -> Result<Vec<String>> {
        let include = format!("{}.profiles.include", self.namespace);
        let names = [PropertyName::parse(&include)?, PropertyName::parse(&format!("{}[0]", include))?];
        let resolver = Arc::new(ContributorPlaceholderResolver::new(
            Arc::clone(contributors.root()),
            Some(context.clone()),
            None,
            true,
        ));
        let mut result: Vec<String> = Vec::new();
        for contributor in contributors.iter() {
            let Some(source) = contributor.property_source() else {
                continue;
            };
            if contributor.has_option(ConfigDataOption::IgnoreProfiles) {
                continue;
            }
            let binder = Binder::new(vec![Arc::clone(source)]).with_placeholders(resolver.clone());
            let Some(includes) = binder.bind_list(&include)? else {
                continue;
            };
            if !contributor.is_active(Some(context)) {
                if let Some(name) = names.iter().find(|name| source.get_property(name).is_some()) {
                    return Err(ConfigError::InactiveSourceAccess {
                        property: name.to_string(),
                        source_name: source.name().to_string(),
                        resource: contributor.resource().map(|r| r.to_string()),
                    });
                }
            }
            for profile in includes {
                if !result.contains(&profile) {
                    result.push(profile);
                }
            }
        }
        Ok(result)
    }

    fn apply_to_environment(
        &self,
        contributors: &ContributorTree,
        context: &ActivationContext,
        importer: &Importer,
        environment: &mut dyn Environment,
    ) -> Result<Profiles> {
        for contributor in contributors.iter() {
            check_invalid_properties(&contributor, &self.namespace)?;
        }
        self.check_mandatory_locations(contributors, context, importer)?;

        tracing::trace!("Applying config data environment contributions");
        for contributor in contributors.iter() {
            if contributor.kind() != ContributorKind::BoundImport {
                continue;
            }
            let Some(source) = contributor.property_source() else {
                continue;
            };
            if !contributor.is_active(Some(context)) {
                tracing::trace!("Skipping inactive property source '{}'", source.name());
                continue;
            }
            tracing::trace!("Adding imported property source '{}'", source.name());
            environment.add_last(Arc::clone(source));
            if let Some(listener) = &self.listener {
                listener.on_property_source_added(source, contributor.location(), contributor.resource());
            }
        }
        environment.move_to_end(DEFAULT_PROPERTIES);

        let profiles = match context.profiles() {
            Some(profiles) => profiles.clone(),
            None => Profiles::new(ProfileInputs::default()),
        };
        tracing::trace!("Setting default profiles: [{}]", profiles.default().join(", "));
        environment.set_default_profiles(profiles.default());
        tracing::trace!("Setting active profiles: [{}]", profiles.active().join(", "));
        environment.set_active_profiles(profiles.active());
        if let Some(listener) = &self.listener {
            listener.on_set_profiles(&profiles);
        }
        Ok(profiles)
    }

    fn check_mandatory_locations(
        &self,
        contributors: &ContributorTree,
        context: &ActivationContext,
        importer: &Importer,
    ) -> Result<()> {
        let mut mandatory: Vec<ConfigDataLocation> = Vec::new();
        for contributor in contributors.iter() {
            if !contributor.is_active(Some(context)) {
                continue;
            }
            for location in contributor.imports().iter().filter(|l| !l.is_optional()) {
                if !mandatory.contains(location) {
                    mandatory.push(location.clone());
                }
            }
        }
        let locations: Vec<ConfigDataLocation> = contributors
            .iter()
            .filter_map(|contributor| contributor.location().cloned())
            .collect();
        mandatory.retain(|location| {
            !locations.contains(location)
                && !importer.loaded_locations().contains(location)
                && !importer.optional_locations().contains(location)
        });
        for location in mandatory {
            handle_not_found(
                self.not_found_action,
                ConfigError::LocationNotFound {
                    location: location.to_string(),
                },
            )?;
        }
        Ok(())
    }
}

impl fmt::Debug for ConfigDataEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigDataEnvironment")
            .field("namespace", &self.namespace)
            .field("not_found_action", &self.not_found_action)
            .field("additional_profiles", &self.additional_profiles)
            .field("contributors", &self.contributors)
            .finish()
    }
}
