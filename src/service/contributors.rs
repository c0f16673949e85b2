// SPDX-License-Identifier: MIT OR Apache-2.0

//! The contributor tree and the import worklist that grows it.

use crate::domain::{ActivationContext, ConfigError, PropertyName, ResolutionResult, Result};
use crate::ports::{ConfigData, PropertySource, ResolverContext};
use crate::service::binder::{BindStage, Binder, Bound};
use crate::service::contributor::{Contributor, ContributorKind, ImportPhase};
use crate::service::importer::Importer;
use crate::service::placeholder::ContributorPlaceholderResolver;
use std::sync::Arc;

/// Options for [`ContributorTree::binder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinderOption {
    /// Include inactive contributors and fail if a bound value is also held by one.
    FailOnBindToInactiveSource,
}

/// An immutable tree of contributors under a single root.
#[derive(Clone, Debug)]
pub struct ContributorTree {
    root: Arc<Contributor>,
    namespace: String,
}

impl ContributorTree {
    /// Creates a tree whose root holds `contributors` in priority order.
    pub fn new(contributors: Vec<Arc<Contributor>>, namespace: impl Into<String>) -> Self {
        Self {
            root: Contributor::root(contributors),
            namespace: namespace.into(),
        }
    }

    fn with_root(&self, root: Arc<Contributor>) -> Self {
        Self {
            root,
            namespace: self.namespace.clone(),
        }
    }

    /// Returns the root contributor.
    pub fn root(&self) -> &Arc<Contributor> {
        &self.root
    }

    /// Returns the property namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Iterates every contributor in priority order.
    pub fn iter(&self) -> impl Iterator<Item = Arc<Contributor>> {
        self.root.iter()
    }

    /// Binds every unbound import and processes every active contributor's
    /// imports for the phase implied by `context`.
    ///
    /// # Errors
    ///
    /// Fails on binding, resolution or loading errors not absorbed by the
    /// importer's not-found action.
    pub fn with_processed_imports(&self, importer: &mut Importer, context: Option<&ActivationContext>) -> Result<Self> {
        let phase = ImportPhase::get(context);
        tracing::trace!("Processing imports for phase {}", phase);
        let mut processed = 0;
        let mut root = Arc::clone(&self.root);
        loop {
            let Some(contributor) = next_to_process(&root, context, phase) else {
                tracing::trace!("Processed imports for {} contributors", processed);
                return Ok(self.with_root(root));
            };
            if contributor.kind() == ContributorKind::UnboundImport {
                let bound = contributor.with_bound_properties(&root, context, &self.namespace)?;
                root = root.with_replacement(&contributor, &bound);
                continue;
            }
            let imports = contributor.imports();
            tracing::trace!(
                "Processing imports [{}]",
                imports.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
            );
            let resolver_context = ResolverContext::with_parent(contributor.resource());
            let imported = importer.resolve_and_load(
                context.and_then(ActivationContext::profiles),
                &resolver_context,
                imports,
            )?;
            tracing::trace!("Imported {} resources", imported.len());
            let children = as_contributors(imported);
            let with_children = Arc::new(contributor.with_children(phase, children));
            root = root.with_replacement(&contributor, &with_children);
            processed += 1;
        }
    }

    /// Creates a binder over the contributors accepted by `filter`.
    ///
    /// Inactive contributors are left out unless
    /// [`BinderOption::FailOnBindToInactiveSource`] is given, in which case every
    /// bound value is checked against the inactive contributors instead.
    pub fn binder<F>(&self, context: Option<&ActivationContext>, filter: F, options: &[BinderOption]) -> Binder
    where
        F: Fn(&Contributor) -> bool,
    {
        let fail_on_inactive = options.contains(&BinderOption::FailOnBindToInactiveSource);
        let sources: Vec<Arc<dyn PropertySource>> = self
            .iter()
            .filter(|contributor| filter(Arc::as_ref(contributor)))
            .filter(|contributor| fail_on_inactive || contributor.is_active(context))
            .filter_map(|contributor| contributor.property_source().cloned())
            .collect();
        let resolver = ContributorPlaceholderResolver::new(Arc::clone(&self.root), context.cloned(), None, fail_on_inactive);
        let binder = Binder::new(sources).with_placeholders(Arc::new(resolver));
        if fail_on_inactive {
            binder.with_stage(inactive_source_checker(Arc::clone(&self.root), context.cloned()))
        } else {
            binder
        }
    }
}

fn next_to_process(
    root: &Arc<Contributor>,
    context: Option<&ActivationContext>,
    phase: ImportPhase,
) -> Option<Arc<Contributor>> {
    root.iter().find(|contributor| {
        contributor.kind() == ContributorKind::UnboundImport
            || (contributor.is_active(context) && contributor.has_unprocessed_imports(phase))
    })
}

fn as_contributors(imported: Vec<(ResolutionResult, ConfigData)>) -> Vec<Arc<Contributor>> {
    let mut contributors = Vec::new();
    for (result, data) in imported {
        if data.is_empty() {
            contributors.push(Contributor::of_empty_location(result.location, result.profile_specific));
            continue;
        }
        for index in (0..data.len()).rev() {
            if let Some(contributor) = Contributor::of_unbound_import(
                result.location.clone(),
                result.resource.clone(),
                result.profile_specific,
                &data,
                index,
            ) {
                contributors.push(contributor);
            }
        }
    }
    contributors
}

fn inactive_source_checker(root: Arc<Contributor>, context: Option<ActivationContext>) -> BindStage {
    Arc::new(move |name: &PropertyName, bound: Bound| {
        for contributor in root.iter() {
            if contributor.is_active(context.as_ref()) {
                continue;
            }
            let Some(source) = contributor.property_source() else {
                continue;
            };
            if source.get_property(name).is_some() {
                return Err(ConfigError::InactiveSourceAccess {
                    property: name.to_string(),
                    source_name: source.name().to_string(),
                    resource: contributor.resource().map(|r| r.to_string()),
                });
            }
        }
        Ok(bound)
    })
}
