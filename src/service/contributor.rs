// SPDX-License-Identifier: MIT OR Apache-2.0

//! Nodes of the immutable contributor tree.
//!
//! Every existing property source, pending import and loaded document is a
//! [`Contributor`]. Nodes are shared through `Arc` and never mutated: replacing a
//! node rebuilds only the path from the root to it.

use crate::domain::{
    ActivationContext, ConfigDataLocation, ConfigDataOption, ConfigDataOptions, ConfigResource, Result,
};
use crate::ports::{ConfigData, PropertySource};
use crate::service::binder::Binder;
use crate::service::placeholder::ContributorPlaceholderResolver;
use crate::service::properties::{throw_if_legacy_processing_requested, ConfigDataProperties};
use std::fmt;
use std::sync::Arc;

/// The kind of a contributor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContributorKind {
    /// The root of the tree
    Root,
    /// A location configured before any import was processed
    InitialImport,
    /// A property source that already existed in the environment
    Existing,
    /// A loaded source whose own properties have not been bound yet
    UnboundImport,
    /// A loaded source with bound properties
    BoundImport,
    /// A location that resolved to no property sources
    EmptyLocation,
}

/// When a contributor's imports were processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImportPhase {
    /// Imports processed before the active profiles were known
    BeforeProfileActivation,
    /// Imports processed once the active profiles were known
    AfterProfileActivation,
}

impl ImportPhase {
    /// Both phases, in declaration order.
    pub const ALL: [ImportPhase; 2] = [
        ImportPhase::BeforeProfileActivation,
        ImportPhase::AfterProfileActivation,
    ];

    /// Returns the phase matching an activation context.
    pub fn get(context: Option<&ActivationContext>) -> Self {
        match context {
            Some(context) if context.profiles().is_some() => ImportPhase::AfterProfileActivation,
            _ => ImportPhase::BeforeProfileActivation,
        }
    }
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportPhase::BeforeProfileActivation => write!(f, "BEFORE_PROFILE_ACTIVATION"),
            ImportPhase::AfterProfileActivation => write!(f, "AFTER_PROFILE_ACTIVATION"),
        }
    }
}

type Children = Vec<Arc<Contributor>>;

/// Children recorded per phase. `None` means the phase was never processed.
#[derive(Clone, Debug, Default)]
struct PhaseChildren {
    before: Option<Children>,
    after: Option<Children>,
}

impl PhaseChildren {
    fn get(&self, phase: ImportPhase) -> Option<&Children> {
        match phase {
            ImportPhase::BeforeProfileActivation => self.before.as_ref(),
            ImportPhase::AfterProfileActivation => self.after.as_ref(),
        }
    }

    fn set(&mut self, phase: ImportPhase, children: Children) {
        match phase {
            ImportPhase::BeforeProfileActivation => self.before = Some(children),
            ImportPhase::AfterProfileActivation => self.after = Some(children),
        }
    }

    fn len(&self) -> usize {
        self.before.as_ref().map_or(0, Vec::len) + self.after.as_ref().map_or(0, Vec::len)
    }
}

/// A node of the contributor tree.
#[derive(Clone)]
pub struct Contributor {
    kind: ContributorKind,
    location: Option<ConfigDataLocation>,
    resource: Option<ConfigResource>,
    from_profile_specific_import: bool,
    property_source: Option<Arc<dyn PropertySource>>,
    properties: Option<ConfigDataProperties>,
    options: ConfigDataOptions,
    children: PhaseChildren,
}

impl Contributor {
    fn new(kind: ContributorKind) -> Self {
        Self {
            kind,
            location: None,
            resource: None,
            from_profile_specific_import: false,
            property_source: None,
            properties: None,
            options: ConfigDataOptions::NONE,
            children: PhaseChildren::default(),
        }
    }

    /// Creates a root whose before-profile children are `contributors`.
    pub fn root(contributors: Vec<Arc<Contributor>>) -> Arc<Self> {
        let mut root = Self::new(ContributorKind::Root);
        root.children.set(ImportPhase::BeforeProfileActivation, contributors);
        Arc::new(root)
    }

    /// Creates a contributor that imports `location`.
    pub fn of_initial_import(location: ConfigDataLocation) -> Arc<Self> {
        let mut contributor = Self::new(ContributorKind::InitialImport);
        contributor.properties = Some(ConfigDataProperties::new(vec![location], None));
        Arc::new(contributor)
    }

    /// Wraps a property source that already exists in the environment.
    pub fn of_existing(source: Arc<dyn PropertySource>) -> Arc<Self> {
        let mut contributor = Self::new(ContributorKind::Existing);
        contributor.property_source = Some(source);
        Arc::new(contributor)
    }

    /// Creates an unbound contributor for the source at `index` of `data`.
    ///
    /// Returns `None` if `index` is out of range.
    pub fn of_unbound_import(
        location: ConfigDataLocation,
        resource: ConfigResource,
        profile_specific: bool,
        data: &ConfigData,
        index: usize,
    ) -> Option<Arc<Self>> {
        let (source, options) = data.get(index)?;
        let mut contributor = Self::new(ContributorKind::UnboundImport);
        contributor.location = Some(location);
        contributor.resource = Some(resource);
        contributor.from_profile_specific_import = profile_specific;
        contributor.property_source = Some(Arc::clone(source));
        contributor.options = options;
        Some(Arc::new(contributor))
    }

    /// Creates a placeholder for a location that loaded no sources.
    pub fn of_empty_location(location: ConfigDataLocation, profile_specific: bool) -> Arc<Self> {
        let mut contributor = Self::new(ContributorKind::EmptyLocation);
        contributor.location = Some(location);
        contributor.from_profile_specific_import = profile_specific;
        contributor.options = ConfigDataOptions::of(&[ConfigDataOption::IgnoreImports]);
        Arc::new(contributor)
    }

    /// Returns the kind of this contributor.
    pub fn kind(&self) -> ContributorKind {
        self.kind
    }

    /// Returns the location this contributor was imported from.
    pub fn location(&self) -> Option<&ConfigDataLocation> {
        self.location.as_ref()
    }

    /// Returns the resource this contributor was loaded from.
    pub fn resource(&self) -> Option<&ConfigResource> {
        self.resource.as_ref()
    }

    /// Returns `true` if the contributor came from a profile-specific resolution.
    pub fn is_from_profile_specific_import(&self) -> bool {
        self.from_profile_specific_import
    }

    /// Returns the property source, if this contributor has one.
    pub fn property_source(&self) -> Option<&Arc<dyn PropertySource>> {
        self.property_source.as_ref()
    }

    /// Returns the bound properties, if any.
    pub fn properties(&self) -> Option<&ConfigDataProperties> {
        self.properties.as_ref()
    }

    /// Returns `true` if `option` is set.
    pub fn has_option(&self, option: ConfigDataOption) -> bool {
        self.options.contains(option)
    }

    /// Returns a copy without `option`.
    pub fn without_option(&self, option: ConfigDataOption) -> Self {
        let mut copy = self.clone();
        copy.options = self.options.without(option);
        copy
    }

    /// Returns `true` if this contributor takes part in the given context.
    ///
    /// Unbound imports are never active.
    pub fn is_active(&self, context: Option<&ActivationContext>) -> bool {
        if self.kind == ContributorKind::UnboundImport {
            return false;
        }
        self.properties
            .as_ref()
            .map_or(true, |properties| properties.is_active(context))
    }

    /// Returns the declared imports.
    pub fn imports(&self) -> &[ConfigDataLocation] {
        match &self.properties {
            Some(properties) => properties.imports(),
            None => &[],
        }
    }

    /// Returns `true` if there are imports and none were processed for `phase`.
    pub fn has_unprocessed_imports(&self, phase: ImportPhase) -> bool {
        !self.imports().is_empty() && self.children.get(phase).is_none()
    }

    /// Returns the children recorded for `phase`.
    pub fn children(&self, phase: ImportPhase) -> &[Arc<Contributor>] {
        match self.children.get(phase) {
            Some(children) => children,
            None => &[],
        }
    }

    /// Iterates the subtree in priority order: after-profile children, then
    /// before-profile children, each depth first, then this node.
    ///
    /// The root is therefore always yielded last.
    pub fn iter(self: &Arc<Self>) -> impl Iterator<Item = Arc<Contributor>> {
        let mut collected = Vec::new();
        collect(self, &mut collected);
        collected.into_iter()
    }

    /// Binds this unbound import's own properties, producing a bound import.
    ///
    /// Placeholders resolve against the whole tree at `root`, with this node
    /// treated as active and inactive holders rejected. Other unbound nodes
    /// holding a value are bound first to decide whether they are active.
    pub fn with_bound_properties(
        self: &Arc<Self>,
        root: &Arc<Contributor>,
        context: Option<&ActivationContext>,
        namespace: &str,
    ) -> Result<Arc<Self>> {
        self.bind_properties(root, context, namespace, true)
    }

    /// Binds this node's properties. Without `lookahead`, other unbound nodes
    /// count as inactive, which stops nested binds from recursing.
    pub(crate) fn bind_properties(
        self: &Arc<Self>,
        root: &Arc<Contributor>,
        context: Option<&ActivationContext>,
        namespace: &str,
        lookahead: bool,
    ) -> Result<Arc<Self>> {
        let sources: Vec<Arc<dyn PropertySource>> = self.property_source.iter().cloned().collect();
        let mut resolver = ContributorPlaceholderResolver::new(
            Arc::clone(root),
            context.cloned(),
            Some(Arc::clone(self)),
            true,
        );
        if lookahead {
            resolver = resolver.with_unbound_lookahead(namespace);
        }
        let binder = Binder::new(sources).with_placeholders(Arc::new(resolver));
        throw_if_legacy_processing_requested(&binder, namespace)?;
        let mut properties = ConfigDataProperties::get(&binder, namespace)?;
        if self.has_option(ConfigDataOption::IgnoreImports) {
            properties = properties.map(|p| p.without_imports());
        }
        let mut bound = Self::clone(self);
        bound.kind = ContributorKind::BoundImport;
        bound.properties = properties;
        bound.children = PhaseChildren::default();
        Ok(Arc::new(bound))
    }

    /// Returns a copy with `children` recorded for `phase`.
    ///
    /// Recording after-profile children moves profile-specific grandchildren
    /// out of the before-profile children into the after-profile list.
    pub fn with_children(&self, phase: ImportPhase, children: Vec<Arc<Contributor>>) -> Self {
        let mut updated = self.children.clone();
        updated.set(phase, children);
        if phase == ImportPhase::AfterProfileActivation {
            move_profile_specific(&mut updated);
        }
        let mut copy = self.clone();
        copy.children = updated;
        copy
    }

    /// Returns a tree where `existing` is replaced by `replacement`.
    ///
    /// Nodes are matched by identity. Only the path from this node down to the
    /// replaced node is copied.
    pub fn with_replacement(
        self: &Arc<Self>,
        existing: &Arc<Contributor>,
        replacement: &Arc<Contributor>,
    ) -> Arc<Self> {
        if Arc::ptr_eq(self, existing) {
            return Arc::clone(replacement);
        }
        if self.children.len() == 0 {
            return Arc::clone(self);
        }
        let replace_all = |children: &Option<Children>| {
            children.as_ref().map(|children| {
                children
                    .iter()
                    .map(|child| child.with_replacement(existing, replacement))
                    .collect::<Children>()
            })
        };
        let before = replace_all(&self.children.before);
        let after = replace_all(&self.children.after);
        let unchanged = |old: &Option<Children>, new: &Option<Children>| match (old, new) {
            (Some(old), Some(new)) => old.iter().zip(new).all(|(a, b)| Arc::ptr_eq(a, b)),
            _ => true,
        };
        if unchanged(&self.children.before, &before) && unchanged(&self.children.after, &after) {
            return Arc::clone(self);
        }
        let mut copy = Self::clone(self);
        copy.children = PhaseChildren { before, after };
        Arc::new(copy)
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}{:?}", "", self.kind, indent = depth * 4)?;
        if let Some(location) = &self.location {
            write!(f, " {}", location)?;
        }
        if let Some(resource) = &self.resource {
            write!(f, " {}", resource)?;
        }
        writeln!(f)?;
        for phase in ImportPhase::ALL {
            for child in self.children(phase) {
                child.fmt_tree(f, depth + 1)?;
            }
        }
        Ok(())
    }
}

fn collect(node: &Arc<Contributor>, out: &mut Vec<Arc<Contributor>>) {
    for phase in [ImportPhase::AfterProfileActivation, ImportPhase::BeforeProfileActivation] {
        for child in node.children(phase) {
            collect(child, out);
        }
    }
    out.push(Arc::clone(node));
}

fn move_profile_specific(children: &mut PhaseChildren) {
    let Some(before) = children.before.as_ref() else {
        return;
    };
    if !has_any_profile_specific_children(before) {
        return;
    }
    let mut updated_after = Vec::new();
    let updated_before: Children = before
        .iter()
        .map(|contributor| move_profile_specific_children(contributor, &mut updated_after))
        .collect();
    if let Some(after) = children.after.take() {
        updated_after.extend(after);
    }
    children.before = Some(updated_before);
    children.after = Some(updated_after);
}

fn move_profile_specific_children(contributor: &Arc<Contributor>, removed: &mut Children) -> Arc<Contributor> {
    let mut current = Contributor::clone(contributor);
    for phase in ImportPhase::ALL {
        let mut kept = Vec::new();
        for child in current.children(phase) {
            if child.has_option(ConfigDataOption::ProfileSpecific) {
                removed.push(Arc::new(child.without_option(ConfigDataOption::ProfileSpecific)));
            } else {
                kept.push(Arc::clone(child));
            }
        }
        current = current.with_children(phase, kept);
    }
    Arc::new(current)
}

fn has_any_profile_specific_children(contributors: &[Arc<Contributor>]) -> bool {
    contributors.iter().any(|contributor| {
        ImportPhase::ALL.iter().any(|phase| {
            contributor
                .children(*phase)
                .iter()
                .any(|child| child.has_option(ConfigDataOption::ProfileSpecific))
        })
    })
}

impl fmt::Debug for Contributor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contributor")
            .field("kind", &self.kind)
            .field("location", &self.location)
            .field("resource", &self.resource)
            .field("source", &self.property_source.as_ref().map(|s| s.name().to_string()))
            .field("options", &self.options)
            .field("children", &self.children.len())
            .finish()
    }
}

impl fmt::Display for Contributor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}
