//! Section registry and module-map loading.
//!
//! Sections register as factories keyed by name; discovery resolves declared
//! kebab-case names against the registry through the naming strategies.
//! Hosts that pre-load implementation modules can derive the registry from
//! their module identifiers instead of registering by hand.

use std::collections::HashMap;
use std::sync::Arc;

use crate::naming::pascal_to_kebab_case;
use crate::node::SectionNode;
use crate::result::{RevelarError, RevelarResult};
use crate::section::Section;

/// Factory constructing a fresh behavior for a discovered node.
pub type SectionFactory = Arc<dyn Fn(SectionNode) -> Box<dyn Section> + Send + Sync>;

/// Name → factory registry.
#[derive(Default, Clone)]
pub struct SectionRegistry {
    map: HashMap<String, SectionFactory>,
}

impl SectionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name` (chainable).
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(SectionNode) -> Box<dyn Section> + Send + Sync + 'static,
    {
        self.register_factory(name, Arc::new(factory))
    }

    /// Register a pre-built factory under `name` (chainable).
    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        factory: SectionFactory,
    ) -> &mut Self {
        self.map.insert(name.into(), factory);
        self
    }

    /// Look up a factory by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<SectionFactory> {
        self.map.get(name).cloned()
    }

    /// Whether a factory is registered under `name`.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl std::fmt::Debug for SectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.map.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("SectionRegistry")
            .field("names", &names)
            .finish()
    }
}

/// Filters applied while loading a module map.
#[derive(Default)]
pub struct ModuleFilter {
    name_transform: Option<Box<dyn Fn(&str) -> String + Send + Sync>>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

impl ModuleFilter {
    /// No filtering, default name derivation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the default identifier → name derivation.
    #[must_use]
    pub fn with_name_transform(
        mut self,
        transform: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.name_transform = Some(Box::new(transform));
        self
    }

    /// Only load these module identifiers.
    #[must_use]
    pub fn with_include(mut self, include: Vec<String>) -> Self {
        self.include = Some(include);
        self
    }

    /// Skip these module identifiers.
    #[must_use]
    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = Some(exclude);
        self
    }

    fn admits(&self, ident: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.iter().any(|name| name == ident) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.iter().any(|name| name == ident) {
                return false;
            }
        }
        true
    }

    fn derive_name(&self, ident: &str) -> String {
        match &self.name_transform {
            Some(transform) => transform(ident),
            None => pascal_to_kebab_case(ident),
        }
    }
}

impl std::fmt::Debug for ModuleFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleFilter")
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field("name_transform", &self.name_transform.is_some())
            .finish()
    }
}

/// Build a registry from pre-loaded implementation modules.
///
/// Each entry pairs a module identifier (conventionally the PascalCase type
/// name, e.g. `"CardGridSection"`) with its factory. The declared section
/// name is derived by stripping the `Section` suffix and kebab-casing, or by
/// the filter's custom transform.
#[must_use]
pub fn load_sections_from_modules<I>(modules: I, filter: &ModuleFilter) -> SectionRegistry
where
    I: IntoIterator<Item = (String, SectionFactory)>,
{
    let mut registry = SectionRegistry::new();
    for (ident, factory) in modules {
        if !filter.admits(&ident) {
            tracing::debug!(module = %ident, "module filtered out of section registry");
            continue;
        }
        let name = filter.derive_name(&ident);
        registry.register_factory(name, factory);
    }
    registry
}

/// Removed path-based section discovery.
///
/// Always fails: path scanning must happen in host build tooling, which then
/// passes the pre-loaded modules to [`load_sections_from_modules`].
///
/// # Errors
///
/// Always returns [`RevelarError::SectionsPathRemoved`].
#[deprecated(note = "pre-load modules and use `load_sections_from_modules` instead")]
pub fn load_sections_from_path(_path: &str) -> RevelarResult<SectionRegistry> {
    Err(RevelarError::SectionsPathRemoved)
}
