//! # Resolver Module
//!
//! Maps a dependency identifier to a loader.
//!
//! Resolution is where "is this optional module part of the build at all"
//! gets answered. A registry only holds constructors; a loader is created
//! (and its resource initialized) when its identifier is first resolved.

use crate::loader::NativeLoader;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Builds a loader on demand.
pub type LoaderConstructor = Arc<dyn Fn() -> Arc<dyn NativeLoader> + Send + Sync>;

/// Something that can locate a loader by identifier.
pub trait LoaderResolver {
    /// Return a freshly initialized loader, or `None` if the dependency is absent.
    fn resolve(&self, dependency: &str) -> Option<Arc<dyn NativeLoader>>;
}

// =============================================================================
// LOADER REGISTRY
// =============================================================================

/// Registry of loader constructors keyed by dependency identifier.
///
/// Uses BTreeMap so `dependencies()` lists identifiers in a stable order.
#[derive(Clone, Default)]
pub struct LoaderRegistry {
    constructors: BTreeMap<String, LoaderConstructor>,
}

impl LoaderRegistry {
    /// Create an empty registry. Every dependency resolves as missing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry of the loaders compiled into this build.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        crate::brotli::register(&mut registry);
        registry
    }

    /// Register (or replace) the constructor for `dependency`.
    pub fn register<F>(&mut self, dependency: impl Into<String>, constructor: F)
    where
        F: Fn() -> Arc<dyn NativeLoader> + Send + Sync + 'static,
    {
        self.constructors
            .insert(dependency.into(), Arc::new(constructor));
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with<F>(mut self, dependency: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Arc<dyn NativeLoader> + Send + Sync + 'static,
    {
        self.register(dependency, constructor);
        self
    }

    /// Whether a constructor is registered for `dependency`.
    #[must_use]
    pub fn contains(&self, dependency: &str) -> bool {
        self.constructors.contains_key(dependency)
    }

    /// Registered identifiers, in sorted order.
    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}

impl LoaderResolver for LoaderRegistry {
    fn resolve(&self, dependency: &str) -> Option<Arc<dyn NativeLoader>> {
        self.constructors.get(dependency).map(|construct| construct())
    }
}

impl fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("dependencies", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
