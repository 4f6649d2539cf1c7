//! Provider Registry
//!
//! Declarations of injectable capabilities keyed by name. A [`Registry`] is
//! mutable while a suite assembles it; an [`Injector`](crate::Injector)
//! consumes an immutable [`RegistrySnapshot`] so later registrations never
//! leak into running tests.
//!
//! ```text
//! Registry::register ──► snapshot() ──► Injector (overrides → snapshot → built-ins)
//! ```

pub mod builtin;
pub mod provider;

pub use builtin::{
    BUILTIN_PROVIDERS, BuiltinContext, BuiltinProviderEntry, find_builtin_provider,
    list_builtin_providers,
};
pub use provider::{Instance, Producer, Provider, ProviderKind, Resolved, downcast};

use std::collections::HashMap;
use std::rc::Rc;

use stk_domain::error::{Error, Result};
use tracing::debug;

/// Mutable collection of provider declarations
#[derive(Default, Clone)]
pub struct Registry {
    providers: HashMap<String, Provider>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider
    ///
    /// Fails with [`Error::DuplicateProvider`] if the name is taken.
    pub fn register(&mut self, provider: Provider) -> Result<&mut Self> {
        if self.providers.contains_key(provider.name()) {
            return Err(Error::duplicate_provider(provider.name()));
        }
        debug!(name = provider.name(), kind = ?provider.kind(), "Provider registered");
        self.providers.insert(provider.name().to_string(), provider);
        Ok(self)
    }

    /// Register a pre-built value
    pub fn value<T: 'static>(&mut self, name: impl Into<String>, value: T) -> Result<&mut Self> {
        self.register(Provider::value(name, value))
    }

    /// Register a constant; behaves exactly like [`Registry::value`]
    pub fn constant<T: 'static>(
        &mut self,
        name: impl Into<String>,
        value: T,
    ) -> Result<&mut Self> {
        self.register(Provider::value(name, value))
    }

    /// Register a factory with explicit, ordered dependencies
    pub fn factory<I, S, F>(
        &mut self,
        name: impl Into<String>,
        dependencies: I,
        producer: F,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Resolved) -> Result<Instance> + 'static,
    {
        self.register(Provider::factory(name, dependencies, producer))
    }

    /// Whether a provider is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Freeze the current declarations
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            providers: Rc::new(self.providers.clone()),
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("providers", &self.names())
            .finish()
    }
}

/// Immutable, cheaply clonable view of a [`Registry`]
#[derive(Clone, Default)]
pub struct RegistrySnapshot {
    providers: Rc<HashMap<String, Provider>>,
}

impl RegistrySnapshot {
    /// Look up a provider
    pub fn get(&self, name: &str) -> Option<&Provider> {
        self.providers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Snapshotted names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for RegistrySnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrySnapshot")
            .field("providers", &self.names())
            .finish()
    }
}
