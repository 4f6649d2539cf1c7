//! Injector
//!
//! Resolves names against overrides, the registry snapshot and the built-in
//! providers, in that order. Producers run lazily on first request and their
//! results are cached for the lifetime of the injector.
//!
//! ## Resolution
//!
//! ```text
//! resolve("greeter")
//!   cache hit? ──► return
//!   on stack?  ──► CircularDependency
//!   push "greeter"
//!     resolve each declared dependency (recursively)
//!     run producer with dependencies in declared order
//!   pop, cache
//! ```

pub mod overrides;

pub use overrides::OverrideLayer;

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use stk_domain::error::{Error, Result};
use tracing::debug;

use crate::registry::{
    BuiltinContext, Instance, Producer, Provider, RegistrySnapshot, Resolved, downcast,
    find_builtin_provider, provider::Recipe,
};

/// Explicit values supplied to a single [`Injector::invoke`] call
///
/// Locals take precedence over overrides and the registry and are never
/// cached.
#[derive(Clone, Default)]
pub struct Locals {
    values: HashMap<String, Instance>,
}

impl Locals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a local value
    pub fn with<T: 'static>(self, name: impl Into<String>, value: T) -> Self {
        self.with_instance(name, Rc::new(value))
    }

    /// Add an already shared instance
    pub fn with_instance(mut self, name: impl Into<String>, instance: Instance) -> Self {
        self.values.insert(name.into(), instance);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Locals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

/// A function with declared parameter names, run through [`Injector::invoke`]
#[derive(Clone)]
pub struct Invokable {
    dependencies: Vec<String>,
    body: Producer,
}

impl Invokable {
    pub fn new<I, S, F>(dependencies: I, body: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Resolved) -> Result<Instance> + 'static,
    {
        Self {
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            body: Rc::new(body),
        }
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

impl fmt::Debug for Invokable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invokable")
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

enum Source {
    Declared(Provider),
    Builtin(fn(&BuiltinContext) -> Result<Instance>),
}

/// Per-test resolver and singleton cache
pub struct Injector {
    registry: RegistrySnapshot,
    overrides: OverrideLayer,
    cache: HashMap<String, Instance>,
    resolving: Vec<String>,
    context: BuiltinContext,
}

impl Injector {
    /// Create an injector with the default digest bound
    pub fn new(registry: RegistrySnapshot) -> Self {
        Self::with_context(registry, BuiltinContext::default())
    }

    /// Create an injector whose root scope uses `ttl` as its digest bound
    pub fn with_digest_ttl(registry: RegistrySnapshot, ttl: usize) -> Self {
        Self::with_context(registry, BuiltinContext { digest_ttl: ttl })
    }

    pub fn with_context(registry: RegistrySnapshot, context: BuiltinContext) -> Self {
        Self {
            registry,
            overrides: OverrideLayer::default(),
            cache: HashMap::new(),
            resolving: Vec::new(),
            context,
        }
    }

    /// Resolve a set of names, returning them in request order
    pub fn resolve<I, S>(&mut self, names: I) -> Result<Resolved>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names.into_iter();
        let mut resolved = Resolved::with_capacity(names.size_hint().0);
        for name in names {
            let name = name.as_ref();
            let instance = self.instance(name)?;
            resolved.push(name, instance);
        }
        Ok(resolved)
    }

    /// Resolve a single name to its shared instance
    pub fn instance(&mut self, name: &str) -> Result<Instance> {
        if let Some(instance) = self.cache.get(name) {
            return Ok(Rc::clone(instance));
        }
        if self.resolving.iter().any(|n| n == name) {
            return Err(Error::circular_dependency(name, &self.resolving));
        }
        let source = self
            .lookup(name)
            .ok_or_else(|| Error::unknown_provider(name, &self.resolving))?;

        self.resolving.push(name.to_string());
        let result = self.instantiate(name, source);
        self.resolving.pop();

        let instance = result?;
        self.cache.insert(name.to_string(), Rc::clone(&instance));
        Ok(instance)
    }

    /// Resolve a single name and downcast it
    pub fn get<T: 'static>(&mut self, name: &str) -> Result<Rc<T>> {
        let instance = self.instance(name)?;
        downcast(name, &instance)
    }

    /// Run `invokable`, resolving each declared parameter from `locals` first
    /// and from the injector otherwise
    pub fn invoke(&mut self, invokable: &Invokable, locals: &Locals) -> Result<Instance> {
        let mut resolved = Resolved::with_capacity(invokable.dependencies.len());
        for name in &invokable.dependencies {
            let instance = match locals.get(name) {
                Some(local) => Rc::clone(local),
                None => self.instance(name)?,
            };
            resolved.push(name, instance);
        }
        (invokable.body)(&resolved)
    }

    /// Shadow a provider for this injector only
    ///
    /// Fails with [`Error::LateOverride`] once the name has been instantiated.
    pub fn override_provider(&mut self, provider: Provider) -> Result<()> {
        let instantiated = self.is_instantiated(provider.name());
        let (name, kind) = (provider.name().to_string(), provider.kind());
        self.overrides.shadow(provider, instantiated)?;
        debug!(name, ?kind, "Provider overridden");
        Ok(())
    }

    /// Shadow a provider with a pre-built value
    pub fn override_value<T: 'static>(&mut self, name: impl Into<String>, value: T) -> Result<()> {
        self.override_provider(Provider::value(name, value))
    }

    /// Whether `name` can be resolved (without instantiating it)
    pub fn has(&self, name: &str) -> bool {
        self.cache.contains_key(name) || self.lookup(name).is_some()
    }

    /// Whether `name` has already been instantiated and cached
    pub fn is_instantiated(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    pub fn overrides(&self) -> &OverrideLayer {
        &self.overrides
    }

    pub fn context(&self) -> BuiltinContext {
        self.context
    }

    fn lookup(&self, name: &str) -> Option<Source> {
        self.overrides
            .get(name)
            .or_else(|| self.registry.get(name))
            .cloned()
            .map(Source::Declared)
            .or_else(|| find_builtin_provider(name).map(|entry| Source::Builtin(entry.factory)))
    }

    fn instantiate(&mut self, name: &str, source: Source) -> Result<Instance> {
        match source {
            Source::Builtin(factory) => {
                debug!(name, "Instantiating built-in provider");
                factory(&self.context)
            }
            Source::Declared(provider) => match provider.recipe() {
                Recipe::Value(instance) => Ok(Rc::clone(instance)),
                Recipe::Factory(producer) => {
                    let producer = Rc::clone(producer);
                    let dependencies = self.resolve(provider.dependencies())?;
                    debug!(
                        name,
                        dependencies = ?provider.dependencies(),
                        "Instantiating provider"
                    );
                    producer(&dependencies)
                }
            },
        }
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cached: Vec<&str> = self.cache.keys().map(String::as_str).collect();
        cached.sort_unstable();
        f.debug_struct("Injector")
            .field("registry", &self.registry)
            .field("overrides", &self.overrides)
            .field("cached", &cached)
            .field("resolving", &self.resolving)
            .finish()
    }
}
