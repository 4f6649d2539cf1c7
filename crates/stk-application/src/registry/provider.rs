//! Provider declarations and resolved dependency sets

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use stk_domain::error::{Error, Result};

/// Live, type-erased capability produced by a provider
pub type Instance = Rc<dyn Any>;

/// Factory closure; receives its dependencies in declared order
pub type Producer = Rc<dyn Fn(&Resolved) -> Result<Instance>>;

/// How a provider yields its instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Pre-built instance, handed out as-is
    Value,
    /// Built on first request by running a producer
    Factory,
}

/// Pre-built instance or producer closure
#[derive(Clone)]
pub(crate) enum Recipe {
    Value(Instance),
    Factory(Producer),
}

/// Named recipe for an injectable capability
///
/// Dependencies are an explicit ordered list of names; nothing is inferred
/// from the producer itself.
#[derive(Clone)]
pub struct Provider {
    name: String,
    dependencies: Vec<String>,
    recipe: Recipe,
}

impl Provider {
    /// Provider handing out a pre-built value
    pub fn value<T: 'static>(name: impl Into<String>, value: T) -> Self {
        Self::instance(name, Rc::new(value))
    }

    /// Provider handing out an already shared instance
    pub fn instance(name: impl Into<String>, instance: Instance) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            recipe: Recipe::Value(instance),
        }
    }

    /// Provider building its instance lazily from resolved dependencies
    pub fn factory<I, S, F>(name: impl Into<String>, dependencies: I, producer: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Resolved) -> Result<Instance> + 'static,
    {
        Self {
            name: name.into(),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            recipe: Recipe::Factory(Rc::new(producer)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ProviderKind {
        match self.recipe {
            Recipe::Value(_) => ProviderKind::Value,
            Recipe::Factory(_) => ProviderKind::Factory,
        }
    }

    /// Declared dependency names, in parameter order
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// How the instance is obtained
    pub(crate) fn recipe(&self) -> &Recipe {
        &self.recipe
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Ordered name → instance mapping handed to producers and returned by
/// [`Injector::resolve`](crate::Injector::resolve)
#[derive(Clone, Default)]
pub struct Resolved {
    entries: Vec<(String, Instance)>,
}

impl Resolved {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, name: &str, instance: Instance) {
        self.entries.push((name.to_string(), instance));
    }

    /// Type-erased instance by name
    pub fn instance(&self, name: &str) -> Option<&Instance> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, instance)| instance)
    }

    /// Typed instance by name
    pub fn get<T: 'static>(&self, name: &str) -> Result<Rc<T>> {
        let instance = self
            .instance(name)
            .ok_or_else(|| Error::unknown_provider(name, &[]))?;
        downcast(name, instance)
    }

    /// Typed instance by declared position
    pub fn at<T: 'static>(&self, index: usize) -> Result<Rc<T>> {
        let (name, instance) = self
            .entries
            .get(index)
            .ok_or_else(|| Error::unknown_provider(format!("#{index}"), &[]))?;
        downcast(name, instance)
    }

    /// Names in resolution order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Downcast a shared instance, reporting the provider name on mismatch
pub fn downcast<T: 'static>(name: &str, instance: &Instance) -> Result<Rc<T>> {
    Rc::clone(instance)
        .downcast::<T>()
        .map_err(|_| Error::type_mismatch::<T, _>(name))
}
