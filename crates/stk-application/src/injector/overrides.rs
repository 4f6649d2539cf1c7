//! Override Layer
//!
//! Per-injector shadow entries consulted before the base registry. The base
//! registry is never mutated; dropping the injector drops its overrides.

use std::collections::HashMap;

use stk_domain::error::{Error, Result};

use crate::registry::Provider;

/// Shadow providers owned by exactly one injector
#[derive(Debug, Default)]
pub struct OverrideLayer {
    shadows: HashMap<String, Provider>,
}

impl OverrideLayer {
    /// Install a shadow entry
    ///
    /// `instantiated` reports whether the owning injector already cached the
    /// name; shadowing a cached name would leave a stale instance behind.
    pub fn shadow(&mut self, provider: Provider, instantiated: bool) -> Result<()> {
        if instantiated {
            return Err(Error::late_override(provider.name()));
        }
        self.shadows.insert(provider.name().to_string(), provider);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Provider> {
        self.shadows.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.shadows.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.shadows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shadows.is_empty()
    }
}
