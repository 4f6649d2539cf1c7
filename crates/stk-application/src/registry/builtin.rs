//! Built-in Provider Registry
//!
//! Injectables every injector knows without registration (the root scope).
//! Entries register themselves via `linkme` distributed slices and are
//! consulted after overrides and the base registry, so a suite can shadow
//! any of them.

use stk_domain::constants::DEFAULT_DIGEST_TTL;
use stk_domain::error::Result;

use super::provider::Instance;

/// Settings available to built-in factories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinContext {
    /// Dirty-pass bound for scopes created by the injector
    pub digest_ttl: usize,
}

impl Default for BuiltinContext {
    fn default() -> Self {
        Self {
            digest_ttl: DEFAULT_DIGEST_TTL,
        }
    }
}

/// Registry entry for built-in providers
pub struct BuiltinProviderEntry {
    /// Injectable name (e.g. `$rootScope`)
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function creating the instance
    pub factory: fn(&BuiltinContext) -> Result<Instance>,
}

#[linkme::distributed_slice]
pub static BUILTIN_PROVIDERS: [BuiltinProviderEntry] = [..];

/// Find a built-in provider by name
pub fn find_builtin_provider(name: &str) -> Option<&'static BuiltinProviderEntry> {
    BUILTIN_PROVIDERS.iter().find(|entry| entry.name == name)
}

/// List all built-in providers as (name, description)
pub fn list_builtin_providers() -> Vec<(&'static str, &'static str)> {
    BUILTIN_PROVIDERS
        .iter()
        .map(|entry| (entry.name, entry.description))
        .collect()
}
