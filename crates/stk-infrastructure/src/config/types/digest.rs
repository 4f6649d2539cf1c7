//! Digest engine configuration types

use serde::{Deserialize, Serialize};
use stk_domain::constants::DEFAULT_DIGEST_TTL;

/// Digest engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    /// Dirty passes a single digest may perform before failing
    pub ttl: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_DIGEST_TTL,
        }
    }
}
