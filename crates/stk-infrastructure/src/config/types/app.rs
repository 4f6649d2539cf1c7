//! Root configuration type

use serde::{Deserialize, Serialize};

use super::{DigestConfig, LoggingConfig};

/// Main kit configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Digest engine configuration
    pub digest: DigestConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}
