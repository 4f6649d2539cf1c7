//! Configuration
//!
//! Layered loading (defaults, `stk.toml`, `STK__` environment variables)
//! through figment, plus a builder for programmatic setups.

pub mod loader;
pub mod types;

pub use loader::{ConfigBuilder, ConfigLoader};
pub use types::{AppConfig, DigestConfig, LoggingConfig};
