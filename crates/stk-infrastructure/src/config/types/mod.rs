//! Configuration types module

pub mod app;
pub mod digest;
pub mod logging;

// Re-export main types
pub use app::AppConfig;
pub use digest::DigestConfig;
pub use logging::LoggingConfig;
