//! Infrastructure constants

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "stk.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "stk";

/// Environment variable prefix for configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "STK";

/// Separator between nested keys in environment variable names
pub const CONFIG_ENV_SEPARATOR: &str = "__";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable holding an `EnvFilter` directive
pub const LOG_FILTER_ENV: &str = "STK_LOG";

/// File name stem used when the configured log path has none
pub const DEFAULT_LOG_FILE_STEM: &str = "stk";
