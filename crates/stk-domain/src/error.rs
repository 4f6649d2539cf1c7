//! Error handling types
//!
//! Every failure in the kit is a programmer error that must fail the current
//! test at the point of violation. Nothing here is retried or downgraded.

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Scope Test Kit
#[derive(Error, Debug)]
pub enum Error {
    /// A provider with the same name is already registered
    #[error("Duplicate provider: '{name}' is already registered")]
    DuplicateProvider {
        /// Name of the provider being registered twice
        name: String,
    },

    /// No provider (and no local) exists for a requested name
    #[error("Unknown provider: {path}")]
    UnknownProvider {
        /// The name that could not be resolved
        name: String,
        /// Resolution path leading to the missing name (`missing <- requester <- ...`)
        path: String,
    },

    /// A provider depends on itself, directly or transitively
    #[error("Circular dependency found: {path}")]
    CircularDependency {
        /// The name found twice on the resolution stack
        name: String,
        /// Full cycle, innermost first (`a <- b <- a`)
        path: String,
    },

    /// Override requested after the injector already instantiated the name
    #[error("Late override: '{name}' was already instantiated by this injector")]
    LateOverride {
        /// Name of the shadowed provider
        name: String,
    },

    /// A resolved instance does not have the requested concrete type
    #[error("Provider type mismatch: '{name}' is not a {expected}")]
    ProviderTypeMismatch {
        /// Name of the provider
        name: String,
        /// Requested Rust type
        expected: &'static str,
    },

    /// A factory producer failed while building its instance
    #[error("Provider '{name}' failed: {message}")]
    Producer {
        /// Name of the provider whose producer failed
        name: String,
        /// Description of the failure
        message: String,
    },

    /// Watchers kept changing past the configured iteration bound
    #[error(
        "{ttl} digest iterations reached without stabilizing (scope {scope_id}, {watchers} watcher(s) fired in last pass: {recent})"
    )]
    DigestConvergence {
        /// Configured iteration bound
        ttl: usize,
        /// Scope owning the last watcher that fired
        scope_id: u64,
        /// Number of listener invocations in the last pass
        watchers: usize,
        /// Labels of the watchers that fired in the last pass
        recent: String,
    },

    /// `digest` was re-entered from inside a running digest
    #[error("Digest already in progress on scope {scope_id}")]
    DigestInProgress {
        /// Root scope whose digest is running
        scope_id: u64,
    },

    /// A request arrived that no expectation or definition accepts
    #[error("Unexpected request: {method} {url}{detail}")]
    UnexpectedRequest {
        /// Request method
        method: String,
        /// Request URL
        url: String,
        /// What was expected instead, if anything
        detail: String,
    },

    /// `flush` was called with nothing pending
    #[error("No pending request to flush")]
    NoPendingRequests,

    /// Expectations were declared but never satisfied
    #[error("Unsatisfied requests: {remaining}")]
    UnsatisfiedExpectation {
        /// Number of expectations left in the queue
        count: usize,
        /// Rendering of the outstanding expectations
        remaining: String,
    },

    /// Requests were issued but their responses never released
    #[error("Unflushed requests: {count}")]
    OutstandingRequest {
        /// Number of requests still awaiting `flush`
        count: usize,
    },

    /// A mock timeout flush found nothing to run
    #[error("No deferred tasks to be flushed")]
    NoPendingTasks,

    /// Deferred tasks remain scheduled at verification time
    #[error("Deferred tasks remain: {count}")]
    PendingTasks {
        /// Number of tasks still scheduled
        count: usize,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

// Registration and resolution error creation methods
impl Error {
    /// Create a duplicate provider error
    pub fn duplicate_provider<S: Into<String>>(name: S) -> Self {
        Self::DuplicateProvider { name: name.into() }
    }

    /// Create an unknown provider error from the resolution path
    ///
    /// `path` is ordered outermost first, as it sits on the resolution stack;
    /// the rendered path starts at the missing name.
    pub fn unknown_provider<S: Into<String>>(name: S, path: &[String]) -> Self {
        let name = name.into();
        let path = render_path(
            std::iter::once(name.as_str()).chain(path.iter().rev().map(String::as_str)),
        );
        Self::UnknownProvider { name, path }
    }

    /// Create a circular dependency error from the resolution stack
    pub fn circular_dependency<S: Into<String>>(name: S, stack: &[String]) -> Self {
        let name = name.into();
        let start = stack.iter().position(|n| *n == name).unwrap_or(0);
        let path = render_path(
            std::iter::once(name.as_str()).chain(stack[start..].iter().rev().map(String::as_str)),
        );
        Self::CircularDependency { name, path }
    }

    /// Create a late override error
    pub fn late_override<S: Into<String>>(name: S) -> Self {
        Self::LateOverride { name: name.into() }
    }

    /// Create a type mismatch error for `T`
    pub fn type_mismatch<T: ?Sized, S: Into<String>>(name: S) -> Self {
        Self::ProviderTypeMismatch {
            name: name.into(),
            expected: std::any::type_name::<T>(),
        }
    }

    /// Create a producer failure error
    pub fn producer<S: Into<String>, M: Into<String>>(name: S, message: M) -> Self {
        Self::Producer {
            name: name.into(),
            message: message.into(),
        }
    }
}

// Mock transport error creation methods
impl Error {
    /// Create an unexpected request error
    pub fn unexpected_request<M, U>(method: M, url: U, expected: Option<String>) -> Self
    where
        M: Into<String>,
        U: Into<String>,
    {
        Self::UnexpectedRequest {
            method: method.into(),
            url: url.into(),
            detail: expected
                .map(|e| format!(", expected {e}"))
                .unwrap_or_default(),
        }
    }

    /// Create an unsatisfied expectation error
    pub fn unsatisfied_expectation(remaining: &[String]) -> Self {
        Self::UnsatisfiedExpectation {
            count: remaining.len(),
            remaining: remaining.join(", "),
        }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

fn render_path<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(" <- ")
}
