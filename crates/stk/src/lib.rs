//! # Scope Test Kit
//!
//! Runtime support for unit-testing code written against a
//! dependency-injected, dirty-checked scope model.
//!
//! ## Features
//!
//! - **Registry and Injector**: named providers with explicit dependency
//!   lists, lazy singletons, cycle detection with full paths
//! - **Override Layer**: per-test shadowing that never touches the registry
//! - **Scope Tree and Digest Engine**: watchers evaluated only inside
//!   `digest`, with a bounded number of dirty passes
//! - **Mock Transport**: scripted HTTP responses released on `flush`
//!
//! ## Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use serde_json::json;
//! use stk::{Registry, TestBed};
//!
//! let mut registry = Registry::new();
//! registry.value("visitor", json!({}))?;
//!
//! let mut bed = TestBed::new(registry.snapshot())?;
//! bed.override_value("visitor", json!({ "country": "UK" }))?;
//!
//! let backend = bed.http_backend()?;
//! backend.expect("POST", "/people", json!({ "name": "Ben" })).respond(200, json!(null));
//! let promise = backend.request("POST", "/people", Some(json!({ "name": "Ben" })))?;
//! backend.flush()?;
//! assert!(promise.value().is_some());
//! bed.teardown()?;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - errors, constants, transport value objects, host ports
//! - `application` - registry, injector, scopes, digest engine, promises
//! - `infrastructure` - mocks, test bed, configuration, logging

/// Domain layer - errors, constants and value objects
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use stk_domain::*;
}

/// Application layer - injection and dirty checking
///
/// Re-exports from the application crate for convenience
pub mod application {
    pub use stk_application::*;
}

/// Infrastructure layer - mocks, test bed, config and logging
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use stk_infrastructure::*;
}

// Re-export commonly used types at the crate root
pub use domain::{Error, Result, Value};

pub use application::{
    Binding, Deferred, DigestReport, Injector, Instance, Invokable, Locals, Promise,
    PromiseState, Provider, Registry, RegistrySnapshot, Resolved, Scope, WatchHandle,
};

pub use domain::value_objects::{BodyMatcher, HttpMethod, Response, UrlMatcher};

pub use infrastructure::{
    AppConfig, ConfigBuilder, ConfigLoader, MockTimeout, MockTransport, SimulatedClock, TestBed,
};
