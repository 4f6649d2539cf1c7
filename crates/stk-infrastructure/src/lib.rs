//! # Scope Test Kit - Infrastructure Layer
//!
//! Test doubles and cross-cutting concerns around the engine.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`transport`] | Scripted HTTP backend released by `flush` |
//! | [`timeout`] | Simulated clock and deferred task scheduler |
//! | [`harness`] | Per-test fixture wiring the mocks into an injector |
//! | [`config`] | Figment-based layered configuration |
//! | [`logging`] | tracing subscriber setup |
//! | [`error_ext`] | Context helpers for foreign errors |

pub mod config;
pub mod constants;
pub mod error_ext;
pub mod harness;
pub mod logging;
pub mod timeout;
pub mod transport;

pub use config::{AppConfig, ConfigBuilder, ConfigLoader};
pub use error_ext::ErrorContext;
pub use harness::TestBed;
pub use timeout::{MockTimeout, SimulatedClock};
pub use transport::{MockTransport, ResponseBuilder, ResponsePromise};
