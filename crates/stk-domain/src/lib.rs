//! # Scope Test Kit - Domain Layer
//!
//! Pure types shared by every layer: the error enum, engine constants,
//! transport value objects and the host environment port.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error enum and `Result` alias |
//! | [`constants`] | Built-in injectable names, digest bounds |
//! | [`value_objects`] | HTTP method, request matchers, responses |
//! | [`ports`] | Host environment abstraction |

pub mod constants;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
pub use serde_json::Value;
