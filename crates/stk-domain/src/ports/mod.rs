//! Ports implemented by the infrastructure layer
//!
//! The engine never touches a real clock or event loop. Hosts supply
//! simulated time and deferred scheduling through these traits.

pub mod host;

pub use host::{HostEnvironment, TaskId, TaskScheduler};
