//! # Scope Test Kit - Application Layer
//!
//! The engine proper. Everything here is single-threaded and synchronous:
//! shared state lives behind `Rc`/`RefCell` and nothing runs unless a caller
//! asks for it.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`registry`] | Provider declarations, immutable snapshots, built-in injectables |
//! | [`injector`] | Lazy resolution, singleton cache, override layer, locals |
//! | [`scope`] | Scope tree, watchers, text bindings |
//! | [`digest`] | Dirty-checking loop with a bounded iteration count |
//! | [`promise`] | Deferred values settled by mock backends |

pub mod digest;
pub mod injector;
pub mod promise;
pub mod registry;
pub mod scope;

pub use digest::{DigestEngine, DigestPhase, DigestReport};
pub use injector::{Injector, Invokable, Locals, OverrideLayer};
pub use promise::{Deferred, Promise, PromiseState};
pub use registry::{Instance, Provider, ProviderKind, Registry, RegistrySnapshot, Resolved};
pub use scope::{Binding, Scope, ScopeId, WatchHandle};
