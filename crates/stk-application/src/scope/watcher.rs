//! Watchers and their deregistration handles

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;

use super::{Scope, ScopeNode};

type Expression = Box<dyn Fn(&Scope) -> Value>;
type Listener = Box<dyn Fn(&Value, &Value, &Scope)>;

/// An (expression, listener) pair evaluated on each digest pass
pub(crate) struct Watcher {
    label: String,
    expression: Expression,
    listener: Listener,
    /// `None` until the first evaluation; never equal to a real value
    last: RefCell<Option<Value>>,
    active: Cell<bool>,
}

impl Watcher {
    pub(crate) fn new<E, L>(label: String, expression: E, listener: L) -> Self
    where
        E: Fn(&Scope) -> Value + 'static,
        L: Fn(&Value, &Value, &Scope) + 'static,
    {
        Self {
            label,
            expression: Box::new(expression),
            listener: Box::new(listener),
            last: RefCell::new(None),
            active: Cell::new(true),
        }
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.get()
    }

    pub(crate) fn deactivate(&self) {
        self.active.set(false);
    }

    /// Evaluate against `scope`; on change record the value and notify.
    ///
    /// Returns whether the listener ran.
    pub(crate) fn check(&self, scope: &Scope) -> bool {
        let current = (self.expression)(scope);
        if self.last.borrow().as_ref() == Some(&current) {
            return false;
        }
        let previous = self.last.replace(Some(current.clone()));
        let old = previous.as_ref().unwrap_or(&current);
        (self.listener)(&current, old, scope);
        true
    }
}

/// Handle returned by [`Scope::watch`]; removes the watcher when deregistered
#[derive(Clone)]
pub struct WatchHandle {
    scope: Weak<ScopeNode>,
    watcher: Weak<Watcher>,
}

impl WatchHandle {
    pub(crate) fn new(scope: Weak<ScopeNode>, watcher: Weak<Watcher>) -> Self {
        Self { scope, watcher }
    }

    /// Stop the watcher from firing and drop it from its scope. Idempotent.
    pub fn deregister(&self) {
        let Some(watcher) = self.watcher.upgrade() else {
            return;
        };
        watcher.deactivate();
        if let Some(node) = self.scope.upgrade() {
            Scope::remove_watcher(&node, &watcher);
        }
    }

    /// Whether the watcher can still fire
    pub fn is_active(&self) -> bool {
        self.watcher.upgrade().is_some_and(|w| w.is_active())
    }
}

impl fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.watcher.upgrade().map(|w| w.label().to_string());
        f.debug_struct("WatchHandle")
            .field("label", &label)
            .field("active", &self.is_active())
            .finish()
    }
}
