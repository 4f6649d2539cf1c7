//! Text bindings
//!
//! A binding stands in for an interpolated text node: until a digest
//! evaluates it, it renders its raw source text.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use super::{Scope, WatchHandle};

/// Rendered text of an expression, refreshed by digests
pub struct Binding {
    source: String,
    rendered: Rc<RefCell<String>>,
    handle: WatchHandle,
}

impl Binding {
    pub(crate) fn new<E>(scope: &Scope, source: String, expression: E) -> Self
    where
        E: Fn(&Scope) -> Value + 'static,
    {
        let rendered = Rc::new(RefCell::new(source.clone()));
        let target = Rc::clone(&rendered);
        let handle = scope.watch(source.clone(), expression, move |value, _, _| {
            *target.borrow_mut() = render(value);
        });
        Self {
            source,
            rendered,
            handle,
        }
    }

    /// The unevaluated expression text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Current text: the source until the first digest, the value afterwards
    pub fn rendered(&self) -> String {
        self.rendered.borrow().clone()
    }

    /// Stop refreshing; the last rendering is kept
    pub fn unbind(&self) {
        self.handle.deregister();
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("source", &self.source)
            .field("rendered", &self.rendered())
            .finish()
    }
}

/// Strings render raw, `null` renders empty, everything else as JSON
fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
