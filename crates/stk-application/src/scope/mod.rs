//! Scope Tree
//!
//! Hierarchical state containers. Each scope owns its children and its
//! watchers; a child holds only a weak back-reference to its parent.
//! Children and watchers keep insertion order, which is the order the digest
//! walks them (parent first, then children depth-first).
//!
//! # Failure Modes
//!
//! - **Destroyed scope**: watchers registered on a destroyed scope never
//!   fire; its children are unreachable from the root.
//! - **Subtree digest**: [`Scope::digest`] on a child only walks that
//!   subtree, but the async queue and the in-progress guard are shared by
//!   the whole tree.

pub mod binding;
pub mod watcher;

pub use binding::Binding;
pub use watcher::WatchHandle;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::{Map, Value};
use stk_domain::constants::ROOT_SCOPE;
use stk_domain::error::Result;
use tracing::debug;

use crate::digest::{DigestEngine, DigestReport};
use crate::registry::{BUILTIN_PROVIDERS, BuiltinContext, BuiltinProviderEntry, Instance};
use watcher::Watcher;

/// Identifier of a scope, unique within its tree (the root is 1)
pub type ScopeId = u64;

type AsyncTask = Box<dyn FnOnce(&Scope)>;

/// State shared by every scope of one tree
pub(crate) struct TreeState {
    pub(crate) engine: DigestEngine,
    next_id: Cell<ScopeId>,
    async_queue: RefCell<VecDeque<(Scope, AsyncTask)>>,
    watchers_added: Cell<bool>,
}

impl TreeState {
    fn allocate_id(&self) -> ScopeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    /// Clear and return the "watcher registered" marker
    pub(crate) fn take_watchers_added(&self) -> bool {
        self.watchers_added.replace(false)
    }

    pub(crate) fn has_async_work(&self) -> bool {
        !self.async_queue.borrow().is_empty()
    }

    /// Run queued tasks until the queue is empty; returns how many ran
    pub(crate) fn drain_async_queue(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.async_queue.borrow_mut().pop_front();
            let Some((scope, task)) = next else {
                return ran;
            };
            task(&scope);
            ran += 1;
        }
    }

    /// Drop queued tasks without running them
    fn clear_async_queue(&self) {
        let queued = std::mem::take(&mut *self.async_queue.borrow_mut());
        drop(queued);
    }
}

pub(crate) struct ScopeNode {
    id: ScopeId,
    tree: Rc<TreeState>,
    parent: RefCell<Weak<ScopeNode>>,
    children: RefCell<Vec<Rc<ScopeNode>>>,
    watchers: RefCell<Vec<Rc<Watcher>>>,
    properties: RefCell<Map<String, Value>>,
    destroyed: Cell<bool>,
}

/// Handle to a node of the scope tree
///
/// Cloning a `Scope` creates a new handle to the **same** node.
#[derive(Clone)]
pub struct Scope {
    node: Rc<ScopeNode>,
}

impl Scope {
    /// Create the root of a new tree whose digests allow `ttl` dirty passes
    pub fn new_root(ttl: usize) -> Self {
        let tree = Rc::new(TreeState {
            engine: DigestEngine::new(ttl),
            next_id: Cell::new(1),
            async_queue: RefCell::new(VecDeque::new()),
            watchers_added: Cell::new(false),
        });
        let id = tree.allocate_id();
        Self::from_node(Rc::new(ScopeNode {
            id,
            tree,
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            watchers: RefCell::new(Vec::new()),
            properties: RefCell::new(Map::new()),
            destroyed: Cell::new(false),
        }))
    }

    fn from_node(node: Rc<ScopeNode>) -> Self {
        Self { node }
    }

    pub fn id(&self) -> ScopeId {
        self.node.id
    }

    pub fn parent(&self) -> Option<Scope> {
        self.node.parent.borrow().upgrade().map(Self::from_node)
    }

    pub fn is_root(&self) -> bool {
        self.node.id == 1
    }

    /// Topmost reachable ancestor (the scope itself once detached)
    pub fn root(&self) -> Scope {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Children in insertion order
    pub fn children(&self) -> Vec<Scope> {
        self.node
            .children
            .borrow()
            .iter()
            .cloned()
            .map(Self::from_node)
            .collect()
    }

    /// Dirty-pass bound of this tree's digests
    pub fn digest_ttl(&self) -> usize {
        self.node.tree.engine.ttl()
    }

    pub fn is_destroyed(&self) -> bool {
        self.node.destroyed.get()
    }

    /// Whether both handles point at the same node
    pub fn same_as(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    /// Allocate a child scope appended after any existing children
    pub fn create_child(&self) -> Scope {
        let child = Rc::new(ScopeNode {
            id: self.node.tree.allocate_id(),
            tree: Rc::clone(&self.node.tree),
            parent: RefCell::new(Rc::downgrade(&self.node)),
            children: RefCell::new(Vec::new()),
            watchers: RefCell::new(Vec::new()),
            properties: RefCell::new(Map::new()),
            destroyed: Cell::new(false),
        });
        self.node.children.borrow_mut().push(Rc::clone(&child));
        debug!(parent = self.id(), child = child.id, "Scope created");
        Self::from_node(child)
    }

    /// Read a property, falling back to ancestors
    pub fn get(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.node.properties.borrow().get(key) {
            return Some(value.clone());
        }
        self.parent().and_then(|parent| parent.get(key))
    }

    /// Write a property on this scope (shadowing any ancestor's)
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.node.properties.borrow_mut().insert(key.into(), value);
    }

    /// Remove a property from this scope only
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.node.properties.borrow_mut().remove(key)
    }

    /// Whether this scope itself (not an ancestor) holds `key`
    pub fn has_own(&self, key: &str) -> bool {
        self.node.properties.borrow().contains_key(key)
    }

    /// Register a watcher
    ///
    /// The expression is never evaluated here; the first digest pass that
    /// reaches it evaluates it and calls the listener with `old == new`.
    pub fn watch<E, L>(&self, label: impl Into<String>, expression: E, listener: L) -> WatchHandle
    where
        E: Fn(&Scope) -> Value + 'static,
        L: Fn(&Value, &Value, &Scope) + 'static,
    {
        let watcher = Rc::new(Watcher::new(label.into(), expression, listener));
        if self.is_destroyed() {
            watcher.deactivate();
        } else {
            self.node.watchers.borrow_mut().push(Rc::clone(&watcher));
            self.node.tree.watchers_added.set(true);
        }
        WatchHandle::new(Rc::downgrade(&self.node), Rc::downgrade(&watcher))
    }

    /// Bind a text rendering of `expression`
    pub fn bind<E>(&self, source: impl Into<String>, expression: E) -> Binding
    where
        E: Fn(&Scope) -> Value + 'static,
    {
        Binding::new(self, source.into(), expression)
    }

    /// Watchers registered on this scope and all descendants
    pub fn watcher_count(&self) -> usize {
        let own = self.node.watchers.borrow().len();
        own + self
            .children()
            .iter()
            .map(Scope::watcher_count)
            .sum::<usize>()
    }

    /// Queue `task` to run at the start of the next digest pass
    pub fn eval_async(&self, task: impl FnOnce(&Scope) + 'static) {
        self.node
            .tree
            .async_queue
            .borrow_mut()
            .push_back((self.clone(), Box::new(task)));
    }

    /// Run `f` against this scope, then digest the whole tree
    pub fn apply(&self, f: impl FnOnce(&Scope)) -> Result<DigestReport> {
        f(self);
        self.root().digest()
    }

    /// Stabilize this scope and its descendants
    pub fn digest(&self) -> Result<DigestReport> {
        let tree = Rc::clone(&self.node.tree);
        tree.engine.run(self, &tree)
    }

    /// Detach from the parent, destroy children, discard watchers
    ///
    /// Idempotent.
    pub fn destroy(&self) {
        if self.node.destroyed.replace(true) {
            return;
        }
        if let Some(parent) = self.node.parent.replace(Weak::new()).upgrade() {
            parent
                .children
                .borrow_mut()
                .retain(|child| !Rc::ptr_eq(child, &self.node));
        }
        let children = std::mem::take(&mut *self.node.children.borrow_mut());
        for child in children {
            Self::from_node(child).destroy();
        }
        let watchers = std::mem::take(&mut *self.node.watchers.borrow_mut());
        for watcher in watchers {
            watcher.deactivate();
        }
        if self.is_root() {
            self.node.tree.clear_async_queue();
        }
        debug!(scope = self.id(), "Scope destroyed");
    }

    /// Watchers of this scope at the moment of the call
    pub(crate) fn watchers_snapshot(&self) -> Vec<Rc<Watcher>> {
        self.node.watchers.borrow().clone()
    }

    pub(crate) fn remove_watcher(node: &Rc<ScopeNode>, watcher: &Rc<Watcher>) {
        node.watchers
            .borrow_mut()
            .retain(|w| !Rc::ptr_eq(w, watcher));
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id())
            .field("properties", &*self.node.properties.borrow())
            .field("watchers", &self.node.watchers.borrow().len())
            .field("children", &self.node.children.borrow().len())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

fn create_root_scope(context: &BuiltinContext) -> Result<Instance> {
    Ok(Rc::new(Scope::new_root(context.digest_ttl)))
}

#[linkme::distributed_slice(BUILTIN_PROVIDERS)]
static ROOT_SCOPE_PROVIDER: BuiltinProviderEntry = BuiltinProviderEntry {
    name: ROOT_SCOPE,
    description: "Root of the scope tree",
    factory: create_root_scope,
};
