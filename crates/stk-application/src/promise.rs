//! Deferred values
//!
//! A minimal single-threaded promise. Nothing settles it automatically:
//! mock backends settle it when a test flushes them, and continuations run
//! synchronously at that moment, in registration order.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Settlement state of a promise
#[derive(Debug, Clone, PartialEq)]
pub enum PromiseState<T, E> {
    Pending,
    Fulfilled(T),
    Rejected(E),
}

type Continuation<T, E> = Box<dyn FnOnce(&PromiseState<T, E>)>;

struct Shared<T, E> {
    state: PromiseState<T, E>,
    continuations: Vec<Continuation<T, E>>,
}

/// Read side of a deferred value
pub struct Promise<T, E> {
    shared: Rc<RefCell<Shared<T, E>>>,
}

/// Write side of a deferred value
pub struct Deferred<T, E> {
    shared: Rc<RefCell<Shared<T, E>>>,
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Deferred<T, E> {
    /// Create a pending promise and the handle that settles it
    pub fn new() -> (Self, Promise<T, E>) {
        let shared = Rc::new(RefCell::new(Shared {
            state: PromiseState::Pending,
            continuations: Vec::new(),
        }));
        (
            Self {
                shared: Rc::clone(&shared),
            },
            Promise { shared },
        )
    }

    /// Fulfil the promise; returns `false` if it was already settled
    pub fn resolve(&self, value: T) -> bool {
        self.settle(PromiseState::Fulfilled(value))
    }

    /// Reject the promise; returns `false` if it was already settled
    pub fn reject(&self, reason: E) -> bool {
        self.settle(PromiseState::Rejected(reason))
    }

    fn settle(&self, outcome: PromiseState<T, E>) -> bool {
        let continuations = {
            let mut shared = self.shared.borrow_mut();
            if !matches!(shared.state, PromiseState::Pending) {
                return false;
            }
            shared.state = outcome.clone();
            std::mem::take(&mut shared.continuations)
        };
        for continuation in continuations {
            continuation(&outcome);
        }
        true
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Promise<T, E> {
    /// Register continuations for fulfilment and rejection
    ///
    /// Runs immediately if the promise is already settled.
    pub fn then<F, R>(&self, on_fulfilled: F, on_rejected: R)
    where
        F: FnOnce(&T) + 'static,
        R: FnOnce(&E) + 'static,
    {
        self.on_settled(move |state| match state {
            PromiseState::Fulfilled(value) => on_fulfilled(value),
            PromiseState::Rejected(reason) => on_rejected(reason),
            PromiseState::Pending => {}
        });
    }

    /// Register a continuation for fulfilment only
    pub fn on_fulfilled(&self, f: impl FnOnce(&T) + 'static) {
        self.then(f, |_| {});
    }

    /// Register a continuation for rejection only
    pub fn on_rejected(&self, f: impl FnOnce(&E) + 'static) {
        self.then(|_| {}, f);
    }

    fn on_settled(&self, continuation: impl FnOnce(&PromiseState<T, E>) + 'static) {
        let settled = {
            let mut shared = self.shared.borrow_mut();
            if matches!(shared.state, PromiseState::Pending) {
                shared.continuations.push(Box::new(continuation));
                return;
            }
            shared.state.clone()
        };
        continuation(&settled);
    }

    pub fn state(&self) -> PromiseState<T, E> {
        self.shared.borrow().state.clone()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.shared.borrow().state, PromiseState::Pending)
    }

    /// Fulfilled value, if any
    pub fn value(&self) -> Option<T> {
        match &self.shared.borrow().state {
            PromiseState::Fulfilled(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Rejection reason, if any
    pub fn reason(&self) -> Option<E> {
        match &self.shared.borrow().state {
            PromiseState::Rejected(reason) => Some(reason.clone()),
            _ => None,
        }
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Promise")
            .field(&self.shared.borrow().state)
            .finish()
    }
}
