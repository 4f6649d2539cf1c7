//! Mock timeout
//!
//! Deferred tasks keyed by (due time, schedule order). Nothing runs until
//! [`MockTimeout::flush`] moves the simulated clock; due tasks then run in
//! key order, and tasks they schedule run too if they fall due within the
//! same flush.

pub mod clock;

pub use clock::SimulatedClock;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use stk_application::{DigestReport, Provider, Scope};
use stk_domain::constants::{ROOT_SCOPE, TIMEOUT};
use stk_domain::error::{Error, Result};
use stk_domain::ports::{HostEnvironment, TaskId, TaskScheduler};
use tracing::debug;

type Task = Box<dyn FnOnce()>;

#[derive(Default)]
struct TimeoutState {
    next_id: u64,
    tasks: BTreeMap<(Duration, TaskId), Task>,
}

/// Simulated-time task scheduler bound to one scope tree
pub struct MockTimeout {
    root: Scope,
    clock: Rc<SimulatedClock>,
    state: RefCell<TimeoutState>,
}

impl MockTimeout {
    pub fn new(root: Scope, clock: Rc<SimulatedClock>) -> Self {
        Self {
            root,
            clock,
            state: RefCell::new(TimeoutState::default()),
        }
    }

    /// Provider installing a scheduler with a fresh clock under `$timeout`
    pub fn provider() -> Provider {
        Provider::factory(TIMEOUT, [ROOT_SCOPE], |deps| {
            let root = deps.get::<Scope>(ROOT_SCOPE)?;
            Ok(Rc::new(Self::new(
                Scope::clone(&root),
                Rc::new(SimulatedClock::new()),
            )))
        })
    }

    /// Schedule a closure; shorthand for [`TaskScheduler::schedule`]
    pub fn defer(&self, delay: Duration, task: impl FnOnce() + 'static) -> TaskId {
        self.schedule(delay, Box::new(task))
    }

    pub fn clock(&self) -> &SimulatedClock {
        &self.clock
    }

    pub fn pending_count(&self) -> usize {
        self.state.borrow().tasks.len()
    }

    /// Advance simulated time and run what fell due, then digest the root
    ///
    /// With `None`, time advances to the latest scheduled task.
    pub fn flush(&self, delay: Option<Duration>) -> Result<DigestReport> {
        let target = match delay {
            Some(delay) => self.clock.now() + delay,
            None => self.latest_due().ok_or(Error::NoPendingTasks)?,
        };

        let mut ran = 0;
        while let Some(((due, id), task)) = self.next_due(target) {
            self.clock.advance_to(due);
            debug!(task = %id, due = ?due, "Running deferred task");
            task();
            ran += 1;
        }
        self.clock.advance_to(target);
        debug!(ran, now = ?self.clock.now(), "Timeout flushed");
        self.root.digest()
    }

    /// Fail if any task is still scheduled
    pub fn verify_no_pending_tasks(&self) -> Result<()> {
        match self.pending_count() {
            0 => Ok(()),
            count => Err(Error::PendingTasks { count }),
        }
    }

    fn latest_due(&self) -> Option<Duration> {
        self.state
            .borrow()
            .tasks
            .last_key_value()
            .map(|((due, _), _)| *due)
    }

    fn next_due(&self, target: Duration) -> Option<((Duration, TaskId), Task)> {
        let mut state = self.state.borrow_mut();
        let ready = state
            .tasks
            .first_key_value()
            .is_some_and(|((due, _), _)| *due <= target);
        if ready { state.tasks.pop_first() } else { None }
    }
}

impl TaskScheduler for MockTimeout {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = TaskId(state.next_id);
        let due = self.clock.now() + delay;
        state.tasks.insert((due, id), task);
        debug!(task = %id, due = ?due, "Task scheduled");
        id
    }

    fn cancel(&self, id: TaskId) -> bool {
        let mut state = self.state.borrow_mut();
        let key = state.tasks.keys().find(|(_, task)| *task == id).copied();
        key.and_then(|key| state.tasks.remove(&key)).is_some()
    }
}

impl fmt::Debug for MockTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTimeout")
            .field("root", &self.root.id())
            .field("now", &self.clock.now())
            .field("pending", &self.pending_count())
            .finish()
    }
}
