//! Host environment abstraction

use std::fmt;
use std::time::Duration;

/// Source of (simulated) time
pub trait HostEnvironment {
    /// Time elapsed since the environment was created
    fn now(&self) -> Duration;
}

/// Identifier of a deferred task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Scheduling hook for deferred work
///
/// Tasks never run on their own: the host decides when simulated time moves
/// and runs whatever became due.
pub trait TaskScheduler {
    /// Schedule `task` to run once `delay` of simulated time has passed
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskId;

    /// Cancel a scheduled task; returns `false` if it already ran or was unknown
    fn cancel(&self, id: TaskId) -> bool;
}
