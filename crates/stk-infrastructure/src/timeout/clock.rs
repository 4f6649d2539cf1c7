//! Simulated time

use std::cell::Cell;
use std::time::Duration;

use stk_domain::ports::HostEnvironment;

/// Clock that starts at zero and moves only when told to
#[derive(Debug, Default)]
pub struct SimulatedClock {
    now: Cell<Duration>,
}

impl SimulatedClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `by`
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Move time forward to `instant`; earlier instants are ignored
    pub fn advance_to(&self, instant: Duration) {
        if instant > self.now.get() {
            self.now.set(instant);
        }
    }
}

impl HostEnvironment for SimulatedClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}
