//! Digest Engine
//!
//! Dirty-checking scheduler. A digest repeatedly walks the scope tree
//! (parent first, then children depth-first in insertion order) until a
//! pass observes no change, or fails once the dirty-pass bound is exceeded.
//!
//! ```text
//! Idle ──digest()──► Running ──clean pass──► Stable    (Ok(DigestReport))
//!                       │
//!                       └──ttl dirty passes + 1──► Exhausted (Err(DigestConvergence))
//! ```
//!
//! A pass is dirty when any listener ran, a watcher was registered during
//! it, or async tasks are still queued at its end. Digests are synchronous;
//! re-entering one fails with `DigestInProgress`.

use std::cell::Cell;

use stk_domain::constants::DIGEST_REPORTED_WATCHERS;
use stk_domain::error::{Error, Result};
use tracing::{trace, warn};

use crate::scope::{Scope, ScopeId, TreeState};

/// Whether a digest is currently running on a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestPhase {
    Idle,
    Running,
}

/// Summary of a digest that reached a stable state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigestReport {
    /// Tree walks performed, including the final clean one
    pub passes: usize,
    /// Listener invocations across all passes
    pub listener_calls: usize,
    /// Async tasks run across all passes
    pub async_tasks: usize,
}

#[derive(Default)]
struct PassStats {
    fired: usize,
    last_scope: Option<ScopeId>,
    recent: Vec<String>,
}

impl PassStats {
    fn record(&mut self, scope: ScopeId, label: &str) {
        self.fired += 1;
        self.last_scope = Some(scope);
        if self.recent.len() < DIGEST_REPORTED_WATCHERS {
            self.recent.push(format!("{label} (scope {scope})"));
        }
    }
}

/// Per-tree digest scheduler
#[derive(Debug)]
pub struct DigestEngine {
    ttl: usize,
    phase: Cell<DigestPhase>,
}

impl DigestEngine {
    /// Create an engine allowing `ttl` dirty passes per digest
    pub fn new(ttl: usize) -> Self {
        Self {
            ttl,
            phase: Cell::new(DigestPhase::Idle),
        }
    }

    pub fn ttl(&self) -> usize {
        self.ttl
    }

    pub fn phase(&self) -> DigestPhase {
        self.phase.get()
    }

    /// Digest `scope` and its descendants until stable
    pub(crate) fn run(&self, scope: &Scope, tree: &TreeState) -> Result<DigestReport> {
        let _running = self.enter(scope.id())?;
        let mut report = DigestReport::default();
        let mut dirty_passes = 0;

        loop {
            report.passes += 1;
            report.async_tasks += tree.drain_async_queue();
            tree.take_watchers_added();

            let mut pass = PassStats::default();
            Self::walk(scope, &mut pass);
            report.listener_calls += pass.fired;

            let dirty = pass.fired > 0 || tree.take_watchers_added() || tree.has_async_work();
            trace!(
                scope = scope.id(),
                pass = report.passes,
                fired = pass.fired,
                dirty,
                "Digest pass complete"
            );
            if !dirty {
                return Ok(report);
            }

            dirty_passes += 1;
            if dirty_passes > self.ttl {
                warn!(
                    scope = scope.id(),
                    ttl = self.ttl,
                    recent = ?pass.recent,
                    "Digest exhausted its iteration bound"
                );
                return Err(Error::DigestConvergence {
                    ttl: self.ttl,
                    scope_id: pass.last_scope.unwrap_or_else(|| scope.id()),
                    watchers: pass.fired,
                    recent: pass.recent.join("; "),
                });
            }
        }
    }

    fn walk(scope: &Scope, pass: &mut PassStats) {
        if scope.is_destroyed() {
            return;
        }
        for watcher in scope.watchers_snapshot() {
            if watcher.is_active() && watcher.check(scope) {
                pass.record(scope.id(), watcher.label());
            }
        }
        for child in scope.children() {
            Self::walk(&child, pass);
        }
    }

    fn enter(&self, scope_id: ScopeId) -> Result<RunningGuard<'_>> {
        if self.phase.replace(DigestPhase::Running) == DigestPhase::Running {
            return Err(Error::DigestInProgress { scope_id });
        }
        Ok(RunningGuard { phase: &self.phase })
    }
}

/// Returns the engine to `Idle` however the digest ends
struct RunningGuard<'a> {
    phase: &'a Cell<DigestPhase>,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.phase.set(DigestPhase::Idle);
    }
}
