//! Convergence watcher: polls retained probes with geometric backoff

use crate::probe::ProbeSet;
use crate::traits::Scheduler;
use std::rc::Rc;
use std::time::Duration;
use tracing::trace;

/// Geometric delay sequence: `initial`, `initial * factor`, ...
#[derive(Clone, Debug, PartialEq)]
pub struct Backoff {
    next: Duration,
    factor: f64,
}

impl Backoff {
    pub fn new(initial: Duration, factor: f64) -> Self {
        Self {
            next: initial,
            factor,
        }
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next;
        // Saturates instead of overflowing when polling never converges.
        self.next = Duration::try_from_secs_f64(current.as_secs_f64() * self.factor)
            .unwrap_or(Duration::MAX);
        Some(current)
    }
}

/// Drives a [`ProbeSet`] to empty, then runs `on_converged` exactly once.
///
/// Each cycle owns the watcher and moves it into the next scheduled cycle,
/// so no state is shared between cycles and nothing can poll twice.
pub(crate) struct ConvergenceWatcher {
    probes: ProbeSet,
    backoff: Backoff,
    scheduler: Rc<dyn Scheduler>,
    on_converged: Box<dyn FnOnce()>,
    cycle: u32,
}

impl ConvergenceWatcher {
    pub(crate) fn new(
        probes: ProbeSet,
        backoff: Backoff,
        scheduler: Rc<dyn Scheduler>,
        on_converged: Box<dyn FnOnce()>,
    ) -> Self {
        Self {
            probes,
            backoff,
            scheduler,
            on_converged,
            cycle: 0,
        }
    }

    /// Run the first cycle now; later cycles run from the scheduler.
    pub(crate) fn start(self) {
        self.poll();
    }

    fn poll(mut self) {
        self.cycle += 1;
        let converged = self.probes.sweep();
        for request in &converged {
            trace!("{} converged on cycle {}", request.family(), self.cycle);
        }

        if self.probes.is_empty() {
            (self.on_converged)();
            return;
        }

        let delay = self.backoff.next().unwrap_or_default();
        trace!(
            "Cycle {}: {} pending {:?}, next poll in {:?}",
            self.cycle,
            self.probes.len(),
            self.probes.families(),
            delay
        );
        let scheduler = Rc::clone(&self.scheduler);
        scheduler.schedule(delay, Box::new(move || self.poll()));
    }
}
