//! Deterministic virtual-clock scheduler
//!
//! Runs queued tasks only when the clock is advanced explicitly, which makes
//! poll cycles and fallback deadlines reproducible in tests and simulations.

use crate::traits::{Scheduler, TimerHandle};
use std::cell::RefCell;
use std::time::Duration;
use tracing::trace;

struct QueuedTask {
    id: u64,
    due: Duration,
    task: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct ClockState {
    now: Duration,
    next_id: u64,
    queue: Vec<QueuedTask>,
    scheduled_delays: Vec<Duration>,
}

/// [`Scheduler`] driven by a manually advanced virtual clock.
///
/// Tasks due at the same instant run in the order they were scheduled.
/// Tasks scheduled by a running task still run within the same
/// [`advance`](Self::advance) call if they fall due before its end.
#[derive(Default)]
pub struct ManualScheduler {
    state: RefCell<ClockState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Number of tasks waiting to run
    pub fn pending(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Every delay passed to `schedule`, in call order
    pub fn scheduled_delays(&self) -> Vec<Duration> {
        self.state.borrow().scheduled_delays.clone()
    }

    /// Move the clock forward by `by`, running every task that falls due.
    /// Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now().saturating_add(by);
        let mut ran = 0;
        while let Some(task) = self.pop_due(target) {
            task();
            ran += 1;
        }
        self.state.borrow_mut().now = target;
        ran
    }

    /// Move the clock to the absolute time `at` (no-op if already past it)
    pub fn advance_to(&self, at: Duration) -> usize {
        let now = self.now();
        self.advance(at.saturating_sub(now))
    }

    /// Run tasks in deadline order until the queue is empty or `max_tasks`
    /// have run. Returns the number of tasks run.
    pub fn run_until_idle(&self, max_tasks: usize) -> usize {
        let mut ran = 0;
        while ran < max_tasks {
            let Some(task) = self.pop_due(Duration::MAX) else {
                break;
            };
            task();
            ran += 1;
        }
        ran
    }

    // The borrow is released before the task runs so tasks may reschedule.
    fn pop_due(&self, limit: Duration) -> Option<Box<dyn FnOnce()>> {
        let mut state = self.state.borrow_mut();
        let index = state
            .queue
            .iter()
            .enumerate()
            .filter(|(_, queued)| queued.due <= limit)
            .min_by_key(|(_, queued)| (queued.due, queued.id))
            .map(|(index, _)| index)?;
        let queued = state.queue.swap_remove(index);
        if queued.due > state.now {
            state.now = queued.due;
        }
        trace!("Running task {} at {:?}", queued.id, state.now);
        Some(queued.task)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerHandle {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        let due = state.now.saturating_add(delay);
        state.scheduled_delays.push(delay);
        state.queue.push(QueuedTask { id, due, task });
        TimerHandle(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        let mut state = self.state.borrow_mut();
        if let Some(index) = state.queue.iter().position(|queued| queued.id == handle.0) {
            state.queue.swap_remove(index);
            trace!("Cancelled task {}", handle.0);
        }
    }
}
