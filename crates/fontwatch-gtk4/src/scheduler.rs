//! GLib main loop scheduler

use fontwatch_core::{Scheduler, TimerHandle};
use glib::SourceId;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

/// [`Scheduler`] backed by `glib::timeout_add_local_once`.
///
/// Must be used from the thread running the default main context. GLib
/// timeouts have whole-millisecond resolution, so delays are truncated
/// (28.75 ms waits 28 ms) and the poll backoff ratio is only approximate.
#[derive(Default)]
pub struct GlibScheduler {
    sources: Rc<RefCell<HashMap<u64, SourceId>>>,
    next_id: Cell<u64>,
}

impl GlibScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timeouts that have neither fired nor been cancelled
    pub fn pending(&self) -> usize {
        self.sources.borrow().len()
    }
}

impl Scheduler for GlibScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerHandle {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let sources = Rc::clone(&self.sources);
        let source = glib::timeout_add_local_once(delay, move || {
            // A once-source is destroyed after it fires; forget its id so
            // cancel never removes a dead source.
            let _fired = sources.borrow_mut().remove(&id);
            task();
        });
        self.sources.borrow_mut().insert(id, source);
        TimerHandle(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        let source = self.sources.borrow_mut().remove(&handle.0);
        if let Some(source) = source {
            source.remove();
        }
    }
}
