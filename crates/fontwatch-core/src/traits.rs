//! Seams between the detector and the rendering environment it observes

use std::rc::Rc;
use std::time::Duration;

/// An off-screen element holding the sentinel text whose rendered width
/// the detector reads back.
pub trait MeasurementSurface {
    /// Rendered width in whole pixels, re-read on every call
    fn offset_width(&self) -> i32;
    /// Current value of the `font-family` declaration
    fn font_family(&self) -> String;
    fn set_font_family(&self, families: &str);
    /// Remove the element from the render tree
    fn detach(&self);
}

/// Render tree that measurement surfaces are attached to.
pub trait Document {
    /// Whether the body exists yet; nothing is attached before it does
    fn body_ready(&self) -> bool;
    /// Create an element styled with `css_text`, containing only `text`,
    /// and attach it to the body.
    fn attach_surface(&self, css_text: &str, text: &str) -> Box<dyn MeasurementSurface>;
}

/// Class list of the document's root element.
///
/// This is the only state shared between independent detector invocations.
pub trait ClassList {
    /// Append `token`; no duplicate check
    fn add_token(&self, token: &str);
    /// Remove every occurrence of `token`; no-op when absent
    fn remove_token(&self, token: &str);
    fn contains(&self, token: &str) -> bool;
}

/// Handle to a task queued on a [`Scheduler`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/// Single-threaded delayed task queue, e.g. the host's event loop.
pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerHandle;
    /// Cancelling a task that already ran or was already cancelled is a no-op
    fn cancel(&self, handle: TimerHandle);
}

/// Everything a detector invocation needs from its host.
#[derive(Clone)]
pub struct Environment {
    pub document: Rc<dyn Document>,
    pub root_classes: Rc<dyn ClassList>,
    pub scheduler: Rc<dyn Scheduler>,
}

impl Environment {
    pub fn new(
        document: Rc<dyn Document>,
        root_classes: Rc<dyn ClassList>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        Self {
            document,
            root_classes,
            scheduler,
        }
    }
}
