//! fontwatch GTK4 - GTK4 backend for fontwatch-core
//!
//! Measures probes with Pango layouts built from a widget's Pango context,
//! schedules poll cycles on the GLib main loop, and uses the CSS classes of
//! a root widget as the fallback marker list.

mod class_list;
mod document;
mod scheduler;

pub use class_list::WidgetClassList;
pub use document::{PangoDocument, PangoSurface};
pub use scheduler::GlibScheduler;

// Re-export fontwatch-core types for convenience
pub use fontwatch_core::*;

use gtk4::prelude::*;
use std::rc::Rc;

/// Environment measuring through `widget` and marking `root`.
///
/// `root` is usually the toplevel window, so stylesheets can key degraded
/// presentation off `window.<fallback-class>`.
pub fn environment_for(widget: &impl IsA<gtk4::Widget>, root: &impl IsA<gtk4::Widget>) -> Environment {
    Environment::new(
        Rc::new(PangoDocument::new(widget)),
        Rc::new(WidgetClassList::new(root)),
        Rc::new(GlibScheduler::new()),
    )
}
