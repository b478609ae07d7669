//! Fallback marker on a widget's CSS classes

use fontwatch_core::ClassList;
use gtk4::prelude::*;

/// [`ClassList`] over the CSS classes of one widget.
///
/// GTK keeps each class at most once, so repeated `add_token` calls with the
/// same name do not accumulate here.
pub struct WidgetClassList {
    widget: gtk4::Widget,
}

impl WidgetClassList {
    pub fn new(widget: &impl IsA<gtk4::Widget>) -> Self {
        Self {
            widget: widget.clone().upcast(),
        }
    }
}

impl ClassList for WidgetClassList {
    fn add_token(&self, token: &str) {
        self.widget.add_css_class(token);
    }

    fn remove_token(&self, token: &str) {
        self.widget.remove_css_class(token);
    }

    fn contains(&self, token: &str) -> bool {
        self.widget.has_css_class(token)
    }
}
