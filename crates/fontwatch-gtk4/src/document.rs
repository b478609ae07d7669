//! Pango-measured probes

use fontwatch_core::constants::DEFAULT_FONT_SIZE_PX;
use fontwatch_core::style::Declarations;
use fontwatch_core::{Document, MeasurementSurface};
use gtk4::prelude::*;
use std::cell::{Cell, RefCell};
use tracing::trace;

/// [`Document`] measuring text with the Pango context of a widget.
///
/// The body counts as ready once the widget is inside a window, which is
/// also when its Pango context reflects the display's font map.
pub struct PangoDocument {
    widget: gtk4::Widget,
}

impl PangoDocument {
    pub fn new(widget: &impl IsA<gtk4::Widget>) -> Self {
        Self {
            widget: widget.clone().upcast(),
        }
    }
}

impl Document for PangoDocument {
    fn body_ready(&self) -> bool {
        self.widget.root().is_some()
    }

    fn attach_surface(&self, css_text: &str, text: &str) -> Box<dyn MeasurementSurface> {
        Box::new(PangoSurface {
            context: self.widget.pango_context(),
            declarations: RefCell::new(Declarations::parse(css_text)),
            text: text.to_string(),
            attached: Cell::new(true),
        })
    }
}

/// Off-screen text whose width is read back through a fresh Pango layout
/// on every measurement, so newly available fonts are picked up.
pub struct PangoSurface {
    context: pango::Context,
    declarations: RefCell<Declarations>,
    text: String,
    attached: Cell<bool>,
}

impl PangoSurface {
    fn font_description(&self) -> pango::FontDescription {
        let declarations = self.declarations.borrow();
        let mut description = pango::FontDescription::new();
        let families = declarations.families();
        if !families.is_empty() {
            description.set_family(&families.join(","));
        }
        let px = declarations.font_size_px().unwrap_or(DEFAULT_FONT_SIZE_PX);
        description.set_absolute_size(px * f64::from(pango::SCALE));
        description.set_weight(parse_weight(declarations.get("font-weight")));
        description.set_style(parse_style(declarations.get("font-style")));
        description
    }
}

impl MeasurementSurface for PangoSurface {
    fn offset_width(&self) -> i32 {
        if !self.attached.get() {
            return 0;
        }
        let layout = pango::Layout::new(&self.context);
        layout.set_font_description(Some(&self.font_description()));
        layout.set_text(&self.text);
        let (width, _height) = layout.pixel_size();
        trace!("Measured {:?} at {}px", self.text, width);
        width
    }

    fn font_family(&self) -> String {
        self.declarations
            .borrow()
            .get("font-family")
            .unwrap_or_default()
            .to_string()
    }

    fn set_font_family(&self, families: &str) {
        self.declarations.borrow_mut().set("font-family", families);
    }

    fn detach(&self) {
        self.attached.set(false);
    }
}

/// CSS `font-weight` to the nearest Pango weight; unknown values are normal
fn parse_weight(value: Option<&str>) -> pango::Weight {
    match value.map(str::trim) {
        Some("100") => pango::Weight::Thin,
        Some("200") => pango::Weight::Ultralight,
        Some("300" | "lighter") => pango::Weight::Light,
        Some("500") => pango::Weight::Medium,
        Some("600") => pango::Weight::Semibold,
        Some("700" | "bold" | "bolder") => pango::Weight::Bold,
        Some("800") => pango::Weight::Ultrabold,
        Some("900") => pango::Weight::Heavy,
        _ => pango::Weight::Normal,
    }
}

fn parse_style(value: Option<&str>) -> pango::Style {
    match value.map(str::trim) {
        Some("italic") => pango::Style::Italic,
        Some(oblique) if oblique.starts_with("oblique") => pango::Style::Oblique,
        _ => pango::Style::Normal,
    }
}
