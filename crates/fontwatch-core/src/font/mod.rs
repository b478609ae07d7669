//! Typeface metrics for the headless render tree
//!
//! A face only has to answer one question: how far does a character advance
//! at a given pixel size. That is enough to compute the rendered width of a
//! probe's sentinel text.

pub mod face;
pub mod registry;

pub use face::FixedAdvanceFace;
#[cfg(feature = "fontdue-faces")]
pub use face::FontdueFace;
pub use registry::FaceRegistry;

/// Horizontal advance of characters in one typeface
pub trait GlyphAdvance {
    /// Advance of `ch` in pixels at `px` pixels per em
    fn advance(&self, ch: char, px: f32) -> f32;

    /// Width of `text` laid out on one line, rounded to whole pixels
    fn text_width(&self, text: &str, px: f32) -> i32 {
        let width: f32 = text.chars().map(|ch| self.advance(ch, px)).sum();
        width.round() as i32
    }
}
