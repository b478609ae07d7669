//! Concrete faces: synthetic fixed advances and real fonts via fontdue

use super::GlyphAdvance;
use std::collections::HashMap;

/// Face with a default advance and optional per-character overrides,
/// all expressed as fractions of an em.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedAdvanceFace {
    default_em: f32,
    overrides: HashMap<char, f32>,
}

impl FixedAdvanceFace {
    pub fn uniform(default_em: f32) -> Self {
        Self {
            default_em,
            overrides: HashMap::new(),
        }
    }

    pub fn with_advance(mut self, ch: char, em: f32) -> Self {
        self.overrides.insert(ch, em);
        self
    }
}

impl GlyphAdvance for FixedAdvanceFace {
    fn advance(&self, ch: char, px: f32) -> f32 {
        self.overrides.get(&ch).copied().unwrap_or(self.default_em) * px
    }
}

#[cfg(feature = "fontdue-faces")]
pub use self::fontdue_face::FontdueFace;

#[cfg(feature = "fontdue-faces")]
mod fontdue_face {
    use super::GlyphAdvance;
    use crate::error::{LoaderError, LoaderResult};
    use fontdue::{Font, FontSettings};
    use std::path::Path;

    /// Face backed by real font data, parsed with fontdue.
    pub struct FontdueFace {
        font: Font,
    }

    impl FontdueFace {
        pub fn from_bytes(data: Vec<u8>) -> LoaderResult<Self> {
            let font = Font::from_bytes(data, FontSettings::default()).map_err(|message| {
                LoaderError::FontError {
                    message: message.to_string(),
                }
            })?;
            Ok(Self { font })
        }

        /// Read and parse a font file; `family` only labels errors.
        pub fn from_path(family: &str, path: &Path) -> LoaderResult<Self> {
            let data = std::fs::read(path).map_err(|source| LoaderError::FaceLoadFailed {
                family: family.to_string(),
                source,
            })?;
            Self::from_bytes(data)
        }

        /// Family name embedded in the font, if any
        pub fn name(&self) -> Option<&str> {
            self.font.name()
        }
    }

    impl GlyphAdvance for FontdueFace {
        fn advance(&self, ch: char, px: f32) -> f32 {
            self.font.metrics(ch, px).advance_width
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_advance_scales_with_size() {
        let face = FixedAdvanceFace::uniform(0.5).with_advance('W', 1.0);
        assert_eq!(face.advance('a', 10.0), 5.0);
        assert_eq!(face.advance('W', 10.0), 10.0);
        assert_eq!(face.text_width("aW", 300.0), 450);
    }

    #[test]
    fn test_text_width_rounds() {
        let face = FixedAdvanceFace::uniform(0.333);
        assert_eq!(face.text_width("abc", 10.0), 10);
        assert_eq!(face.text_width("", 10.0), 0);
    }

    #[cfg(feature = "fontdue-faces")]
    #[test]
    fn test_fontdue_rejects_garbage() {
        let result = FontdueFace::from_bytes(vec![0, 1, 2, 3]);
        assert!(matches!(result, Err(crate::error::LoaderError::FontError { .. })));
    }

    #[cfg(feature = "fontdue-faces")]
    #[test]
    fn test_fontdue_missing_file() {
        let result = FontdueFace::from_path("Nowhere", std::path::Path::new("/nonexistent/font.ttf"));
        match result {
            Err(crate::error::LoaderError::FaceLoadFailed { family, .. }) => assert_eq!(family, "Nowhere"),
            _ => panic!("expected FaceLoadFailed"),
        }
    }
}
