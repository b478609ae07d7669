//! Family name to face resolution

use super::{FixedAdvanceFace, GlyphAdvance};
use crate::constants::GENERIC_FAMILIES;
use std::collections::HashMap;
use std::rc::Rc;

/// Faces currently available for rendering, keyed by case-insensitive
/// family name. Generic families (`serif`, `sans-serif`, ...) always resolve
/// to the fallback face, as does a list where nothing matches.
pub struct FaceRegistry {
    faces: HashMap<String, Rc<dyn GlyphAdvance>>,
    fallback: Rc<dyn GlyphAdvance>,
}

impl Default for FaceRegistry {
    fn default() -> Self {
        Self::new(Rc::new(FixedAdvanceFace::uniform(0.5)))
    }
}

impl FaceRegistry {
    pub fn new(fallback: Rc<dyn GlyphAdvance>) -> Self {
        Self {
            faces: HashMap::new(),
            fallback,
        }
    }

    /// Make `family` available; replaces any face already registered for it
    pub fn register(&mut self, family: &str, face: Rc<dyn GlyphAdvance>) {
        self.faces.insert(family.to_lowercase(), face);
    }

    pub fn unregister(&mut self, family: &str) -> bool {
        self.faces.remove(&family.to_lowercase()).is_some()
    }

    pub fn contains(&self, family: &str) -> bool {
        self.faces.contains_key(&family.to_lowercase())
    }

    pub fn set_fallback(&mut self, face: Rc<dyn GlyphAdvance>) {
        self.fallback = face;
    }

    /// First usable face in a `font-family` list
    pub fn resolve<S: AsRef<str>>(&self, families: &[S]) -> Rc<dyn GlyphAdvance> {
        for family in families {
            let key = family.as_ref().to_lowercase();
            if let Some(face) = self.faces.get(&key) {
                return Rc::clone(face);
            }
            if GENERIC_FAMILIES.contains(&key.as_str()) {
                break;
            }
        }
        Rc::clone(&self.fallback)
    }
}
