//! Headless render tree for running the detector without a real renderer
//!
//! Elements carry inline style only; their rendered width is the sentinel
//! text measured in the first available face of their `font-family` list.
//! Registering a face while probes are attached models a web font finishing
//! its download.

use crate::class_list::TokenClassList;
use crate::constants::DEFAULT_FONT_SIZE_PX;
use crate::font::{FaceRegistry, GlyphAdvance};
use crate::style::Declarations;
use crate::traits::{ClassList, Document, Environment, MeasurementSurface, Scheduler};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{trace, warn};

struct Element {
    declarations: Declarations,
    text: String,
}

struct TreeState {
    body_ready: bool,
    next_id: u64,
    attached: BTreeMap<u64, Element>,
    faces: FaceRegistry,
    attach_count: usize,
    detached: Vec<u64>,
}

/// Simulated document: a body, attached elements, a root class list and the
/// set of faces currently available.
///
/// Cloning yields another handle to the same document.
#[derive(Clone)]
pub struct HeadlessDocument {
    state: Rc<RefCell<TreeState>>,
    root_classes: Rc<TokenClassList>,
}

impl Default for HeadlessDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDocument {
    /// Document with a body and the default fallback face
    pub fn new() -> Self {
        Self::with_faces(FaceRegistry::default())
    }

    pub fn with_faces(faces: FaceRegistry) -> Self {
        HeadlessDocument {
            state: Rc::new(RefCell::new(TreeState {
                body_ready: true,
                next_id: 0,
                attached: BTreeMap::new(),
                faces,
                attach_count: 0,
                detached: Vec::new(),
            })),
            root_classes: Rc::new(TokenClassList::default()),
        }
    }

    /// Document whose body has not been parsed yet
    pub fn without_body() -> Self {
        let document = Self::new();
        document.set_body_ready(false);
        document
    }

    pub fn set_body_ready(&self, ready: bool) {
        self.state.borrow_mut().body_ready = ready;
    }

    /// Make a family available to every element, attached or not
    pub fn register_face(&self, family: &str, face: Rc<dyn GlyphAdvance>) {
        trace!("Registering face for {}", family);
        self.state.borrow_mut().faces.register(family, face);
    }

    pub fn unregister_face(&self, family: &str) -> bool {
        self.state.borrow_mut().faces.unregister(family)
    }

    pub fn root_classes(&self) -> Rc<TokenClassList> {
        Rc::clone(&self.root_classes)
    }

    /// Bundle this document, its class list and `scheduler` for a loader
    pub fn environment(&self, scheduler: Rc<dyn Scheduler>) -> Environment {
        let document: Rc<dyn Document> = Rc::new(self.clone());
        let root_classes: Rc<dyn ClassList> = self.root_classes();
        Environment::new(document, root_classes, scheduler)
    }

    /// Number of elements currently attached
    pub fn attached_count(&self) -> usize {
        self.state.borrow().attached.len()
    }

    /// Total number of elements ever attached
    pub fn attach_count(&self) -> usize {
        self.state.borrow().attach_count
    }

    /// Ids of detached elements, in detach order
    pub fn detached(&self) -> Vec<u64> {
        self.state.borrow().detached.clone()
    }

    /// Inline style of every attached element
    pub fn attached_styles(&self) -> Vec<String> {
        self.state
            .borrow()
            .attached
            .values()
            .map(|element| element.declarations.to_css_text())
            .collect()
    }
}

impl Document for HeadlessDocument {
    fn body_ready(&self) -> bool {
        self.state.borrow().body_ready
    }

    fn attach_surface(&self, css_text: &str, text: &str) -> Box<dyn MeasurementSurface> {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.attach_count += 1;
        state.attached.insert(
            id,
            Element {
                declarations: Declarations::parse(css_text),
                text: text.to_string(),
            },
        );
        Box::new(HeadlessSurface {
            id,
            state: Rc::clone(&self.state),
        })
    }
}

/// Element attached to a [`HeadlessDocument`]
pub struct HeadlessSurface {
    id: u64,
    state: Rc<RefCell<TreeState>>,
}

impl HeadlessSurface {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl MeasurementSurface for HeadlessSurface {
    fn offset_width(&self) -> i32 {
        let state = self.state.borrow();
        // Detached elements have no layout box
        let Some(element) = state.attached.get(&self.id) else {
            return 0;
        };
        let px = element
            .declarations
            .font_size_px()
            .unwrap_or(DEFAULT_FONT_SIZE_PX) as f32;
        let face = state.faces.resolve(&element.declarations.families());
        face.text_width(&element.text, px)
    }

    fn font_family(&self) -> String {
        self.state
            .borrow()
            .attached
            .get(&self.id)
            .and_then(|element| element.declarations.get("font-family"))
            .unwrap_or_default()
            .to_string()
    }

    fn set_font_family(&self, families: &str) {
        if let Some(element) = self.state.borrow_mut().attached.get_mut(&self.id) {
            element.declarations.set("font-family", families);
        }
    }

    fn detach(&self) {
        let mut state = self.state.borrow_mut();
        if state.attached.remove(&self.id).is_some() {
            state.detached.push(self.id);
        } else {
            warn!("Element {} detached twice", self.id);
        }
    }
}
