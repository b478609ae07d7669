//! fontwatch core - backend-agnostic web font load detection
//!
//! Many rendering environments never report when a web font has finished
//! loading; the font is just swapped in once it arrives. This crate detects
//! that moment from the outside: it renders a sentinel string in a fallback
//! family, asks for the requested family instead, and polls until the
//! rendered width changes.
//!
//! The rendering environment is reached only through the traits in
//! [`traits`], so the detector runs unchanged against a real toolkit or the
//! [`headless`] document driven by the [`ManualScheduler`] virtual clock.

pub mod class_list;
pub mod config;
pub mod constants;
pub mod error;
pub mod font;
pub mod headless;
pub mod loader;
pub mod probe;
pub mod request;
pub mod scheduler;
pub mod style;
pub mod traits;
pub mod watcher;

// Re-export main types
pub use class_list::TokenClassList;
pub use config::LoaderConfig;
pub use error::{LoaderError, LoaderResult};
pub use headless::HeadlessDocument;
pub use loader::{load_fonts, FontLoader, LoadOptions, LoadStatus};
pub use probe::{Probe, ProbeSet};
pub use request::{FontRequest, FontRequests};
pub use scheduler::ManualScheduler;
pub use watcher::Backoff;

// Re-export traits and types
pub use traits::*;
