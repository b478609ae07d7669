//! fontwatch - detect when web fonts become active
//!
//! This crate bundles:
//! - the backend-agnostic detector from `fontwatch-core`
//! - a headless render tree and virtual clock for simulations and tests
//! - the GTK4/Pango backend, behind the `gtk` feature
//! - `timeline`, the simulation driver behind the `fontwatch` binary

pub mod timeline;

pub use fontwatch_core::*;

#[cfg(feature = "gtk")]
pub use fontwatch_gtk4 as gtk;
