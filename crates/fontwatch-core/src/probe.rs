//! Probe set construction
//!
//! Each requested family gets an invisible surface rendered in the fallback
//! families, measured, then switched to prefer the requested family and
//! measured again. A changed width means the family is already active and
//! the probe is discarded at once; an unchanged width means it still has to
//! be watched.

use crate::config::LoaderConfig;
use crate::request::FontRequest;
use crate::style::{prefer_family, probe_css_text};
use crate::traits::{Document, MeasurementSurface};
use tracing::trace;

/// A measurement surface paired with the request it stands for
pub struct Probe {
    request: FontRequest,
    surface: Box<dyn MeasurementSurface>,
    original_width: i32,
}

impl Probe {
    /// Attach a surface for `request` and capture its fallback-only width,
    /// then put the requested family first.
    fn attach(document: &dyn Document, request: FontRequest, config: &LoaderConfig) -> Self {
        let css_text = probe_css_text(config, request.style());
        let surface = document.attach_surface(&css_text, &config.sentinel_text);
        let original_width = surface.offset_width();
        let families = prefer_family(request.family(), &surface.font_family());
        surface.set_font_family(&families);
        Probe {
            request,
            surface,
            original_width,
        }
    }

    pub fn request(&self) -> &FontRequest {
        &self.request
    }

    pub fn original_width(&self) -> i32 {
        self.original_width
    }

    pub fn current_width(&self) -> i32 {
        self.surface.offset_width()
    }

    pub fn has_diverged(&self) -> bool {
        self.current_width() != self.original_width
    }

    /// Remove the surface from the render tree. Consumes the probe so a
    /// surface can only ever be detached once.
    fn detach(self) {
        self.surface.detach();
    }
}

/// Probes still waiting for their family to become active.
///
/// Only ever shrinks after [`ProbeSet::build`].
#[derive(Default)]
pub struct ProbeSet {
    probes: Vec<Probe>,
}

impl ProbeSet {
    /// Attach one probe per request, in order, keeping only those whose
    /// width did not change when the requested family was put first.
    pub fn build(document: &dyn Document, requests: &[FontRequest], config: &LoaderConfig) -> Self {
        let mut probes = Vec::with_capacity(requests.len());
        for request in requests {
            let probe = Probe::attach(document, request.clone(), config);
            if probe.has_diverged() {
                trace!(
                    "{} already active ({} -> {})",
                    probe.request.family(),
                    probe.original_width,
                    probe.current_width()
                );
                probe.detach();
            } else {
                trace!("{} pending at width {}", probe.request.family(), probe.original_width);
                probes.push(probe);
            }
        }
        ProbeSet { probes }
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Families still pending, in request order
    pub fn families(&self) -> Vec<&str> {
        self.probes.iter().map(|probe| probe.request.family()).collect()
    }

    /// Detach and drop every probe whose width has diverged. Scans from the
    /// back so removal does not disturb the indices still to visit.
    /// Returns the families that converged.
    pub fn sweep(&mut self) -> Vec<FontRequest> {
        let mut converged = Vec::new();
        let mut index = self.probes.len();
        while index > 0 {
            index -= 1;
            if self.probes[index].has_diverged() {
                let probe = self.probes.remove(index);
                converged.push(probe.request.clone());
                probe.detach();
            }
        }
        converged
    }
}
