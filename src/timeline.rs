//! Virtual-clock simulation of a font load, as driven by the `fontwatch` binary

use fontwatch_core::font::{FaceRegistry, FixedAdvanceFace, GlyphAdvance};
use fontwatch_core::{
    ClassList, FontLoader, FontRequests, HeadlessDocument, LoadOptions, LoadStatus, LoaderConfig,
    LoaderError, ManualScheduler, Scheduler,
};
use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum TimelineError {
    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error("Invalid face spec {spec:?}: {reason}")]
    InvalidFaceSpec { spec: String, reason: String },
}

/// A face that becomes available some time after the simulation starts.
///
/// Written `FAMILY[=PATH][@MS]`; without a path a synthetic face is used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceSpec {
    pub family: String,
    pub path: Option<PathBuf>,
    pub arrives_after: Duration,
}

impl FromStr for FaceSpec {
    type Err = TimelineError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| TimelineError::InvalidFaceSpec {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let (rest, arrives_after) = match spec.rsplit_once('@') {
            Some((rest, ms)) if !ms.is_empty() && ms.bytes().all(|b| b.is_ascii_digit()) => {
                let ms = ms.parse::<u64>().map_err(|_| invalid("delay out of range"))?;
                (rest, Duration::from_millis(ms))
            }
            _ => (spec, Duration::ZERO),
        };
        let (family, path) = match rest.split_once('=') {
            Some((_, "")) => return Err(invalid("empty path")),
            Some((family, path)) => (family, Some(PathBuf::from(path))),
            None => (rest, None),
        };
        let family = family.trim();
        if family.is_empty() {
            return Err(invalid("missing family"));
        }
        Ok(FaceSpec {
            family: family.to_string(),
            path,
            arrives_after,
        })
    }
}

/// Something observable that happened during a run
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimelineEvent {
    FaceArrived { family: String, at: Duration },
    FallbackApplied { class: String, at: Duration },
    FallbackRemoved { class: String, at: Duration },
    Converged { at: Duration },
}

impl TimelineEvent {
    pub fn at(&self) -> Duration {
        match self {
            TimelineEvent::FaceArrived { at, .. }
            | TimelineEvent::FallbackApplied { at, .. }
            | TimelineEvent::FallbackRemoved { at, .. }
            | TimelineEvent::Converged { at } => *at,
        }
    }
}

impl fmt::Display for TimelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.at().as_secs_f64() * 1000.0;
        match self {
            TimelineEvent::FaceArrived { family, .. } => write!(f, "{ms:>9.2}ms  face {family} available"),
            TimelineEvent::FallbackApplied { class, .. } => write!(f, "{ms:>9.2}ms  fallback class {class} applied"),
            TimelineEvent::FallbackRemoved { class, .. } => write!(f, "{ms:>9.2}ms  fallback class {class} removed"),
            TimelineEvent::Converged { .. } => write!(f, "{ms:>9.2}ms  all fonts active"),
        }
    }
}

/// How long to run and which fallback marker to use
#[derive(Clone, Debug)]
pub struct RunPlan {
    pub fallback_class: Option<String>,
    pub fallback_timeout: Option<Duration>,
    pub run_for: Duration,
    /// Granularity at which class-list changes are observed
    pub step: Duration,
}

impl Default for RunPlan {
    fn default() -> Self {
        Self {
            fallback_class: None,
            fallback_timeout: None,
            run_for: Duration::from_secs(5),
            step: Duration::from_millis(1),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeline {
    pub status: LoadStatus,
    pub events: Vec<TimelineEvent>,
}

/// Headless document plus virtual clock with scheduled face arrivals.
pub struct Simulation {
    document: HeadlessDocument,
    scheduler: Rc<ManualScheduler>,
    events: Rc<RefCell<Vec<TimelineEvent>>>,
    config: LoaderConfig,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(Rc::new(FixedAdvanceFace::uniform(0.5)))
    }
}

impl Simulation {
    /// `fallback` renders generic families and anything not yet available
    pub fn new(fallback: Rc<dyn GlyphAdvance>) -> Self {
        Self {
            document: HeadlessDocument::with_faces(FaceRegistry::new(fallback)),
            scheduler: Rc::new(ManualScheduler::new()),
            events: Rc::new(RefCell::new(Vec::new())),
            config: LoaderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn document(&self) -> &HeadlessDocument {
        &self.document
    }

    /// Stand-in face for a family with no font file: wider than the
    /// default fallback and with uneven advances.
    pub fn synthetic_face() -> Rc<dyn GlyphAdvance> {
        Rc::new(
            FixedAdvanceFace::uniform(0.55)
                .with_advance('W', 0.95)
                .with_advance('1', 0.4)
                .with_advance('/', 0.3),
        )
    }

    /// Make `family` available `after` the start of the run
    pub fn add_face(&self, family: &str, face: Rc<dyn GlyphAdvance>, after: Duration) {
        let document = self.document.clone();
        let events = Rc::clone(&self.events);
        let scheduler = Rc::clone(&self.scheduler);
        let family = family.to_string();
        let arrive = move || {
            document.register_face(&family, face);
            events.borrow_mut().push(TimelineEvent::FaceArrived {
                family,
                at: scheduler.now(),
            });
        };
        if after.is_zero() {
            arrive();
        } else {
            self.scheduler.schedule(after, Box::new(arrive));
        }
    }

    /// Start loading `fonts` and run the clock for `plan.run_for`.
    ///
    /// The returned timeline holds the events recorded since the previous
    /// run returned, face arrivals scheduled before this run included.
    pub fn run(&self, fonts: impl Into<FontRequests>, plan: &RunPlan) -> Result<Timeline, TimelineError> {
        let env = self.document.environment(self.scheduler.clone());
        let loader = FontLoader::with_config(env, self.config.clone())?;

        let mut options = LoadOptions::new();
        if let Some(class) = &plan.fallback_class {
            options = options.with_fallback_class(class);
        }
        if let Some(timeout) = plan.fallback_timeout {
            options = options.with_fallback_timeout(timeout);
        }
        let events = Rc::clone(&self.events);
        let scheduler = Rc::clone(&self.scheduler);
        options = options.on_success(move || {
            events.borrow_mut().push(TimelineEvent::Converged { at: scheduler.now() });
        });

        let status = loader.load_fonts(fonts, options);
        debug!("load_fonts returned {:?}", status);

        let classes = self.document.root_classes();
        let marker = plan.fallback_class.as_deref().filter(|class| !class.is_empty());
        let mut marked = marker.is_some_and(|class| classes.contains(class));
        let step = plan.step.max(Duration::from_micros(1));
        let end = self.scheduler.now().saturating_add(plan.run_for);

        while self.scheduler.now() < end {
            let remaining = end - self.scheduler.now();
            self.scheduler.advance(step.min(remaining));
            let Some(class) = marker else {
                continue;
            };
            let now_marked = classes.contains(class);
            if now_marked != marked {
                let at = self.scheduler.now();
                let class = class.to_string();
                let event = if now_marked {
                    TimelineEvent::FallbackApplied { class, at }
                } else {
                    TimelineEvent::FallbackRemoved { class, at }
                };
                self.events.borrow_mut().push(event);
                marked = now_marked;
            }
        }

        let mut events = std::mem::take(&mut *self.events.borrow_mut());
        events.sort_by_key(TimelineEvent::at);
        Ok(Timeline { status, events })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_spec_forms() {
        let spec: FaceSpec = "Dolly".parse().unwrap();
        assert_eq!(spec.path, None);
        assert_eq!(spec.arrives_after, Duration::ZERO);

        let spec: FaceSpec = "Dolly@250".parse().unwrap();
        assert_eq!(spec.family, "Dolly");
        assert_eq!(spec.arrives_after, Duration::from_millis(250));

        let spec: FaceSpec = "Open Sans=/fonts/open@sans.ttf@40".parse().unwrap();
        assert_eq!(spec.family, "Open Sans");
        assert_eq!(spec.path, Some(PathBuf::from("/fonts/open@sans.ttf")));
        assert_eq!(spec.arrives_after, Duration::from_millis(40));

        let spec: FaceSpec = "Mail=/fonts/a@b.ttf".parse().unwrap();
        assert_eq!(spec.path, Some(PathBuf::from("/fonts/a@b.ttf")));
        assert_eq!(spec.arrives_after, Duration::ZERO);
    }

    #[test]
    fn test_face_spec_rejects_incomplete_input() {
        assert!("=font.ttf".parse::<FaceSpec>().is_err());
        assert!("@100".parse::<FaceSpec>().is_err());
        assert!("Dolly=".parse::<FaceSpec>().is_err());
    }

    #[test]
    fn test_late_face_timeline() {
        let simulation = Simulation::default();
        simulation.add_face("Dolly", Simulation::synthetic_face(), Duration::from_millis(300));
        let plan = RunPlan {
            fallback_class: Some("hide-dolly".to_string()),
            fallback_timeout: Some(Duration::from_millis(100)),
            run_for: Duration::from_secs(2),
            ..RunPlan::default()
        };

        let timeline = simulation.run("Dolly", &plan).unwrap();
        assert_eq!(timeline.status, LoadStatus::Pending { retained: 1 });

        let kinds: Vec<&str> = timeline
            .events
            .iter()
            .map(|event| match event {
                TimelineEvent::FaceArrived { .. } => "arrived",
                TimelineEvent::FallbackApplied { .. } => "applied",
                TimelineEvent::FallbackRemoved { .. } => "removed",
                TimelineEvent::Converged { .. } => "converged",
            })
            .collect();
        assert_eq!(kinds, ["applied", "arrived", "converged", "removed"]);
        assert_eq!(timeline.events[0].at(), Duration::from_millis(100));
        assert!(timeline.events[2].at() >= Duration::from_millis(300));
    }

    #[test]
    fn test_immediate_face_completes() {
        let simulation = Simulation::default();
        simulation.add_face("Arial", Simulation::synthetic_face(), Duration::ZERO);
        let timeline = simulation.run("Arial", &RunPlan::default()).unwrap();
        assert_eq!(timeline.status, LoadStatus::Completed);
        assert_eq!(timeline.events.len(), 2);
        assert_eq!(timeline.events[1], TimelineEvent::Converged { at: Duration::ZERO });
        assert_eq!(simulation.document().attached_count(), 0);
    }

    #[test]
    fn test_each_run_reports_its_own_events() {
        let simulation = Simulation::default();
        simulation.add_face("Arial", Simulation::synthetic_face(), Duration::ZERO);
        let first = simulation.run("Arial", &RunPlan::default()).unwrap();
        assert_eq!(first.events.len(), 2);

        simulation.add_face("Dolly", Simulation::synthetic_face(), Duration::from_millis(60));
        let plan = RunPlan {
            run_for: Duration::from_secs(1),
            ..RunPlan::default()
        };
        let second = simulation.run("Dolly", &plan).unwrap();
        assert_eq!(second.status, LoadStatus::Pending { retained: 1 });
        assert_eq!(second.events.len(), 2);
        assert!(matches!(
            &second.events[0],
            TimelineEvent::FaceArrived { family, .. } if family == "Dolly"
        ));
        assert!(matches!(second.events[1], TimelineEvent::Converged { .. }));
    }

    #[test]
    fn test_event_display() {
        let event = TimelineEvent::FallbackApplied {
            class: "x".to_string(),
            at: Duration::from_millis(50),
        };
        assert_eq!(event.to_string(), "    50.00ms  fallback class x applied");
    }
}
