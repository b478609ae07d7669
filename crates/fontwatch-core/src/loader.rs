//! Entry point: builds probes, starts the watcher and the fallback timer,
//! and runs the completion routine exactly once.

use crate::config::LoaderConfig;
use crate::error::LoaderResult;
use crate::probe::ProbeSet;
use crate::request::FontRequests;
use crate::traits::{ClassList, Environment, Scheduler, TimerHandle};
use crate::watcher::{Backoff, ConvergenceWatcher};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info};

/// Optional arguments of a [`FontLoader::load_fonts`] call.
#[derive(Default)]
pub struct LoadOptions {
    fallback_class: Option<String>,
    fallback_timeout: Option<Duration>,
    on_success: Option<Box<dyn FnOnce()>>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Class added to the root element if the fonts are not confirmed by
    /// the deadline, and removed once they are. An empty name disables it.
    pub fn with_fallback_class(mut self, class: &str) -> Self {
        self.fallback_class = Some(class.to_string()).filter(|class| !class.is_empty());
        self
    }

    /// Deadline for the fallback class; zero means the configured default
    pub fn with_fallback_timeout(mut self, timeout: Duration) -> Self {
        self.fallback_timeout = Some(timeout);
        self
    }

    /// Called once when every requested family is active
    pub fn on_success(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn fallback_class(&self) -> Option<&str> {
        self.fallback_class.as_deref()
    }
}

/// What a `load_fonts` call did before returning
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    /// The document had no body yet; nothing was attached or scheduled
    Skipped,
    /// Every family was already active; completion ran synchronously
    Completed,
    /// Polling is under way for `retained` families
    Pending { retained: usize },
}

/// Detects when web fonts become active in one rendering environment.
///
/// Every call to [`load_fonts`](Self::load_fonts) is independent: it owns
/// its probes, its poll loop and its fallback timer. Only the root class
/// list is shared between calls.
pub struct FontLoader {
    env: Environment,
    config: LoaderConfig,
}

impl FontLoader {
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            config: LoaderConfig::default(),
        }
    }

    pub fn with_config(env: Environment, config: LoaderConfig) -> LoaderResult<Self> {
        config.validate()?;
        Ok(Self { env, config })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Wait for `fonts` to become active.
    ///
    /// A single family, a [`FontRequest`](crate::FontRequest) or any
    /// sequence of them is accepted.
    pub fn load_fonts(&self, fonts: impl Into<FontRequests>, options: LoadOptions) -> LoadStatus {
        let document = &self.env.document;
        if !document.body_ready() {
            debug!("Document body not ready, skipping font load");
            return LoadStatus::Skipped;
        }

        let requests = fonts.into().into_vec();
        debug!("Loading {} font(s)", requests.len());
        let probes = ProbeSet::build(document.as_ref(), &requests, &self.config);

        let LoadOptions {
            fallback_class,
            fallback_timeout,
            on_success,
        } = options;

        if probes.is_empty() {
            debug!("All fonts already active");
            Completion {
                scheduler: Rc::clone(&self.env.scheduler),
                root_classes: Rc::clone(&self.env.root_classes),
                fallback_class,
                fallback_timer: None,
                on_success,
                done: None,
            }
            .run();
            return LoadStatus::Completed;
        }

        let retained = probes.len();
        let fallback_timer = fallback_class.as_ref().map(|class| {
            let timeout = fallback_timeout
                .filter(|timeout| !timeout.is_zero())
                .unwrap_or(self.config.default_fallback_timeout);
            self.schedule_fallback(class, timeout)
        });

        let done = Rc::new(Cell::new(false));
        let completion = Completion {
            scheduler: Rc::clone(&self.env.scheduler),
            root_classes: Rc::clone(&self.env.root_classes),
            fallback_class,
            fallback_timer,
            on_success,
            done: Some(Rc::clone(&done)),
        };
        ConvergenceWatcher::new(
            probes,
            Backoff::new(self.config.initial_poll_delay, self.config.backoff_factor),
            Rc::clone(&self.env.scheduler),
            Box::new(move || completion.run()),
        )
        .start();

        if done.get() {
            LoadStatus::Completed
        } else {
            LoadStatus::Pending { retained }
        }
    }

    fn schedule_fallback(&self, class: &str, timeout: Duration) -> TimerHandle {
        let root_classes = Rc::clone(&self.env.root_classes);
        let class = class.to_string();
        self.env.scheduler.schedule(
            timeout,
            Box::new(move || {
                info!("Fonts not confirmed after {:?}, applying {}", timeout, class);
                root_classes.add_token(&class);
            }),
        )
    }
}

/// Wait for `fonts` in `env` with the default configuration.
///
/// ```
/// use fontwatch_core::{load_fonts, HeadlessDocument, LoadOptions, LoadStatus, ManualScheduler};
/// use std::rc::Rc;
///
/// let document = HeadlessDocument::new();
/// let scheduler = Rc::new(ManualScheduler::new());
/// let status = load_fonts(
///     &document.environment(scheduler.clone()),
///     ["Bello", "Liza"],
///     LoadOptions::new().with_fallback_class("hide-webfonts"),
/// );
/// assert_eq!(status, LoadStatus::Pending { retained: 2 });
/// ```
pub fn load_fonts(
    env: &Environment,
    fonts: impl Into<FontRequests>,
    options: LoadOptions,
) -> LoadStatus {
    FontLoader::new(env.clone()).load_fonts(fonts, options)
}

/// Cleanup shared by the immediate and the polled completion paths.
/// Consumed by [`Completion::run`], so it can run at most once.
struct Completion {
    scheduler: Rc<dyn Scheduler>,
    root_classes: Rc<dyn ClassList>,
    fallback_class: Option<String>,
    fallback_timer: Option<TimerHandle>,
    on_success: Option<Box<dyn FnOnce()>>,
    done: Option<Rc<Cell<bool>>>,
}

impl Completion {
    fn run(self) {
        if let Some(timer) = self.fallback_timer {
            self.scheduler.cancel(timer);
        }
        if let Some(class) = &self.fallback_class {
            self.root_classes.remove_token(class);
        }
        if let Some(done) = &self.done {
            done.set(true);
        }
        info!("Fonts active");
        if let Some(callback) = self.on_success {
            callback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FixedAdvanceFace;
    use crate::headless::HeadlessDocument;
    use crate::request::FontRequest;
    use crate::scheduler::ManualScheduler;

    struct Harness {
        document: HeadlessDocument,
        scheduler: Rc<ManualScheduler>,
        loader: FontLoader,
        calls: Rc<Cell<u32>>,
    }

    impl Harness {
        fn new() -> Self {
            let document = HeadlessDocument::new();
            let scheduler = Rc::new(ManualScheduler::new());
            let loader = FontLoader::new(document.environment(scheduler.clone()));
            Harness {
                document,
                scheduler,
                loader,
                calls: Rc::new(Cell::new(0)),
            }
        }

        fn counting(&self, options: LoadOptions) -> LoadOptions {
            let calls = Rc::clone(&self.calls);
            options.on_success(move || calls.set(calls.get() + 1))
        }

        fn arrive(&self, family: &str) {
            self.document
                .register_face(family, Rc::new(FixedAdvanceFace::uniform(0.625)));
        }
    }

    #[test]
    fn test_no_body_is_a_silent_noop() {
        let document = HeadlessDocument::without_body();
        let scheduler = Rc::new(ManualScheduler::new());
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let status = load_fonts(
            &document.environment(scheduler.clone()),
            "Dolly",
            LoadOptions::new()
                .with_fallback_class("x")
                .on_success(move || counter.set(counter.get() + 1)),
        );
        assert_eq!(status, LoadStatus::Skipped);
        assert_eq!(document.attach_count(), 0);
        assert_eq!(scheduler.pending(), 0);
        scheduler.advance(Duration::from_secs(10));
        assert_eq!(calls.get(), 0);
        assert_eq!(document.root_classes().class_name(), "");
    }

    #[test]
    fn test_empty_input_completes_immediately() {
        let harness = Harness::new();
        let status = harness
            .loader
            .load_fonts(Vec::<FontRequest>::new(), harness.counting(LoadOptions::new()));
        assert_eq!(status, LoadStatus::Completed);
        assert_eq!(harness.calls.get(), 1);
        assert_eq!(harness.document.attach_count(), 0);
        assert!(harness.scheduler.scheduled_delays().is_empty());
    }

    #[test]
    fn test_already_active_completes_synchronously() {
        let harness = Harness::new();
        harness.arrive("Arial");
        let options = harness.counting(LoadOptions::new().with_fallback_class("x"));
        let status = harness.loader.load_fonts("Arial", options);

        assert_eq!(status, LoadStatus::Completed);
        assert_eq!(harness.calls.get(), 1);
        assert_eq!(harness.document.attached_count(), 0);
        assert_eq!(harness.scheduler.pending(), 0);
        assert!(harness.scheduler.scheduled_delays().is_empty());
        assert!(!harness.document.root_classes().contains("x"));
    }

    #[test]
    fn test_fallback_applied_at_deadline() {
        let harness = Harness::new();
        let options = harness.counting(
            LoadOptions::new()
                .with_fallback_class("x")
                .with_fallback_timeout(Duration::from_millis(100)),
        );
        assert_eq!(
            harness.loader.load_fonts("Never", options),
            LoadStatus::Pending { retained: 1 }
        );

        harness.scheduler.advance(Duration::from_millis(99));
        assert!(!harness.document.root_classes().contains("x"));
        harness.scheduler.advance(Duration::from_millis(1));
        assert!(harness.document.root_classes().contains("x"));

        harness.scheduler.advance(Duration::from_secs(60));
        assert_eq!(harness.calls.get(), 0);
        assert_eq!(harness.scheduler.pending(), 1);
        assert_eq!(harness.document.root_classes().count("x"), 1);
    }

    #[test]
    fn test_late_convergence_removes_fallback() {
        let harness = Harness::new();
        let options = harness.counting(
            LoadOptions::new()
                .with_fallback_class("x")
                .with_fallback_timeout(Duration::from_millis(100)),
        );
        harness.loader.load_fonts("Dolly", options);

        harness.scheduler.advance_to(Duration::from_millis(300));
        assert!(harness.document.root_classes().contains("x"));
        harness.arrive("Dolly");
        harness.scheduler.advance(Duration::from_secs(1));

        assert!(!harness.document.root_classes().contains("x"));
        assert_eq!(harness.calls.get(), 1);
        assert_eq!(harness.scheduler.pending(), 0);
    }

    #[test]
    fn test_early_convergence_cancels_fallback() {
        let harness = Harness::new();
        let options = harness.counting(
            LoadOptions::new()
                .with_fallback_class("x")
                .with_fallback_timeout(Duration::from_millis(500)),
        );
        harness.loader.load_fonts("Dolly", options);

        harness.scheduler.advance(Duration::from_millis(40));
        harness.arrive("Dolly");
        harness.scheduler.advance(Duration::from_millis(100));
        assert_eq!(harness.calls.get(), 1);
        assert_eq!(harness.scheduler.pending(), 0);

        harness.scheduler.advance(Duration::from_secs(5));
        assert!(!harness.document.root_classes().contains("x"));
        assert_eq!(harness.calls.get(), 1);
    }

    #[test]
    fn test_zero_timeout_uses_default() {
        let harness = Harness::new();
        harness.loader.load_fonts(
            "Never",
            LoadOptions::new()
                .with_fallback_class("x")
                .with_fallback_timeout(Duration::ZERO),
        );
        harness.scheduler.advance(Duration::from_millis(2221));
        assert!(!harness.document.root_classes().contains("x"));
        harness.scheduler.advance(Duration::from_millis(1));
        assert!(harness.document.root_classes().contains("x"));
    }

    #[test]
    fn test_no_fallback_class_means_no_timer() {
        let harness = Harness::new();
        harness.loader.load_fonts("Never", LoadOptions::new().with_fallback_class(""));
        assert_eq!(harness.scheduler.scheduled_delays(), vec![Duration::from_millis(23)]);
        harness.scheduler.advance(Duration::from_secs(10));
        assert_eq!(harness.document.root_classes().class_name(), "");
    }

    #[test]
    fn test_custom_config_drives_polling() {
        let document = HeadlessDocument::new();
        let scheduler = Rc::new(ManualScheduler::new());
        let config = LoaderConfig::new()
            .with_initial_poll_delay(Duration::from_millis(10))
            .with_backoff_factor(2.0);
        let loader = FontLoader::with_config(document.environment(scheduler.clone()), config).unwrap();
        loader.load_fonts("Never", LoadOptions::new());
        scheduler.advance(Duration::from_millis(70));
        assert_eq!(
            scheduler.scheduled_delays(),
            vec![
                Duration::from_millis(10),
                Duration::from_millis(20),
                Duration::from_millis(40),
                Duration::from_millis(80)
            ]
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let document = HeadlessDocument::new();
        let env = document.environment(Rc::new(ManualScheduler::new()));
        let config = LoaderConfig::new().with_backoff_factor(0.5);
        assert!(FontLoader::with_config(env, config).is_err());
    }
}
