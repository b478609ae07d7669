// src/main.rs
use clap::Parser;
use fontwatch::font::{FontdueFace, GlyphAdvance};
use fontwatch::timeline::{FaceSpec, RunPlan, Simulation, TimelineError};
use fontwatch::{FontRequest, LoadStatus};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

/// Simulate web font load detection on a virtual clock.
///
/// Each requested family is probed in a headless document; faces given with
/// --face become available after their delay, and the resulting timeline of
/// fallback marker and completion events is printed.
#[derive(Parser, Debug)]
#[command(name = "fontwatch", version)]
struct Cli {
    /// Families to wait for, as `Family` or `Family; extra: declarations`
    #[arg(required = true)]
    fonts: Vec<FontRequest>,

    /// Face arriving during the run, as FAMILY[=PATH][@MS]
    #[arg(long = "face", value_name = "SPEC")]
    faces: Vec<FaceSpec>,

    /// Font file rendering generic families (defaults to a synthetic face)
    #[arg(long, value_name = "PATH")]
    fallback_face: Option<PathBuf>,

    /// Class applied to the root element if fonts are late
    #[arg(long)]
    fallback_class: Option<String>,

    /// Deadline for the fallback class in milliseconds
    #[arg(long, value_name = "MS")]
    timeout: Option<u64>,

    /// Virtual time to simulate in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 5000)]
    run_for: u64,
}

fn load_face(family: &str, path: &Path) -> Result<FontdueFace, TimelineError> {
    Ok(FontdueFace::from_path(family, path)?)
}

// The face is still registered under the requested family.
fn internal_name_note(internal: Option<&str>, family: &str, path: &Path) -> Option<String> {
    let name = internal.filter(|name| !name.eq_ignore_ascii_case(family))?;
    Some(format!("fontwatch: note: {} is named {:?} internally", path.display(), name))
}

fn run(cli: Cli) -> Result<bool, TimelineError> {
    let simulation = match &cli.fallback_face {
        Some(path) => Simulation::new(Rc::new(load_face("fallback", path)?)),
        None => Simulation::default(),
    };

    for spec in &cli.faces {
        let face: Rc<dyn GlyphAdvance> = match &spec.path {
            Some(path) => {
                let face = load_face(&spec.family, path)?;
                if let Some(note) = internal_name_note(face.name(), &spec.family, path) {
                    eprintln!("{}", note);
                }
                Rc::new(face)
            }
            None => Simulation::synthetic_face(),
        };
        simulation.add_face(&spec.family, face, spec.arrives_after);
    }

    let plan = RunPlan {
        fallback_class: cli.fallback_class.clone(),
        fallback_timeout: cli.timeout.map(Duration::from_millis),
        run_for: Duration::from_millis(cli.run_for),
        ..RunPlan::default()
    };
    let timeline = simulation.run(cli.fonts, &plan)?;

    match timeline.status {
        LoadStatus::Skipped => println!("document not ready, nothing to do"),
        LoadStatus::Completed => println!("all fonts already active"),
        LoadStatus::Pending { retained } => println!("waiting for {} font(s)", retained),
    }
    for event in &timeline.events {
        println!("{}", event);
    }

    let converged = timeline
        .events
        .iter()
        .any(|event| matches!(event, fontwatch::timeline::TimelineEvent::Converged { .. }));
    if !converged {
        println!("fonts still pending after {}ms", cli.run_for);
    }
    Ok(converged)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(err) => {
            eprintln!("fontwatch: {}", err);
            ExitCode::FAILURE
        }
    }
}
