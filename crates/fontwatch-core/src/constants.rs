// src/constants.rs
use std::time::Duration;

// Polling constants
pub const INITIAL_POLL_DELAY: Duration = Duration::from_millis(23);
pub const POLL_BACKOFF_FACTOR: f64 = 1.25;

// Fallback marker deadline when the caller gives none (or zero)
pub const DEFAULT_FALLBACK_TIMEOUT: Duration = Duration::from_millis(2222);

// Probe constants
pub const SENTINEL_TEXT: &str = "A1WQy-/#";
pub const PROBE_FONT_SIZE_PX: f64 = 300.0;
pub const PROBE_FALLBACK_FAMILIES: &str = "Georgia,sans-serif";

/// Layout-neutral declarations every probe starts from. The font size and
/// fallback family list are appended separately so they stay configurable.
pub const PROBE_BASE_STYLE: &str = "display:block;position:absolute;top:-9999px;left:-9999px;\
visibility:hidden;width:auto;height:auto;white-space:nowrap;line-height:normal;\
margin:0;padding:0;font-variant:normal;";

// Headless rendering
pub const DEFAULT_FONT_SIZE_PX: f64 = 16.0;
pub const GENERIC_FAMILIES: [&str; 7] = [
    "serif",
    "sans-serif",
    "monospace",
    "cursive",
    "fantasy",
    "system-ui",
    "math",
];
