// src/config.rs
use crate::constants::{
    DEFAULT_FALLBACK_TIMEOUT, INITIAL_POLL_DELAY, POLL_BACKOFF_FACTOR, PROBE_FALLBACK_FAMILIES,
    PROBE_FONT_SIZE_PX, SENTINEL_TEXT,
};
use crate::error::{LoaderError, LoaderResult};
use std::time::Duration;

/// Tuning knobs for the font load detector.
#[derive(Clone, Debug, PartialEq)]
pub struct LoaderConfig {
    pub initial_poll_delay: Duration,
    pub backoff_factor: f64,
    pub default_fallback_timeout: Duration,
    pub sentinel_text: String,
    pub probe_font_size_px: f64,
    /// Family list every probe is first rendered in, e.g. `Georgia,sans-serif`
    pub probe_fallback_families: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            initial_poll_delay: INITIAL_POLL_DELAY,
            backoff_factor: POLL_BACKOFF_FACTOR,
            default_fallback_timeout: DEFAULT_FALLBACK_TIMEOUT,
            sentinel_text: SENTINEL_TEXT.to_string(),
            probe_font_size_px: PROBE_FONT_SIZE_PX,
            probe_fallback_families: PROBE_FALLBACK_FAMILIES.to_string(),
        }
    }
}

impl LoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_poll_delay(mut self, delay: Duration) -> Self {
        self.initial_poll_delay = delay;
        self
    }

    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    pub fn with_default_fallback_timeout(mut self, timeout: Duration) -> Self {
        self.default_fallback_timeout = timeout;
        self
    }

    pub fn with_sentinel_text(mut self, text: &str) -> Self {
        self.sentinel_text = text.to_string();
        self
    }

    pub fn with_probe_font_size(mut self, px: f64) -> Self {
        self.probe_font_size_px = px;
        self
    }

    pub fn with_probe_fallback_families(mut self, families: &str) -> Self {
        self.probe_fallback_families = families.to_string();
        self
    }

    /// Reject values that would stall polling or make every probe useless.
    pub fn validate(&self) -> LoaderResult<()> {
        if self.initial_poll_delay.is_zero() {
            return Err(invalid("initial_poll_delay", format!("{:?}", self.initial_poll_delay)));
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor <= 1.0 {
            return Err(invalid("backoff_factor", self.backoff_factor.to_string()));
        }
        if self.default_fallback_timeout.is_zero() {
            return Err(invalid(
                "default_fallback_timeout",
                format!("{:?}", self.default_fallback_timeout),
            ));
        }
        if self.sentinel_text.is_empty() {
            return Err(invalid("sentinel_text", String::new()));
        }
        if !self.probe_font_size_px.is_finite() || self.probe_font_size_px <= 0.0 {
            return Err(invalid("probe_font_size_px", self.probe_font_size_px.to_string()));
        }
        if self.probe_fallback_families.trim().is_empty() {
            return Err(invalid("probe_fallback_families", self.probe_fallback_families.clone()));
        }
        Ok(())
    }
}

fn invalid(field: &str, value: String) -> LoaderError {
    LoaderError::ConfigurationError {
        field: field.to_string(),
        value,
    }
}
