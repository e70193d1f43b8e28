//! Page configuration: which elements the behaviours bind to, their
//! timings, and the platform capabilities the page is loaded with.

use crate::error::{Error, Result};
use crate::platform::PlatformConfig;

/// Ids of the host page elements the submit controller binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementIds {
    pub trigger: String,
    pub input: String,
    pub loading_region: String,
    pub empty_region: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            trigger: "btn1".into(),
            input: "pwd".into(),
            loading_region: "myDIV".into(),
            empty_region: "nss".into(),
        }
    }
}

/// Delays in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub invalid_indicator_ms: i64,
    pub loading_fade_ms: i64,
    pub scroll_delay_ms: i64,
    pub toast_show_ms: i64,
    pub toast_visible_ms: i64,
    pub toast_exit_ms: i64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            invalid_indicator_ms: 600,
            loading_fade_ms: 10,
            scroll_delay_ms: 100,
            toast_show_ms: 10,
            toast_visible_ms: 3000,
            toast_exit_ms: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevealOptions {
    pub selector: String,
    pub threshold: f64,
    /// Added to the bottom edge of the viewport; negative values shrink it.
    pub bottom_margin_px: i64,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            selector: ".result-card".into(),
            threshold: 0.1,
            bottom_margin_px: -50,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub ids: ElementIds,
    pub timings: Timings,
    pub reveal: RevealOptions,
    pub results_selector: String,
    /// `None` keeps toasts unbounded.
    pub max_toasts: Option<usize>,
    pub viewport_height: i64,
    pub inject_styles: bool,
    pub platform: PlatformConfig,
    pub timer_step_limit: usize,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            ids: ElementIds::default(),
            timings: Timings::default(),
            reveal: RevealOptions::default(),
            results_selector: ".results-section".into(),
            max_toasts: None,
            viewport_height: 800,
            inject_styles: true,
            platform: PlatformConfig::default(),
            timer_step_limit: 10_000,
        }
    }
}

impl PageConfig {
    pub fn validate(&self) -> Result<()> {
        let t = &self.timings;
        let delays = [
            ("invalid_indicator_ms", t.invalid_indicator_ms),
            ("loading_fade_ms", t.loading_fade_ms),
            ("scroll_delay_ms", t.scroll_delay_ms),
            ("toast_show_ms", t.toast_show_ms),
            ("toast_visible_ms", t.toast_visible_ms),
            ("toast_exit_ms", t.toast_exit_ms),
        ];
        if let Some((name, value)) = delays.iter().find(|(_, value)| *value < 0) {
            return Err(Error::Config(format!("{name} must be non-negative, got {value}")));
        }
        if t.toast_visible_ms < t.toast_show_ms {
            return Err(Error::Config(
                "toast_visible_ms must not be shorter than toast_show_ms".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.reveal.threshold) {
            return Err(Error::Config(format!(
                "reveal threshold must be within 0..=1, got {}",
                self.reveal.threshold
            )));
        }
        if self.max_toasts == Some(0) {
            return Err(Error::Config("max_toasts must be at least 1".into()));
        }
        if self.viewport_height <= 0 {
            return Err(Error::Config("viewport_height must be positive".into()));
        }
        if self.timer_step_limit == 0 {
            return Err(Error::Config(
                "timer_step_limit requires at least 1 step".into(),
            ));
        }
        Ok(())
    }
}
