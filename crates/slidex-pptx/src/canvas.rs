//! Slide canvas dimensions

use std::fmt;

use slidex_core::settings::AssemblySettings;

use crate::constants::{WIDESCREEN_HEIGHT_EMU, WIDESCREEN_WIDTH_EMU};

/// Width and height of a slide in EMU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetCanvas {
    /// Width in EMU
    pub width: i64,
    /// Height in EMU
    pub height: i64,
}

impl TargetCanvas {
    /// 16:9 widescreen, 10" x 5.625"
    pub const WIDESCREEN: TargetCanvas = TargetCanvas {
        width: WIDESCREEN_WIDTH_EMU,
        height: WIDESCREEN_HEIGHT_EMU,
    };

    /// Create a canvas
    pub fn new(width: i64, height: i64) -> Self {
        Self { width, height }
    }

    /// Fallback canvas configured in settings
    pub fn from_settings(settings: &AssemblySettings) -> Self {
        Self::new(settings.default_canvas_width, settings.default_canvas_height)
    }

    /// `PresentationFormat` label written to `docProps/app.xml`
    pub fn format_label(&self) -> &'static str {
        if self.height <= 0 {
            return "Custom";
        }
        let ratio = self.width as f64 / self.height as f64;
        let close = |r: f64| (ratio - r).abs() < 0.01;
        if close(16.0 / 9.0) {
            "On-screen Show (16:9)"
        } else if close(16.0 / 10.0) {
            "On-screen Show (16:10)"
        } else if close(4.0 / 3.0) {
            "On-screen Show (4:3)"
        } else {
            "Custom"
        }
    }
}

impl Default for TargetCanvas {
    fn default() -> Self {
        Self::WIDESCREEN
    }
}

impl fmt::Display for TargetCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.width, self.height)
    }
}
