//! Viewer configuration.

use serde::{Deserialize, Serialize};

use crate::render::InterpolationFilter;

/// Settings supplied by the host when a session is created.
///
/// Every field has a default, so a host may pass a partial object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Maximum display area width used for the initial fit.
    pub container_width: u32,
    /// Maximum display area height used for the initial fit.
    pub container_height: u32,
    /// Factor applied by one zoom in or zoom out step.
    pub zoom_step: f64,
    /// Sampling used by the software surface.
    pub sample_filter: InterpolationFilter,
    /// JPEG export quality (1-100).
    pub jpeg_quality: u8,
    /// Dash length of the selection outline, in surface pixels.
    pub overlay_dash: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            container_width: 600,
            container_height: 400,
            zoom_step: 1.1,
            sample_filter: InterpolationFilter::Nearest,
            jpeg_quality: 90,
            overlay_dash: 4,
        }
    }
}

impl ViewerConfig {
    /// Zoom step usable as a multiplier: finite and greater than one.
    pub fn effective_zoom_step(&self) -> f64 {
        if self.zoom_step.is_finite() && self.zoom_step > 1.0 {
            self.zoom_step
        } else {
            Self::default().zoom_step
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!((config.container_width, config.container_height), (600, 400));
        assert_eq!(config.zoom_step, 1.1);
        assert_eq!(config.sample_filter, InterpolationFilter::Nearest);
        assert_eq!(config.jpeg_quality, 90);
    }

    #[test]
    fn test_effective_zoom_step_rejects_degenerate() {
        let mut config = ViewerConfig::default();
        config.zoom_step = 2.0;
        assert_eq!(config.effective_zoom_step(), 2.0);
        config.zoom_step = 1.0;
        assert_eq!(config.effective_zoom_step(), 1.1);
        config.zoom_step = f64::NAN;
        assert_eq!(config.effective_zoom_step(), 1.1);
    }
}
