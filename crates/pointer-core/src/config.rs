//! Controller configuration: every tunable of the pointer pipeline.
//!
//! One record drives all behavioral variants. Persisted as JSON; missing
//! fields fall back to the defaults below.

use headmouse_common::error::{HeadmouseError, HeadmouseResult};
use headmouse_tracking_model::geometry::Bounds;
use serde::{Deserialize, Serialize};

use crate::cursor_smooth::SmoothingAlgorithm;
use crate::gesture::rules::{canonical_rules, GestureAction, GestureRule};
use crate::layout::LandmarkLayout;

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ControllerConfig {
    pub calibration: CalibrationConfig,
    pub motion: MotionConfig,
    pub smoothing: SmoothingAlgorithm,
    pub gestures: GestureConfig,
    pub mode: ModeConfig,
    pub output: OutputConfig,
    pub layout: LandmarkLayout,
}

/// How the neutral pose is captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationStrategy {
    /// Mean of the samples becomes the reference position.
    #[default]
    Centroid,
    /// Outlier-trimmed bounding box becomes the movement range.
    Range,
}

/// Calibration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub strategy: CalibrationStrategy,

    /// Samples required before calibration completes (N).
    pub sample_count: usize,

    /// Range strategy: samples farther than this many standard deviations
    /// from the per-axis mean are discarded.
    pub outlier_sigma: f64,

    /// Range strategy: each axis is widened by this fraction of its span.
    pub margin_fraction: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            strategy: CalibrationStrategy::Centroid,
            sample_count: 30,
            outlier_sigma: 2.0,
            margin_fraction: 0.1,
        }
    }
}

/// Motion mapping parameters. Distances are in landmark pixels, speeds in
/// output pixels per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Offsets shorter than this produce no motion.
    pub deadzone_radius: f64,

    /// Offset length at which speed saturates.
    pub full_strength_distance: f64,

    /// Speed at saturation, before the sensitivity multiplier.
    pub max_speed: f64,

    /// Ramp exponent; values above 1 give finer control near the center.
    pub acceleration_exponent: f64,

    /// Initial pointer sensitivity multiplier.
    pub sensitivity: f64,

    /// Lower clamp for runtime sensitivity adjustments.
    pub min_sensitivity: f64,

    /// Upper clamp for runtime sensitivity adjustments.
    pub max_sensitivity: f64,

    /// Mirror the horizontal axis (front cameras usually need this).
    pub invert_x: bool,

    /// Mirror the vertical axis.
    pub invert_y: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            deadzone_radius: 12.0,
            full_strength_distance: 80.0,
            max_speed: 25.0,
            acceleration_exponent: 2.0,
            sensitivity: 1.0,
            min_sensitivity: 0.1,
            max_sensitivity: 10.0,
            invert_x: false,
            invert_y: false,
        }
    }
}

/// Gesture detection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Eye counts as closed when its aspect ratio is below this.
    pub ear_threshold: f64,

    /// Mouth counts as open when its aspect ratio is above this.
    pub mar_threshold: f64,

    /// Rolling history length (K); also the default debounce window.
    pub history_len: usize,

    /// Minimum spacing between two events of the same gesture.
    pub cooldown_ms: u64,

    /// What a sustained open mouth does in the canonical table.
    pub mouth_open_action: GestureAction,

    /// Replaces the canonical table when set.
    pub rules: Option<Vec<GestureRule>>,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.22,
            mar_threshold: 0.35,
            history_len: 3,
            cooldown_ms: 600,
            mouth_open_action: GestureAction::ToggleMode,
            rules: None,
        }
    }
}

impl GestureConfig {
    /// The effective rule table.
    pub fn effective_rules(&self) -> Vec<GestureRule> {
        match &self.rules {
            Some(rules) => rules.clone(),
            None => canonical_rules(self),
        }
    }
}

/// Which displacement axis drives scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScrollAxis {
    #[default]
    Vertical,
    Horizontal,
}

/// Pointer/Scroll mode parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    pub scroll_axis: ScrollAxis,

    /// Wheel units per output pixel of displacement in Scroll mode.
    pub scroll_sensitivity: f64,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            scroll_axis: ScrollAxis::Vertical,
            scroll_sensitivity: 0.1,
        }
    }
}

/// How cursor motion is handed to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputForm {
    /// `move_to(x, y)` with the clamped cursor position.
    #[default]
    Absolute,
    /// `move_by(dx, dy)` for sinks that only accept relative vectors.
    Relative,
}

/// Output area and form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub bounds: Bounds,
    pub form: OutputForm,
}

impl ControllerConfig {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> HeadmouseResult<()> {
        let c = &self.calibration;
        if c.sample_count == 0 {
            return Err(HeadmouseError::config(
                "Calibration sample count must be greater than 0",
            ));
        }
        if !(c.outlier_sigma > 0.0) {
            return Err(HeadmouseError::config("Outlier sigma must be positive"));
        }
        if !(0.0..=1.0).contains(&c.margin_fraction) {
            return Err(HeadmouseError::config(
                "Range margin fraction must be between 0.0 and 1.0",
            ));
        }

        let m = &self.motion;
        if !(m.deadzone_radius >= 0.0) {
            return Err(HeadmouseError::config("Dead-zone radius must be non-negative"));
        }
        if !(m.full_strength_distance > m.deadzone_radius) {
            return Err(HeadmouseError::config(
                "Full strength distance must exceed the dead-zone radius",
            ));
        }
        if !(m.max_speed > 0.0) {
            return Err(HeadmouseError::config("Max speed must be positive"));
        }
        if !(m.acceleration_exponent > 0.0) {
            return Err(HeadmouseError::config(
                "Acceleration exponent must be positive",
            ));
        }
        if !(m.min_sensitivity > 0.0 && m.min_sensitivity <= m.max_sensitivity) {
            return Err(HeadmouseError::config(
                "Sensitivity limits must satisfy 0 < min <= max",
            ));
        }
        if !(m.min_sensitivity..=m.max_sensitivity).contains(&m.sensitivity) {
            return Err(HeadmouseError::config(format!(
                "Sensitivity must be between {} and {}",
                m.min_sensitivity, m.max_sensitivity
            )));
        }

        match self.smoothing {
            SmoothingAlgorithm::Ema { alpha } if !(alpha > 0.0 && alpha <= 1.0) => {
                return Err(HeadmouseError::config("EMA alpha must be in (0.0, 1.0]"));
            }
            SmoothingAlgorithm::MovingAverage { window } | SmoothingAlgorithm::Median { window }
                if window == 0 =>
            {
                return Err(HeadmouseError::config(
                    "Smoothing window must be greater than 0",
                ));
            }
            _ => {}
        }

        let g = &self.gestures;
        if g.history_len == 0 {
            return Err(HeadmouseError::config(
                "Gesture history length must be greater than 0",
            ));
        }
        if !(g.ear_threshold > 0.0) || !(g.mar_threshold > 0.0) {
            return Err(HeadmouseError::config("EAR/MAR thresholds must be positive"));
        }
        for rule in self.gestures.effective_rules() {
            rule.validate(g.history_len)?;
        }

        if !(self.mode.scroll_sensitivity > 0.0) {
            return Err(HeadmouseError::config("Scroll sensitivity must be positive"));
        }

        let b = &self.output.bounds;
        if !(b.width >= 1.0 && b.height >= 1.0) {
            return Err(HeadmouseError::config(
                "Output bounds must be at least 1x1 pixels",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        ControllerConfig::default().validate().unwrap();
    }

    #[test]
    fn test_zero_sample_count_rejected() {
        let mut config = ControllerConfig::default();
        config.calibration.sample_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deadzone_must_be_inside_full_strength() {
        let mut config = ControllerConfig::default();
        config.motion.deadzone_radius = 90.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_smoothing_window_rejected() {
        let mut config = ControllerConfig::default();
        config.smoothing = SmoothingAlgorithm::Median { window: 0 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sensitivity_outside_limits_rejected() {
        let mut config = ControllerConfig::default();
        config.motion.sensitivity = 20.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let raw = r#"{
            "motion": { "deadzone_radius": 8.0 },
            "smoothing": { "algorithm": "moving_average", "window": 4 },
            "gestures": { "mouth_open_action": "double_click" }
        }"#;
        let config: ControllerConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.motion.deadzone_radius, 8.0);
        assert_eq!(config.motion.max_speed, 25.0);
        assert_eq!(config.smoothing, SmoothingAlgorithm::MovingAverage { window: 4 });
        assert_eq!(config.gestures.mouth_open_action, GestureAction::DoubleClick);
        assert_eq!(config.calibration.sample_count, 30);
        config.validate().unwrap();
    }

    #[test]
    fn test_json_roundtrip_preserves_everything() {
        let mut config = ControllerConfig::default();
        config.calibration.strategy = CalibrationStrategy::Range;
        config.output.form = OutputForm::Relative;
        config.output.bounds = Bounds::from_size(2560, 1440);
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: ControllerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
