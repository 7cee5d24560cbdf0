//! Calibration: establish the neutral pose from an initial sample window.
//!
//! # Strategies
//!
//! 1. **Centroid**: the mean of N tracking points becomes the reference
//!    position. Motion is then driven by the offset from that point.
//! 2. **Range**: per axis, samples beyond `outlier_sigma` standard deviations
//!    are dropped, the min/max of the rest is widened by a margin, and the
//!    resulting box is linearly rescaled onto the output area.
//!
//! Completion happens exactly at the N-th sample. Later samples are ignored
//! until [`CalibrationManager::reset`].

use headmouse_tracking_model::geometry::{Bounds, Point2D};
use serde::{Deserialize, Serialize};

use crate::config::{CalibrationConfig, CalibrationStrategy};

/// Variance below this is treated as a degenerate (perfectly still) hold.
const DEGENERATE_STD: f64 = 1e-9;

/// Per-axis bounding box of the user's comfortable head motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementRange {
    pub min: Point2D,
    pub max: Point2D,
}

impl MovementRange {
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Position of `p` inside the range as 0..=1 per axis.
    ///
    /// Points outside the range are clamped to its edges. An axis without
    /// extent maps to 0.5.
    pub fn normalize(&self, p: Point2D) -> (f64, f64) {
        (
            normalize_axis(p.x, self.min.x, self.max.x),
            normalize_axis(p.y, self.min.y, self.max.y),
        )
    }

    /// Rescale `p` from the range onto `bounds`.
    pub fn map_into(&self, p: Point2D, bounds: &Bounds) -> Point2D {
        let (nx, ny) = self.normalize(p);
        bounds.denormalize(nx, ny)
    }
}

fn normalize_axis(v: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span.abs() < DEGENERATE_STD {
        return 0.5;
    }
    ((v - min) / span).clamp(0.0, 1.0)
}

/// Result of a completed calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Calibration {
    /// Neutral tracking point (centroid strategy).
    Reference { position: Point2D },
    /// Comfortable motion box (range strategy).
    Range { range: MovementRange },
}

/// Outcome of feeding one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationProgress {
    /// Still collecting; `collected` of `required` samples held.
    Collecting { collected: usize, required: usize },
    /// This sample completed calibration.
    Completed(Calibration),
    /// Calibration was already complete; the sample was ignored.
    AlreadyCalibrated,
}

/// Accumulates samples and owns the resulting reference or range.
#[derive(Debug, Clone)]
pub struct CalibrationManager {
    config: CalibrationConfig,
    samples: Vec<Point2D>,
    result: Option<Calibration>,
}

impl CalibrationManager {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            samples: Vec::with_capacity(config.sample_count),
            config,
            result: None,
        }
    }

    /// Feed one tracking point.
    pub fn add_sample(&mut self, point: Point2D) -> CalibrationProgress {
        if self.result.is_some() {
            return CalibrationProgress::AlreadyCalibrated;
        }

        self.samples.push(point);
        let required = self.required();
        if self.samples.len() < required {
            return CalibrationProgress::Collecting {
                collected: self.samples.len(),
                required,
            };
        }

        let calibration = match self.config.strategy {
            CalibrationStrategy::Centroid => {
                let position = Point2D::centroid(&self.samples).unwrap_or(point);
                Calibration::Reference { position }
            }
            CalibrationStrategy::Range => Calibration::Range {
                range: compute_range(
                    &self.samples,
                    self.config.outlier_sigma,
                    self.config.margin_fraction,
                ),
            },
        };

        tracing::info!(
            samples = self.samples.len(),
            ?calibration,
            "Calibration complete"
        );
        self.samples.clear();
        self.result = Some(calibration);
        CalibrationProgress::Completed(calibration)
    }

    pub fn is_calibrated(&self) -> bool {
        self.result.is_some()
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        self.result.as_ref()
    }

    /// Integer percent; 100 once calibrated.
    pub fn progress_percent(&self) -> u8 {
        if self.result.is_some() {
            return 100;
        }
        let pct = self.samples.len() * 100 / self.required();
        pct.min(100) as u8
    }

    /// Samples collected toward the current calibration.
    pub fn collected(&self) -> usize {
        self.samples.len()
    }

    /// Drop samples and the stored result.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.result = None;
    }

    fn required(&self) -> usize {
        self.config.sample_count.max(1)
    }
}

/// Outlier-trimmed, margin-expanded bounding box of `samples`.
///
/// Returns a zero-size range at the origin for an empty slice.
pub fn compute_range(samples: &[Point2D], sigma: f64, margin_fraction: f64) -> MovementRange {
    let xs: Vec<f64> = samples.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = samples.iter().map(|p| p.y).collect();

    let (min_x, max_x) = trimmed_axis(&xs, sigma, margin_fraction);
    let (min_y, max_y) = trimmed_axis(&ys, sigma, margin_fraction);

    MovementRange {
        min: Point2D::new(min_x, min_y),
        max: Point2D::new(max_x, max_y),
    }
}

fn trimmed_axis(values: &[f64], sigma: f64, margin_fraction: f64) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();

    let (lo, hi) = if std < DEGENERATE_STD {
        min_max(values.iter().copied())
    } else {
        let limit = sigma * std;
        let kept = values.iter().copied().filter(|v| (v - mean).abs() <= limit);
        let (lo, hi) = min_max(kept);
        if lo > hi {
            min_max(values.iter().copied())
        } else {
            (lo, hi)
        }
    };

    let pad = (hi - lo) * margin_fraction;
    (lo - pad, hi + pad)
}

/// Returns `(INFINITY, NEG_INFINITY)` for an empty iterator.
fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}
