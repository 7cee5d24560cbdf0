//! Motion mapping: tracking point + calibration → cursor displacement.
//!
//! # Pipeline
//!
//! 1. **Offset** from the reference position, or from the cursor to the
//!    range-mapped target.
//! 2. **Dead-zone**: short offsets produce nothing and leave the filter alone.
//! 3. **Acceleration**: `max_speed * sensitivity * norm^exponent` along the
//!    offset direction, with `norm` ramping from 0 at the dead-zone edge to 1
//!    at `full_strength_distance`.
//! 4. **Smoothing** through [`CursorSmoother`].
//! 5. **Clamp** the advanced cursor to the output bounds.

use headmouse_tracking_model::geometry::{Bounds, Point2D, Vector2};

use crate::calibration::Calibration;
use crate::config::MotionConfig;
use crate::cursor_smooth::{CursorSmoother, SmoothingAlgorithm};

/// Filtered output position plus filter memory.
#[derive(Debug, Clone)]
pub struct CursorState {
    pub position: Point2D,
    smoother: CursorSmoother,
}

/// Per-frame result of [`MotionMapper::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    /// Offset after axis inversion.
    pub offset: Vector2,
    /// Accelerated displacement before smoothing.
    pub raw: Vector2,
    /// Smoothed displacement to apply this frame.
    pub displacement: Vector2,
    pub in_deadzone: bool,
}

/// Cursor update produced by [`MotionMapper::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorMove {
    /// New absolute position, inside the output bounds.
    pub target: Point2D,
    /// Actual change from the previous position after clamping.
    pub delta: Vector2,
}

/// Converts tracking points into cursor motion.
#[derive(Debug, Clone)]
pub struct MotionMapper {
    config: MotionConfig,
    bounds: Bounds,
    cursor: CursorState,
}

impl MotionMapper {
    /// Create a mapper with the cursor at the center of `bounds`.
    pub fn new(config: MotionConfig, smoothing: SmoothingAlgorithm, bounds: Bounds) -> Self {
        Self {
            config,
            cursor: CursorState {
                position: bounds.center(),
                smoother: CursorSmoother::new(smoothing),
            },
            bounds,
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Current cursor position.
    pub fn cursor(&self) -> Point2D {
        self.cursor.position
    }

    /// Offset driving this frame's motion.
    pub fn offset(&self, point: Point2D, calibration: &Calibration) -> Vector2 {
        match calibration {
            Calibration::Reference { position } => {
                let mut v = point.offset_from(position);
                if self.config.invert_x {
                    v.dx = -v.dx;
                }
                if self.config.invert_y {
                    v.dy = -v.dy;
                }
                v
            }
            Calibration::Range { range } => {
                let (mut nx, mut ny) = range.normalize(point);
                if self.config.invert_x {
                    nx = 1.0 - nx;
                }
                if self.config.invert_y {
                    ny = 1.0 - ny;
                }
                self.bounds
                    .denormalize(nx, ny)
                    .offset_from(&self.cursor.position)
            }
        }
    }

    /// Dead-zone and acceleration curve. Pure.
    ///
    /// `cap` limits the step length, so range mode approaches the mapped
    /// target without overshooting it.
    pub fn accelerate(&self, offset: Vector2, sensitivity: f64, cap: Option<f64>) -> Vector2 {
        let distance = offset.length();
        let deadzone = self.config.deadzone_radius;
        if distance < deadzone {
            return Vector2::ZERO;
        }
        let Some(direction) = offset.unit() else {
            return Vector2::ZERO;
        };

        let ramp = (self.config.full_strength_distance - deadzone).max(f64::EPSILON);
        let norm = ((distance - deadzone) / ramp).clamp(0.0, 1.0);
        let mut speed =
            self.config.max_speed * sensitivity * norm.powf(self.config.acceleration_exponent);
        if let Some(cap) = cap {
            speed = speed.min(cap);
        }
        direction.scale(speed)
    }

    /// Run offset, dead-zone, acceleration, and smoothing for one frame.
    ///
    /// Does not move the cursor; see [`MotionMapper::advance`].
    pub fn step(
        &mut self,
        point: Point2D,
        calibration: &Calibration,
        sensitivity: f64,
    ) -> MotionSample {
        let offset = self.offset(point, calibration);
        if offset.length() < self.config.deadzone_radius {
            return MotionSample {
                offset,
                raw: Vector2::ZERO,
                displacement: Vector2::ZERO,
                in_deadzone: true,
            };
        }

        let cap = match calibration {
            Calibration::Reference { .. } => None,
            Calibration::Range { .. } => Some(offset.length()),
        };
        let raw = self.accelerate(offset, sensitivity, cap);
        let displacement = self.cursor.smoother.apply(raw);

        MotionSample {
            offset,
            raw,
            displacement,
            in_deadzone: false,
        }
    }

    /// Apply a displacement to the cursor, clamped to the output bounds.
    pub fn advance(&mut self, displacement: Vector2) -> CursorMove {
        let previous = self.cursor.position;
        let target = self.bounds.clamp(previous.translate(displacement));
        self.cursor.position = target;
        CursorMove {
            target,
            delta: target.offset_from(&previous),
        }
    }

    /// Clear filter memory. The cursor keeps its position.
    pub fn reset(&mut self) {
        self.cursor.smoother.reset();
    }
}
