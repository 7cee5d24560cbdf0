//! Synthetic face frames with exact metric values.

#![allow(dead_code)]

use headmouse_pointer_core::config::{CalibrationConfig, ControllerConfig};
use headmouse_pointer_core::layout::LandmarkLayout;
use headmouse_tracking_model::frame::LandmarkFrame;
use headmouse_tracking_model::geometry::Point2D;

pub const MS: u64 = 1_000_000;

const EYE_WIDTH: f64 = 30.0;
const MOUTH_WIDTH: f64 = 50.0;

/// Face pose for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    pub nose: Point2D,
    pub left_ear: f64,
    pub right_ear: f64,
    pub mar: f64,
}

impl Face {
    pub fn neutral(x: f64, y: f64) -> Self {
        Self {
            nose: Point2D::new(x, y),
            left_ear: 0.30,
            right_ear: 0.30,
            mar: 0.05,
        }
    }

    pub fn eyes(mut self, left_ear: f64, right_ear: f64) -> Self {
        self.left_ear = left_ear;
        self.right_ear = right_ear;
        self
    }

    pub fn mouth(mut self, mar: f64) -> Self {
        self.mar = mar;
        self
    }

    /// 68-point iBUG frame at `t_ms` realizing this pose.
    pub fn frame(&self, t_ms: u64) -> LandmarkFrame {
        let layout = LandmarkLayout::ibug68();
        let mut points: Vec<Point2D> = (0..68)
            .map(|i| Point2D::new(200.0 + i as f64, 400.0))
            .collect();

        for (eye, ear, x0) in [
            (layout.left_eye, self.left_ear, 380.0),
            (layout.right_eye, self.right_ear, 260.0),
        ] {
            let y = 200.0;
            points[eye.horizontal[0] as usize] = Point2D::new(x0, y);
            points[eye.horizontal[1] as usize] = Point2D::new(x0 + EYE_WIDTH, y);
            let opening = ear * EYE_WIDTH;
            for (k, pair) in eye.vertical.iter().enumerate() {
                let x = x0 + 10.0 + 10.0 * k as f64;
                points[pair[0] as usize] = Point2D::new(x, y - opening / 2.0);
                points[pair[1] as usize] = Point2D::new(x, y + opening / 2.0);
            }
        }

        let mouth = layout.mouth;
        points[mouth.horizontal[0] as usize] = Point2D::new(295.0, 320.0);
        points[mouth.horizontal[1] as usize] = Point2D::new(295.0 + MOUTH_WIDTH, 320.0);
        let opening = self.mar * MOUTH_WIDTH;
        points[mouth.vertical[0] as usize] = Point2D::new(320.0, 320.0 - opening / 2.0);
        points[mouth.vertical[1] as usize] = Point2D::new(320.0, 320.0 + opening / 2.0);

        points[layout.tracking_point as usize] = self.nose;
        LandmarkFrame::from_points(t_ms * MS, &points)
    }
}

/// Default config with a short calibration window.
pub fn config_with_samples(n: usize) -> ControllerConfig {
    ControllerConfig {
        calibration: CalibrationConfig {
            sample_count: n,
            ..CalibrationConfig::default()
        },
        ..ControllerConfig::default()
    }
}
