//! Eye and mouth aspect ratios.

use headmouse_tracking_model::frame::LandmarkFrame;
use serde::{Deserialize, Serialize};

use crate::layout::{EyeLandmarks, LandmarkLayout, MouthLandmarks};

/// Reference distances shorter than this are treated as degenerate.
const MIN_REFERENCE_DISTANCE: f64 = 1e-6;

/// EAR reported when the eye width is degenerate ("open").
pub const NEUTRAL_EAR: f64 = 1.0;

/// MAR reported when the mouth width is degenerate ("closed").
pub const NEUTRAL_MAR: f64 = 0.0;

/// One per-frame gesture metric sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceMetrics {
    pub left_ear: f64,
    pub right_ear: f64,
    pub mar: f64,
}

/// Metric selector used by gesture rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    LeftEar,
    RightEar,
    Mar,
}

impl FaceMetrics {
    /// Compute all metrics, or `None` when any landmark the layout needs is
    /// missing from the frame.
    pub fn from_frame(frame: &LandmarkFrame, layout: &LandmarkLayout) -> Option<Self> {
        Some(Self {
            left_ear: eye_aspect_ratio(frame, &layout.left_eye)?,
            right_ear: eye_aspect_ratio(frame, &layout.right_eye)?,
            mar: mouth_aspect_ratio(frame, &layout.mouth)?,
        })
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::LeftEar => self.left_ear,
            Metric::RightEar => self.right_ear,
            Metric::Mar => self.mar,
        }
    }
}

fn distance(frame: &LandmarkFrame, pair: [u32; 2]) -> Option<f64> {
    let a = frame.point(pair[0])?;
    let b = frame.point(pair[1])?;
    Some(a.distance_to(&b))
}

/// `(v1 + v2) / (2 * h)`; [`NEUTRAL_EAR`] when the eye width is ~0.
pub fn eye_aspect_ratio(frame: &LandmarkFrame, eye: &EyeLandmarks) -> Option<f64> {
    let v1 = distance(frame, eye.vertical[0])?;
    let v2 = distance(frame, eye.vertical[1])?;
    let h = distance(frame, eye.horizontal)?;
    Some(ear_from_distances(v1, v2, h))
}

/// `vertical / horizontal`; [`NEUTRAL_MAR`] when the mouth width is ~0.
pub fn mouth_aspect_ratio(frame: &LandmarkFrame, mouth: &MouthLandmarks) -> Option<f64> {
    let v = distance(frame, mouth.vertical)?;
    let h = distance(frame, mouth.horizontal)?;
    Some(mar_from_distances(v, h))
}

pub fn ear_from_distances(v1: f64, v2: f64, h: f64) -> f64 {
    if h < MIN_REFERENCE_DISTANCE {
        return NEUTRAL_EAR;
    }
    (v1 + v2) / (2.0 * h)
}

pub fn mar_from_distances(v: f64, h: f64) -> f64 {
    if h < MIN_REFERENCE_DISTANCE {
        return NEUTRAL_MAR;
    }
    v / h
}

#[cfg(test)]
mod tests {
    use super::*;
    use headmouse_tracking_model::frame::Landmark;

    /// Frame with a 30 px wide left eye open `opening` px at both lid pairs.
    fn frame_with_left_eye(opening: f64) -> LandmarkFrame {
        let layout = LandmarkLayout::ibug68();
        let mut landmarks: Vec<Landmark> =
            (0..68).map(|id| Landmark::new(id, 0.0, 0.0)).collect();
        let eye = layout.left_eye;
        landmarks[eye.horizontal[0] as usize] = Landmark::new(eye.horizontal[0], 100.0, 50.0);
        landmarks[eye.horizontal[1] as usize] = Landmark::new(eye.horizontal[1], 130.0, 50.0);
        for (i, pair) in eye.vertical.iter().enumerate() {
            let x = 110.0 + 10.0 * i as f64;
            landmarks[pair[0] as usize] = Landmark::new(pair[0], x, 50.0 - opening / 2.0);
            landmarks[pair[1] as usize] = Landmark::new(pair[1], x, 50.0 + opening / 2.0);
        }
        LandmarkFrame::new(0, landmarks)
    }

    #[test]
    fn test_ear_formula() {
        let frame = frame_with_left_eye(9.0);
        let ear = eye_aspect_ratio(&frame, &LandmarkLayout::ibug68().left_eye).unwrap();
        assert!((ear - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_geometry_is_neutral() {
        assert_eq!(ear_from_distances(3.0, 3.0, 0.0), NEUTRAL_EAR);
        assert_eq!(mar_from_distances(5.0, 0.0), NEUTRAL_MAR);

        // All-zero frame: every eye and mouth width collapses.
        let frame = LandmarkFrame::new(0, (0..68).map(|id| Landmark::new(id, 0.0, 0.0)).collect());
        let metrics = FaceMetrics::from_frame(&frame, &LandmarkLayout::ibug68()).unwrap();
        assert_eq!(metrics.left_ear, NEUTRAL_EAR);
        assert_eq!(metrics.right_ear, NEUTRAL_EAR);
        assert_eq!(metrics.mar, NEUTRAL_MAR);
    }

    #[test]
    fn test_missing_landmarks_yield_none() {
        let frame = LandmarkFrame::new(0, (0..40).map(|id| Landmark::new(id, 1.0, 1.0)).collect());
        assert!(FaceMetrics::from_frame(&frame, &LandmarkLayout::ibug68()).is_none());
        let empty = LandmarkFrame::empty(0);
        assert!(FaceMetrics::from_frame(&empty, &LandmarkLayout::ibug68()).is_none());
    }
}
