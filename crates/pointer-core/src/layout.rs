//! Landmark layout: which labels form the tracking point, eyes, and mouth.
//!
//! Defaults follow the 68-point iBUG layout (0-based). "Left" and "right"
//! always mean the user's own left and right, so on an unmirrored camera
//! image the left eye is the one on the image's right side (labels 42-47).

use headmouse_tracking_model::frame::LandmarkFrame;
use headmouse_tracking_model::geometry::Point2D;
use serde::{Deserialize, Serialize};

/// Landmark labels used for one eye's aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EyeLandmarks {
    /// Corner-to-corner pair (eye width).
    pub horizontal: [u32; 2],
    /// Two upper-lid/lower-lid pairs (eye opening).
    pub vertical: [[u32; 2]; 2],
}

/// Landmark labels used for the mouth aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouthLandmarks {
    /// Left/right mouth corners.
    pub horizontal: [u32; 2],
    /// Inner upper-lip / inner lower-lip centers.
    pub vertical: [u32; 2],
}

/// Complete landmark layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkLayout {
    /// Layout name, matched against frame stream headers.
    pub name: String,
    /// Label of the pointing reference (nose tip).
    pub tracking_point: u32,
    pub left_eye: EyeLandmarks,
    pub right_eye: EyeLandmarks,
    pub mouth: MouthLandmarks,
}

impl LandmarkLayout {
    /// The 68-point iBUG layout.
    pub fn ibug68() -> Self {
        Self {
            name: "ibug68".to_string(),
            tracking_point: 30,
            left_eye: EyeLandmarks {
                horizontal: [42, 45],
                vertical: [[43, 47], [44, 46]],
            },
            right_eye: EyeLandmarks {
                horizontal: [36, 39],
                vertical: [[37, 41], [38, 40]],
            },
            mouth: MouthLandmarks {
                horizontal: [48, 54],
                vertical: [62, 66],
            },
        }
    }

    /// Extract the tracking point, or `None` when the frame lacks it.
    pub fn tracking_point(&self, frame: &LandmarkFrame) -> Option<Point2D> {
        frame.point(self.tracking_point)
    }

    /// Highest label this layout reads; frames need at least this many
    /// landmarks.
    pub fn max_label(&self) -> u32 {
        let eye_max = |e: &EyeLandmarks| {
            e.horizontal
                .iter()
                .chain(e.vertical.iter().flatten())
                .copied()
                .max()
                .unwrap_or(0)
        };
        [
            self.tracking_point,
            eye_max(&self.left_eye),
            eye_max(&self.right_eye),
            self.mouth.horizontal[0],
            self.mouth.horizontal[1],
            self.mouth.vertical[0],
            self.mouth.vertical[1],
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

impl Default for LandmarkLayout {
    fn default() -> Self {
        Self::ibug68()
    }
}
