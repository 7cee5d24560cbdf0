//! Landmark frames and the JSONL frame stream format.
//!
//! A frame stream is a JSONL file whose first line is a `# `-prefixed
//! [`FrameStreamHeader`], followed by one [`LandmarkFrame`] per line. Frames
//! with an empty landmark list are "no detection" frames and are kept in the
//! stream so replay preserves dropout timing.

use serde::{Deserialize, Serialize};

use crate::geometry::Point2D;

/// Monotonic timestamp in nanoseconds since stream start.
pub type TimestampNs = u64;

/// Current frame stream schema version.
pub const FRAME_SCHEMA_VERSION: &str = "1.0";

/// Coordinate space used by landmark positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSpace {
    /// Pixel coordinates in the source image.
    #[default]
    Pixel,
    /// Coordinates normalized to `[0.0, 1.0]` of the source image.
    Normalized,
}

/// A single labeled landmark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Landmark label (index in the tracker's layout, e.g. 30 = nose tip in
    /// the 68-point layout).
    pub id: u32,
    pub x: f64,
    pub y: f64,
}

impl Landmark {
    pub fn new(id: u32, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    pub fn point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// All landmarks reported by the tracker for one input frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Monotonic nanoseconds since stream start.
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    /// Landmarks in tracker order. Empty when no face was detected.
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

impl LandmarkFrame {
    /// Create a frame from landmarks.
    pub fn new(timestamp_ns: TimestampNs, landmarks: Vec<Landmark>) -> Self {
        Self {
            timestamp_ns,
            landmarks,
        }
    }

    /// Create a frame whose landmark ids are their positions in `points`.
    pub fn from_points(timestamp_ns: TimestampNs, points: &[Point2D]) -> Self {
        let landmarks = points
            .iter()
            .enumerate()
            .map(|(i, p)| Landmark::new(i as u32, p.x, p.y))
            .collect();
        Self::new(timestamp_ns, landmarks)
    }

    /// Create a "no detection" frame.
    pub fn empty(timestamp_ns: TimestampNs) -> Self {
        Self::new(timestamp_ns, Vec::new())
    }

    /// Whether the tracker found a face in this frame.
    pub fn has_detection(&self) -> bool {
        !self.landmarks.is_empty()
    }

    /// Look up a landmark by label.
    pub fn point(&self, id: u32) -> Option<Point2D> {
        // Trackers normally emit landmarks in label order.
        match self.landmarks.get(id as usize) {
            Some(lm) if lm.id == id => Some(lm.point()),
            _ => self
                .landmarks
                .iter()
                .find(|lm| lm.id == id)
                .map(Landmark::point),
        }
    }

    /// Timestamp as fractional seconds since stream start.
    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp_ns as f64 / 1_000_000_000.0
    }
}

/// Metadata written at the top of a frame stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameStreamHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Wall-clock time at stream start (RFC 3339).
    pub epoch_wall: String,

    /// Coordinate space of landmark positions.
    #[serde(default)]
    pub coordinate_space: CoordinateSpace,

    /// Source image dimensions in pixels.
    pub frame_width: u32,
    pub frame_height: u32,

    /// Nominal frame rate of the tracker (Hz).
    pub frame_rate_hz: u32,

    /// Name of the landmark layout (e.g. "ibug68").
    #[serde(default = "default_layout_name")]
    pub layout: String,
}

fn default_layout_name() -> String {
    "ibug68".to_string()
}

impl FrameStreamHeader {
    /// Header for a pixel-space stream.
    pub fn pixel(epoch_wall: impl Into<String>, width: u32, height: u32, fps: u32) -> Self {
        Self {
            schema_version: FRAME_SCHEMA_VERSION.to_string(),
            epoch_wall: epoch_wall.into(),
            coordinate_space: CoordinateSpace::Pixel,
            frame_width: width,
            frame_height: height,
            frame_rate_hz: fps,
            layout: default_layout_name(),
        }
    }
}

/// Parse frames from JSONL content (one JSON object per line).
///
/// Blank lines and `#` comment lines (the header) are skipped.
pub fn parse_frames(jsonl: &str) -> Result<Vec<LandmarkFrame>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Extract the header from the first `# ` line of a frame stream, if any.
pub fn parse_header(jsonl: &str) -> Option<Result<FrameStreamHeader, serde_json::Error>> {
    jsonl
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.strip_prefix('#'))
        .map(|rest| serde_json::from_str(rest.trim()))
}

/// Serialize frames to JSONL format, prefixed by the header comment line.
pub fn serialize_frames(
    header: &FrameStreamHeader,
    frames: &[LandmarkFrame],
) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    output.push_str("# ");
    output.push_str(&serde_json::to_string(header)?);
    output.push('\n');
    for frame in frames {
        output.push_str(&serde_json::to_string(frame)?);
        output.push('\n');
    }
    Ok(output)
}
