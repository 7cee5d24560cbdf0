//! Scripted synthetic face frames.
//!
//! Produces 68-point iBUG frames for a sequence of poses (neutral, head
//! turns, winks, blink, open mouth, dropout) so the whole pipeline can be
//! exercised without a camera or a landmark model.

use std::fmt;
use std::str::FromStr;

use headmouse_common::error::{HeadmouseError, HeadmouseResult};
use headmouse_tracking_model::frame::{FrameStreamHeader, LandmarkFrame, TimestampNs};
use headmouse_tracking_model::geometry::{Point2D, Vector2};
use serde::{Deserialize, Serialize};

use crate::LandmarkSource;

/// Script used when none is given: calibrate, move, click, toggle scroll,
/// scroll, toggle back, drop out, right click.
pub const DEFAULT_SCRIPT: &str = "neutral:45,right:30,neutral:15,left-wink:4,neutral:20,\
mouth-open:5,neutral:10,down:30,neutral:10,mouth-open:5,neutral:10,\
dropout:5,right-wink:4,neutral:10";

const LANDMARK_COUNT: usize = 68;
const EYE_WIDTH: f64 = 30.0;
const MOUTH_WIDTH: f64 = 50.0;
const OPEN_EAR: f64 = 0.30;
const CLOSED_EAR: f64 = 0.10;
const CLOSED_MAR: f64 = 0.05;
const OPEN_MAR: f64 = 0.50;

/// One scripted pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pose {
    Neutral,
    Left,
    Right,
    Up,
    Down,
    LeftWink,
    RightWink,
    Blink,
    MouthOpen,
    Dropout,
}

impl Pose {
    const ALL: [Pose; 10] = [
        Pose::Neutral,
        Pose::Left,
        Pose::Right,
        Pose::Up,
        Pose::Down,
        Pose::LeftWink,
        Pose::RightWink,
        Pose::Blink,
        Pose::MouthOpen,
        Pose::Dropout,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Pose::Neutral => "neutral",
            Pose::Left => "left",
            Pose::Right => "right",
            Pose::Up => "up",
            Pose::Down => "down",
            Pose::LeftWink => "left-wink",
            Pose::RightWink => "right-wink",
            Pose::Blink => "blink",
            Pose::MouthOpen => "mouth-open",
            Pose::Dropout => "dropout",
        }
    }

    /// Head offset in frame pixels for a given look distance.
    fn head_offset(self, distance: f64) -> Vector2 {
        match self {
            Pose::Left => Vector2::new(-distance, 0.0),
            Pose::Right => Vector2::new(distance, 0.0),
            Pose::Up => Vector2::new(0.0, -distance),
            Pose::Down => Vector2::new(0.0, distance),
            _ => Vector2::ZERO,
        }
    }

    /// `(left_ear, right_ear, mar)`
    fn shape(self) -> (f64, f64, f64) {
        match self {
            Pose::LeftWink => (CLOSED_EAR, OPEN_EAR, CLOSED_MAR),
            Pose::RightWink => (OPEN_EAR, CLOSED_EAR, CLOSED_MAR),
            Pose::Blink => (CLOSED_EAR, CLOSED_EAR, CLOSED_MAR),
            Pose::MouthOpen => (OPEN_EAR, OPEN_EAR, OPEN_MAR),
            _ => (OPEN_EAR, OPEN_EAR, CLOSED_MAR),
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pose {
    type Err = HeadmouseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase().replace('_', "-");
        Pose::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| HeadmouseError::config(format!("Unknown synthetic pose '{s}'")))
    }
}

/// A pose held for a number of frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub pose: Pose,
    pub frames: u32,
}

/// Ordered pose sequence, written as `pose:frames,pose:frames,...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn total_frames(&self) -> u64 {
        self.steps.iter().map(|s| s.frames as u64).sum()
    }

    /// Repeat the whole script until it covers at least `frames` frames.
    pub fn cycled_to(&self, frames: u64) -> Script {
        let per_cycle = self.total_frames();
        if per_cycle == 0 || per_cycle >= frames {
            return self.clone();
        }
        let cycles = frames.div_ceil(per_cycle) as usize;
        Script {
            steps: self.steps.iter().copied().cycle().take(self.steps.len() * cycles).collect(),
        }
    }
}

impl Default for Script {
    fn default() -> Self {
        // The default script is a compile-time constant that always parses.
        DEFAULT_SCRIPT.parse().unwrap_or(Script {
            steps: vec![ScriptStep {
                pose: Pose::Neutral,
                frames: 30,
            }],
        })
    }
}

impl FromStr for Script {
    type Err = HeadmouseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let steps = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (pose, frames) = part.split_once(':').ok_or_else(|| {
                    HeadmouseError::config(format!("Script step '{part}' must be pose:frames"))
                })?;
                let frames = frames.trim().parse::<u32>().map_err(|e| {
                    HeadmouseError::config(format!("Invalid frame count in '{part}': {e}"))
                })?;
                Ok(ScriptStep {
                    pose: pose.parse()?,
                    frames,
                })
            })
            .collect::<HeadmouseResult<Vec<_>>>()?;

        if steps.is_empty() {
            return Err(HeadmouseError::config("Synthetic script is empty"));
        }
        Ok(Script { steps })
    }
}

/// Generates frames for a [`Script`] at a fixed frame rate.
pub struct SyntheticSource {
    script: Script,
    header: FrameStreamHeader,
    look_distance: f64,
    jitter: f64,
    step: usize,
    frame_in_step: u32,
    index: u64,
}

impl SyntheticSource {
    /// Face centered in a `width` x `height` image.
    pub fn new(
        script: Script,
        width: u32,
        height: u32,
        fps: u32,
        epoch_wall: impl Into<String>,
    ) -> Self {
        Self {
            script,
            header: FrameStreamHeader::pixel(epoch_wall, width, height, fps.max(1)),
            look_distance: 60.0,
            jitter: 0.4,
            step: 0,
            frame_in_step: 0,
            index: 0,
        }
    }

    /// Head travel in pixels for the directional poses.
    pub fn with_look_distance(mut self, distance: f64) -> Self {
        self.look_distance = distance;
        self
    }

    /// Peak tracker noise in pixels added to every landmark.
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.max(0.0);
        self
    }

    pub fn frame_header(&self) -> &FrameStreamHeader {
        &self.header
    }

    /// Generate every remaining frame.
    pub fn collect_frames(&mut self) -> Vec<LandmarkFrame> {
        let mut frames = Vec::with_capacity(self.script.total_frames() as usize);
        while let Some(frame) = self.next_frame() {
            frames.push(frame);
        }
        frames
    }

    fn next_frame(&mut self) -> Option<LandmarkFrame> {
        loop {
            let step = *self.script.steps.get(self.step)?;
            if self.frame_in_step < step.frames {
                self.frame_in_step += 1;
                let t = self.timestamp(self.index);
                let frame = self.render(step.pose, t);
                self.index += 1;
                return Some(frame);
            }
            self.step += 1;
            self.frame_in_step = 0;
        }
    }

    fn timestamp(&self, index: u64) -> TimestampNs {
        index * 1_000_000_000 / self.header.frame_rate_hz as u64
    }

    fn render(&self, pose: Pose, t: TimestampNs) -> LandmarkFrame {
        if pose == Pose::Dropout {
            return LandmarkFrame::empty(t);
        }

        let center = Point2D::new(
            self.header.frame_width as f64 / 2.0,
            self.header.frame_height as f64 / 2.0,
        );
        let nose = center.translate(pose.head_offset(self.look_distance));
        let (left_ear, right_ear, mar) = pose.shape();

        // Face outline for labels the pipeline does not read.
        let mut points: Vec<Point2D> = (0..LANDMARK_COUNT)
            .map(|i| {
                let a = i as f64 / LANDMARK_COUNT as f64 * std::f64::consts::TAU;
                nose.translate(Vector2::new(90.0 * a.cos(), 110.0 * a.sin()))
            })
            .collect();

        // The user's left eye appears on the image's right.
        let left_origin = nose.translate(Vector2::new(25.0, -40.0));
        let right_origin = nose.translate(Vector2::new(-55.0, -40.0));
        place_eye(&mut points, left_origin, [42, 45], [[43, 47], [44, 46]], left_ear);
        place_eye(&mut points, right_origin, [36, 39], [[37, 41], [38, 40]], right_ear);

        let mouth = nose.translate(Vector2::new(0.0, 45.0));
        let opening = mar * MOUTH_WIDTH;
        points[48] = mouth.translate(Vector2::new(-MOUTH_WIDTH / 2.0, 0.0));
        points[54] = mouth.translate(Vector2::new(MOUTH_WIDTH / 2.0, 0.0));
        points[62] = mouth.translate(Vector2::new(0.0, -opening / 2.0));
        points[66] = mouth.translate(Vector2::new(0.0, opening / 2.0));
        points[30] = nose;

        if self.jitter > 0.0 {
            let k = self.index as f64;
            for (i, p) in points.iter_mut().enumerate() {
                let i = i as f64;
                p.x += self.jitter * (i * 12.9898 + k * 78.233).sin();
                p.y += self.jitter * (i * 39.346 + k * 11.135).sin();
            }
        }

        LandmarkFrame::from_points(t, &points)
    }
}

/// Eye whose outer-left corner is at `origin`, opened to `ear`.
fn place_eye(
    points: &mut [Point2D],
    origin: Point2D,
    corners: [usize; 2],
    lids: [[usize; 2]; 2],
    ear: f64,
) {
    let opening = ear * EYE_WIDTH;
    points[corners[0]] = origin;
    points[corners[1]] = origin.translate(Vector2::new(EYE_WIDTH, 0.0));
    for (k, [top, bottom]) in lids.into_iter().enumerate() {
        let x = 10.0 + 10.0 * k as f64;
        points[top] = origin.translate(Vector2::new(x, -opening / 2.0));
        points[bottom] = origin.translate(Vector2::new(x, opening / 2.0));
    }
}

impl LandmarkSource for SyntheticSource {
    fn poll(&mut self) -> HeadmouseResult<Option<LandmarkFrame>> {
        Ok(self.next_frame())
    }

    fn name(&self) -> &str {
        "synthetic"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn is_finished(&self) -> bool {
        self.step >= self.script.steps.len()
            || (self.step + 1 == self.script.steps.len()
                && self.frame_in_step >= self.script.steps[self.step].frames)
    }

    fn header(&self) -> Option<&FrameStreamHeader> {
        Some(&self.header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_parse() {
        let script: Script = "neutral:3, left_wink:2,dropout:1".parse().unwrap();
        assert_eq!(script.total_frames(), 6);
        assert_eq!(script.steps[1].pose, Pose::LeftWink);
        assert!("neutral".parse::<Script>().is_err());
        assert!("wave:3".parse::<Script>().is_err());
        assert!("".parse::<Script>().is_err());
    }

    #[test]
    fn test_default_script_parses() {
        let script: Script = DEFAULT_SCRIPT.parse().unwrap();
        assert_eq!(Script::default(), script);
        assert!(script.total_frames() > 100);
    }

    #[test]
    fn test_generates_scripted_frame_count_and_timestamps() {
        let script: Script = "neutral:2,dropout:1,right:2".parse().unwrap();
        let mut source = SyntheticSource::new(script, 640, 480, 25, "x");
        let frames = source.collect_frames();
        assert_eq!(frames.len(), 5);
        assert_eq!(frames[1].timestamp_ns, 40_000_000);
        assert!(!frames[2].has_detection());
        assert_eq!(frames[0].landmarks.len(), 68);
        assert!(source.is_finished());
        assert!(source.poll().unwrap().is_none());
    }

    #[test]
    fn test_right_pose_moves_nose_right() {
        let script: Script = "neutral:1,right:1".parse().unwrap();
        let frames = SyntheticSource::new(script, 640, 480, 30, "x")
            .with_jitter(0.0)
            .collect_frames();
        let a = frames[0].point(30).unwrap();
        let b = frames[1].point(30).unwrap();
        assert_eq!(a, Point2D::new(320.0, 240.0));
        assert_eq!(b, Point2D::new(380.0, 240.0));
    }

    #[test]
    fn test_cycled_script_covers_duration() {
        let script: Script = "neutral:10,blink:5".parse().unwrap();
        let long = script.cycled_to(40);
        assert_eq!(long.total_frames(), 45);
    }
}
