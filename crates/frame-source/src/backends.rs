//! Landmark source implementations.
//!
//! Each source provides a different way to obtain landmark frames.

mod replay;
mod synthetic;

use headmouse_common::error::HeadmouseResult;
use headmouse_tracking_model::frame::{FrameStreamHeader, LandmarkFrame};

use crate::LandmarkSource;

pub use replay::JsonlReplaySource;
pub use synthetic::{Pose, Script, ScriptStep, SyntheticSource, DEFAULT_SCRIPT};

/// Pre-loaded frames, mainly for tests and embedding.
pub struct MemorySource {
    frames: Vec<LandmarkFrame>,
    header: Option<FrameStreamHeader>,
    index: usize,
}

impl MemorySource {
    pub fn new(frames: Vec<LandmarkFrame>) -> Self {
        Self {
            frames,
            header: None,
            index: 0,
        }
    }

    pub fn with_header(mut self, header: FrameStreamHeader) -> Self {
        self.header = Some(header);
        self
    }

    /// A source that never produces frames.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl LandmarkSource for MemorySource {
    fn poll(&mut self) -> HeadmouseResult<Option<LandmarkFrame>> {
        let frame = self.frames.get(self.index).cloned();
        if frame.is_some() {
            self.index += 1;
        }
        Ok(frame)
    }

    fn name(&self) -> &str {
        "memory"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn is_finished(&self) -> bool {
        self.index >= self.frames.len()
    }

    fn header(&self) -> Option<&FrameStreamHeader> {
        self.header.as_ref()
    }
}
