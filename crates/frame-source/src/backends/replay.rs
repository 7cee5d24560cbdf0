//! Replay a recorded JSONL frame stream.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use headmouse_common::error::{HeadmouseError, HeadmouseResult};
use headmouse_tracking_model::frame::{CoordinateSpace, FrameStreamHeader, LandmarkFrame};

use crate::LandmarkSource;

type LineIter = Box<dyn Iterator<Item = std::io::Result<String>> + Send>;

/// Streams frames from a JSONL file written by a tracker or by `FrameWriter`.
///
/// Normalized streams are scaled to pixels using the header's frame size so
/// the pointer pipeline always sees pixel coordinates.
pub struct JsonlReplaySource {
    lines: LineIter,
    header: Option<FrameStreamHeader>,
    pending: Option<(usize, String)>,
    line_no: usize,
    frames_read: u64,
    finished: bool,
}

impl JsonlReplaySource {
    pub fn open(path: &Path) -> HeadmouseResult<Self> {
        if !path.exists() {
            return Err(HeadmouseError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read from any buffered source. The header line, if present, is
    /// consumed immediately.
    pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> HeadmouseResult<Self> {
        let mut source = Self {
            lines: Box::new(reader.lines()),
            header: None,
            pending: None,
            line_no: 0,
            frames_read: 0,
            finished: false,
        };

        if let Some((line_no, line)) = source.next_line()? {
            match line.strip_prefix('#') {
                Some(rest) => {
                    let header: FrameStreamHeader = serde_json::from_str(rest.trim()).map_err(|e| {
                        HeadmouseError::tracking(format!("Invalid frame stream header: {e}"))
                    })?;
                    tracing::debug!(?header, "Frame stream header");
                    source.header = Some(header);
                }
                None => source.pending = Some((line_no, line)),
            }
        }
        Ok(source)
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Next non-blank line with its 1-based number.
    fn next_line(&mut self) -> HeadmouseResult<Option<(usize, String)>> {
        if let Some(pending) = self.pending.take() {
            return Ok(Some(pending));
        }
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = line?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok(Some((self.line_no, trimmed.to_string())));
            }
        }
        Ok(None)
    }

    fn to_pixels(&self, mut frame: LandmarkFrame) -> LandmarkFrame {
        if let Some(header) = &self.header {
            if header.coordinate_space == CoordinateSpace::Normalized {
                let (w, h) = (header.frame_width as f64, header.frame_height as f64);
                for landmark in &mut frame.landmarks {
                    landmark.x *= w;
                    landmark.y *= h;
                }
            }
        }
        frame
    }
}

impl LandmarkSource for JsonlReplaySource {
    fn poll(&mut self) -> HeadmouseResult<Option<LandmarkFrame>> {
        loop {
            let Some((line_no, line)) = self.next_line()? else {
                if !self.finished {
                    tracing::debug!(frames = self.frames_read, "Frame stream exhausted");
                }
                self.finished = true;
                return Ok(None);
            };
            if line.starts_with('#') {
                continue;
            }

            let frame: LandmarkFrame = serde_json::from_str(&line).map_err(|e| {
                HeadmouseError::tracking(format!("Invalid frame on line {line_no}: {e}"))
            })?;
            self.frames_read += 1;
            return Ok(Some(self.to_pixels(frame)));
        }
    }

    fn name(&self) -> &str {
        "jsonl-replay"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn header(&self) -> Option<&FrameStreamHeader> {
        self.header.as_ref()
    }
}
