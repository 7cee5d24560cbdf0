//! Append-only frame stream writer.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use headmouse_common::error::{HeadmouseError, HeadmouseResult};
use headmouse_tracking_model::frame::{FrameStreamHeader, LandmarkFrame};

/// Flush interval; a crash loses at most this many frames.
const FLUSH_EVERY: u64 = 300;

/// Writes landmark frames to a JSONL file, header first.
pub struct FrameWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    frames_written: u64,
}

impl FrameWriter {
    /// Create (or truncate) `path` and write the header comment line.
    pub fn create(path: impl Into<PathBuf>, header: &FrameStreamHeader) -> HeadmouseResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        let mut writer = BufWriter::new(file);

        let header_json = serde_json::to_string(header)?;
        writeln!(writer, "# {header_json}")
            .map_err(|e| HeadmouseError::tracking(format!("Failed to write header: {e}")))?;

        Ok(Self {
            writer,
            path,
            frames_written: 0,
        })
    }

    pub fn write_frame(&mut self, frame: &LandmarkFrame) -> HeadmouseResult<()> {
        let json = serde_json::to_string(frame)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| HeadmouseError::tracking(format!("Failed to write frame: {e}")))?;
        self.frames_written += 1;

        if self.frames_written % FLUSH_EVERY == 0 {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> HeadmouseResult<()> {
        self.writer
            .flush()
            .map_err(|e| HeadmouseError::tracking(format!("Failed to flush frames: {e}")))
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FrameWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
