//! Control commands keyed to frame time.
//!
//! File format, one command per line:
//!
//! ```text
//! # ms   command
//! 1500   sensitivity +0.5
//! 4000   mode scroll
//! 6000   reset
//! ```

use std::path::Path;

use headmouse_common::clock::SessionClock;
use headmouse_common::error::{HeadmouseError, HeadmouseResult};
use headmouse_pointer_core::ControlCommand;
use headmouse_tracking_model::frame::TimestampNs;

/// Commands sorted by the frame time at which they become due.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandSchedule {
    entries: Vec<(TimestampNs, ControlCommand)>,
    next: usize,
}

impl CommandSchedule {
    pub fn new(mut entries: Vec<(TimestampNs, ControlCommand)>) -> Self {
        entries.sort_by_key(|(t, _)| *t);
        Self { entries, next: 0 }
    }

    pub fn load(path: &Path) -> HeadmouseResult<Self> {
        if !path.exists() {
            return Err(HeadmouseError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        std::fs::read_to_string(path)?.parse()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Commands due at or before `now`, each returned once.
    pub fn due(&mut self, now: TimestampNs) -> Vec<ControlCommand> {
        let start = self.next;
        while self.next < self.entries.len() && self.entries[self.next].0 <= now {
            self.next += 1;
        }
        self.entries[start..self.next]
            .iter()
            .map(|(_, c)| c.clone())
            .collect()
    }
}

impl std::str::FromStr for CommandSchedule {
    type Err = HeadmouseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut entries = Vec::new();
        for (i, raw) in s.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (ms, command) = line.split_once(char::is_whitespace).ok_or_else(|| {
                HeadmouseError::config(format!("Line {}: expected '<ms> <command>'", i + 1))
            })?;
            let ms: u64 = ms.parse().map_err(|e| {
                HeadmouseError::config(format!("Line {}: invalid time '{ms}': {e}", i + 1))
            })?;
            let command: ControlCommand = command.parse().map_err(|e| {
                HeadmouseError::config(format!("Line {}: {e}", i + 1))
            })?;
            entries.push((SessionClock::ms_to_ns(ms), command));
        }
        Ok(Self::new(entries))
    }
}
