//! Control commands and the queue that carries them into the frame loop.
//!
//! Commands are sent from any thread and drained once at the start of each
//! processed frame, so control input never interleaves with frame state.

use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use headmouse_common::error::{HeadmouseError, HeadmouseResult};
use serde::{Deserialize, Serialize};

use crate::mode::Mode;

/// A control-surface request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ControlCommand {
    /// Discard calibration and filter state and start collecting again.
    ResetCalibration,
    /// Add a signed delta to the sensitivity multiplier.
    AdjustSensitivity { delta: f64 },
    /// Pause or resume frame processing.
    SetPaused { paused: bool },
    TogglePause,
    /// Set the mode directly.
    ForceMode { mode: Mode },
    ToggleMode,
}

impl FromStr for ControlCommand {
    type Err = HeadmouseError;

    /// Parse the text form used by command files and stdin:
    /// `reset`, `sensitivity +0.5`, `pause`, `mode scroll`, `toggle-mode`.
    /// A JSON object is accepted as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        if line.starts_with('{') {
            return Ok(serde_json::from_str(line)?);
        }

        let mut parts = line.split_whitespace();
        let verb = parts.next().unwrap_or_default().to_ascii_lowercase();
        let arg = parts.next();

        match (verb.as_str(), arg) {
            ("reset" | "recalibrate", None) => Ok(Self::ResetCalibration),
            ("pause", None) => Ok(Self::SetPaused { paused: true }),
            ("resume", None) => Ok(Self::SetPaused { paused: false }),
            ("toggle-pause", None) => Ok(Self::TogglePause),
            ("toggle-mode" | "toggle", None) => Ok(Self::ToggleMode),
            ("sensitivity" | "sens", Some(raw)) => {
                let delta = raw.parse::<f64>().map_err(|e| {
                    HeadmouseError::config(format!("Invalid sensitivity delta '{raw}': {e}"))
                })?;
                if !delta.is_finite() {
                    return Err(HeadmouseError::config(format!(
                        "Sensitivity delta must be finite, got '{raw}'"
                    )));
                }
                Ok(Self::AdjustSensitivity { delta })
            }
            ("mode", Some(mode)) => mode
                .parse::<Mode>()
                .map(|mode| Self::ForceMode { mode })
                .map_err(HeadmouseError::config),
            _ => Err(HeadmouseError::config(format!("Unknown command: '{line}'"))),
        }
    }
}

/// Cloneable handle for sending commands to a session.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<ControlCommand>,
}

impl CommandSender {
    /// Queue a command. Fails only when the session has been dropped.
    pub fn send(&self, command: ControlCommand) -> HeadmouseResult<()> {
        self.tx
            .send(command)
            .map_err(|e| HeadmouseError::unsupported(format!("Session closed: {e}")))
    }
}

/// Receiving end owned by the session.
#[derive(Debug)]
pub struct CommandQueue {
    tx: Sender<ControlCommand>,
    rx: Receiver<ControlCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> CommandSender {
        CommandSender {
            tx: self.tx.clone(),
        }
    }

    /// Everything queued so far, oldest first.
    pub fn drain(&self) -> Vec<ControlCommand> {
        let mut commands = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(command) => commands.push(command),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        commands
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
