//! Session: all controller state plus the per-frame orchestration.
//!
//! # Per-frame order
//!
//! 1. Drain queued control commands.
//! 2. If paused, stop here.
//! 3. Gesture detection (always runs on unpaused frames).
//! 4. Calibration sampling until calibrated.
//! 5. Gesture actions (clicks, mode toggles).
//! 6. Motion mapping, routed by mode.
//! 7. Dispatch. Failures are logged and reported, never fatal.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use headmouse_common::error::HeadmouseResult;
use headmouse_platform_core::ActionDispatcher;
use headmouse_tracking_model::action::{MouseButton, PointerAction};
use headmouse_tracking_model::frame::{LandmarkFrame, TimestampNs};
use headmouse_tracking_model::geometry::Point2D;
use serde::{Deserialize, Serialize};

use crate::calibration::{Calibration, CalibrationManager, CalibrationProgress};
use crate::command::{CommandQueue, CommandSender, ControlCommand};
use crate::config::ControllerConfig;
use crate::gesture::{GestureAction, GestureDetector, GestureEvent};
use crate::mode::{Mode, ModeController};
use crate::motion::{MotionMapper, MotionSample};

/// Snapshot returned by status queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub mode: Mode,
    pub paused: bool,
    pub calibrated: bool,
    pub calibration_progress_percent: u8,
    pub sensitivity: f64,
}

/// A dispatcher call that failed.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchFailure {
    pub action: PointerAction,
    pub message: String,
}

/// What happened while processing one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub timestamp_ns: TimestampNs,
    /// The tracking point was present.
    pub detected: bool,
    pub paused: bool,
    pub commands_applied: usize,
    pub calibration_completed: bool,
    pub gestures: Vec<GestureEvent>,
    pub motion: Option<MotionSample>,
    /// New mode if it changed during this frame.
    pub mode_changed: Option<Mode>,
    /// Actions handed to the dispatcher, in order.
    pub actions: Vec<PointerAction>,
    pub dispatch_failures: Vec<DispatchFailure>,
}

impl FrameReport {
    pub fn dispatched_ok(&self) -> usize {
        self.actions.len() - self.dispatch_failures.len()
    }
}

/// Explicit session context holding all controller state.
#[derive(Debug)]
pub struct Session {
    config: ControllerConfig,
    calibration: CalibrationManager,
    motion: MotionMapper,
    gestures: GestureDetector,
    mode: ModeController,
    commands: CommandQueue,
    sensitivity: f64,
    paused: bool,
    frames_processed: u64,
}

impl Session {
    /// Create a session. Fails if the configuration does not validate.
    pub fn new(config: ControllerConfig) -> HeadmouseResult<Self> {
        config.validate()?;

        tracing::info!(
            strategy = ?config.calibration.strategy,
            samples = config.calibration.sample_count,
            smoothing = config.smoothing.name(),
            layout = %config.layout.name,
            "Session created"
        );

        Ok(Self {
            calibration: CalibrationManager::new(config.calibration.clone()),
            motion: MotionMapper::new(
                config.motion.clone(),
                config.smoothing,
                config.output.bounds,
            ),
            gestures: GestureDetector::new(&config.gestures, config.layout.clone()),
            mode: ModeController::new(config.mode.clone()),
            commands: CommandQueue::new(),
            sensitivity: config.motion.sensitivity,
            paused: false,
            frames_processed: 0,
            config,
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Handle for queueing commands from other threads or tasks.
    pub fn command_sender(&self) -> CommandSender {
        self.commands.sender()
    }

    pub fn status(&self) -> Status {
        Status {
            mode: self.mode.mode(),
            paused: self.paused,
            calibrated: self.calibration.is_calibrated(),
            calibration_progress_percent: self.calibration.progress_percent(),
            sensitivity: self.sensitivity,
        }
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.calibration()
    }

    pub fn cursor(&self) -> Point2D {
        self.motion.cursor()
    }

    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Apply one control command immediately.
    pub fn apply_command(&mut self, command: ControlCommand) {
        match command {
            ControlCommand::ResetCalibration => {
                self.calibration.reset();
                self.motion.reset();
                self.gestures.clear_history();
                tracing::info!("Calibration reset");
            }
            ControlCommand::AdjustSensitivity { delta } => {
                if !delta.is_finite() {
                    tracing::warn!(delta, "Ignoring non-finite sensitivity delta");
                    return;
                }
                let m = &self.config.motion;
                let previous = self.sensitivity;
                self.sensitivity =
                    (self.sensitivity + delta).clamp(m.min_sensitivity, m.max_sensitivity);
                tracing::info!(previous, sensitivity = self.sensitivity, "Sensitivity adjusted");
            }
            ControlCommand::SetPaused { paused } => self.set_paused(paused),
            ControlCommand::TogglePause => self.set_paused(!self.paused),
            ControlCommand::ForceMode { mode } => {
                self.mode.force(mode, self.motion.cursor());
            }
            ControlCommand::ToggleMode => {
                self.mode.toggle(self.motion.cursor());
            }
        }
    }

    fn set_paused(&mut self, paused: bool) {
        if self.paused == paused {
            tracing::debug!(paused, "Pause state unchanged");
            return;
        }
        self.paused = paused;
        if paused {
            self.gestures.clear_history();
        }
        tracing::info!(paused, "Pause state changed");
    }

    /// Return to the freshly created state. The cursor stays where it is,
    /// and gesture cooldowns keep running across the reset.
    pub fn reset(&mut self) {
        self.calibration.reset();
        self.motion.reset();
        self.gestures.reset();
        self.mode.reset();
        self.sensitivity = self.config.motion.sensitivity;
        self.paused = false;
        // Commands queued before the reset are stale.
        let dropped = self.commands.drain().len();
        tracing::info!(dropped_commands = dropped, "Session reset");
    }

    /// Run the full pipeline for one frame.
    pub fn process_frame<D>(&mut self, frame: &LandmarkFrame, dispatcher: &mut D) -> FrameReport
    where
        D: ActionDispatcher + ?Sized,
    {
        self.frames_processed += 1;
        let mode_before = self.mode.mode();
        let mut report = FrameReport {
            timestamp_ns: frame.timestamp_ns,
            ..FrameReport::default()
        };

        for command in self.commands.drain() {
            tracing::debug!(?command, "Applying command");
            self.apply_command(command);
            report.commands_applied += 1;
        }

        if self.paused {
            self.gestures.clear_history();
            report.paused = true;
            report.mode_changed = self.mode_change(mode_before);
            return report;
        }

        report.gestures = self.gestures.process_frame(frame);

        let point = self.config.layout.tracking_point(frame);
        report.detected = point.is_some();

        // Calibration frames never move the cursor, including the one that
        // completes it.
        let calibration = match (self.calibration.calibration().copied(), point) {
            (Some(calibration), _) => Some(calibration),
            (None, Some(p)) => {
                if let CalibrationProgress::Completed(_) = self.calibration.add_sample(p) {
                    self.motion.reset();
                    report.calibration_completed = true;
                }
                None
            }
            (None, None) => None,
        };

        let mut actions = Vec::new();
        for event in &report.gestures {
            match event.action {
                GestureAction::PrimaryClick => actions.push(PointerAction::Click {
                    button: MouseButton::Left,
                }),
                GestureAction::SecondaryClick => actions.push(PointerAction::Click {
                    button: MouseButton::Right,
                }),
                GestureAction::MiddleClick => actions.push(PointerAction::Click {
                    button: MouseButton::Middle,
                }),
                GestureAction::DoubleClick => actions.push(PointerAction::DoubleClick),
                GestureAction::ToggleMode => {
                    self.mode.toggle(self.motion.cursor());
                }
            }
        }

        if let (Some(calibration), Some(p)) = (calibration, point) {
            let sample = self.motion.step(p, &calibration, self.sensitivity);
            if !sample.in_deadzone {
                let action = if self.mode.moves_cursor() {
                    let movement = self.motion.advance(sample.displacement);
                    self.mode.pointer_action(&movement, self.config.output.form)
                } else {
                    self.mode.scroll_action(sample.displacement)
                };
                actions.extend(action);
            }
            report.motion = Some(sample);
        }

        for action in &actions {
            if let Err(e) = dispatcher.dispatch(action) {
                tracing::warn!(
                    sink = dispatcher.name(),
                    action = action.label(),
                    error = %e,
                    "Dispatch failed"
                );
                report.dispatch_failures.push(DispatchFailure {
                    action: action.clone(),
                    message: e.to_string(),
                });
            }
        }
        report.actions = actions;
        report.mode_changed = self.mode_change(mode_before);

        tracing::trace!(
            t = frame.timestamp_ns,
            detected = report.detected,
            actions = report.actions.len(),
            "Frame processed"
        );
        report
    }

    fn mode_change(&self, before: Mode) -> Option<Mode> {
        let now = self.mode.mode();
        (now != before).then_some(now)
    }
}

/// A session shared between a frame loop and other tasks.
///
/// Every operation takes the lock once, so a frame is processed atomically
/// with respect to status queries and direct commands.
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Lock the session. A panic in another holder does not make the state
    /// unusable; the guard is recovered.
    pub fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn process_frame<D>(&self, frame: &LandmarkFrame, dispatcher: &mut D) -> FrameReport
    where
        D: ActionDispatcher + ?Sized,
    {
        self.lock().process_frame(frame, dispatcher)
    }

    pub fn status(&self) -> Status {
        self.lock().status()
    }

    pub fn apply_command(&self, command: ControlCommand) {
        self.lock().apply_command(command);
    }

    pub fn command_sender(&self) -> CommandSender {
        self.lock().command_sender()
    }

    pub fn reset(&self) {
        self.lock().reset();
    }
}
