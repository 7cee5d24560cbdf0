//! HeadMouse Frame Source
//!
//! Supplies landmark frames to the pointer pipeline and drives it. Uses a
//! pluggable source architecture:
//!
//! - **Replay:** a recorded JSONL frame stream
//! - **Synthetic:** scripted face poses, no camera needed
//! - **Memory:** pre-loaded frames
//!
//! A live tracker plugs in by implementing [`LandmarkSource`].

pub mod backends;
pub mod schedule;
pub mod writer;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use headmouse_common::clock::{RateController, SessionClock};
use headmouse_common::error::{HeadmouseError, HeadmouseResult};
use headmouse_platform_core::ActionDispatcher;
use headmouse_pointer_core::session::{FrameReport, SharedSession};
use headmouse_tracking_model::frame::{FrameStreamHeader, LandmarkFrame};

pub use schedule::CommandSchedule;

/// Consecutive source errors tolerated before the driver gives up.
const MAX_CONSECUTIVE_ERRORS: u32 = 100;

/// Trait for landmark frame sources.
pub trait LandmarkSource: Send {
    /// Poll for the next frame. Returns `None` if no frame is ready.
    fn poll(&mut self) -> HeadmouseResult<Option<LandmarkFrame>>;

    /// Source name for logging.
    fn name(&self) -> &str;

    /// Check if the source can produce frames on this system.
    fn is_available(&self) -> bool;

    /// Whether the source will never produce another frame.
    fn is_finished(&self) -> bool {
        false
    }

    /// Stream metadata, when the source has any.
    fn header(&self) -> Option<&FrameStreamHeader> {
        None
    }
}

/// Frame loop behavior.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Wait until each frame's timestamp before processing it.
    pub realtime: bool,
    /// Status log rate, in frame time.
    pub heartbeat_hz: u32,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            realtime: false,
            heartbeat_hz: 1,
        }
    }
}

/// Totals over a driver run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub frames: u64,
    pub detected_frames: u64,
    pub paused_frames: u64,
    pub gestures: u64,
    pub actions: u64,
    pub dispatch_failures: u64,
    pub mode_changes: u64,
    pub calibrations_completed: u64,
    pub source_errors: u64,
}

impl DriverStats {
    pub fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        self.detected_frames += u64::from(report.detected);
        self.paused_frames += u64::from(report.paused);
        self.gestures += report.gestures.len() as u64;
        self.actions += report.actions.len() as u64;
        self.dispatch_failures += report.dispatch_failures.len() as u64;
        self.mode_changes += u64::from(report.mode_changed.is_some());
        self.calibrations_completed += u64::from(report.calibration_completed);
    }
}

/// Feeds frames from a source through a shared session into a dispatcher.
pub struct FrameDriver {
    source: Box<dyn LandmarkSource>,
    session: SharedSession,
    dispatcher: Box<dyn ActionDispatcher>,
    recorder: Option<writer::FrameWriter>,
    schedule: CommandSchedule,
    options: DriverOptions,
    stop_flag: Arc<AtomicBool>,
    stats: DriverStats,
}

impl FrameDriver {
    pub fn new(
        source: Box<dyn LandmarkSource>,
        session: SharedSession,
        dispatcher: Box<dyn ActionDispatcher>,
    ) -> Self {
        Self {
            source,
            session,
            dispatcher,
            recorder: None,
            schedule: CommandSchedule::default(),
            options: DriverOptions::default(),
            stop_flag: Arc::new(AtomicBool::new(false)),
            stats: DriverStats::default(),
        }
    }

    pub fn with_options(mut self, options: DriverOptions) -> Self {
        self.options = options;
        self
    }

    /// Also write every processed frame to `recorder`.
    pub fn record_to(mut self, recorder: writer::FrameWriter) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Queue scheduled commands as their frame time is reached.
    pub fn with_schedule(mut self, schedule: CommandSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Run until the source is exhausted or the stop flag is set.
    pub async fn run(&mut self) -> HeadmouseResult<DriverStats> {
        if !self.source.is_available() {
            return Err(HeadmouseError::tracking(format!(
                "Landmark source '{}' is not available",
                self.source.name()
            )));
        }

        tracing::info!(
            source = %self.source.name(),
            sink = %self.dispatcher.name(),
            realtime = self.options.realtime,
            "Frame driver started"
        );

        let commands = self.session.command_sender();
        let clock = SessionClock::start();
        let mut heartbeat = RateController::new(self.options.heartbeat_hz);
        let mut first_timestamp = None;
        let mut consecutive_errors = 0;

        while !self.stop_flag.load(Ordering::Relaxed) {
            match self.source.poll() {
                Ok(Some(frame)) => {
                    consecutive_errors = 0;

                    if self.options.realtime {
                        let first = *first_timestamp.get_or_insert(frame.timestamp_ns);
                        let due = frame.timestamp_ns.saturating_sub(first);
                        let now = clock.elapsed_ns();
                        if due > now {
                            tokio::time::sleep(Duration::from_nanos(due - now)).await;
                        }
                    }

                    if let Some(recorder) = self.recorder.as_mut() {
                        recorder.write_frame(&frame)?;
                    }

                    for command in self.schedule.due(frame.timestamp_ns) {
                        commands.send(command)?;
                    }

                    let report = self.session.process_frame(&frame, self.dispatcher.as_mut());
                    self.stats.record(&report);

                    if heartbeat.should_tick(frame.timestamp_ns) {
                        let status = self.session.status();
                        tracing::info!(
                            t = frame.timestamp_secs(),
                            mode = %status.mode,
                            paused = status.paused,
                            calibrated = status.calibrated,
                            progress = status.calibration_progress_percent,
                            sensitivity = status.sensitivity,
                            "Status"
                        );
                    }

                    // Let command producers on this runtime make progress.
                    tokio::task::yield_now().await;
                }
                Ok(None) => {
                    if self.source.is_finished() {
                        break;
                    }
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
                Err(e) => {
                    self.stats.source_errors += 1;
                    consecutive_errors += 1;
                    tracing::warn!(error = %e, "Landmark source error");
                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        return Err(e);
                    }
                }
            }
        }

        if let Some(recorder) = self.recorder.as_mut() {
            recorder.flush()?;
        }
        tracing::info!(
            frames = self.stats.frames,
            actions = self.stats.actions,
            gestures = self.stats.gestures,
            dispatch_failures = self.stats.dispatch_failures,
            "Frame driver stopped"
        );
        Ok(self.stats.clone())
    }

    /// Set the stop flag.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Get the stop flag for external coordination.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    pub fn stats(&self) -> &DriverStats {
        &self.stats
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// Give the dispatcher back, e.g. to flush a file sink.
    pub fn into_dispatcher(self) -> Box<dyn ActionDispatcher> {
        self.dispatcher
    }
}
