//! HeadMouse Pointer Core
//!
//! Turns a stream of facial landmark frames into pointer actions:
//! - **Calibration:** Neutral reference point or movement range from an initial sample window
//! - **Motion:** Dead-zone, non-linear acceleration, temporal smoothing, and bounds clamping
//! - **Gestures:** Eye/mouth aspect ratios with K-frame debounce, latches, and cooldowns
//! - **Mode:** Pointer/Scroll state machine that routes motion and gesture output
//! - **Session:** Per-frame orchestration, control commands, and status
//!
//! This crate is pure computation: no I/O, no platform dependencies.
//! Frames come in as data; actions go out through an `ActionDispatcher`.

pub mod calibration;
pub mod command;
pub mod config;
pub mod cursor_smooth;
pub mod gesture;
pub mod layout;
pub mod mode;
pub mod motion;
pub mod session;

pub use calibration::{Calibration, CalibrationManager, MovementRange};
pub use command::{CommandSender, ControlCommand};
pub use config::ControllerConfig;
pub use cursor_smooth::{CursorSmoother, SmoothingAlgorithm};
pub use gesture::{GestureDetector, GestureEvent};
pub use mode::{Mode, ModeController};
pub use motion::MotionMapper;
pub use session::{FrameReport, Session, SharedSession, Status};
