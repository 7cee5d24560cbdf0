//! Pointer/Scroll mode state machine.
//!
//! `Pointer` is the initial state. A toggle (gesture or command) swaps the
//! state; a forced switch sets it directly. In `Scroll` the cursor is held
//! where it was when the mode was entered and the configured displacement
//! axis becomes a wheel amount.

use headmouse_tracking_model::action::PointerAction;
use headmouse_tracking_model::geometry::{Point2D, Vector2};
use serde::{Deserialize, Serialize};

use crate::config::{ModeConfig, OutputForm, ScrollAxis};
use crate::motion::CursorMove;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Pointer,
    Scroll,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Pointer => Self::Scroll,
            Self::Scroll => Self::Pointer,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pointer => write!(f, "pointer"),
            Self::Scroll => write!(f, "scroll"),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pointer" => Ok(Self::Pointer),
            "scroll" => Ok(Self::Scroll),
            other => Err(format!("unknown mode '{other}' (expected pointer or scroll)")),
        }
    }
}

/// Owns the current mode and routes motion accordingly.
#[derive(Debug, Clone)]
pub struct ModeController {
    config: ModeConfig,
    mode: Mode,
    held_position: Option<Point2D>,
}

impl ModeController {
    pub fn new(config: ModeConfig) -> Self {
        Self {
            config,
            mode: Mode::Pointer,
            held_position: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Cursor position captured on entering `Scroll`.
    pub fn held_position(&self) -> Option<Point2D> {
        self.held_position
    }

    /// Swap the mode. Returns the new mode.
    pub fn toggle(&mut self, cursor: Point2D) -> Mode {
        self.set(self.mode.toggled(), cursor);
        self.mode
    }

    /// Set the mode directly. Returns `true` if it changed.
    pub fn force(&mut self, mode: Mode, cursor: Point2D) -> bool {
        if self.mode == mode {
            return false;
        }
        self.set(mode, cursor);
        true
    }

    fn set(&mut self, mode: Mode, cursor: Point2D) {
        self.held_position = match mode {
            Mode::Scroll => Some(cursor),
            Mode::Pointer => None,
        };
        tracing::info!(from = %self.mode, to = %mode, "Mode changed");
        self.mode = mode;
    }

    /// Whether the cursor should advance this frame.
    pub fn moves_cursor(&self) -> bool {
        self.mode == Mode::Pointer
    }

    /// Wheel amount for a displacement in `Scroll` mode.
    pub fn scroll_amount(&self, displacement: Vector2) -> f64 {
        let component = match self.config.scroll_axis {
            ScrollAxis::Vertical => displacement.dy,
            ScrollAxis::Horizontal => displacement.dx,
        };
        component * self.config.scroll_sensitivity
    }

    /// Pointer-mode action for a cursor move, or `None` if it went nowhere.
    pub fn pointer_action(&self, movement: &CursorMove, form: OutputForm) -> Option<PointerAction> {
        if movement.delta.is_zero() {
            return None;
        }
        Some(match form {
            OutputForm::Absolute => PointerAction::MoveTo {
                x: movement.target.x,
                y: movement.target.y,
            },
            OutputForm::Relative => PointerAction::MoveBy {
                dx: movement.delta.dx,
                dy: movement.delta.dy,
            },
        })
    }

    /// Scroll-mode action for a displacement, or `None` if it is zero.
    pub fn scroll_action(&self, displacement: Vector2) -> Option<PointerAction> {
        let amount = self.scroll_amount(displacement);
        (amount != 0.0).then_some(PointerAction::Scroll { amount })
    }

    /// Back to `Pointer` without counting a transition.
    pub fn reset(&mut self) {
        self.mode = Mode::Pointer;
        self.held_position = None;
    }
}
