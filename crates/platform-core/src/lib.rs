//! HeadMouse platform core contracts.
//!
//! The pointer pipeline never talks to an OS, a serial relay, or a socket
//! directly. It calls an [`ActionDispatcher`], and concrete sinks decide how
//! a move or click reaches the target machine.

pub mod sinks;

use headmouse_common::error::HeadmouseResult;
use headmouse_tracking_model::action::{MouseButton, PointerAction};

pub use sinks::{JsonlDispatcher, RecordingDispatcher, TracingDispatcher};

/// Capability set the pipeline uses to realize motion, clicks, and scrolling.
///
/// Calls must not block on the transport. A sink that cannot deliver returns
/// a dispatch error; the caller reports it and keeps processing frames.
pub trait ActionDispatcher: Send {
    /// Place the cursor at absolute output coordinates.
    fn move_to(&mut self, x: f64, y: f64) -> HeadmouseResult<()>;

    /// Move the cursor relative to its current position.
    fn move_by(&mut self, dx: f64, dy: f64) -> HeadmouseResult<()>;

    /// Press and release a button.
    fn click(&mut self, button: MouseButton) -> HeadmouseResult<()>;

    /// Two primary clicks in quick succession.
    fn double_click(&mut self) -> HeadmouseResult<()>;

    /// Scroll by `amount` wheel units; positive scrolls down.
    fn scroll(&mut self, amount: f64) -> HeadmouseResult<()>;

    /// Sink name for logging.
    fn name(&self) -> &str;

    /// Route a recorded action to the matching capability.
    fn dispatch(&mut self, action: &PointerAction) -> HeadmouseResult<()> {
        match *action {
            PointerAction::MoveTo { x, y } => self.move_to(x, y),
            PointerAction::MoveBy { dx, dy } => self.move_by(dx, dy),
            PointerAction::Click { button } => self.click(button),
            PointerAction::DoubleClick => self.double_click(),
            PointerAction::Scroll { amount } => self.scroll(amount),
        }
    }
}

impl<D: ActionDispatcher + ?Sized> ActionDispatcher for Box<D> {
    fn move_to(&mut self, x: f64, y: f64) -> HeadmouseResult<()> {
        (**self).move_to(x, y)
    }

    fn move_by(&mut self, dx: f64, dy: f64) -> HeadmouseResult<()> {
        (**self).move_by(dx, dy)
    }

    fn click(&mut self, button: MouseButton) -> HeadmouseResult<()> {
        (**self).click(button)
    }

    fn double_click(&mut self) -> HeadmouseResult<()> {
        (**self).double_click()
    }

    fn scroll(&mut self, amount: f64) -> HeadmouseResult<()> {
        (**self).scroll(amount)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
