//! Pointer actions produced by the pipeline.
//!
//! Each variant mirrors one call on the dispatcher capability set, so an
//! action stream can be replayed into any sink.

use serde::{Deserialize, Serialize};

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    Middle,
}

/// One dispatcher call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerAction {
    /// Absolute cursor placement in output pixels.
    MoveTo { x: f64, y: f64 },
    /// Relative cursor motion in output pixels.
    MoveBy { dx: f64, dy: f64 },
    Click { button: MouseButton },
    DoubleClick,
    /// Scroll amount in wheel units; positive scrolls down.
    Scroll { amount: f64 },
}

impl PointerAction {
    /// Whether this action moves the cursor.
    pub fn is_motion(&self) -> bool {
        matches!(self, Self::MoveTo { .. } | Self::MoveBy { .. })
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MoveTo { .. } => "move_to",
            Self::MoveBy { .. } => "move_by",
            Self::Click { .. } => "click",
            Self::DoubleClick => "double_click",
            Self::Scroll { .. } => "scroll",
        }
    }
}

/// Parse actions from JSONL content.
pub fn parse_actions(jsonl: &str) -> Result<Vec<PointerAction>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}
