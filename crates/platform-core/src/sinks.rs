//! Reference dispatcher sinks.

use std::io::{BufWriter, Write};

use headmouse_common::error::{HeadmouseError, HeadmouseResult};
use headmouse_tracking_model::action::{MouseButton, PointerAction};

use crate::ActionDispatcher;

/// Keeps every dispatched action in memory.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    actions: Vec<PointerAction>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Actions dispatched so far, oldest first.
    pub fn actions(&self) -> &[PointerAction] {
        &self.actions
    }

    /// Remove and return all recorded actions.
    pub fn take(&mut self) -> Vec<PointerAction> {
        std::mem::take(&mut self.actions)
    }

    /// Number of recorded clicks of `button`.
    pub fn clicks(&self, button: MouseButton) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, PointerAction::Click { button: b } if *b == button))
            .count()
    }

    fn record(&mut self, action: PointerAction) -> HeadmouseResult<()> {
        self.actions.push(action);
        Ok(())
    }
}

impl ActionDispatcher for RecordingDispatcher {
    fn move_to(&mut self, x: f64, y: f64) -> HeadmouseResult<()> {
        self.record(PointerAction::MoveTo { x, y })
    }

    fn move_by(&mut self, dx: f64, dy: f64) -> HeadmouseResult<()> {
        self.record(PointerAction::MoveBy { dx, dy })
    }

    fn click(&mut self, button: MouseButton) -> HeadmouseResult<()> {
        self.record(PointerAction::Click { button })
    }

    fn double_click(&mut self) -> HeadmouseResult<()> {
        self.record(PointerAction::DoubleClick)
    }

    fn scroll(&mut self, amount: f64) -> HeadmouseResult<()> {
        self.record(PointerAction::Scroll { amount })
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Writes each action as one JSON line to any byte sink (file, socket, pipe).
pub struct JsonlDispatcher<W: Write + Send> {
    writer: BufWriter<W>,
    actions_written: u64,
    flush_every: u64,
}

impl<W: Write + Send> JsonlDispatcher<W> {
    /// Create a dispatcher that flushes after every line.
    pub fn new(inner: W) -> Self {
        Self::with_flush_interval(inner, 1)
    }

    /// Create a dispatcher that flushes every `flush_every` lines.
    pub fn with_flush_interval(inner: W, flush_every: u64) -> Self {
        Self {
            writer: BufWriter::new(inner),
            actions_written: 0,
            flush_every: flush_every.max(1),
        }
    }

    /// Number of actions written.
    pub fn actions_written(&self) -> u64 {
        self.actions_written
    }

    /// Flush buffered lines to the underlying sink.
    pub fn flush(&mut self) -> HeadmouseResult<()> {
        self.writer
            .flush()
            .map_err(|e| HeadmouseError::dispatch(format!("Failed to flush actions: {e}")))
    }

    /// Flush and return the underlying sink.
    pub fn into_inner(self) -> HeadmouseResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| HeadmouseError::dispatch(format!("Failed to flush actions: {e}")))
    }

    fn write_action(&mut self, action: &PointerAction) -> HeadmouseResult<()> {
        let json = serde_json::to_string(action)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| HeadmouseError::dispatch(format!("Failed to write action: {e}")))?;
        self.actions_written += 1;

        if self.actions_written % self.flush_every == 0 {
            self.flush()?;
        }
        Ok(())
    }
}

impl<W: Write + Send> ActionDispatcher for JsonlDispatcher<W> {
    fn move_to(&mut self, x: f64, y: f64) -> HeadmouseResult<()> {
        self.write_action(&PointerAction::MoveTo { x, y })
    }

    fn move_by(&mut self, dx: f64, dy: f64) -> HeadmouseResult<()> {
        self.write_action(&PointerAction::MoveBy { dx, dy })
    }

    fn click(&mut self, button: MouseButton) -> HeadmouseResult<()> {
        self.write_action(&PointerAction::Click { button })
    }

    fn double_click(&mut self) -> HeadmouseResult<()> {
        self.write_action(&PointerAction::DoubleClick)
    }

    fn scroll(&mut self, amount: f64) -> HeadmouseResult<()> {
        self.write_action(&PointerAction::Scroll { amount })
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}

/// Logs every action and never fails. Used for dry runs.
#[derive(Debug, Default)]
pub struct TracingDispatcher {
    dispatched: u64,
}

impl TracingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of actions logged.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }
}

impl ActionDispatcher for TracingDispatcher {
    fn move_to(&mut self, x: f64, y: f64) -> HeadmouseResult<()> {
        self.dispatched += 1;
        tracing::trace!(x, y, "move_to");
        Ok(())
    }

    fn move_by(&mut self, dx: f64, dy: f64) -> HeadmouseResult<()> {
        self.dispatched += 1;
        tracing::trace!(dx, dy, "move_by");
        Ok(())
    }

    fn click(&mut self, button: MouseButton) -> HeadmouseResult<()> {
        self.dispatched += 1;
        tracing::info!(?button, "click");
        Ok(())
    }

    fn double_click(&mut self) -> HeadmouseResult<()> {
        self.dispatched += 1;
        tracing::info!("double_click");
        Ok(())
    }

    fn scroll(&mut self, amount: f64) -> HeadmouseResult<()> {
        self.dispatched += 1;
        tracing::debug!(amount, "scroll");
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing"
    }
}
