//! Cursor motion smoothing algorithms.
//!
//! Suppresses tracking jitter in the per-frame displacement stream. Unlike an
//! offline smoother this runs one sample at a time and keeps its memory
//! between frames, so it adds a small fixed latency instead of lookahead.

use std::collections::VecDeque;

use headmouse_tracking_model::geometry::Vector2;
use serde::{Deserialize, Serialize};

/// Available smoothing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum SmoothingAlgorithm {
    /// Exponential low-pass: `state = state * (1 - alpha) + target * alpha`.
    ///
    /// `alpha` is in (0.0, 1.0]; smaller values mean more smoothing.
    Ema { alpha: f64 },

    /// Mean of the last `window` raw targets.
    MovingAverage { window: usize },

    /// Per-axis median of the last `window` raw targets.
    Median { window: usize },

    /// No smoothing, pass through raw data.
    None,
}

impl Default for SmoothingAlgorithm {
    fn default() -> Self {
        Self::Ema { alpha: 0.5 }
    }
}

impl SmoothingAlgorithm {
    /// Name used in logs and config summaries.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ema { .. } => "ema",
            Self::MovingAverage { .. } => "moving_average",
            Self::Median { .. } => "median",
            Self::None => "none",
        }
    }
}

/// Streaming smoother holding the filter memory for one cursor.
#[derive(Debug, Clone)]
pub struct CursorSmoother {
    algorithm: SmoothingAlgorithm,
    ema_state: Option<Vector2>,
    window: VecDeque<Vector2>,
}

impl CursorSmoother {
    /// Create a smoother with the given algorithm.
    pub fn new(algorithm: SmoothingAlgorithm) -> Self {
        let capacity = match algorithm {
            SmoothingAlgorithm::MovingAverage { window }
            | SmoothingAlgorithm::Median { window } => window.max(1),
            _ => 0,
        };
        Self {
            algorithm,
            ema_state: None,
            window: VecDeque::with_capacity(capacity),
        }
    }

    pub fn algorithm(&self) -> SmoothingAlgorithm {
        self.algorithm
    }

    /// Feed one raw target and return the smoothed value.
    pub fn apply(&mut self, target: Vector2) -> Vector2 {
        match self.algorithm {
            SmoothingAlgorithm::Ema { alpha } => self.apply_ema(target, alpha),
            SmoothingAlgorithm::MovingAverage { window } => {
                self.push(target, window);
                let n = self.window.len() as f64;
                let (sx, sy) = self
                    .window
                    .iter()
                    .fold((0.0, 0.0), |(sx, sy), v| (sx + v.dx, sy + v.dy));
                Vector2::new(sx / n, sy / n)
            }
            SmoothingAlgorithm::Median { window } => {
                self.push(target, window);
                Vector2::new(
                    median(self.window.iter().map(|v| v.dx)),
                    median(self.window.iter().map(|v| v.dy)),
                )
            }
            SmoothingAlgorithm::None => target,
        }
    }

    /// Forget all filter memory.
    pub fn reset(&mut self) {
        self.ema_state = None;
        self.window.clear();
    }

    /// Number of samples currently held in the rolling window.
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    fn apply_ema(&mut self, target: Vector2, alpha: f64) -> Vector2 {
        let alpha = alpha.clamp(0.0, 1.0);
        let next = match self.ema_state {
            Some(state) => Vector2::new(
                state.dx * (1.0 - alpha) + target.dx * alpha,
                state.dy * (1.0 - alpha) + target.dy * alpha,
            ),
            None => target,
        };
        self.ema_state = Some(next);
        next
    }

    fn push(&mut self, target: Vector2, window: usize) {
        let window = window.max(1);
        while self.window.len() >= window {
            self.window.pop_front();
        }
        self.window.push_back(target);
    }
}

fn median(values: impl Iterator<Item = f64>) -> f64 {
    let mut sorted: Vec<f64> = values.collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let len = sorted.len();
    if len == 0 {
        0.0
    } else if len % 2 == 0 {
        (sorted[len / 2 - 1] + sorted[len / 2]) / 2.0
    } else {
        sorted[len / 2]
    }
}
