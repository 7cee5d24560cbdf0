//! Gesture detection: per-frame face metrics → debounced discrete events.
//!
//! A rule fires only when
//! 1. its conditions hold on each of the last `required_frames` samples,
//! 2. no rule it is exclusive with is active, and
//! 3. its cooldown has elapsed since it last fired.
//!
//! After firing, the rule stays latched until its condition stops holding,
//! so a held wink produces one click rather than one per cooldown period.
//!
//! A frame without usable landmarks clears the history: a dropout breaks the
//! consecutive-frame requirement. Latches and cooldown timers are kept.

pub mod metrics;
pub mod rules;

use std::collections::{HashMap, HashSet, VecDeque};

use headmouse_common::clock::SessionClock;
use headmouse_tracking_model::frame::{LandmarkFrame, TimestampNs};

use crate::config::GestureConfig;
use crate::layout::LandmarkLayout;

pub use metrics::{FaceMetrics, Metric};
pub use rules::{GestureAction, GestureRule};

/// A gesture that fired on a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureEvent {
    /// Rule name (gesture class).
    pub name: String,
    pub action: GestureAction,
    pub timestamp_ns: TimestampNs,
    /// Metrics of the frame that completed the debounce window.
    pub metrics: FaceMetrics,
}

/// Rolling window of the last K metric samples.
#[derive(Debug, Clone)]
pub struct GestureHistory {
    capacity: usize,
    samples: VecDeque<FaceMetrics>,
}

impl GestureHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, sample: FaceMetrics) {
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn newest(&self) -> Option<&FaceMetrics> {
        self.samples.back()
    }

    /// The newest `n` samples, or `None` if fewer are held.
    pub fn last(&self, n: usize) -> Option<impl Iterator<Item = &FaceMetrics>> {
        if n == 0 || self.samples.len() < n {
            return None;
        }
        Some(self.samples.iter().skip(self.samples.len() - n))
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Last trigger time per gesture class.
#[derive(Debug, Clone, Default)]
pub struct CooldownTimers {
    last_fired: HashMap<String, TimestampNs>,
}

impl CooldownTimers {
    /// Whether `name` may fire at `now`. Timestamps that run backwards are
    /// treated as zero elapsed time.
    pub fn ready(&self, name: &str, now: TimestampNs, cooldown_ns: u64) -> bool {
        match self.last_fired.get(name) {
            Some(&last) => now.saturating_sub(last) >= cooldown_ns,
            None => true,
        }
    }

    pub fn mark(&mut self, name: &str, now: TimestampNs) {
        self.last_fired.insert(name.to_string(), now);
    }

    pub fn last_fired(&self, name: &str) -> Option<TimestampNs> {
        self.last_fired.get(name).copied()
    }
}

/// Runs the gesture table over a stream of frames.
#[derive(Debug, Clone)]
pub struct GestureDetector {
    rules: Vec<GestureRule>,
    layout: LandmarkLayout,
    history: GestureHistory,
    cooldowns: CooldownTimers,
    latched: HashSet<String>,
    default_cooldown_ms: u64,
}

impl GestureDetector {
    pub fn new(config: &GestureConfig, layout: LandmarkLayout) -> Self {
        Self {
            rules: config.effective_rules(),
            layout,
            history: GestureHistory::new(config.history_len),
            cooldowns: CooldownTimers::default(),
            latched: HashSet::new(),
            default_cooldown_ms: config.cooldown_ms,
        }
    }

    pub fn rules(&self) -> &[GestureRule] {
        &self.rules
    }

    pub fn history(&self) -> &GestureHistory {
        &self.history
    }

    pub fn cooldowns(&self) -> &CooldownTimers {
        &self.cooldowns
    }

    pub fn is_latched(&self, name: &str) -> bool {
        self.latched.contains(name)
    }

    /// Compute metrics for `frame` and run the table.
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> Vec<GestureEvent> {
        let metrics = FaceMetrics::from_frame(frame, &self.layout);
        self.process_metrics(frame.timestamp_ns, metrics)
    }

    /// Run the table on one sample; `None` is a no-signal frame.
    pub fn process_metrics(
        &mut self,
        timestamp_ns: TimestampNs,
        metrics: Option<FaceMetrics>,
    ) -> Vec<GestureEvent> {
        let Some(sample) = metrics else {
            self.history.clear();
            return Vec::new();
        };
        self.history.push(sample);

        // Release latches whose condition no longer holds.
        let holds_now: Vec<bool> = self.rules.iter().map(|r| r.matches(&sample)).collect();
        for (rule, holds) in self.rules.iter().zip(&holds_now) {
            if !holds {
                self.latched.remove(&rule.name);
            }
        }

        let mut active: HashSet<String> = self
            .rules
            .iter()
            .zip(&holds_now)
            .filter(|(rule, holds)| **holds || self.latched.contains(&rule.name))
            .map(|(rule, _)| rule.name.clone())
            .collect();

        let mut events = Vec::new();
        for rule in &self.rules {
            if self.latched.contains(&rule.name) {
                continue;
            }

            let required = rule.required_frames(self.history.capacity());
            let debounced = match self.history.last(required) {
                Some(mut window) => window.all(|s| rule.matches(s)),
                None => false,
            };
            if !debounced {
                continue;
            }

            if rule.exclusive_with.iter().any(|other| active.contains(other)) {
                tracing::trace!(gesture = %rule.name, "Suppressed by exclusive gesture");
                continue;
            }

            let cooldown_ns = SessionClock::ms_to_ns(rule.cooldown_ms(self.default_cooldown_ms));
            if !self.cooldowns.ready(&rule.name, timestamp_ns, cooldown_ns) {
                continue;
            }

            self.latched.insert(rule.name.clone());
            self.cooldowns.mark(&rule.name, timestamp_ns);
            active.insert(rule.name.clone());

            tracing::debug!(
                gesture = %rule.name,
                action = ?rule.action,
                left_ear = sample.left_ear,
                right_ear = sample.right_ear,
                mar = sample.mar,
                "Gesture fired"
            );
            events.push(GestureEvent {
                name: rule.name.clone(),
                action: rule.action,
                timestamp_ns,
                metrics: sample,
            });
        }

        events
    }

    /// Drop the sample window. Latches and cooldowns survive.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Drop the sample window and all latches. Cooldown timers keep running
    /// so same-class events stay spaced across a reset.
    pub fn reset(&mut self) {
        self.history.clear();
        self.latched.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::rules::{LEFT_WINK, MOUTH_OPEN};

    const MS: u64 = 1_000_000;

    fn detector() -> GestureDetector {
        GestureDetector::new(&GestureConfig::default(), LandmarkLayout::ibug68())
    }

    fn sample(left_ear: f64, right_ear: f64, mar: f64) -> Option<FaceMetrics> {
        Some(FaceMetrics {
            left_ear,
            right_ear,
            mar,
        })
    }

    fn feed(
        d: &mut GestureDetector,
        start_ms: u64,
        samples: &[Option<FaceMetrics>],
    ) -> Vec<GestureEvent> {
        samples
            .iter()
            .enumerate()
            .flat_map(|(i, s)| d.process_metrics((start_ms + i as u64 * 33) * MS, *s))
            .collect()
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = GestureHistory::new(3);
        for i in 0..10 {
            history.push(FaceMetrics {
                left_ear: i as f64,
                right_ear: 0.3,
                mar: 0.0,
            });
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.newest().map(|s| s.left_ear), Some(9.0));
        assert!(history.last(4).is_none());
    }

    #[test]
    fn test_wink_fires_once_after_k_frames() {
        let mut d = detector();
        let events = feed(
            &mut d,
            0,
            &[sample(0.15, 0.3, 0.1), sample(0.14, 0.3, 0.1), sample(0.16, 0.3, 0.1)],
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, LEFT_WINK);
        assert_eq!(events[0].action, GestureAction::PrimaryClick);
        assert!(d.is_latched(LEFT_WINK));
    }

    #[test]
    fn test_interrupted_window_does_not_fire() {
        let mut d = detector();
        let events = feed(
            &mut d,
            0,
            &[sample(0.15, 0.3, 0.1), sample(0.14, 0.3, 0.1), sample(0.30, 0.3, 0.1)],
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_latch_holds_until_release() {
        let mut d = GestureDetector::new(
            &GestureConfig {
                cooldown_ms: 0,
                ..GestureConfig::default()
            },
            LandmarkLayout::ibug68(),
        );
        let closed = sample(0.1, 0.3, 0.1);
        let events = feed(&mut d, 0, &[closed; 10]);
        assert_eq!(events.len(), 1, "held wink clicks once");

        // Release, then wink again.
        let mut again = vec![sample(0.3, 0.3, 0.1)];
        again.extend([closed; 3]);
        let events = feed(&mut d, 1000, &again);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_cooldown_blocks_quick_refire() {
        let mut d = detector();
        let closed = sample(0.1, 0.3, 0.1);
        let open = sample(0.3, 0.3, 0.1);
        assert_eq!(feed(&mut d, 0, &[closed, closed, closed]).len(), 1);
        // Released and re-winked 200 ms later: still inside the 600 ms cooldown.
        assert!(feed(&mut d, 100, &[open, closed, closed, closed]).is_empty());
        // Well after the cooldown.
        assert_eq!(feed(&mut d, 2000, &[open, closed, closed, closed]).len(), 1);
    }

    #[test]
    fn test_dropout_clears_history() {
        let mut d = detector();
        let closed = sample(0.1, 0.3, 0.1);
        let events = feed(&mut d, 0, &[closed, closed, None, closed]);
        assert!(events.is_empty());
        assert_eq!(d.history().len(), 1);
    }

    #[test]
    fn test_exclusive_gesture_blocks() {
        let mut d = detector();
        // Mouth opens first and latches; a wink that follows is suppressed
        // while the mouth stays open.
        let mouth = sample(0.3, 0.3, 0.5);
        let both = sample(0.1, 0.3, 0.5);
        let mut events = feed(&mut d, 0, &[mouth, mouth, mouth]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, MOUTH_OPEN);

        events = feed(&mut d, 200, &[both, both, both, both]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_reset_keeps_cooldowns() {
        let mut d = detector();
        let closed = sample(0.1, 0.3, 0.1);
        feed(&mut d, 0, &[closed; 3]);
        d.reset();
        assert!(!d.is_latched(LEFT_WINK));
        assert!(d.history().is_empty());
        assert_eq!(d.cooldowns().last_fired(LEFT_WINK), Some(66 * MS));

        // Inside the cooldown: suppressed even though the latch was dropped.
        assert!(feed(&mut d, 200, &[closed; 3]).is_empty());
        assert_eq!(feed(&mut d, 1000, &[closed; 3]).len(), 1);
    }
}
