//! Declarative gesture table.
//!
//! A rule fires when all of its metric conditions hold for `required_frames`
//! consecutive samples. New gestures are new table rows, not new code.

use headmouse_common::error::{HeadmouseError, HeadmouseResult};
use serde::{Deserialize, Serialize};

use super::metrics::{FaceMetrics, Metric};
use crate::config::GestureConfig;

pub const LEFT_WINK: &str = "left_wink";
pub const RIGHT_WINK: &str = "right_wink";
pub const MOUTH_OPEN: &str = "mouth_open";

/// Threshold comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// `value < threshold`
    Below,
    /// `value >= threshold`
    AtLeast,
    /// `value > threshold`
    Above,
}

impl Comparison {
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Below => value < threshold,
            Self::AtLeast => value >= threshold,
            Self::Above => value > threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricCondition {
    pub metric: Metric,
    pub comparison: Comparison,
    pub threshold: f64,
}

impl MetricCondition {
    pub fn new(metric: Metric, comparison: Comparison, threshold: f64) -> Self {
        Self {
            metric,
            comparison,
            threshold,
        }
    }

    pub fn holds(&self, sample: &FaceMetrics) -> bool {
        self.comparison.holds(sample.get(self.metric), self.threshold)
    }
}

/// What a fired gesture does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureAction {
    PrimaryClick,
    SecondaryClick,
    MiddleClick,
    DoubleClick,
    ToggleMode,
}

/// One row of the gesture table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureRule {
    /// Gesture class; cooldowns and exclusions refer to it.
    pub name: String,

    /// All must hold on a sample for it to qualify.
    pub conditions: Vec<MetricCondition>,

    /// Consecutive qualifying samples needed. Defaults to the history length.
    #[serde(default)]
    pub required_frames: Option<usize>,

    /// Per-rule cooldown. Defaults to the configured cooldown.
    #[serde(default)]
    pub cooldown_ms: Option<u64>,

    /// Gestures that block this one while active.
    #[serde(default)]
    pub exclusive_with: Vec<String>,

    pub action: GestureAction,
}

impl GestureRule {
    /// Whether every condition holds on `sample`.
    pub fn matches(&self, sample: &FaceMetrics) -> bool {
        self.conditions.iter().all(|c| c.holds(sample))
    }

    pub fn required_frames(&self, history_len: usize) -> usize {
        self.required_frames.unwrap_or(history_len)
    }

    pub fn cooldown_ms(&self, default_ms: u64) -> u64 {
        self.cooldown_ms.unwrap_or(default_ms)
    }

    pub fn validate(&self, history_len: usize) -> HeadmouseResult<()> {
        if self.name.is_empty() {
            return Err(HeadmouseError::config("Gesture rule name must not be empty"));
        }
        if self.conditions.is_empty() {
            return Err(HeadmouseError::config(format!(
                "Gesture rule '{}' has no conditions",
                self.name
            )));
        }
        let required = self.required_frames(history_len);
        if required == 0 || required > history_len {
            return Err(HeadmouseError::config(format!(
                "Gesture rule '{}' requires {} frames; must be between 1 and {}",
                self.name, required, history_len
            )));
        }
        Ok(())
    }
}

/// Left wink, right wink, and sustained mouth-open, built from the
/// configured thresholds. The three are mutually exclusive.
pub fn canonical_rules(config: &GestureConfig) -> Vec<GestureRule> {
    let ear = config.ear_threshold;
    let exclusive = |this: &str| {
        [LEFT_WINK, RIGHT_WINK, MOUTH_OPEN]
            .into_iter()
            .filter(|name| *name != this)
            .map(str::to_string)
            .collect::<Vec<_>>()
    };

    vec![
        GestureRule {
            name: LEFT_WINK.to_string(),
            conditions: vec![
                MetricCondition::new(Metric::LeftEar, Comparison::Below, ear),
                MetricCondition::new(Metric::RightEar, Comparison::AtLeast, ear),
            ],
            required_frames: None,
            cooldown_ms: None,
            exclusive_with: exclusive(LEFT_WINK),
            action: GestureAction::PrimaryClick,
        },
        GestureRule {
            name: RIGHT_WINK.to_string(),
            conditions: vec![
                MetricCondition::new(Metric::RightEar, Comparison::Below, ear),
                MetricCondition::new(Metric::LeftEar, Comparison::AtLeast, ear),
            ],
            required_frames: None,
            cooldown_ms: None,
            exclusive_with: exclusive(RIGHT_WINK),
            action: GestureAction::SecondaryClick,
        },
        GestureRule {
            name: MOUTH_OPEN.to_string(),
            conditions: vec![MetricCondition::new(
                Metric::Mar,
                Comparison::Above,
                config.mar_threshold,
            )],
            required_frames: None,
            cooldown_ms: None,
            exclusive_with: exclusive(MOUTH_OPEN),
            action: config.mouth_open_action,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(left_ear: f64, right_ear: f64, mar: f64) -> FaceMetrics {
        FaceMetrics {
            left_ear,
            right_ear,
            mar,
        }
    }

    #[test]
    fn test_canonical_wink_excludes_blink() {
        let rules = canonical_rules(&GestureConfig::default());
        let left = &rules[0];
        assert!(left.matches(&sample(0.15, 0.30, 0.1)));
        assert!(!left.matches(&sample(0.15, 0.15, 0.1)), "both eyes closed is a blink");
        assert!(!left.matches(&sample(0.30, 0.30, 0.1)));
        assert!(left.matches(&sample(0.15, 0.22, 0.1)), "threshold counts as open");
    }

    #[test]
    fn test_mouth_rule_uses_configured_action() {
        let config = GestureConfig {
            mouth_open_action: GestureAction::DoubleClick,
            ..GestureConfig::default()
        };
        let rules = canonical_rules(&config);
        let mouth = rules.iter().find(|r| r.name == MOUTH_OPEN).unwrap();
        assert_eq!(mouth.action, GestureAction::DoubleClick);
        assert!(mouth.matches(&sample(0.3, 0.3, 0.40)));
        assert!(!mouth.matches(&sample(0.3, 0.3, 0.35)));
        assert_eq!(mouth.exclusive_with, vec![LEFT_WINK, RIGHT_WINK]);
    }

    #[test]
    fn test_required_frames_bounded_by_history() {
        let mut rule = canonical_rules(&GestureConfig::default()).remove(0);
        assert!(rule.validate(3).is_ok());
        rule.required_frames = Some(4);
        assert!(rule.validate(3).is_err());
        rule.required_frames = Some(0);
        assert!(rule.validate(3).is_err());
    }

    #[test]
    fn test_custom_rule_from_json() {
        let raw = r#"{
            "name": "long_blink",
            "conditions": [
                { "metric": "left_ear", "comparison": "below", "threshold": 0.2 },
                { "metric": "right_ear", "comparison": "below", "threshold": 0.2 }
            ],
            "required_frames": 5,
            "action": "middle_click"
        }"#;
        let rule: GestureRule = serde_json::from_str(raw).unwrap();
        assert_eq!(rule.required_frames(3), 5);
        assert_eq!(rule.cooldown_ms(600), 600);
        assert!(rule.exclusive_with.is_empty());
        assert!(rule.matches(&sample(0.1, 0.1, 0.0)));
    }
}
