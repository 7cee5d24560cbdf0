mod common;

use common::MS;
use headmouse_pointer_core::calibration::{CalibrationManager, CalibrationProgress};
use headmouse_pointer_core::config::{
    CalibrationConfig, CalibrationStrategy, GestureConfig, MotionConfig,
};
use headmouse_pointer_core::cursor_smooth::SmoothingAlgorithm;
use headmouse_pointer_core::gesture::{FaceMetrics, GestureDetector};
use headmouse_pointer_core::layout::LandmarkLayout;
use headmouse_pointer_core::motion::MotionMapper;
use headmouse_tracking_model::geometry::{Bounds, Point2D, Vector2};
use proptest::prelude::*;

fn mapper(config: MotionConfig) -> MotionMapper {
    MotionMapper::new(config, SmoothingAlgorithm::None, Bounds::default())
}

fn motion_config() -> impl Strategy<Value = MotionConfig> {
    (1.0f64..40.0, 10.0f64..200.0, 1.0f64..60.0, 0.5f64..4.0).prop_map(
        |(deadzone, ramp, max_speed, exponent)| MotionConfig {
            deadzone_radius: deadzone,
            full_strength_distance: deadzone + ramp,
            max_speed,
            acceleration_exponent: exponent,
            ..MotionConfig::default()
        },
    )
}

fn angle() -> impl Strategy<Value = f64> {
    0.0f64..std::f64::consts::TAU
}

fn wink(closed: bool) -> Option<FaceMetrics> {
    Some(FaceMetrics {
        left_ear: if closed { 0.10 } else { 0.30 },
        right_ear: 0.30,
        mar: 0.05,
    })
}

proptest! {
    #[test]
    fn offsets_inside_deadzone_never_move(
        config in motion_config(),
        theta in angle(),
        frac in 0.0f64..1.0,
        sensitivity in 0.1f64..10.0,
    ) {
        let length = config.deadzone_radius * frac;
        let offset = Vector2::new(length * theta.cos(), length * theta.sin());
        let m = mapper(config);
        prop_assert_eq!(m.accelerate(offset, sensitivity, None), Vector2::ZERO);
    }

    #[test]
    fn offsets_past_full_strength_saturate(
        config in motion_config(),
        theta in angle(),
        extra in 0.0f64..1000.0,
    ) {
        let length = config.full_strength_distance + extra;
        let offset = Vector2::new(length * theta.cos(), length * theta.sin());
        let max_speed = config.max_speed;
        let m = mapper(config);
        let speed = m.accelerate(offset, 1.0, None).length();
        prop_assert!((speed - max_speed).abs() < 1e-6, "speed {} vs {}", speed, max_speed);
    }

    #[test]
    fn speed_never_exceeds_scaled_max(
        config in motion_config(),
        dx in -500.0f64..500.0,
        dy in -500.0f64..500.0,
        sensitivity in 0.1f64..10.0,
    ) {
        let limit = config.max_speed * sensitivity;
        let m = mapper(config);
        let speed = m.accelerate(Vector2::new(dx, dy), sensitivity, None).length();
        prop_assert!(speed <= limit + 1e-9);
    }

    #[test]
    fn k_minus_one_then_break_never_fires(
        k in 2usize..6,
        gaps in prop::collection::vec(1u64..200, 1..40),
    ) {
        let config = GestureConfig { history_len: k, cooldown_ms: 0, ..GestureConfig::default() };
        let mut detector = GestureDetector::new(&config, LandmarkLayout::ibug68());
        let mut t = 0;
        for gap in gaps {
            // k-1 closed frames, then one open frame.
            for _ in 0..k - 1 {
                t += gap * MS;
                prop_assert!(detector.process_metrics(t, wink(true)).is_empty());
            }
            t += gap * MS;
            prop_assert!(detector.process_metrics(t, wink(false)).is_empty());
        }
    }

    #[test]
    fn same_class_events_respect_cooldown(
        cooldown_ms in 0u64..1000,
        pattern in prop::collection::vec((any::<bool>(), 1u64..120), 1..200),
    ) {
        let config = GestureConfig { cooldown_ms, ..GestureConfig::default() };
        let mut detector = GestureDetector::new(&config, LandmarkLayout::ibug68());
        let mut t = 0;
        let mut fired = Vec::new();
        for (closed, gap_ms) in pattern {
            t += gap_ms * MS;
            for event in detector.process_metrics(t, wink(closed)) {
                fired.push(event.timestamp_ns);
            }
        }
        for pair in fired.windows(2) {
            prop_assert!(pair[1] - pair[0] >= cooldown_ms * MS);
        }
    }

    #[test]
    fn calibration_completes_exactly_at_n(
        n in 1usize..80,
        points in prop::collection::vec((-1e4f64..1e4, -1e4f64..1e4), 80..120),
        range in any::<bool>(),
    ) {
        let strategy = if range {
            CalibrationStrategy::Range
        } else {
            CalibrationStrategy::Centroid
        };
        let mut mgr = CalibrationManager::new(CalibrationConfig {
            strategy,
            sample_count: n,
            ..CalibrationConfig::default()
        });
        for (i, (x, y)) in points.into_iter().enumerate() {
            let progress = mgr.add_sample(Point2D::new(x, y));
            match i + 1 {
                c if c < n => {
                    let is_collecting =
                        matches!(progress, CalibrationProgress::Collecting { .. });
                    prop_assert!(is_collecting)
                }
                c if c == n => prop_assert!(matches!(progress, CalibrationProgress::Completed(_))),
                _ => prop_assert_eq!(progress, CalibrationProgress::AlreadyCalibrated),
            }
            prop_assert_eq!(mgr.is_calibrated(), i + 1 >= n);
        }
    }

    #[test]
    fn recalibration_is_reproducible(
        points in prop::collection::vec((-1e3f64..1e3, -1e3f64..1e3), 1..60),
        range in any::<bool>(),
    ) {
        let strategy = if range {
            CalibrationStrategy::Range
        } else {
            CalibrationStrategy::Centroid
        };
        let mut mgr = CalibrationManager::new(CalibrationConfig {
            strategy,
            sample_count: points.len(),
            ..CalibrationConfig::default()
        });
        for &(x, y) in &points {
            mgr.add_sample(Point2D::new(x, y));
        }
        let first = mgr.calibration().copied();

        mgr.reset();
        prop_assert!(!mgr.is_calibrated());
        for &(x, y) in &points {
            mgr.add_sample(Point2D::new(x, y));
        }
        prop_assert_eq!(mgr.calibration().copied(), first);
        prop_assert!(first.is_some());
    }
}
