mod common;

use common::{config_with_samples, Face};
use headmouse_common::error::{HeadmouseError, HeadmouseResult};
use headmouse_platform_core::{ActionDispatcher, RecordingDispatcher};
use headmouse_pointer_core::calibration::Calibration;
use headmouse_pointer_core::config::{ControllerConfig, OutputForm};
use headmouse_pointer_core::cursor_smooth::SmoothingAlgorithm;
use headmouse_pointer_core::gesture::GestureAction;
use headmouse_pointer_core::mode::Mode;
use headmouse_pointer_core::motion::MotionMapper;
use headmouse_pointer_core::{ControlCommand, Session};
use headmouse_tracking_model::action::{MouseButton, PointerAction};
use headmouse_tracking_model::geometry::{Bounds, Point2D};

fn calibrated_session(
    config: ControllerConfig,
    nose: (f64, f64),
) -> (Session, RecordingDispatcher) {
    let n = config.calibration.sample_count as u64;
    let mut session = Session::new(config).unwrap();
    let mut sink = RecordingDispatcher::new();
    for i in 0..n {
        session.process_frame(&Face::neutral(nose.0, nose.1).frame(i * 33), &mut sink);
    }
    assert!(session.status().calibrated);
    sink.take();
    (session, sink)
}

#[test]
fn scenario_a_rightward_offset_moves_right_only() {
    let mut config = config_with_samples(1);
    config.motion.deadzone_radius = 12.0;
    config.motion.sensitivity = 2.0;

    // Mapper level.
    let mut mapper = MotionMapper::new(
        config.motion.clone(),
        config.smoothing,
        config.output.bounds,
    );
    let reference = Calibration::Reference {
        position: Point2D::new(320.0, 240.0),
    };
    let sample = mapper.step(Point2D::new(340.0, 240.0), &reference, 2.0);
    assert!(!sample.in_deadzone);
    assert!(sample.displacement.dx > 0.0);
    assert_eq!(sample.displacement.dy, 0.0);

    // Pipeline level.
    let (mut session, mut sink) = calibrated_session(config, (320.0, 240.0));
    let start = session.cursor();
    let report = session.process_frame(&Face::neutral(340.0, 240.0).frame(1000), &mut sink);
    assert_eq!(report.actions.len(), 1);
    let end = session.cursor();
    assert!(end.x > start.x);
    assert_eq!(end.y, start.y);
}

#[test]
fn scenario_b_left_wink_clicks_once() {
    let config = config_with_samples(30);
    let mut session = Session::new(config).unwrap();
    let mut sink = RecordingDispatcher::new();

    let burst = |session: &mut Session, sink: &mut RecordingDispatcher, start_ms: u64| {
        for (i, ear) in [0.15, 0.14, 0.16].into_iter().enumerate() {
            let face = Face::neutral(320.0, 240.0).eyes(ear, 0.30);
            session.process_frame(&face.frame(start_ms + i as u64 * 33), sink);
        }
    };

    burst(&mut session, &mut sink, 0);
    assert_eq!(sink.clicks(MouseButton::Left), 1);
    assert_eq!(sink.clicks(MouseButton::Right), 0);

    // Same frames again while the wink is still held and cooling down.
    burst(&mut session, &mut sink, 100);
    assert_eq!(sink.clicks(MouseButton::Left), 1);

    // Eye reopens, wink repeats, still inside the 600 ms cooldown.
    session.process_frame(&Face::neutral(320.0, 240.0).frame(200), &mut sink);
    burst(&mut session, &mut sink, 233);
    assert_eq!(sink.clicks(MouseButton::Left), 1);

    // Released and repeated after the cooldown.
    session.process_frame(&Face::neutral(320.0, 240.0).frame(1000), &mut sink);
    burst(&mut session, &mut sink, 1033);
    assert_eq!(sink.clicks(MouseButton::Left), 2);
}

#[test]
fn scenario_b_right_wink_is_secondary_click() {
    let mut session = Session::new(config_with_samples(30)).unwrap();
    let mut sink = RecordingDispatcher::new();
    for i in 0..3 {
        let face = Face::neutral(320.0, 240.0).eyes(0.30, 0.12);
        session.process_frame(&face.frame(i * 33), &mut sink);
    }
    assert_eq!(sink.clicks(MouseButton::Right), 1);
    assert_eq!(sink.clicks(MouseButton::Left), 0);
}

#[test]
fn blink_is_not_a_click() {
    let mut session = Session::new(config_with_samples(30)).unwrap();
    let mut sink = RecordingDispatcher::new();
    for i in 0..10 {
        let face = Face::neutral(320.0, 240.0).eyes(0.10, 0.10);
        session.process_frame(&face.frame(i * 33), &mut sink);
    }
    assert!(sink.actions().is_empty());
}

#[test]
fn scenario_c_mouth_open_toggles_scroll_once() {
    let (mut session, mut sink) = calibrated_session(config_with_samples(3), (320.0, 240.0));
    assert_eq!(session.mode(), Mode::Pointer);

    let open = Face::neutral(320.0, 240.0).mouth(0.40);
    let mut changes = 0;
    for i in 0..3 {
        let report = session.process_frame(&open.frame(200 + i * 33), &mut sink);
        changes += usize::from(report.mode_changed.is_some());
    }
    assert_eq!(session.mode(), Mode::Scroll);
    assert_eq!(changes, 1);

    // Held open for a long time: stays in Scroll.
    for i in 3..60 {
        let report = session.process_frame(&open.frame(200 + i * 33), &mut sink);
        assert!(report.mode_changed.is_none());
    }
    assert_eq!(session.mode(), Mode::Scroll);

    // Close, then open again: back to Pointer.
    session.process_frame(&Face::neutral(320.0, 240.0).frame(3000), &mut sink);
    for i in 0..3 {
        session.process_frame(&open.frame(3033 + i * 33), &mut sink);
    }
    assert_eq!(session.mode(), Mode::Pointer);
}

#[test]
fn mouth_open_can_map_to_double_click() {
    let mut config = config_with_samples(3);
    config.gestures.mouth_open_action = GestureAction::DoubleClick;
    let (mut session, mut sink) = calibrated_session(config, (320.0, 240.0));

    let open = Face::neutral(320.0, 240.0).mouth(0.40);
    for i in 0..5 {
        session.process_frame(&open.frame(200 + i * 33), &mut sink);
    }
    assert_eq!(session.mode(), Mode::Pointer);
    assert_eq!(
        sink.actions()
            .iter()
            .filter(|a| **a == PointerAction::DoubleClick)
            .count(),
        1
    );
}

#[test]
fn scroll_mode_holds_cursor_and_scrolls() {
    let (mut session, mut sink) = calibrated_session(config_with_samples(3), (320.0, 240.0));
    session.apply_command(ControlCommand::ForceMode { mode: Mode::Scroll });
    let held = session.cursor();

    for i in 0..10 {
        session.process_frame(&Face::neutral(320.0, 320.0).frame(500 + i * 33), &mut sink);
    }
    assert_eq!(session.cursor(), held);
    assert!(!sink.actions().is_empty());
    assert!(sink
        .actions()
        .iter()
        .all(|a| matches!(a, PointerAction::Scroll { amount } if *amount > 0.0)));
}

#[test]
fn relative_output_form_emits_move_by() {
    let mut config = config_with_samples(2);
    config.output.form = OutputForm::Relative;
    config.smoothing = SmoothingAlgorithm::None;
    let (mut session, mut sink) = calibrated_session(config, (320.0, 240.0));

    session.process_frame(&Face::neutral(250.0, 240.0).frame(500), &mut sink);
    match sink.actions() {
        [PointerAction::MoveBy { dx, dy }] => {
            assert!(*dx < 0.0);
            assert_eq!(*dy, 0.0);
        }
        other => panic!("expected one move_by, got {other:?}"),
    }
}

#[test]
fn cursor_never_leaves_bounds() {
    let mut config = config_with_samples(1);
    config.output.bounds = Bounds::from_size(200, 100);
    let (mut session, mut sink) = calibrated_session(config, (320.0, 240.0));
    for i in 0..200 {
        session.process_frame(&Face::neutral(1000.0, -500.0).frame(100 + i * 33), &mut sink);
        let cursor = session.cursor();
        assert!(Bounds::from_size(200, 100).contains(&cursor), "{cursor:?}");
    }
    assert_eq!(session.cursor(), Point2D::new(199.0, 0.0));
}

/// Fails the first `failures` calls, then records.
struct FlakyDispatcher {
    failures: usize,
    inner: RecordingDispatcher,
}

impl FlakyDispatcher {
    fn check(&mut self) -> HeadmouseResult<()> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(HeadmouseError::dispatch("relay offline"));
        }
        Ok(())
    }
}

impl ActionDispatcher for FlakyDispatcher {
    fn move_to(&mut self, x: f64, y: f64) -> HeadmouseResult<()> {
        self.check()?;
        self.inner.move_to(x, y)
    }

    fn move_by(&mut self, dx: f64, dy: f64) -> HeadmouseResult<()> {
        self.check()?;
        self.inner.move_by(dx, dy)
    }

    fn click(&mut self, button: MouseButton) -> HeadmouseResult<()> {
        self.check()?;
        self.inner.click(button)
    }

    fn double_click(&mut self) -> HeadmouseResult<()> {
        self.check()?;
        self.inner.double_click()
    }

    fn scroll(&mut self, amount: f64) -> HeadmouseResult<()> {
        self.check()?;
        self.inner.scroll(amount)
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

#[test]
fn dispatch_failure_is_reported_and_loop_continues() {
    let mut session = Session::new(config_with_samples(1)).unwrap();
    let mut sink = FlakyDispatcher {
        failures: 3,
        inner: RecordingDispatcher::new(),
    };
    session.process_frame(&Face::neutral(320.0, 240.0).frame(0), &mut sink);

    let mut failed = 0;
    for i in 1..=6 {
        let report = session.process_frame(&Face::neutral(420.0, 240.0).frame(i * 33), &mut sink);
        assert_eq!(report.actions.len(), 1);
        failed += report.dispatch_failures.len();
    }
    assert_eq!(failed, 3);
    assert_eq!(sink.inner.actions().len(), 3);
}

#[test]
fn boxed_dispatcher_works_through_trait_object() {
    let mut session = Session::new(config_with_samples(1)).unwrap();
    let mut sink: Box<dyn ActionDispatcher> = Box::new(RecordingDispatcher::new());
    session.process_frame(&Face::neutral(320.0, 240.0).frame(0), &mut sink);
    let report = session.process_frame(&Face::neutral(420.0, 240.0).frame(33), sink.as_mut());
    assert!(report.dispatch_failures.is_empty());
    assert_eq!(sink.name(), "recording");
}

#[test]
fn reset_command_recalibrates() {
    let (mut session, mut sink) = calibrated_session(config_with_samples(2), (320.0, 240.0));
    session
        .command_sender()
        .send(ControlCommand::ResetCalibration)
        .unwrap();

    session.process_frame(&Face::neutral(100.0, 100.0).frame(500), &mut sink);
    assert!(!session.status().calibrated);
    assert_eq!(session.status().calibration_progress_percent, 50);
    session.process_frame(&Face::neutral(100.0, 100.0).frame(533), &mut sink);
    assert_eq!(
        session.calibration(),
        Some(&Calibration::Reference {
            position: Point2D::new(100.0, 100.0)
        })
    );
    assert!(sink.actions().is_empty());
}

#[test]
fn typed_pause_and_resume_commands_are_not_toggles() {
    let (mut session, mut sink) = calibrated_session(config_with_samples(1), (320.0, 240.0));
    let sender = session.command_sender();

    sender.send("resume".parse().unwrap()).unwrap();
    let report = session.process_frame(&Face::neutral(420.0, 240.0).frame(100), &mut sink);
    assert!(!session.status().paused);
    assert_eq!(report.actions.len(), 1);

    for _ in 0..2 {
        sender.send("pause".parse().unwrap()).unwrap();
    }
    let report = session.process_frame(&Face::neutral(420.0, 240.0).frame(133), &mut sink);
    assert!(session.status().paused);
    assert!(report.actions.is_empty());

    sender.send("resume".parse().unwrap()).unwrap();
    let report = session.process_frame(&Face::neutral(420.0, 240.0).frame(166), &mut sink);
    assert!(!session.status().paused);
    assert_eq!(report.actions.len(), 1);
}

#[test]
fn bad_sensitivity_input_keeps_cursor_in_bounds() {
    let config = config_with_samples(1);
    let bounds = config.output.bounds;
    let (mut session, mut sink) = calibrated_session(config, (320.0, 240.0));

    for line in ["sensitivity nan", "sensitivity inf", "sens -inf"] {
        assert!(line.parse::<ControlCommand>().is_err(), "{line} should be rejected");
    }
    session.apply_command(ControlCommand::AdjustSensitivity { delta: f64::NAN });
    session.apply_command(ControlCommand::AdjustSensitivity {
        delta: f64::INFINITY,
    });
    assert_eq!(session.status().sensitivity, 1.0);

    session.apply_command(ControlCommand::AdjustSensitivity { delta: 1e300 });
    assert_eq!(session.status().sensitivity, 10.0);

    for i in 0..30 {
        let report =
            session.process_frame(&Face::neutral(600.0, 240.0).frame(100 + i * 33), &mut sink);
        assert!(report.actions.iter().all(|a| !matches!(a, PointerAction::Click { .. })));
        let cursor = session.cursor();
        assert!(cursor.x.is_finite() && cursor.y.is_finite());
        assert!(bounds.contains(&cursor));
    }
}
