//! Inspect a recorded landmark stream before replaying it.

use std::path::PathBuf;

use headmouse_common::clock::SessionClock;
use headmouse_frame_source::backends::JsonlReplaySource;
use headmouse_frame_source::LandmarkSource;
use headmouse_pointer_core::gesture::FaceMetrics;
use headmouse_pointer_core::ControllerConfig;

use super::percent;

/// Running min/max of one metric.
#[derive(Default)]
struct Range {
    min: Option<f64>,
    max: Option<f64>,
}

impl Range {
    fn add(&mut self, v: f64) {
        self.min = Some(self.min.map_or(v, |m| m.min(v)));
        self.max = Some(self.max.map_or(v, |m| m.max(v)));
    }

    fn describe(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("{min:.3} .. {max:.3}"),
            _ => "n/a".to_string(),
        }
    }
}

pub fn run(input: PathBuf, config: &ControllerConfig) -> anyhow::Result<()> {
    let mut source = JsonlReplaySource::open(&input)
        .map_err(|e| anyhow::anyhow!("Failed to open {}: {e}", input.display()))?;

    println!("Landmark Stream Check: {}", input.display());
    println!("{}", "=".repeat(50));

    match source.header() {
        Some(h) => {
            println!(
                "[OK] Header: schema {}, {}x{} @ {} Hz, {:?} coordinates",
                h.schema_version, h.frame_width, h.frame_height, h.frame_rate_hz, h.coordinate_space
            );
            if h.layout == "ibug68" {
                println!("[OK] Layout: {}", h.layout);
            } else {
                println!("[WARN] Layout: {} (pipeline reads ibug68 indices)", h.layout);
            }
        }
        None => println!("[WARN] No header line; assuming pixel coordinates"),
    }

    let layout = &config.layout;
    let gestures = &config.gestures;

    let mut frames = 0u64;
    let mut detected = 0u64;
    let mut usable = 0u64;
    let mut non_monotonic = 0u64;
    let mut max_gap_ns = 0u64;
    let mut first_ns = None;
    let mut last_ns: Option<u64> = None;
    let mut eyes_closed = 0u64;
    let mut mouth_open = 0u64;
    let mut left_ear = Range::default();
    let mut right_ear = Range::default();
    let mut mar = Range::default();

    while let Some(frame) = source.poll()? {
        frames += 1;
        first_ns.get_or_insert(frame.timestamp_ns);
        if let Some(prev) = last_ns {
            if frame.timestamp_ns <= prev {
                non_monotonic += 1;
            } else {
                max_gap_ns = max_gap_ns.max(frame.timestamp_ns - prev);
            }
        }
        last_ns = Some(frame.timestamp_ns);

        if !frame.has_detection() {
            continue;
        }
        detected += 1;

        let metrics = FaceMetrics::from_frame(&frame, layout);
        if let (Some(m), Some(_)) = (metrics, layout.tracking_point(&frame)) {
            usable += 1;
            left_ear.add(m.left_ear);
            right_ear.add(m.right_ear);
            mar.add(m.mar);
            let closed =
                m.left_ear < gestures.ear_threshold || m.right_ear < gestures.ear_threshold;
            eyes_closed += u64::from(closed);
            mouth_open += u64::from(m.mar > gestures.mar_threshold);
        }
    }

    if frames == 0 {
        println!("[FAIL] Stream contains no frames");
        return Ok(());
    }

    let span_ns = last_ns.unwrap_or(0).saturating_sub(first_ns.unwrap_or(0));
    let span_secs = SessionClock::ns_to_secs(span_ns);
    println!("[OK] Frames: {} over {:.2}s", frames, span_secs);
    if span_ns > 0 {
        println!(
            "     Effective rate: {:.1} Hz, largest gap {:.1} ms",
            (frames - 1) as f64 / span_secs,
            max_gap_ns as f64 / 1_000_000.0
        );
    }
    if non_monotonic > 0 {
        println!("[WARN] Timestamps not increasing: {} frames", non_monotonic);
    } else {
        println!("[OK] Timestamps strictly increasing");
    }

    let detected_pct = percent(detected, frames);
    let tag = if detected_pct >= 80.0 { "[OK]" } else { "[WARN]" };
    println!("{tag} Face detected: {} frames ({:.1}%)", detected, detected_pct);
    if usable < detected {
        println!(
            "[WARN] {} detected frames lack landmarks up to label {}",
            detected - usable,
            layout.max_label()
        );
    }

    println!();
    println!("Face metrics over {} usable frames:", usable);
    println!("  Left EAR:   {}", left_ear.describe());
    println!("  Right EAR:  {}", right_ear.describe());
    println!("  MAR:        {}", mar.describe());
    println!(
        "  Eye below {:.2}: {} frames, mouth above {:.2}: {} frames",
        gestures.ear_threshold, eyes_closed, gestures.mar_threshold, mouth_open
    );

    let calibration_ready = usable as usize >= config.calibration.sample_count;
    println!();
    if calibration_ready {
        println!("Stream has enough usable frames to calibrate.");
    } else {
        println!(
            "Stream has fewer usable frames than calibration needs ({} < {}).",
            usable, config.calibration.sample_count
        );
    }

    Ok(())
}
