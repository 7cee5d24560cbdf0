//! Write a synthetic landmark stream.

use std::path::PathBuf;

use headmouse_common::clock::SessionClock;
use headmouse_frame_source::backends::{Script, SyntheticSource};
use headmouse_frame_source::writer::FrameWriter;
use headmouse_frame_source::LandmarkSource;

#[allow(clippy::too_many_arguments)]
pub fn run(
    output: PathBuf,
    script: Option<String>,
    seconds: Option<f64>,
    fps: u32,
    width: u32,
    height: u32,
    jitter: f64,
    look_distance: f64,
) -> anyhow::Result<()> {
    let mut script: Script = match script {
        Some(s) => s.parse()?,
        None => Script::default(),
    };
    if let Some(seconds) = seconds {
        if !(seconds > 0.0) {
            anyhow::bail!("--seconds must be positive");
        }
        script = script.cycled_to((seconds * fps.max(1) as f64).ceil() as u64);
    }

    let clock = SessionClock::start();
    let mut source = SyntheticSource::new(script, width, height, fps, clock.epoch_wall())
        .with_jitter(jitter)
        .with_look_distance(look_distance);
    let header = source.frame_header().clone();

    let mut writer = FrameWriter::create(&output, &header)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", output.display()))?;
    let mut detected = 0u64;
    let mut last_ns = 0;
    while let Some(frame) = source.poll()? {
        detected += u64::from(frame.has_detection());
        last_ns = frame.timestamp_ns;
        writer.write_frame(&frame)?;
    }
    writer.flush()?;

    println!("Synthetic stream written to {}", writer.path().display());
    println!("  Frames:     {}", writer.frames_written());
    println!("  With face:  {}", detected);
    println!("  Duration:   {:.2}s", SessionClock::ns_to_secs(last_ns));
    println!(
        "  Image:      {}x{} @ {} Hz",
        header.frame_width, header.frame_height, header.frame_rate_hz
    );

    Ok(())
}
