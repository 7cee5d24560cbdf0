//! Run a scripted synthetic face through the pipeline.

use std::path::PathBuf;

use headmouse_common::clock::SessionClock;
use headmouse_frame_source::backends::{Script, SyntheticSource};
use headmouse_frame_source::writer::FrameWriter;
use headmouse_frame_source::{DriverOptions, FrameDriver};
use headmouse_pointer_core::{ControllerConfig, Session, SharedSession};

pub async fn run(
    config: ControllerConfig,
    script: Option<String>,
    fps: u32,
    realtime: bool,
    record: Option<PathBuf>,
    actions: Option<PathBuf>,
    stdin_commands: bool,
) -> anyhow::Result<()> {
    let script: Script = match script {
        Some(s) => s.parse()?,
        None => Script::default(),
    };
    let total_frames = script.total_frames();
    let clock = SessionClock::start();
    let source = SyntheticSource::new(script, 640, 480, fps, clock.epoch_wall());
    let header = source.frame_header().clone();

    println!(
        "Synthetic demo: {} frames at {} Hz",
        total_frames, header.frame_rate_hz
    );

    let session = SharedSession::new(Session::new(config)?);
    let mut driver = FrameDriver::new(
        Box::new(source),
        session,
        super::action_sink(actions.as_deref())?,
    )
    .with_options(DriverOptions {
        realtime,
        ..DriverOptions::default()
    });

    if let Some(path) = &record {
        driver = driver.record_to(FrameWriter::create(path, &header)?);
    }

    super::drive(driver, stdin_commands).await?;

    if let Some(path) = record {
        println!("Frames recorded to {}", path.display());
    }
    Ok(())
}
