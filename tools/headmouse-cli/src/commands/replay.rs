//! Run a recorded landmark stream through the pipeline.

use std::path::PathBuf;

use headmouse_frame_source::backends::JsonlReplaySource;
use headmouse_frame_source::{CommandSchedule, DriverOptions, FrameDriver, LandmarkSource};
use headmouse_pointer_core::{ControllerConfig, Session, SharedSession};

pub async fn run(
    config: ControllerConfig,
    input: PathBuf,
    actions: Option<PathBuf>,
    commands: Option<PathBuf>,
    realtime: bool,
    stdin_commands: bool,
) -> anyhow::Result<()> {
    let source = JsonlReplaySource::open(&input)
        .map_err(|e| anyhow::anyhow!("Failed to open {}: {e}", input.display()))?;

    println!("Replaying {}", input.display());
    if let Some(header) = source.header() {
        println!(
            "  Stream: {}x{} @ {} Hz, {:?} coordinates, layout {}",
            header.frame_width,
            header.frame_height,
            header.frame_rate_hz,
            header.coordinate_space,
            header.layout
        );
        if header.layout != "ibug68" {
            tracing::warn!(
                layout = %header.layout,
                "Stream layout differs from the configured landmark indices"
            );
        }
    }

    let schedule = match &commands {
        Some(path) => {
            let schedule = CommandSchedule::load(path)
                .map_err(|e| anyhow::anyhow!("Failed to load {}: {e}", path.display()))?;
            println!("  Scheduled commands: {}", schedule.len());
            schedule
        }
        None => CommandSchedule::default(),
    };

    let session = SharedSession::new(Session::new(config)?);
    let driver = FrameDriver::new(
        Box::new(source),
        session,
        super::action_sink(actions.as_deref())?,
    )
    .with_options(DriverOptions {
        realtime,
        ..DriverOptions::default()
    })
    .with_schedule(schedule);

    super::drive(driver, stdin_commands).await?;

    if let Some(path) = actions {
        println!("Actions written to {}", path.display());
    }
    Ok(())
}
