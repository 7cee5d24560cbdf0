//! Subcommand implementations.

pub mod check;
pub mod config;
pub mod demo;
pub mod replay;
pub mod synth;

use std::fs::File;
use std::io::BufRead;
use std::path::Path;
use std::sync::atomic::Ordering;

use headmouse_frame_source::FrameDriver;
use headmouse_platform_core::{ActionDispatcher, JsonlDispatcher, TracingDispatcher};
use headmouse_pointer_core::{CommandSender, ControlCommand};

/// JSONL file sink when a path is given, otherwise log-only.
pub(crate) fn action_sink(path: Option<&Path>) -> anyhow::Result<Box<dyn ActionDispatcher>> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let file = File::create(path)
                .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", path.display()))?;
            Ok(Box::new(JsonlDispatcher::new(file)))
        }
        None => Ok(Box::new(TracingDispatcher::new())),
    }
}

/// Forward stdin lines as control commands until stdin closes.
///
/// Runs on a plain thread so a pending read never holds up runtime shutdown.
fn spawn_stdin_commands(sender: CommandSender) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.parse::<ControlCommand>() {
                Ok(command) => {
                    tracing::info!(?command, "Command received");
                    if sender.send(command).is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Ignoring command"),
            }
        }
    });
}

/// Run the driver to completion with Ctrl+C handling, then print a summary.
pub(crate) async fn drive(mut driver: FrameDriver, stdin_commands: bool) -> anyhow::Result<()> {
    if stdin_commands {
        spawn_stdin_commands(driver.session().command_sender());
    }

    let stop = driver.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping");
            stop.store(true, Ordering::SeqCst);
        }
    });

    let stats = driver.run().await?;
    let status = driver.session().status();

    println!();
    println!("Run summary");
    println!("{}", "=".repeat(50));
    println!("  Frames:            {}", stats.frames);
    println!(
        "  Face detected:     {} ({:.1}%)",
        stats.detected_frames,
        percent(stats.detected_frames, stats.frames)
    );
    println!("  Paused frames:     {}", stats.paused_frames);
    println!("  Calibrations:      {}", stats.calibrations_completed);
    println!("  Gestures:          {}", stats.gestures);
    println!("  Mode changes:      {}", stats.mode_changes);
    println!("  Actions:           {}", stats.actions);
    println!("  Dispatch failures: {}", stats.dispatch_failures);
    println!("  Source errors:     {}", stats.source_errors);
    println!();
    println!("Final status:");
    println!("{}", serde_json::to_string_pretty(&status)?);

    Ok(())
}

pub(crate) fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}
