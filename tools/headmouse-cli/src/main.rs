//! HeadMouse CLI: drive the pointer pipeline from landmark streams.
//!
//! Usage:
//!   headmouse replay <FRAMES>    Run a recorded stream through the pipeline
//!   headmouse demo               Run a scripted synthetic face through the pipeline
//!   headmouse synth <OUTPUT>     Write a synthetic landmark stream
//!   headmouse check <FRAMES>     Inspect a recorded stream
//!   headmouse config <ACTION>    Create, validate, or show the config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod settings;

use settings::AppConfig;

#[derive(Parser)]
#[command(
    name = "headmouse",
    about = "Hands-free pointer control from head movement and facial gestures",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to the per-user location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a recorded landmark stream through the pipeline
    Replay {
        /// Path to the JSONL frame stream
        input: PathBuf,

        /// Write dispatched actions as JSONL instead of logging them
        #[arg(short, long)]
        actions: Option<PathBuf>,

        /// Timed control commands ("<ms> <command>" per line)
        #[arg(long)]
        commands: Option<PathBuf>,

        /// Pace frames by their timestamps
        #[arg(long)]
        realtime: bool,

        /// Read control commands from stdin while running
        #[arg(long)]
        stdin_commands: bool,
    },

    /// Run a scripted synthetic face through the pipeline
    Demo {
        /// Pose script ("pose:frames,...")
        #[arg(long)]
        script: Option<String>,

        /// Frame rate of the synthetic tracker
        #[arg(long, default_value = "30")]
        fps: u32,

        /// Pace frames in real time
        #[arg(long)]
        realtime: bool,

        /// Also record the generated frames
        #[arg(long)]
        record: Option<PathBuf>,

        /// Write dispatched actions as JSONL instead of logging them
        #[arg(short, long)]
        actions: Option<PathBuf>,

        /// Read control commands from stdin while running
        #[arg(long)]
        stdin_commands: bool,
    },

    /// Write a synthetic landmark stream
    Synth {
        /// Output JSONL path
        output: PathBuf,

        /// Pose script ("pose:frames,...")
        #[arg(long)]
        script: Option<String>,

        /// Repeat the script to fill this many seconds
        #[arg(long)]
        seconds: Option<f64>,

        /// Frame rate
        #[arg(long, default_value = "30")]
        fps: u32,

        /// Image width in pixels
        #[arg(long, default_value = "640")]
        width: u32,

        /// Image height in pixels
        #[arg(long, default_value = "480")]
        height: u32,

        /// Landmark jitter amplitude in pixels
        #[arg(long, default_value = "0.4")]
        jitter: f64,

        /// Nose displacement for look poses in pixels
        #[arg(long, default_value = "60")]
        look_distance: f64,
    },

    /// Inspect a recorded landmark stream
    Check {
        /// Path to the JSONL frame stream
        input: PathBuf,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Check that the config file parses and is consistent
    Validate,

    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(headmouse_common::config::config_file_path);

    // `config validate` reports parse errors itself.
    let app = match &cli.command {
        Commands::Config { .. } => AppConfig::load_lenient(&config_path),
        _ => AppConfig::load(&config_path)?,
    };

    // Initialize logging
    let mut logging = app.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    if cli.json_logs {
        logging.json = true;
    }
    headmouse_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Replay {
            input,
            actions,
            commands,
            realtime,
            stdin_commands,
        } => {
            commands::replay::run(
                app.controller,
                input,
                actions,
                commands,
                realtime,
                stdin_commands,
            )
            .await
        }
        Commands::Demo {
            script,
            fps,
            realtime,
            record,
            actions,
            stdin_commands,
        } => {
            commands::demo::run(
                app.controller,
                script,
                fps,
                realtime,
                record,
                actions,
                stdin_commands,
            )
            .await
        }
        Commands::Synth {
            output,
            script,
            seconds,
            fps,
            width,
            height,
            jitter,
            look_distance,
        } => commands::synth::run(
            output,
            script,
            seconds,
            fps,
            width,
            height,
            jitter,
            look_distance,
        ),
        Commands::Check { input } => commands::check::run(input, &app.controller),
        Commands::Config { action } => match action {
            ConfigAction::Init { force } => commands::config::init(&config_path, force),
            ConfigAction::Validate => commands::config::validate(&config_path),
            ConfigAction::Show => commands::config::show(&config_path, &app),
        },
    }
}
