//! Pixelpick CLI — diagnostics harness for the capture pipeline and sampler.
//!
//! Usage:
//!   pixelpick check               Check host capabilities
//!   pixelpick devices             List devices visible to the synthetic backend
//!   pixelpick preview [OPTIONS]   Stream synthetic frames through the pipeline
//!   pixelpick sample [OPTIONS]    Capture one frame and sample a pixel

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "pixelpick",
    about = "Live-camera frame pipeline with tap-to-sample pixel colors",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check host capabilities
    Check,

    /// List camera devices visible to the synthetic backend
    Devices,

    /// Stream synthetic frames through the capture pipeline
    Preview {
        /// Number of frames to deliver
        #[arg(long, default_value = "30")]
        frames: u64,

        /// Producer pacing in frames per second
        #[arg(long, default_value = "30")]
        fps: u32,

        /// Camera facing to select ("back" or "front")
        #[arg(long, default_value = "back")]
        facing: String,

        /// Resolution preset ("low", "medium", "high")
        #[arg(long, default_value = "medium")]
        preset: String,
    },

    /// Capture one frame and sample the pixel under a point
    Sample {
        /// Sample point x coordinate
        #[arg(short = 'x', long)]
        x: f64,

        /// Sample point y coordinate
        #[arg(short = 'y', long)]
        y: f64,

        /// Resolution preset ("low", "medium", "high")
        #[arg(long, default_value = "medium")]
        preset: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    pixelpick_common::logging::init_logging(&pixelpick_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Check => commands::check::run(),
        Commands::Devices => commands::devices::run(),
        Commands::Preview {
            frames,
            fps,
            facing,
            preset,
        } => commands::preview::run(frames, fps, facing, preset).await,
        Commands::Sample { x, y, preset } => commands::sample::run(x, y, preset).await,
    }
}
