//! ClipMerge CLI
//!
//! Merge audio or video files into one output with per-clip trims and fades.
//!
//! # Usage
//!
//! ```bash
//! clipmerge merge -i intro.mp3 -i talk.mp3 --edit 2=0:05,1:30,1,2 --cover art.png -o episode
//! clipmerge plan --kind video -i a.mp4 -i b.mp4 --mode reencode
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use clipmerge::cli::{commands, Cli, Commands, LogFormat};
use clipmerge::config_initialization::{initialize_configuration, ConfigOverrides};

/// Main entry point for the ClipMerge CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format);

    info!("Starting ClipMerge");

    let overrides = ConfigOverrides {
        ready_timeout_secs: cli.ready_timeout,
        ffmpeg_binary: cli.ffmpeg.clone(),
        audio_bitrate: cli.audio_bitrate.clone(),
    };
    let config = initialize_configuration(cli.config.as_deref(), &overrides)?;

    match cli.command {
        Commands::Merge(args) => {
            info!("Executing merge command");
            commands::merge(args, &config).await?;
        }
        Commands::Plan(args) => {
            info!("Executing plan command");
            commands::plan(args, &config).await?;
        }
    }

    info!("ClipMerge completed successfully");
    Ok(())
}

/// Logs go to stderr so `plan` output stays machine-readable
fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
