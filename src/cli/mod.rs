//! CLI module for ClipMerge
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub mod args;
pub mod commands;

pub use args::{EditArg, MergeArgs};

/// ClipMerge
///
/// Merge audio or video files into one output with per-clip trims, fades and
/// optional cover art, driven by ffmpeg.
#[derive(Parser, Debug)]
#[command(name = "clipmerge")]
#[command(about = "ClipMerge - Merge audio or video clips with trims and fades")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (overridden by RUST_LOG)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// Configuration file (TOML with a [merge] section)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// ffmpeg executable
    #[arg(long, global = true)]
    pub ffmpeg: Option<String>,

    /// Seconds to wait for the engine to become ready
    #[arg(long, global = true)]
    pub ready_timeout: Option<u64>,

    /// Audio bitrate for re-encoded output, e.g. 192k
    #[arg(long, global = true)]
    pub audio_bitrate: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge the input files into one output
    Merge(MergeArgs),
    /// Print the job plan as JSON without running the engine
    Plan(MergeArgs),
}
