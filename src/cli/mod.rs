//! CLI module for trimcode
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::logging::{LogFormat, LogLevel};

pub mod args;
pub mod commands;

pub use args::{
    BookmarksArgs, ChapterSourceArgs, ChapterTrimsArgs, ChaptersArgs, ClockArgs, ConvertArgs,
    CreateArgs, CutArgs, QpfileArgs, TrimSelectionArgs, TrimsArgs,
};

/// trimcode
///
/// Timecode conversion and Trim-based timecode cutting for Avisynth
/// workflows.
#[derive(Parser, Debug)]
#[command(name = "trimcode")]
#[command(about = "Timecode v1/v2 conversion and Trim-based timecode cutting")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (default: from preferences)
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Log output format (default: from preferences)
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    /// Preferences file
    #[arg(long, env = "TRIMCODE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Save this run's choices to the preferences file
    #[arg(long, global = true)]
    pub save_config: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a v1 timecode to v2
    Convert(ConvertArgs),
    /// Print the trims of a script
    Trims(TrimsArgs),
    /// Cut a timecode by the trims of a script
    Cut(CutArgs),
    /// Create a timecode from the trims of a script
    Create(CreateArgs),
    /// Make an x264 QP file from a chapter file
    Qpfile(QpfileArgs),
    /// Make a trims line from a chapter file
    ChapterTrims(ChapterTrimsArgs),
    /// Make a chapter file from the trims of a script
    Chapters(ChaptersArgs),
    /// Make a trims line from bookmarked frames
    Bookmarks(BookmarksArgs),
}
