//! CLI module for TrimDesk
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// TrimDesk
///
/// Arrange clips on a timeline, preview and export stream-copy trims through
/// ffmpeg, and keep saved projects per user.
#[derive(Parser, Debug)]
#[command(name = "trimdesk")]
#[command(about = "TrimDesk - Timeline trimming and export over ffmpeg")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./trimdesk.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Use the in-memory engine instead of ffmpeg
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// ffmpeg binary
    #[arg(long, global = true)]
    pub ffmpeg: Option<String>,

    /// ffprobe binary
    #[arg(long, global = true)]
    pub ffprobe: Option<String>,

    /// Directory receiving exports
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Saved project store
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Timeline snapshot file
    #[arg(long, global = true)]
    pub timeline: Option<PathBuf>,

    /// Act as this signed-in user id
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Role of the signed-in user (ADMIN or USER)
    #[arg(long, global = true)]
    pub role: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Trim the active source and write a preview file
    Preview(args::TrimArgs),
    /// Trim the active source and write a download named after the title
    Export(args::ExportArgs),
    /// Save the current trim as a project of the signed-in user
    Save(args::SaveArgs),
    /// List the signed-in user's saved projects
    List(args::ListArgs),
    /// Extract timeline thumbnails from a source
    Filmstrip(args::FilmstripArgs),
    /// Add or move clips on the timeline
    Timeline(args::TimelineArgs),
    /// Request an email sign-in link
    SignIn(args::SignInArgs),
    /// Show name, size, duration and dimensions of the active video
    Inspect(args::InspectArgs),
    /// List every known user (administrators only)
    Users(args::UsersArgs),
    /// Check whether the current session may open a page
    Access(args::AccessArgs),
}
