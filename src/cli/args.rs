//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Arguments shared by preview and export
#[derive(Args, Debug)]
pub struct TrimArgs {
    /// Source video (path, file:// or http(s):// URL); defaults to the timeline's active source
    #[arg(short, long)]
    pub source: Option<String>,

    /// Start time (HH:MM:SS.ms, MM:SS.ms, or seconds)
    #[arg(short = 'S', long)]
    pub start: String,

    /// End time (HH:MM:SS.ms, MM:SS.ms, or seconds)
    #[arg(short = 'E', long)]
    pub end: String,
}

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub trim: TrimArgs,

    /// Project title; names the exported file
    #[arg(short, long, default_value = "")]
    pub title: String,
}

/// Arguments for the save command
///
/// Values are taken as typed and validated like the editor's save form.
#[derive(Args, Debug)]
pub struct SaveArgs {
    #[arg(short, long, default_value = "")]
    pub title: String,

    #[arg(short = 'S', long, default_value = "")]
    pub start: String,

    #[arg(short = 'E', long, default_value = "")]
    pub end: String,
}

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Page being rendered
    #[arg(long, default_value = "/dashboard")]
    pub path: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Source video; defaults to the timeline's active source
    #[arg(short, long)]
    pub source: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the users command
#[derive(Args, Debug)]
pub struct UsersArgs {
    /// Page being rendered
    #[arg(long, default_value = "/admin")]
    pub path: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the filmstrip command
#[derive(Args, Debug)]
pub struct FilmstripArgs {
    /// Source video; defaults to the timeline's active source
    #[arg(short, long)]
    pub source: Option<String>,

    /// Directory receiving the frame images
    #[arg(short, long)]
    pub out_dir: PathBuf,
}

/// Arguments for the timeline command
#[derive(Args, Debug)]
pub struct TimelineArgs {
    #[command(subcommand)]
    pub action: TimelineAction,
}

#[derive(Subcommand, Debug)]
pub enum TimelineAction {
    /// Add a clip on the lane implied by its media type
    Add {
        /// Source video or audio
        #[arg(short, long)]
        source: String,

        /// Display title (default: the source's file name)
        #[arg(short, long)]
        title: Option<String>,

        /// video or audio (default: guessed from the file extension)
        #[arg(short, long)]
        media_type: Option<String>,

        /// Horizontal position in percent of the timeline
        #[arg(long, default_value_t = 0.0)]
        start_percent: f64,
    },
    /// Move a clip to another lane
    Move {
        /// Clip id, or its 1-based position in insertion order
        #[arg(short, long)]
        clip: String,

        /// Target lane (V1, A1, A2)
        #[arg(short, long)]
        track: String,
    },
    /// Apply a JSON array of timeline events
    Apply {
        #[arg(short, long)]
        events: PathBuf,
    },
    /// Print lanes and their clips
    Show {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Forget every clip
    Reset,
}

/// Arguments for the sign-in command
#[derive(Args, Debug)]
pub struct SignInArgs {
    #[arg(short, long, default_value = "")]
    pub email: String,

    /// Human verification token
    #[arg(short, long, default_value = "")]
    pub token: String,
}

/// Arguments for the access command
#[derive(Args, Debug)]
pub struct AccessArgs {
    /// Page path, e.g. /dashboard
    pub path: String,
}
