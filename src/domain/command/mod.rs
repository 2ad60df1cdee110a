//! Transcode command construction
//!
//! Pure functions from edit state to engine argv. Nothing here touches the
//! engine, so every command can be checked without ffmpeg present.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::model::*;

/// Thumbnail width used by the filmstrip
pub const FILMSTRIP_FRAME_WIDTH: u32 = 150;
/// Thumbnail height (16:9 of the width)
pub const FILMSTRIP_FRAME_HEIGHT: u32 = 84;
/// One thumbnail per this many seconds of source
pub const FILMSTRIP_INTERVAL_SECS: u32 = 5;

/// Names a single run uses inside the engine's virtual filesystem
///
/// Every run gets its own prefix so concurrent jobs on the shared engine
/// never touch each other's files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingNames {
    pub prefix: String,
    pub input: String,
    pub output: String,
}

impl StagingNames {
    pub fn for_run(run_id: Uuid) -> Self {
        Self::with_prefix(format!("run-{}-", run_id.simple()))
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            input: format!("{}input.mp4", prefix),
            output: format!("{}output.mp4", prefix),
            prefix,
        }
    }

    /// Frame name pattern for the filmstrip
    pub fn frame_pattern(&self) -> String {
        format!("{}frame-%03d.png", self.prefix)
    }

    /// Does `name` belong to the filmstrip frames of this run
    pub fn is_frame(&self, name: &str) -> bool {
        name.strip_prefix(&self.prefix)
            .map(|rest| rest.starts_with("frame-") && rest.ends_with(".png"))
            .unwrap_or(false)
    }
}

/// A built command plus the files it reads and writes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscodePlan {
    pub argv: Vec<String>,
    pub input_name: String,
    pub output_name: String,
}

pub struct TranscodeCommandBuilder;

impl TranscodeCommandBuilder {
    /// Seek to `start`, cut at `end`, stream-copy audio and video
    ///
    /// Stream copy keeps the trim lossless; cut points land on the nearest
    /// keyframe.
    pub fn trim(range: &TrimRange, names: &StagingNames) -> TranscodePlan {
        let argv = vec![
            "-i".to_string(),
            names.input.clone(),
            "-ss".to_string(),
            format_seconds(range.start.seconds),
            "-to".to_string(),
            format_seconds(range.end.seconds),
            "-c:v".to_string(),
            "copy".to_string(),
            "-c:a".to_string(),
            "copy".to_string(),
            names.output.clone(),
        ];

        TranscodePlan {
            argv,
            input_name: names.input.clone(),
            output_name: names.output.clone(),
        }
    }

    /// Extract one scaled frame every [`FILMSTRIP_INTERVAL_SECS`] seconds
    pub fn filmstrip(names: &StagingNames) -> TranscodePlan {
        let pattern = names.frame_pattern();
        let argv = vec![
            "-i".to_string(),
            names.input.clone(),
            "-vf".to_string(),
            format!(
                "fps=1/{},scale={}:-1",
                FILMSTRIP_INTERVAL_SECS, FILMSTRIP_FRAME_WIDTH
            ),
            pattern.clone(),
        ];

        TranscodePlan {
            argv,
            input_name: names.input.clone(),
            output_name: pattern,
        }
    }
}

/// Shortest decimal rendering: `2`, `2.5`, `0.04`
pub fn format_seconds(seconds: f64) -> String {
    format!("{}", seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_argv() {
        let range = TrimRange::from_seconds(2.0, 4.0).unwrap();
        let names = StagingNames::with_prefix("");
        let plan = TranscodeCommandBuilder::trim(&range, &names);

        assert_eq!(
            plan.argv,
            vec![
                "-i", "input.mp4", "-ss", "2", "-to", "4", "-c:v", "copy", "-c:a", "copy",
                "output.mp4"
            ]
        );
        assert_eq!(plan.input_name, "input.mp4");
        assert_eq!(plan.output_name, "output.mp4");
    }

    #[test]
    fn test_trim_argv_fractional_seconds() {
        let range = TrimRange::from_seconds(1.25, 7.5).unwrap();
        let plan = TranscodeCommandBuilder::trim(&range, &StagingNames::with_prefix(""));
        assert_eq!(plan.argv[3], "1.25");
        assert_eq!(plan.argv[5], "7.5");
    }

    #[test]
    fn test_runs_get_distinct_namespaces() {
        let a = StagingNames::for_run(Uuid::new_v4());
        let b = StagingNames::for_run(Uuid::new_v4());
        assert_ne!(a.input, b.input);
        assert_ne!(a.output, b.output);
        assert!(a.input.starts_with("run-"));
    }

    #[test]
    fn test_filmstrip_argv_and_frame_matching() {
        let names = StagingNames::with_prefix("run-x-");
        let plan = TranscodeCommandBuilder::filmstrip(&names);

        assert_eq!(
            plan.argv,
            vec!["-i", "run-x-input.mp4", "-vf", "fps=1/5,scale=150:-1", "run-x-frame-%03d.png"]
        );
        assert!(names.is_frame("run-x-frame-001.png"));
        assert!(!names.is_frame("run-y-frame-001.png"));
        assert!(!names.is_frame("run-x-output.mp4"));
    }
}
