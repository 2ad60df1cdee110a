// Domain models - Core types and data structures

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;

/// Time specification with precision - represents time in seconds with fractional precision
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    /// Parse time string in various formats
    ///
    /// Accepts plain seconds (`12.5`), `MM:SS.ms` and `HH:MM:SS.ms`. The same
    /// parser reads the `Duration:` and `time=` fields of ffmpeg logs.
    pub fn parse(time_str: &str) -> Result<Self, DomainError> {
        let trimmed = time_str.trim();

        if let Ok(seconds) = trimmed.parse::<f64>() {
            if !seconds.is_finite() {
                return Err(DomainError::BadArgs("Time must be a finite number".to_string()));
            }
            if seconds < 0.0 {
                return Err(DomainError::BadArgs("Time cannot be negative".to_string()));
            }
            return Ok(Self::from_seconds(seconds));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        match parts.as_slice() {
            [minutes, seconds] => {
                let minutes = parse_unit(minutes, "minutes")?;
                let seconds = parse_seconds_part(seconds)?;
                Ok(Self::from_seconds(minutes as f64 * 60.0 + seconds))
            }
            [hours, minutes, seconds] => {
                let hours = parse_unit(hours, "hours")?;
                let minutes = parse_unit(minutes, "minutes")?;
                if minutes >= 60 {
                    return Err(DomainError::BadArgs("Minutes must be less than 60".to_string()));
                }
                let seconds = parse_seconds_part(seconds)?;
                Ok(Self::from_seconds(
                    hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds,
                ))
            }
            _ => Err(DomainError::BadArgs(
                "Invalid time format. Supported formats: seconds (e.g., 123.45), MM:SS.ms (e.g., 2:30.5), HH:MM:SS.ms (e.g., 1:02:30.5)".to_string(),
            )),
        }
    }

    /// Format as HH:MM:SS.mmm, or MM:SS.mmm under an hour
    pub fn format_hms(&self) -> String {
        let total_ms = (self.seconds.max(0.0) * 1000.0).round() as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let seconds = (total_ms % 60_000) / 1000;
        let milliseconds = total_ms % 1000;

        if hours > 0 {
            format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds)
        } else {
            format!("{:02}:{:02}.{:03}", minutes, seconds, milliseconds)
        }
    }
}

fn parse_unit(part: &str, name: &str) -> Result<u32, DomainError> {
    part.parse::<u32>()
        .map_err(|_| DomainError::BadArgs(format!("Invalid {} format", name)))
}

fn parse_seconds_part(part: &str) -> Result<f64, DomainError> {
    let seconds = part
        .parse::<f64>()
        .map_err(|_| DomainError::BadArgs("Invalid seconds format".to_string()))?;
    if !(0.0..60.0).contains(&seconds) {
        return Err(DomainError::BadArgs("Seconds must be less than 60".to_string()));
    }
    Ok(seconds)
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_hms())
    }
}

/// In/out points used for preview and export
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimRange {
    pub start: TimeSpec,
    pub end: TimeSpec,
}

impl TrimRange {
    /// Create a trim range; `end` must be strictly after `start`
    pub fn new(start: TimeSpec, end: TimeSpec) -> Result<Self, DomainError> {
        if !start.seconds.is_finite() || !end.seconds.is_finite() {
            return Err(DomainError::BadArgs("Trim points must be finite".to_string()));
        }
        if start.seconds < 0.0 {
            return Err(DomainError::BadArgs("Start time cannot be negative".to_string()));
        }
        if end.seconds <= start.seconds {
            return Err(DomainError::BadArgs(format!(
                "End time ({}) must be after start time ({})",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn from_seconds(start: f64, end: f64) -> Result<Self, DomainError> {
        Self::new(TimeSpec::from_seconds(start), TimeSpec::from_seconds(end))
    }

    pub fn duration(&self) -> TimeSpec {
        TimeSpec::from_seconds(self.end.seconds - self.start.seconds)
    }
}

/// Timeline lane identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackId {
    V1,
    A1,
    A2,
}

impl TrackId {
    /// Lanes in display order
    pub const ALL: [TrackId; 3] = [TrackId::V1, TrackId::A1, TrackId::A2];

    /// The single lane reserved for video
    pub const VIDEO: TrackId = TrackId::V1;

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackId::V1 => "V1",
            TrackId::A1 => "A1",
            TrackId::A2 => "A2",
        }
    }

    /// Default lane for a freshly added clip
    pub fn default_for(media_type: MediaType) -> Self {
        match media_type {
            MediaType::Video => TrackId::V1,
            MediaType::Audio => TrackId::A1,
        }
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "V1" => Ok(TrackId::V1),
            "A1" => Ok(TrackId::A1),
            "A2" => Ok(TrackId::A2),
            other => Err(DomainError::BadArgs(format!(
                "Unknown track: {}. Valid tracks: V1, A1, A2",
                other
            ))),
        }
    }
}

/// Kind of media a clip carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Audio,
}

impl MediaType {
    /// Best-effort classification of a file name by extension
    pub fn guess_from_name(name: &str) -> Self {
        let extension = std::path::Path::new(name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "mp4" | "m4v" | "mov" | "mkv" | "webm" | "avi" | "ts" | "mts" => MediaType::Video,
            _ => MediaType::Audio,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(MediaType::Video),
            "audio" => Ok(MediaType::Audio),
            other => Err(DomainError::BadArgs(format!(
                "Unknown media type: {}. Valid types: video, audio",
                other
            ))),
        }
    }
}

/// Opaque clip identity, generated at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(Uuid);

impl ClipId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClipId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| DomainError::BadArgs(format!("Invalid clip id '{}': {}", s, e)))
    }
}

/// Handle to the media behind a clip (path or URL); the bytes are never held here
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRef(String);

impl SourceRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, e.g. `holiday.mp4` for `https://cdn/v/holiday.mp4`
    pub fn file_name(&self) -> &str {
        let trimmed = self.0.trim_end_matches(['/', '\\']);
        trimmed
            .rsplit(['/', '\\'])
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(trimmed)
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One media segment placed on the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: ClipId,
    pub track_id: TrackId,
    pub media_type: MediaType,
    pub source: SourceRef,
    pub title: String,
    /// Left edge as a percentage of the timeline width
    pub start_percent: f64,
    /// Length as a percentage of the timeline width
    pub width_percent: f64,
}

/// Which surface a transcode run feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscodeTarget {
    Preview,
    Export,
}

/// Orchestrator states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrchestrationState {
    Idle,
    Initializing,
    WritingInput,
    Executing,
    ReadingOutput,
    Done,
    Error,
}

impl OrchestrationState {
    pub fn is_idle(&self) -> bool {
        matches!(self, OrchestrationState::Idle)
    }
}

/// Everything one preview/export run needs
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeRequest {
    pub target: TranscodeTarget,
    pub source: Option<SourceRef>,
    pub range: TrimRange,
    /// Project title; names the exported file
    pub title: String,
}

impl TranscodeRequest {
    pub fn preview(source: Option<SourceRef>, range: TrimRange) -> Self {
        Self {
            target: TranscodeTarget::Preview,
            source,
            range,
            title: String::new(),
        }
    }

    pub fn export(source: Option<SourceRef>, range: TrimRange, title: impl Into<String>) -> Self {
        Self {
            target: TranscodeTarget::Export,
            source,
            range,
            title: title.into(),
        }
    }
}

/// What a finished run left for the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TranscodeOutput {
    /// Locally addressable preview
    Preview { url: String, bytes: usize },
    /// File offered as a download
    Download { file_name: String, location: String, bytes: usize },
}

/// User role as carried by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            other => Err(DomainError::BadArgs(format!("Unknown role: {}", other))),
        }
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed-in identity supplied by the session gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Role,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Request context handed to the session gateway
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    pub path: String,
    /// Opaque session credential (cookie value, token); gateway-specific
    pub credential: Option<String>,
}

impl RequestContext {
    pub fn for_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            credential: None,
        }
    }
}

/// Trim points as persisted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimData {
    pub start: f64,
    pub end: f64,
}

/// Editing payload stored with a saved project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoData {
    pub trim: TrimData,
}

impl From<TrimRange> for VideoData {
    fn from(range: TrimRange) -> Self {
        Self {
            trim: TrimData {
                start: range.start.seconds,
                end: range.end.seconds,
            },
        }
    }
}

/// Record to be created by the persistence gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSavedVideo {
    pub title: String,
    pub user_id: String,
    pub video_data: VideoData,
}

/// Persisted project record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedVideo {
    pub id: Uuid,
    pub title: String,
    pub user_id: String,
    pub video_data: VideoData,
    pub created_at: DateTime<Utc>,
}

/// Raw save form fields, exactly as submitted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveVideoForm {
    pub title: String,
    pub start_time: String,
    pub end_time: String,
}

impl SaveVideoForm {
    pub fn new(
        title: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }
}

/// Outcome of a form action: exactly one of the two is set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub error: Option<String>,
    pub success: Option<String>,
}

impl FormState {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            success: None,
        }
    }

    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            error: None,
            success: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success.is_some()
    }
}
