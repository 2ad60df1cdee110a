//! FFprobe adapter for media inspection
//!
//! Runs `ffprobe` with JSON output and reduces the answer to the handful of
//! properties the editor shows: byte size, duration and the pixel size of the
//! first real video stream.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::adapters::source_fs::local_path;
use crate::domain::errors::*;
use crate::domain::model::SourceRef;
use crate::ports::*;

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    binary: PathBuf,
}

impl FFprobeAdapter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe(&self, source: &SourceRef) -> Result<MediaProbe, DomainError> {
        let local = local_path(source);
        let target = match &local {
            Some(path) => path.clone().into_os_string(),
            None => OsString::from(source.as_str()),
        };

        let output = Command::new(&self.binary)
            .args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(&target)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| DomainError::Probe(format!("Failed to start {}: {}", self.binary.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DomainError::Probe(format!("{}: {}", source, stderr.trim())));
        }

        let mut probe = parse_probe_output(&output.stdout)?;
        // Some containers omit format.size; the file itself knows
        if probe.size_bytes == 0 {
            if let Some(path) = &local {
                if let Ok(metadata) = tokio::fs::metadata(path).await {
                    probe.size_bytes = metadata.len();
                }
            }
        }
        tracing::debug!(source = %source, ?probe, "probed media");
        Ok(probe)
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: ProbeFormat,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
    #[serde(default)]
    disposition: ProbeDisposition,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeDisposition {
    /// Cover art in audio files shows up as a one-frame video stream
    #[serde(default)]
    attached_pic: u8,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    size: Option<String>,
    duration: Option<String>,
}

/// Reduce `ffprobe -print_format json -show_format -show_streams` output
pub fn parse_probe_output(raw: &[u8]) -> Result<MediaProbe, DomainError> {
    let output: ProbeOutput = serde_json::from_slice(raw)
        .map_err(|e| DomainError::Probe(format!("Unreadable ffprobe output: {}", e)))?;

    let video_stream = output
        .streams
        .iter()
        .find(|stream| stream.codec_type == "video" && stream.disposition.attached_pic == 0);

    let video = video_stream.and_then(|stream| match (stream.width, stream.height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => Some(Dimensions { width, height }),
        _ => None,
    });

    let duration_seconds = output
        .format
        .duration
        .as_deref()
        .or_else(|| video_stream.and_then(|stream| stream.duration.as_deref()))
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
        .unwrap_or(0.0);

    let size_bytes = output
        .format
        .size
        .as_deref()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(0);

    Ok(MediaProbe {
        size_bytes,
        duration_seconds,
        video,
    })
}
