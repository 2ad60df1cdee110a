//! FFmpeg execution adapter
//!
//! Runs a native `ffmpeg` binary as the transcoding engine. The engine's
//! virtual filesystem is a private scratch directory that lives as long as
//! the adapter; every argv runs with that directory as its working directory.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::domain::errors::*;
use crate::domain::model::TimeSpec;
use crate::ports::*;

/// FFmpeg-based execution adapter
pub struct FFmpegAdapter {
    binary: PathBuf,
    workspace: TempDir,
}

impl FFmpegAdapter {
    /// Map a virtual file name onto the scratch directory
    fn resolve(&self, name: &str) -> Result<PathBuf, DomainError> {
        let name = name.trim_start_matches("./");
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(DomainError::BadArgs(format!("Invalid engine file name: {}", name)));
        }
        Ok(self.workspace.path().join(name))
    }
}

#[async_trait]
impl TranscodeEngine for FFmpegAdapter {
    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), DomainError> {
        let path = self.resolve(name)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| DomainError::EngineWrite(format!("{}: {}", name, e)))
    }

    async fn exec(&self, argv: &[String], progress: &dyn ProgressCallback) -> Result<i32, DomainError> {
        let mut child = Command::new(&self.binary)
            .args(["-hide_banner", "-nostdin", "-y"])
            .args(argv)
            .current_dir(self.workspace.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DomainError::EngineExec(format!("Failed to start FFmpeg: {}", e)))?;

        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| DomainError::EngineExec("Failed to capture FFmpeg stderr".to_string()))?;

        let mut parser = ProgressParser::from_argv(argv);
        let mut pending: Vec<u8> = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let read = stderr
                .read(&mut chunk)
                .await
                .map_err(|e| DomainError::EngineExec(format!("Failed to read FFmpeg output: {}", e)))?;
            if read == 0 {
                break;
            }
            // Stats lines end in '\r', log lines in '\n'
            for &byte in &chunk[..read] {
                if byte == b'\r' || byte == b'\n' {
                    feed_line(&mut parser, &pending, progress);
                    pending.clear();
                } else {
                    pending.push(byte);
                }
            }
        }
        feed_line(&mut parser, &pending, progress);

        let status = child
            .wait()
            .await
            .map_err(|e| DomainError::EngineExec(format!("Failed to wait for FFmpeg: {}", e)))?;
        let code = status.code().unwrap_or(-1);
        if code == 0 {
            progress.on_progress(1.0);
        }
        tracing::debug!(code, "ffmpeg exited");
        Ok(code)
    }

    async fn read_file(&self, name: &str) -> Result<EnginePayload, DomainError> {
        let path = self.resolve(name)?;
        tokio::fs::read(&path)
            .await
            .map(EnginePayload::Binary)
            .map_err(|e| DomainError::EngineRead(format!("{}: {}", name, e)))
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, DomainError> {
        if !matches!(path, "." | "./" | "/" | "") {
            return Err(DomainError::BadArgs(format!("Unknown engine directory: {}", path)));
        }

        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(self.workspace.path())
            .await
            .map_err(|e| DomainError::EngineRead(format!("{}: {}", path, e)))?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| DomainError::EngineRead(format!("{}: {}", path, e)))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map(|kind| kind.is_dir())
                .unwrap_or(false);
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn delete_file(&self, name: &str) -> Result<(), DomainError> {
        let path = self.resolve(name)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| DomainError::EngineWrite(format!("{}: {}", name, e)))
    }
}

fn feed_line(parser: &mut ProgressParser, raw: &[u8], progress: &dyn ProgressCallback) {
    if raw.is_empty() {
        return;
    }
    let line = String::from_utf8_lossy(raw);
    tracing::trace!(target: "ffmpeg", "{}", line);
    if let Some(fraction) = parser.feed(&line) {
        progress.on_progress(fraction);
    }
}

/// Turns ffmpeg log output into fractional progress
///
/// The total comes from the argv's `-ss`/`-to` pair when both are present,
/// otherwise from the first `Duration:` the input reports. Each `time=` stat
/// is then divided by that total.
#[derive(Debug, Clone, Default)]
pub struct ProgressParser {
    expected: Option<f64>,
    duration: Option<f64>,
}

impl ProgressParser {
    pub fn from_argv(argv: &[String]) -> Self {
        let value_of = |flag: &str| {
            argv.iter()
                .position(|arg| arg == flag)
                .and_then(|i| argv.get(i + 1))
                .and_then(|value| TimeSpec::parse(value).ok())
                .map(|time| time.seconds)
        };
        let expected = match (value_of("-ss"), value_of("-to")) {
            (Some(start), Some(end)) if end > start => Some(end - start),
            _ => None,
        };
        Self {
            expected,
            duration: None,
        }
    }

    /// Feed one log line; returns progress when the line carries a `time=` stat
    pub fn feed(&mut self, line: &str) -> Option<f64> {
        if self.duration.is_none() {
            if let Some(rest) = line.trim_start().strip_prefix("Duration:") {
                let value = rest.split(',').next().unwrap_or("").trim();
                self.duration = TimeSpec::parse(value).ok().map(|t| t.seconds);
                return None;
            }
        }

        let time = line
            .split_whitespace()
            .find_map(|field| field.strip_prefix("time="))
            .and_then(|value| TimeSpec::parse(value).ok())?;

        let total = self.expected.or(self.duration).filter(|total| *total > 0.0)?;
        Some((time.seconds / total).clamp(0.0, 1.0))
    }
}

/// Loads the native engine: checks the binary answers and opens a scratch directory
pub struct FFmpegEngineLoader {
    scratch_root: Option<PathBuf>,
}

impl FFmpegEngineLoader {
    pub fn new(scratch_root: Option<PathBuf>) -> Self {
        Self { scratch_root }
    }
}

#[async_trait]
impl EngineLoader for FFmpegEngineLoader {
    /// `core_url` names the ffmpeg binary; the native engine has no separate module, so `wasm_url` is unused
    async fn load(&self, source: &EngineSource) -> Result<Arc<dyn TranscodeEngine>, DomainError> {
        let binary = PathBuf::from(&source.core_url);

        let output = Command::new(&binary)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| DomainError::EngineLoad(format!("{}: {}", binary.display(), e)))?;
        if !output.status.success() {
            return Err(DomainError::EngineLoad(format!(
                "{} -version exited with {}",
                binary.display(),
                output.status
            )));
        }
        let banner = String::from_utf8_lossy(&output.stdout);
        tracing::info!(version = %banner.lines().next().unwrap_or(""), "ffmpeg ready");

        let builder = {
            let mut builder = tempfile::Builder::new();
            builder.prefix("trimdesk-engine-");
            builder
        };
        let workspace = match &self.scratch_root {
            Some(root) => {
                tokio::fs::create_dir_all(root)
                    .await
                    .map_err(|e| DomainError::EngineLoad(format!("{}: {}", root.display(), e)))?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .map_err(|e| DomainError::EngineLoad(format!("Failed to create engine workspace: {}", e)))?;

        Ok(Arc::new(FFmpegAdapter { binary, workspace }))
    }
}
