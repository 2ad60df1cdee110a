// Mock probe adapter - Media properties without ffprobe, for dry runs and tests

use async_trait::async_trait;

use crate::adapters::source_fs::local_path;
use crate::domain::errors::*;
use crate::domain::model::{MediaType, SourceRef};
use crate::ports::*;

/// Reports the real byte size of a local file with fixed stream properties
///
/// Sources named like video files get `dimensions`; anything else is audio.
pub struct MockProbeAdapter {
    duration_seconds: f64,
    dimensions: Dimensions,
}

impl MockProbeAdapter {
    pub fn new() -> Self {
        Self::with_streams(
            30.0,
            Dimensions {
                width: 1920,
                height: 1080,
            },
        )
    }

    pub fn with_streams(duration_seconds: f64, dimensions: Dimensions) -> Self {
        Self {
            duration_seconds,
            dimensions,
        }
    }
}

impl Default for MockProbeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProbePort for MockProbeAdapter {
    async fn probe(&self, source: &SourceRef) -> Result<MediaProbe, DomainError> {
        let path = local_path(source)
            .ok_or_else(|| DomainError::Probe(format!("{}: only local files can be probed here", source)))?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| DomainError::Probe(format!("{}: {}", path.display(), e)))?;

        let video = match MediaType::guess_from_name(source.as_str()) {
            MediaType::Video => Some(self.dimensions),
            MediaType::Audio => None,
        };
        Ok(MediaProbe {
            size_bytes: metadata.len(),
            duration_seconds: self.duration_seconds,
            video,
        })
    }
}
