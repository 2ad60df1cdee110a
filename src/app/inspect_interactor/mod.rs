// Inspect interactor - Video properties of the active media

use std::sync::Arc;

use serde::Serialize;

use crate::domain::model::*;
use crate::ports::*;

/// Shown when there is nothing to describe
pub const NO_VIDEO: &str = "No video selected or data unavailable.";

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// What the properties panel lists for one video
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoProperties {
    pub name: String,
    pub size_bytes: u64,
    pub duration_seconds: f64,
    pub width: u32,
    pub height: u32,
    /// e.g. `1.5 MB`
    pub size: String,
    /// `HH:MM:SS`
    pub duration: String,
    /// e.g. `1920 x 1080`
    pub dimensions: String,
}

impl VideoProperties {
    pub fn new(name: impl Into<String>, probe: &MediaProbe, dimensions: Dimensions) -> Self {
        Self {
            name: name.into(),
            size_bytes: probe.size_bytes,
            duration_seconds: probe.duration_seconds,
            width: dimensions.width,
            height: dimensions.height,
            size: format_bytes(probe.size_bytes),
            duration: format_clock(probe.duration_seconds),
            dimensions: format!("{} x {}", dimensions.width, dimensions.height),
        }
    }
}

/// Binary units with up to two decimals and no trailing zeros: `0 Bytes`, `1.5 KB`
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return format!("0 {}", SIZE_UNITS[0]);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

/// Whole seconds as `HH:MM:SS`; fractions are dropped
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// Interactor for the video properties panel
pub struct InspectInteractor {
    probe_port: Arc<dyn ProbePort>,
    log_port: Arc<dyn LogPort>,
}

impl InspectInteractor {
    pub fn new(probe_port: Arc<dyn ProbePort>, log_port: Arc<dyn LogPort>) -> Self {
        Self { probe_port, log_port }
    }

    /// `None` when there is no source, it is not a video, or probing failed
    pub async fn inspect(&self, source: Option<&SourceRef>) -> Option<VideoProperties> {
        let source = source?;

        let probe = match self.probe_port.probe(source).await {
            Ok(probe) => probe,
            Err(e) => {
                self.log_port.warn(&format!("inspection failed: {}", e)).await;
                return None;
            }
        };

        match probe.video {
            Some(dimensions) => Some(VideoProperties::new(source.file_name(), &probe, dimensions)),
            None => {
                self.log_port
                    .debug(&format!("{} has no video stream", source))
                    .await;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::adapters::tracing_log::TracingLogAdapter;
    use crate::domain::errors::DomainError;

    struct FixedProbe(Result<MediaProbe, DomainError>);

    #[async_trait]
    impl ProbePort for FixedProbe {
        async fn probe(&self, _source: &SourceRef) -> Result<MediaProbe, DomainError> {
            self.0.clone()
        }
    }

    fn inspector(answer: Result<MediaProbe, DomainError>) -> InspectInteractor {
        InspectInteractor::new(Arc::new(FixedProbe(answer)), Arc::new(TracingLogAdapter::new()))
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(500), "500 Bytes");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1_234_567), "1.18 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "00:00:00");
        assert_eq!(format_clock(59.99), "00:00:59");
        assert_eq!(format_clock(3725.4), "01:02:05");
        assert_eq!(format_clock(f64::NAN), "00:00:00");
    }

    #[tokio::test]
    async fn test_video_properties() {
        let probe = MediaProbe {
            size_bytes: 5_242_880,
            duration_seconds: 95.7,
            video: Some(Dimensions {
                width: 1920,
                height: 1080,
            }),
        };

        let properties = inspector(Ok(probe))
            .inspect(Some(&SourceRef::new("clips/holiday.mp4")))
            .await
            .unwrap();

        assert_eq!(properties.name, "holiday.mp4");
        assert_eq!(properties.size, "5 MB");
        assert_eq!(properties.duration, "00:01:35");
        assert_eq!(properties.dimensions, "1920 x 1080");
    }

    #[tokio::test]
    async fn test_audio_has_no_video_properties() {
        let probe = MediaProbe {
            size_bytes: 4000,
            duration_seconds: 180.0,
            video: None,
        };
        assert_eq!(inspector(Ok(probe)).inspect(Some(&SourceRef::new("song.mp3"))).await, None);
    }

    #[tokio::test]
    async fn test_nothing_selected_or_unreadable() {
        assert_eq!(inspector(Ok(MediaProbe::default())).inspect(None).await, None);
        assert_eq!(
            inspector(Err(DomainError::Probe("moov atom not found".to_string())))
                .inspect(Some(&SourceRef::new("broken.mp4")))
                .await,
            None
        );
    }
}
