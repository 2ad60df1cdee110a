// Delivery adapter - Writes previews and downloads to local directories

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::*;
use crate::ports::*;

/// Preview files are addressable by `file://` URL; downloads land in the output directory
pub struct FsDeliveryAdapter {
    preview_dir: PathBuf,
    output_dir: PathBuf,
}

impl FsDeliveryAdapter {
    pub fn new(preview_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            preview_dir: preview_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    async fn write(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, DomainError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| DomainError::Delivery(format!("{}: {}", dir.display(), e)))?;
        let path = dir.join(file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| DomainError::Delivery(format!("{}: {}", path.display(), e)))?;
        Ok(path)
    }

    /// Drop every earlier preview once `current` is in place
    async fn release_previews(&self, current: &Path) {
        let mut dir = match tokio::fs::read_dir(&self.preview_dir).await {
            Ok(dir) => dir,
            Err(e) => {
                tracing::debug!(dir = %self.preview_dir.display(), error = %e, "previews not listed");
                return;
            }
        };
        while let Ok(Some(entry)) = dir.next_entry().await {
            let path = entry.path();
            let is_preview = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(PREVIEW_PREFIX) && name.ends_with(".mp4"));
            if !is_preview || path == current {
                continue;
            }
            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::debug!(file = %path.display(), error = %e, "stale preview not removed");
            }
        }
    }
}

const PREVIEW_PREFIX: &str = "preview-";

#[async_trait]
impl DeliveryPort for FsDeliveryAdapter {
    async fn present_preview(&self, bytes: &[u8]) -> Result<String, DomainError> {
        let file_name = format!("{}{}.mp4", PREVIEW_PREFIX, Uuid::new_v4().simple());
        let path = Self::write(&self.preview_dir, &file_name, bytes).await?;
        self.release_previews(&path).await;
        let absolute = std::path::absolute(&path).unwrap_or(path);
        Ok(format!("file://{}", absolute.display()))
    }

    async fn offer_download(&self, file_name: &str, bytes: &[u8]) -> Result<String, DomainError> {
        if file_name.contains('/') || file_name.contains('\\') {
            return Err(DomainError::Delivery(format!("Refusing file name {}", file_name)));
        }
        let path = Self::write(&self.output_dir, file_name, bytes).await?;
        Ok(path.display().to_string())
    }
}
