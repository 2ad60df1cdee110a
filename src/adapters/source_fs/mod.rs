// Source fetch adapter - Reads source media from disk or over HTTP

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::SourceRef;
use crate::ports::*;

/// Fetches local paths, `file://` URLs and `http(s)://` URLs
pub struct SourceFetchAdapter {
    client: reqwest::Client,
}

impl SourceFetchAdapter {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn fetch_http(&self, url: &str) -> Result<Vec<u8>, DomainError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::SourceFetch(format!("Download failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DomainError::SourceFetch(format!(
                "Download failed with status: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DomainError::SourceFetch(format!("Failed to read download: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

impl Default for SourceFetchAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Local path behind a source reference, if it is not an HTTP URL
pub fn local_path(source: &SourceRef) -> Option<PathBuf> {
    let raw = source.as_str();
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return None;
    }
    Some(PathBuf::from(raw.strip_prefix("file://").unwrap_or(raw)))
}

#[async_trait]
impl SourceFetchPort for SourceFetchAdapter {
    async fn fetch(&self, source: &SourceRef) -> Result<Vec<u8>, DomainError> {
        match local_path(source) {
            Some(path) => tokio::fs::read(&path)
                .await
                .map_err(|e| DomainError::SourceFetch(format!("{}: {}", path.display(), e))),
            None => self.fetch_http(source.as_str()).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path_forms() {
        assert_eq!(
            local_path(&SourceRef::new("file:///tmp/a.mp4")),
            Some(PathBuf::from("/tmp/a.mp4"))
        );
        assert_eq!(local_path(&SourceRef::new("clips/a.mp4")), Some(PathBuf::from("clips/a.mp4")));
        assert_eq!(local_path(&SourceRef::new("https://cdn.example.com/a.mp4")), None);
    }

    #[tokio::test]
    async fn test_fetch_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp4");
        std::fs::write(&path, b"bytes").unwrap();

        let adapter = SourceFetchAdapter::new();
        let bytes = adapter
            .fetch(&SourceRef::new(path.to_string_lossy()))
            .await
            .unwrap();
        assert_eq!(bytes, b"bytes");
    }

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let adapter = SourceFetchAdapter::new();
        let err = adapter
            .fetch(&SourceRef::new("/definitely/not/here.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::SourceFetch(_)));
    }
}
