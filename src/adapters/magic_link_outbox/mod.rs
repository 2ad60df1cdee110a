// Magic link adapter - Records sign-in link requests for the external mailer

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::domain::errors::*;
use crate::ports::*;

/// One queued sign-in link request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxEntry {
    pub email: String,
    pub requested_at: DateTime<Utc>,
}

/// Appends requests as JSON lines to an outbox file the mailer drains
pub struct MagicLinkOutboxAdapter {
    outbox: PathBuf,
}

impl MagicLinkOutboxAdapter {
    pub fn new(outbox: impl Into<PathBuf>) -> Self {
        Self {
            outbox: outbox.into(),
        }
    }
}

#[async_trait]
impl MagicLinkPort for MagicLinkOutboxAdapter {
    async fn send_sign_in_link(&self, email: &str) -> Result<(), DomainError> {
        let entry = OutboxEntry {
            email: email.to_string(),
            requested_at: Utc::now(),
        };
        let mut line = serde_json::to_vec(&entry)
            .map_err(|e| DomainError::InternalError(format!("Failed to encode outbox entry: {}", e)))?;
        line.push(b'\n');

        if let Some(parent) = self.outbox.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::InternalError(format!("{}: {}", parent.display(), e)))?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.outbox)
            .await
            .map_err(|e| DomainError::InternalError(format!("{}: {}", self.outbox.display(), e)))?;
        file.write_all(&line)
            .await
            .map_err(|e| DomainError::InternalError(format!("{}: {}", self.outbox.display(), e)))?;

        tracing::info!(email = %email, "sign-in link queued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_requests_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mail/outbox.jsonl");
        let adapter = MagicLinkOutboxAdapter::new(&path);

        adapter.send_sign_in_link("a@example.com").await.unwrap();
        adapter.send_sign_in_link("b@example.com").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let emails: Vec<String> = content
            .lines()
            .map(|line| serde_json::from_str::<OutboxEntry>(line).unwrap().email)
            .collect();
        assert_eq!(emails, vec!["a@example.com", "b@example.com"]);
    }
}
