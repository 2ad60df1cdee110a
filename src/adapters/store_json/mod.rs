// JSON store adapter - Saved project persistence

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// On-disk layout of the store
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    users: Vec<SessionUser>,
    #[serde(default)]
    videos: Vec<SavedVideo>,
}

/// Users and saved videos kept in a single JSON document
pub struct JsonStoreAdapter {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonStoreAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<StoreDocument, DomainError> {
        match tokio::fs::read(&self.path).await {
            Ok(content) if content.is_empty() => Ok(StoreDocument::default()),
            Ok(content) => serde_json::from_slice(&content).map_err(|e| {
                DomainError::Storage(format!("{} is not a valid store: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreDocument::default()),
            Err(e) => Err(DomainError::Storage(format!("{}: {}", self.path.display(), e))),
        }
    }

    async fn persist(&self, document: &StoreDocument) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Storage(format!("{}: {}", parent.display(), e)))?;
        }

        let content = serde_json::to_vec_pretty(document)
            .map_err(|e| DomainError::Storage(format!("Failed to encode store: {}", e)))?;
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, content)
            .await
            .map_err(|e| DomainError::Storage(format!("{}: {}", staging.display(), e)))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|e| DomainError::Storage(format!("{}: {}", self.path.display(), e)))
    }
}

#[async_trait]
impl PersistencePort for JsonStoreAdapter {
    async fn create_saved_video(&self, record: NewSavedVideo) -> Result<SavedVideo, DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load().await?;
        let saved = materialize(record);
        document.videos.push(saved.clone());
        self.persist(&document).await?;
        tracing::debug!(id = %saved.id, store = %self.path.display(), "saved video stored");
        Ok(saved)
    }

    async fn list_saved_videos(&self, user_id: &str) -> Result<Vec<SavedVideo>, DomainError> {
        let document = self.load().await?;
        Ok(newest_first(document.videos, user_id))
    }

    async fn record_user(&self, user: &SessionUser) -> Result<(), DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load().await?;
        if upsert_user(&mut document.users, user) {
            self.persist(&document).await?;
        }
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<SessionUser>, DomainError> {
        Ok(self.load().await?.users)
    }
}

/// Process-local store
#[derive(Default)]
pub struct MemoryStoreAdapter {
    records: Mutex<Vec<SavedVideo>>,
    users: Mutex<Vec<SessionUser>>,
    unavailable: bool,
}

impl MemoryStoreAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails, for exercising error paths
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.unavailable {
            return Err(DomainError::Storage("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PersistencePort for MemoryStoreAdapter {
    async fn create_saved_video(&self, record: NewSavedVideo) -> Result<SavedVideo, DomainError> {
        self.check()?;
        let saved = materialize(record);
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(saved.clone());
        Ok(saved)
    }

    async fn list_saved_videos(&self, user_id: &str) -> Result<Vec<SavedVideo>, DomainError> {
        self.check()?;
        let records = self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        Ok(newest_first(records, user_id))
    }

    async fn record_user(&self, user: &SessionUser) -> Result<(), DomainError> {
        self.check()?;
        let mut users = self.users.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        upsert_user(&mut users, user);
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<SessionUser>, DomainError> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }
}

/// Returns whether anything changed
fn upsert_user(users: &mut Vec<SessionUser>, user: &SessionUser) -> bool {
    match users.iter_mut().find(|known| known.id == user.id) {
        Some(known) if known == user => false,
        Some(known) => {
            *known = user.clone();
            true
        }
        None => {
            users.push(user.clone());
            true
        }
    }
}

fn materialize(record: NewSavedVideo) -> SavedVideo {
    SavedVideo {
        id: Uuid::new_v4(),
        title: record.title,
        user_id: record.user_id,
        video_data: record.video_data,
        created_at: Utc::now(),
    }
}

/// Later insertions win ties on equal timestamps
fn newest_first(records: Vec<SavedVideo>, user_id: &str) -> Vec<SavedVideo> {
    let mut owned: Vec<SavedVideo> = records
        .into_iter()
        .rev()
        .filter(|record| record.user_id == user_id)
        .collect();
    owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    owned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, user: &str) -> NewSavedVideo {
        NewSavedVideo {
            title: title.to_string(),
            user_id: user.to_string(),
            video_data: VideoData {
                trim: TrimData { start: 0.0, end: 10.0 },
            },
        }
    }

    #[tokio::test]
    async fn test_json_store_round_trip_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStoreAdapter::new(dir.path().join("data/videos.json"));

        store.create_saved_video(record("First", "u1")).await.unwrap();
        store.create_saved_video(record("Other", "u2")).await.unwrap();
        store.create_saved_video(record("Second", "u1")).await.unwrap();

        let listed = store.list_saved_videos("u1").await.unwrap();
        let titles: Vec<&str> = listed.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(titles, vec!["Second", "First"]);

        let reopened = JsonStoreAdapter::new(dir.path().join("data/videos.json"));
        assert_eq!(reopened.list_saved_videos("u2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_json_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStoreAdapter::new(dir.path().join("none.json"));
        assert!(store.list_saved_videos("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_json_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos.json");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonStoreAdapter::new(&path);
        assert!(matches!(
            store.create_saved_video(record("x", "u1")).await,
            Err(DomainError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_json_store_keeps_users_in_first_seen_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStoreAdapter::new(dir.path().join("videos.json"));
        let mut ada = SessionUser {
            id: "u1".to_string(),
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            role: Role::User,
        };
        let grace = SessionUser {
            id: "u2".to_string(),
            name: Some("Grace".to_string()),
            email: None,
            role: Role::Admin,
        };

        store.record_user(&ada).await.unwrap();
        store.record_user(&grace).await.unwrap();
        ada.role = Role::Admin;
        store.record_user(&ada).await.unwrap();
        store.create_saved_video(record("First", "u1")).await.unwrap();

        let reopened = JsonStoreAdapter::new(dir.path().join("videos.json"));
        let users = reopened.list_users().await.unwrap();
        assert_eq!(users, vec![ada, grace]);
        assert_eq!(reopened.list_saved_videos("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_unavailable() {
        let store = MemoryStoreAdapter::unavailable();
        assert!(store.create_saved_video(record("x", "u1")).await.is_err());
    }
}
