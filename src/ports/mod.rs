// Ports - Interface definitions (contracts)

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::*;
use crate::domain::model::*;

/// Progress relay for engine execution
pub trait ProgressCallback: Send + Sync {
    /// Fractional progress in `0.0..=1.0`
    fn on_progress(&self, fraction: f64);
}

/// What the engine hands back from its filesystem
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePayload {
    Binary(Vec<u8>),
    Text(String),
}

/// Entry in the engine's virtual filesystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Loaded transcoding engine with a private in-memory filesystem
#[async_trait]
pub trait TranscodeEngine: Send + Sync {
    /// Stage bytes under `name`
    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), DomainError>;

    /// Run one command; returns the engine's exit status
    async fn exec(&self, argv: &[String], progress: &dyn ProgressCallback) -> Result<i32, DomainError>;

    /// Retrieve a produced file
    async fn read_file(&self, name: &str) -> Result<EnginePayload, DomainError>;

    /// List a directory of the virtual filesystem
    async fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, DomainError>;

    /// Remove a staged or produced file
    async fn delete_file(&self, name: &str) -> Result<(), DomainError>;
}

/// Where the engine's code lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSource {
    pub core_url: String,
    pub wasm_url: String,
}

/// Expensive, once-per-process engine bootstrap
#[async_trait]
pub trait EngineLoader: Send + Sync {
    async fn load(&self, source: &EngineSource) -> Result<Arc<dyn TranscodeEngine>, DomainError>;
}

/// Fetches the bytes behind a source reference
#[async_trait]
pub trait SourceFetchPort: Send + Sync {
    async fn fetch(&self, source: &SourceRef) -> Result<Vec<u8>, DomainError>;
}

/// Surfaces finished output to the user
#[async_trait]
pub trait DeliveryPort: Send + Sync {
    /// Make bytes locally addressable for a player; returns the URL
    async fn present_preview(&self, bytes: &[u8]) -> Result<String, DomainError>;

    /// Offer bytes as a download named `file_name`; returns where it landed
    async fn offer_download(&self, file_name: &str, bytes: &[u8]) -> Result<String, DomainError>;
}

/// Receives human-readable status lines
pub trait StatusSink: Send + Sync {
    fn status(&self, message: &str);

    /// Orchestrator state transitions, for views that render them
    fn state_changed(&self, _state: OrchestrationState) {}
}

/// Session/identity gateway
#[async_trait]
pub trait SessionPort: Send + Sync {
    /// `None` when the request is unauthenticated
    async fn get_session(&self, context: &RequestContext) -> Result<Option<SessionUser>, DomainError>;
}

/// Saved project storage
#[async_trait]
pub trait PersistencePort: Send + Sync {
    async fn create_saved_video(&self, record: NewSavedVideo) -> Result<SavedVideo, DomainError>;

    /// Records owned by `user_id`, newest first
    async fn list_saved_videos(&self, user_id: &str) -> Result<Vec<SavedVideo>, DomainError>;

    /// Insert or refresh a user by id
    async fn record_user(&self, user: &SessionUser) -> Result<(), DomainError>;

    /// Every known user, in the order first recorded
    async fn list_users(&self) -> Result<Vec<SessionUser>, DomainError>;
}

/// Pixel size of a video stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Container metadata of one media source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaProbe {
    pub size_bytes: u64,
    pub duration_seconds: f64,
    /// First real video stream; `None` for audio-only media
    pub video: Option<Dimensions>,
}

/// Media inspection
#[async_trait]
pub trait ProbePort: Send + Sync {
    async fn probe(&self, source: &SourceRef) -> Result<MediaProbe, DomainError>;
}

/// Answer from the human-verification endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub success: bool,
    #[serde(rename = "error-codes", default)]
    pub error_codes: Vec<String>,
}

/// CAPTCHA-style token verification
#[async_trait]
pub trait HumanVerificationPort: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerificationOutcome, DomainError>;
}

/// Passwordless sign-in link issuer
#[async_trait]
pub trait MagicLinkPort: Send + Sync {
    async fn send_sign_in_link(&self, email: &str) -> Result<(), DomainError>;
}

/// Port for logging and observability
#[async_trait]
pub trait LogPort: Send + Sync {
    async fn info(&self, message: &str);

    async fn warn(&self, message: &str);

    async fn error(&self, message: &str);

    async fn debug(&self, message: &str);
}
