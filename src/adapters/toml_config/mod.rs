// TOML config adapter - Layered configuration from file and environment

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::adapters::turnstile_http::DEFAULT_VERIFY_URL;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::AccessPolicy;
use crate::ports::EngineSource;

/// File looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "trimdesk.toml";

/// Environment variables consulted, with the prefix
pub const ENV_PREFIX: &str = "TRIMDESK_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// ffmpeg binary
    pub core_url: String,
    pub wasm_url: String,
    /// ffprobe binary used for media inspection
    pub probe_binary: String,
    /// Parent directory for the engine scratch space; system temp when unset
    pub scratch_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            core_url: "ffmpeg".to_string(),
            wasm_url: String::new(),
            probe_binary: "ffprobe".to_string(),
            scratch_dir: None,
        }
    }
}

impl EngineConfig {
    pub fn source(&self) -> EngineSource {
        EngineSource {
            core_url: self.core_url.clone(),
            wasm_url: self.wasm_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub preview_dir: PathBuf,
    pub output_dir: PathBuf,
    pub store_path: PathBuf,
    pub outbox_path: PathBuf,
    /// Timeline snapshot used between CLI invocations
    pub timeline_path: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let data = PathBuf::from(".trimdesk");
        Self {
            preview_dir: data.join("previews"),
            output_dir: PathBuf::from("."),
            store_path: data.join("videos.json"),
            outbox_path: data.join("outbox.jsonl"),
            timeline_path: data.join("timeline.json"),
        }
    }
}

/// Identity reported by the static session gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Role,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_id: None,
            name: None,
            email: None,
            role: Role::User,
        }
    }
}

impl SessionConfig {
    /// `None` unless a non-empty user id is configured
    pub fn user(&self) -> Option<SessionUser> {
        let id = self.user_id.as_deref().map(str::trim).filter(|id| !id.is_empty())?;
        Some(SessionUser {
            id: id.to_string(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    pub endpoint: String,
    pub secret: String,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_VERIFY_URL.to_string(),
            secret: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub paths: PathsConfig,
    pub session: SessionConfig,
    pub verification: VerificationConfig,
    pub access: AccessPolicy,
    pub logging: LoggingConfig,
    /// Use the in-memory engine instead of ffmpeg
    pub dry_run: bool,
}

/// Loads [`AppConfig`] as defaults, then file, then environment
pub struct TomlConfigAdapter {
    config_file: Option<PathBuf>,
}

impl TomlConfigAdapter {
    /// `config_file` must exist when given; otherwise `trimdesk.toml` is used if present
    pub fn new(config_file: Option<PathBuf>) -> Self {
        Self { config_file }
    }

    pub fn load(&self) -> Result<AppConfig, DomainError> {
        let mut config = match self.resolve_file()? {
            Some(path) => {
                tracing::info!(file = %path.display(), "loading configuration");
                Self::from_file(&path)?
            }
            None => AppConfig::default(),
        };

        apply_env(&mut config, |key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn resolve_file(&self) -> Result<Option<PathBuf>, DomainError> {
        match &self.config_file {
            Some(path) if path.exists() => Ok(Some(path.clone())),
            Some(path) => Err(DomainError::Config(format!(
                "Config file does not exist: {}",
                path.display()
            ))),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                Ok(fallback.exists().then_some(fallback))
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<AppConfig, DomainError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DomainError::Config(format!("Failed to read config file: {}", e)))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<AppConfig, DomainError> {
        toml::from_str(content)
            .map_err(|e| DomainError::Config(format!("Failed to parse TOML config: {}", e)))
    }
}

/// Overlay `TRIMDESK_*` variables read through `lookup`
pub fn apply_env<F>(config: &mut AppConfig, lookup: F) -> Result<(), DomainError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

    if let Some(level) = var("LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("LOG_JSON") {
        config.logging.json = parse_bool("LOG_JSON", &json)?;
    }
    if let Some(dry_run) = var("DRY_RUN") {
        config.dry_run = parse_bool("DRY_RUN", &dry_run)?;
    }
    if let Some(ffmpeg) = var("FFMPEG") {
        config.engine.core_url = ffmpeg;
    }
    if let Some(ffprobe) = var("FFPROBE") {
        config.engine.probe_binary = ffprobe;
    }
    if let Some(dir) = var("SCRATCH_DIR") {
        config.engine.scratch_dir = Some(PathBuf::from(dir));
    }
    if let Some(dir) = var("PREVIEW_DIR") {
        config.paths.preview_dir = PathBuf::from(dir);
    }
    if let Some(dir) = var("OUTPUT_DIR") {
        config.paths.output_dir = PathBuf::from(dir);
    }
    if let Some(path) = var("STORE") {
        config.paths.store_path = PathBuf::from(path);
    }
    if let Some(path) = var("OUTBOX") {
        config.paths.outbox_path = PathBuf::from(path);
    }
    if let Some(path) = var("TIMELINE") {
        config.paths.timeline_path = PathBuf::from(path);
    }
    if let Some(id) = var("USER_ID") {
        config.session.user_id = Some(id);
    }
    if let Some(name) = var("USER_NAME") {
        config.session.name = Some(name);
    }
    if let Some(email) = var("USER_EMAIL") {
        config.session.email = Some(email);
    }
    if let Some(role) = var("USER_ROLE") {
        config.session.role = role
            .parse()
            .map_err(|e: DomainError| DomainError::Config(format!("{}USER_ROLE: {}", ENV_PREFIX, e)))?;
    }
    if let Some(endpoint) = var("TURNSTILE_URL") {
        config.verification.endpoint = endpoint;
    }
    if let Some(secret) = var("TURNSTILE_SECRET").or_else(|| lookup("TURNSTILE_SECRET_KEY")) {
        config.verification.secret = secret;
    }
    Ok(())
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, DomainError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(DomainError::Config(format!(
            "Invalid boolean value for {}{}: {}",
            ENV_PREFIX, name, other
        ))),
    }
}
