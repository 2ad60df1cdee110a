// Adapters - External system implementations

pub mod delivery_fs;
pub mod exec_ffmpeg;
pub mod magic_link_outbox;
pub mod mock_engine;
pub mod mock_probe;
pub mod probe_ffprobe;
pub mod session_static;
pub mod source_fs;
pub mod store_json;
pub mod toml_config;
pub mod tracing_log;
pub mod turnstile_http;

// Re-export adapters
pub use delivery_fs::FsDeliveryAdapter;
pub use exec_ffmpeg::{FFmpegAdapter, FFmpegEngineLoader};
pub use magic_link_outbox::MagicLinkOutboxAdapter;
pub use mock_engine::{MockEngineAdapter, MockEngineLoader};
pub use mock_probe::MockProbeAdapter;
pub use probe_ffprobe::FFprobeAdapter;
pub use session_static::StaticSessionAdapter;
pub use source_fs::SourceFetchAdapter;
pub use store_json::{JsonStoreAdapter, MemoryStoreAdapter};
pub use toml_config::{AppConfig, TomlConfigAdapter};
pub use tracing_log::TracingLogAdapter;
pub use turnstile_http::TurnstileAdapter;
