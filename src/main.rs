//! TrimDesk CLI
//!
//! Arrange clips on a timeline, then preview or export a stream-copy trim of
//! the active source through ffmpeg.
//!
//! # Usage
//!
//! ```bash
//! trimdesk timeline add --source holiday.mp4
//! trimdesk preview --start 00:00:02 --end 00:00:04
//! trimdesk export --start 2 --end 4 --title "Holiday cut"
//! trimdesk --user u1 save --title "Holiday cut" --start 2 --end 4
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use trimdesk::adapters::toml_config::LoggingConfig;
use trimdesk::app::container::DefaultAppContainer;
use trimdesk::cli::{commands, Cli};
use trimdesk::config_initialization::initialize_configuration_hierarchy;

/// Main entry point for the TrimDesk CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = initialize_configuration_hierarchy(&cli)?;
    init_logging(&config.logging);

    info!("Starting TrimDesk");
    let container = DefaultAppContainer::new(&config)?;
    commands::run(cli.command, &container, &config).await
}

/// RUST_LOG, when set, takes precedence over the configured level
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
