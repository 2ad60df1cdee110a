//! Configuration initialization and hierarchy management

use anyhow::{Context, Result};

use crate::adapters::toml_config::{AppConfig, TomlConfigAdapter};
use crate::cli::Cli;
use crate::domain::model::Role;

/// Build the effective configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<AppConfig> {
    let mut config = TomlConfigAdapter::new(cli.config.clone())
        .load()
        .context("Failed to load configuration")?;
    apply_cli_configuration_overrides(&mut config, cli)?;
    Ok(config)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_configuration_overrides(config: &mut AppConfig, cli: &Cli) -> Result<()> {
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.json_logs {
        config.logging.json = true;
    }
    if cli.dry_run {
        config.dry_run = true;
    }
    if let Some(ffmpeg) = &cli.ffmpeg {
        config.engine.core_url = ffmpeg.clone();
    }
    if let Some(ffprobe) = &cli.ffprobe {
        config.engine.probe_binary = ffprobe.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.paths.output_dir = dir.clone();
    }
    if let Some(store) = &cli.store {
        config.paths.store_path = store.clone();
    }
    if let Some(timeline) = &cli.timeline {
        config.paths.timeline_path = timeline.clone();
    }
    if let Some(user) = &cli.user {
        config.session.user_id = Some(user.clone());
    }
    if let Some(role) = &cli.role {
        config.session.role = role.parse::<Role>().context("Invalid --role")?;
    }
    Ok(())
}
