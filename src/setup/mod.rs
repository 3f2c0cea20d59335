//! First-run setup.
//!
//! Writes the default config file when none exists and stamps the config
//! version after an upgrade.

pub mod version;

use std::path::Path;

/// Embedded default configuration template.
const DEFAULT_CONFIG: &str = include_str!("../../environments/wavr.toml");

/// Current application version from Cargo.toml
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Brings the config at `config_path` up to the current version.
///
/// A missing config is created from the template. An older config keeps its
/// content and only gets a new version line.
///
/// # Errors
/// - If the config directory or file cannot be written
pub fn ensure_config(config_path: &Path) -> anyhow::Result<()> {
    match version::check_setup_needed(config_path)? {
        Some(version::SetupReason::Missing) => {
            write_default_config(config_path)?;
            tracing::info!("Created default config at {}", config_path.display());
        }
        Some(version::SetupReason::Outdated(old_version)) => {
            version::update_config_version(config_path)?;
            tracing::info!(
                "Config migrated from version {} to {}",
                old_version,
                CURRENT_VERSION
            );
        }
        None => {
            tracing::debug!("Config version up to date ({})", CURRENT_VERSION);
        }
    }
    Ok(())
}

/// Writes the default template, prefixed with the version line.
///
/// # Errors
/// - If the directory cannot be created or the file cannot be written
pub fn write_default_config(config_path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = config_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let version_line = format!(r#"config_version = "{CURRENT_VERSION}""#);
    std::fs::write(config_path, format!("{version_line}\n{DEFAULT_CONFIG}"))?;
    Ok(())
}
