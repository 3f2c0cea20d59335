//! Configuration file management for wavr.
//!
//! The config lives at `~/.config/wavr/wavr.toml`. Its first line carries the
//! `config_version` used by setup; everything else is in the `[render]` table.

use crate::waveform::settings::{DEFAULT_AUTO_WIDTH, DEFAULT_VOLUME_BOOST, DEFAULT_WIDTH};
use crate::waveform::{presets, Reduction, RenderSettings, RenderStyle};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Render defaults applied before command-line overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Preset name, see `wavr presets`
    #[serde(default = "default_preset")]
    pub preset: String,
    /// Drawing style; the preset's style when absent
    #[serde(default)]
    pub style: Option<RenderStyle>,
    /// Sample reduction; the preset's reduction when absent
    #[serde(default)]
    pub reduction: Option<Reduction>,
    /// Let the width grow up to the style maximum
    #[serde(default = "default_auto_width")]
    pub auto_width: bool,
    /// Width limit when `auto_width` is off
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_volume_boost")]
    pub volume_boost: f32,
    /// Dynamic range in dB for decibel-scaled peaks
    #[serde(default)]
    pub decibel_range: Option<f64>,
    /// Output directory; next to the input file when absent
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_preset() -> String {
    presets::DEFAULT_PRESET.to_string()
}

fn default_auto_width() -> bool {
    DEFAULT_AUTO_WIDTH
}

fn default_width() -> i32 {
    DEFAULT_WIDTH
}

fn default_volume_boost() -> f32 {
    DEFAULT_VOLUME_BOOST
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            style: None,
            reduction: None,
            auto_width: default_auto_width(),
            width: default_width(),
            volume_boost: default_volume_boost(),
            decibel_range: None,
            output_dir: None,
        }
    }
}

impl RenderConfig {
    /// Copies the size and volume values onto `settings` through its clamping setters.
    pub fn apply(&self, settings: &mut RenderSettings) {
        settings.set_auto_width(self.auto_width);
        settings.set_width(self.width);
        settings.set_volume_boost(self.volume_boost);
    }

    /// Output directory with a leading `~` expanded.
    pub fn output_dir(&self) -> Option<PathBuf> {
        self.output_dir.as_deref().map(expand_home)
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WavrConfig {
    #[serde(default)]
    pub render: RenderConfig,
}

impl WavrConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the file cannot be read or the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    /// Loads configuration from `path`; a missing file yields the defaults.
    ///
    /// # Errors
    /// - If the file cannot be read or the TOML is malformed
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config {}: {e}", path.display()))?;
        let config: WavrConfig = toml::from_str(&content)
            .map_err(|e| anyhow!("Invalid config {}: {e}", path.display()))?;
        Ok(config)
    }
}

/// Directory holding `wavr.toml`.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("wavr"))
}

/// Path of the config file. The file itself may not exist yet.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    Ok(get_config_dir()?.join("wavr.toml"))
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}
