//! Configuration management for wavr.
//!
//! Loads render defaults from a TOML file in the user's config directory.

pub mod file;

pub use file::{get_config_dir, get_config_path, RenderConfig, WavrConfig};
