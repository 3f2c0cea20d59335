//! Application command handlers for wavr.
//!
//! Each submodule handles one command.
//!
//! # Commands
//! - `render`: Render an audio file to PNG (default)
//! - `interactive`: Prompt for preset, style and reduction, then render
//! - `presets`: List the built-in presets
//! - `config`: Open configuration file in user's preferred editor
//! - `logs`: Display recent log entries

pub mod config;
pub mod interactive;
pub mod logs;
pub mod presets;
pub mod render;

pub use config::handle_config;
pub use interactive::handle_interactive;
pub use logs::handle_logs;
pub use presets::handle_presets;
pub use render::{handle_render, RenderRequest};
