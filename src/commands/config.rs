//! Open `wavr.toml` in the user's editor.
//!
//! The default template is written first when the file is missing, so the
//! editor always opens a documented config.

use crate::config::get_config_path;
use crate::setup;
use anyhow::anyhow;
use std::process::Command;

const FALLBACK_EDITORS: [&str; 2] = ["nano", "vi"];

/// Opens the wavr configuration file in the user's preferred editor.
///
/// `$VISUAL` wins over `$EDITOR`; both may carry arguments, as in
/// `code --wait`. Without either, nano and then vi are tried.
///
/// # Errors
/// - If the config file cannot be created
/// - If no editor can be found or it exits with an error
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = get_config_path()?;
    setup::ensure_config(&config_path)?;

    let (program, args) = find_editor()?;
    tracing::info!("Opening {} with {}", config_path.display(), program);

    let status = Command::new(&program)
        .args(&args)
        .arg(&config_path)
        .status()
        .map_err(|e| anyhow!("Failed to start editor '{program}': {e}"))?;

    if !status.success() {
        return Err(anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }
    Ok(())
}

fn find_editor() -> anyhow::Result<(String, Vec<String>)> {
    let configured = ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|value| split_editor(&value));
    if let Some(editor) = configured {
        return Ok(editor);
    }

    FALLBACK_EDITORS
        .iter()
        .find(|editor| is_editor_available(editor))
        .map(|editor| (editor.to_string(), Vec::new()))
        .ok_or_else(|| anyhow!("No editor found. Please set the $EDITOR environment variable."))
}

/// Splits an editor variable into program and arguments.
fn split_editor(value: &str) -> Option<(String, Vec<String>)> {
    let mut parts = value.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

fn is_editor_available(editor: &str) -> bool {
    Command::new("which")
        .arg(editor)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
