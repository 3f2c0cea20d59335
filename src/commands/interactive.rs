//! Prompt-driven render session.
//!
//! Walks through preset, style, reduction, width and volume boost, renders on
//! a blocking worker behind a spinner, and offers to go again with other
//! choices.

use super::render::{RenderPlan, RenderRequest};
use crate::audio::AudioFile;
use crate::config::WavrConfig;
use crate::waveform::{self, presets, Reduction, RenderStyle};
use crate::waveform::settings::{MAX_VOLUME_BOOST, MAX_WIDTH, MIN_VOLUME_BOOST, MIN_WIDTH};
use anyhow::anyhow;
use cliclack::{confirm, input, intro, log, note, outro, select, spinner};
use console::style;
use std::path::PathBuf;

/// Runs the interactive session for `file`.
///
/// # Errors
/// - If a prompt is cancelled
/// - If the config cannot be loaded
/// - If a render fails
pub async fn handle_interactive(file: PathBuf) -> anyhow::Result<()> {
    tracing::info!("=== wavr Interactive Session ===");

    ctrlc::set_handler(move || {}).map_err(|e| anyhow!("Failed to set Ctrl-C handler: {e}"))?;

    if !file.exists() {
        return Err(anyhow!("Audio file not found: {}", file.display()));
    }
    let config = WavrConfig::load()?;

    intro(style(" wavr ").on_white().black())?;
    note("input", file.display())?;

    let mut request = RenderRequest {
        file,
        preset: Some(config.render.preset.clone()),
        ..RenderRequest::default()
    };

    loop {
        prompt_request(&mut request)?;
        let plan = RenderPlan::resolve(&request, &config.render)?;

        let mut progress = spinner();
        progress.start(format!(
            "Rendering {} ({} / {})",
            plan.settings.display_name(),
            plan.style,
            plan.reduction.label()
        ));

        let source = AudioFile::open(&request.file)?;
        let rendered = waveform::create_async(source, plan.style, plan.reduction, plan.settings.clone())
            .await
            .and_then(|result| {
                let paths = result.save_png(&plan.output)?;
                Ok((result, paths))
            });

        match rendered {
            Ok((result, paths)) => {
                let geometry = result.geometry();
                progress.stop(format!("Rendered {}x{}", geometry.width, geometry.height));
                let written: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
                note("written", written.join("\n"))?;
            }
            Err(e) => {
                progress.stop("Render failed");
                log::error(format!("{e:#}"))?;
                tracing::error!("Interactive render failed: {e}");
            }
        }

        let again: bool = confirm("Render again with other settings?")
            .initial_value(false)
            .interact()?;
        if !again {
            break;
        }
    }

    outro("Done")?;
    Ok(())
}

/// Fills `request` from prompts, starting from its current values.
fn prompt_request(request: &mut RenderRequest) -> anyhow::Result<()> {
    let current = request.preset.as_deref().unwrap_or(presets::DEFAULT_PRESET);
    let mut preset_prompt = select("Preset:");
    for preset in presets::all() {
        preset_prompt = preset_prompt.item(preset.name.to_string(), preset.name, preset.description);
    }
    let preset_name: String = preset_prompt
        .initial_value(current.to_string())
        .interact()
        .map_err(|e| anyhow!("Selection cancelled: {e}"))?;
    let preset = presets::find(&preset_name)?;

    let mut style_prompt = select("Style:");
    for render_style in RenderStyle::ALL {
        let hint = if render_style == preset.style { "preset" } else { "" };
        style_prompt = style_prompt.item(render_style, render_style.display_name(), hint);
    }
    let render_style: RenderStyle = style_prompt
        .initial_value(preset.style)
        .interact()
        .map_err(|e| anyhow!("Selection cancelled: {e}"))?;

    let suggested = if render_style == preset.style {
        preset.reduction
    } else {
        render_style.default_reduction()
    };
    let mut reduction_prompt = select("Reduction:");
    for name in Reduction::NAMES {
        let reduction: Reduction = name.parse()?;
        if render_style.accepts(&reduction) {
            reduction_prompt = reduction_prompt.item(name, reduction.label(), "");
        }
    }
    let reduction_name: &str = reduction_prompt
        .initial_value(suggested.name())
        .interact()
        .map_err(|e| anyhow!("Selection cancelled: {e}"))?;

    let width: String = input(format!("Maximum width ({MIN_WIDTH}-{MAX_WIDTH}, empty for auto):"))
        .required(false)
        .validate(|value: &String| {
            if value.trim().is_empty() || value.trim().parse::<i32>().is_ok() {
                Ok(())
            } else {
                Err("Enter a whole number")
            }
        })
        .interact()
        .map_err(|e| anyhow!("Input cancelled: {e}"))?;

    let boost: f32 = input(format!("Volume boost ({MIN_VOLUME_BOOST}-{MAX_VOLUME_BOOST}):"))
        .default_input("1.0")
        .interact()
        .map_err(|e| anyhow!("Input cancelled: {e}"))?;

    request.preset = Some(preset_name);
    request.style = Some(render_style);
    request.reduction = Some(reduction_name.parse()?);
    request.width = width.trim().parse().ok();
    request.volume_boost = Some(boost);
    Ok(())
}
