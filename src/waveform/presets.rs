//! Named settings catalogue.
//!
//! Each preset bundles a settings snapshot with the style and reduction it
//! was designed for. Callers may still override style and reduction.

use super::calculators::SampleCalculator;
use super::canvas::Color;
use super::peaks::{PeakReduction, PeakStrategy};
use super::rasterizer::{Reduction, RenderStyle};
use super::settings::{RenderSettings, SettingsKind, MIN_PIXELS_PER_PEAK, MIN_SPACER_PIXELS};
use anyhow::{anyhow, Result};

pub const DEFAULT_PRESET: &str = "sine";

#[derive(Debug, Clone)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub style: RenderStyle,
    pub reduction: Reduction,
    settings: RenderSettings,
}

impl Preset {
    /// A fresh copy of the preset's settings.
    pub fn settings(&self) -> RenderSettings {
        self.settings.clone()
    }
}

/// Every preset, in display order.
pub fn all() -> Vec<Preset> {
    vec![
        sine(),
        bar(),
        fat_bar("fat-bar-gray", "Fat Bar (Gray)", Color::rgb(52, 52, 52), Color::rgb(154, 154, 154)),
        fat_bar(
            "fat-bar-orange",
            "Fat Bar (Orange)",
            Color::rgb(255, 76, 0),
            Color::rgb(255, 171, 141),
        ),
        block(
            "block-light",
            "Block (Light)",
            [Color::rgb(102, 102, 102), Color::rgb(179, 179, 179), Color::rgb(218, 218, 218)],
        ),
        block(
            "block-dark",
            "Block (Dark)",
            [Color::rgb(52, 52, 52), Color::rgb(154, 154, 154), Color::rgb(204, 204, 204)],
        ),
        block(
            "block-orange",
            "Block (Orange)",
            [Color::rgb(255, 76, 0), Color::rgb(255, 171, 141), Color::rgb(255, 213, 199)],
        ),
        soundcloud(),
    ]
}

/// Looks up a preset by name (case-insensitive).
///
/// # Errors
/// - If no preset has that name
pub fn find(name: &str) -> Result<Preset> {
    all()
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| {
            let names: Vec<&str> = all().iter().map(|p| p.name).collect();
            anyhow!("Unknown preset '{name}'. Available presets: {}", names.join(", "))
        })
}

fn sine() -> Preset {
    let mut settings = RenderSettings::new(SettingsKind::Standard);
    settings.set_display_name("Sine");
    settings.set_height(112);
    settings.set_primary_line_color(Color::RED);
    settings.set_line_thickness(1.0);
    settings.set_center_line_color(Color::BLACK);
    settings.set_step(2.0);
    Preset {
        name: "sine",
        description: "Red trace through the window averages",
        style: RenderStyle::Sine,
        reduction: Reduction::Calculator(SampleCalculator::Average),
        settings,
    }
}

fn bar() -> Preset {
    let mut settings = RenderSettings::new(SettingsKind::Bar);
    settings.set_display_name("Standard Bar");
    settings.set_height(128);
    settings.set_primary_line_color(Color::BLACK);
    settings.set_secondary_line_color(Color::RED);
    settings.set_line_thickness(4.0);
    settings.set_center_line_color(Color::DARK_SLATE_GRAY);
    settings.set_center_line_thickness(1);
    settings.set_step(5.0);
    Preset {
        name: "bar",
        description: "Black and red mirrored bars",
        style: RenderStyle::Bar,
        reduction: Reduction::Calculator(SampleCalculator::Rms),
        settings,
    }
}

fn fat_bar(name: &'static str, display_name: &str, primary: Color, secondary: Color) -> Preset {
    let mut settings = RenderSettings::new(SettingsKind::Bar);
    settings.set_display_name(display_name);
    settings.set_height(172);
    settings.set_line_thickness(7.0);
    settings.set_center_line_thickness(0);
    settings.set_step(8.0);
    settings.set_scale_step(false);
    settings.set_primary_line_color(primary);
    settings.set_secondary_line_color(secondary);
    Preset {
        name,
        description: "Wide touching bars at a fixed step",
        style: RenderStyle::Bar,
        reduction: Reduction::Calculator(SampleCalculator::Rms),
        settings,
    }
}

/// `colors` are primary, secondary and spacer.
fn block(name: &'static str, display_name: &str, colors: [Color; 3]) -> Preset {
    let mut settings = RenderSettings::new(SettingsKind::Block);
    settings.set_display_name(display_name);
    settings.set_pixels_per_peak(4);
    settings.set_spacer_pixels(2);
    settings.set_use_sample_threshold(true);
    settings.set_primary_line_color(colors[0]);
    settings.set_secondary_line_color(colors[1]);
    settings.set_spacer_color(colors[2]);
    Preset {
        name,
        description: "Peak blocks joined by lighter spacers",
        style: RenderStyle::Block,
        reduction: Reduction::Peaks(PeakReduction::new(PeakStrategy::Max)),
        settings,
    }
}

fn soundcloud() -> Preset {
    let mut settings = RenderSettings::new(SettingsKind::SoundCloud);
    settings.set_display_name("SoundCloud");
    settings.set_pixels_per_peak(MIN_PIXELS_PER_PEAK);
    settings.set_spacer_pixels(MIN_SPACER_PIXELS);
    settings.set_use_sample_threshold(true);
    Preset {
        name: "soundcloud",
        description: "Gray gradient peaks",
        style: RenderStyle::Block,
        reduction: Reduction::Peaks(PeakReduction::new(PeakStrategy::Max)),
        settings,
    }
}
