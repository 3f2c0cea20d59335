//! List the built-in presets.

use crate::waveform::presets;
use console::style;

/// Prints every preset with the parameters that set it apart.
pub fn handle_presets() {
    println!();
    for preset in presets::all() {
        let settings = preset.settings();
        println!(
            "  {:<16} {}",
            style(preset.name).bold(),
            style(preset.description).dim()
        );
        println!(
            "  {:<16} style {}, reduction {}, height {}, step {}",
            "",
            preset.style,
            preset.reduction.label(),
            settings.height(),
            settings.step()
        );
    }
    println!();
    println!("Use a preset with `wavr render <FILE> --preset <NAME>`.");
}
