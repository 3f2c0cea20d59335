//! Non-interactive render of one audio file to PNG.
//!
//! Options are layered: preset, then the `[render]` config table, then
//! command-line flags.

use crate::audio::AudioFile;
use crate::config::{RenderConfig, WavrConfig};
use crate::waveform::{self, presets, Reduction, RenderSettings, RenderStyle};
use anyhow::anyhow;
use std::path::{Path, PathBuf};

/// Command-line overrides for a render.
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    pub file: PathBuf,
    pub output: Option<PathBuf>,
    pub preset: Option<String>,
    pub style: Option<RenderStyle>,
    pub reduction: Option<Reduction>,
    pub width: Option<i32>,
    pub fixed_width: bool,
    pub volume_boost: Option<f32>,
    pub decibel_range: Option<f64>,
}

/// Everything needed to run one render.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    pub style: RenderStyle,
    pub reduction: Reduction,
    pub settings: RenderSettings,
    pub output: PathBuf,
}

impl RenderPlan {
    /// Resolves `request` against the preset and `config`.
    ///
    /// Style and reduction come from the flags, then the config, then the
    /// preset. When the style differs from the preset's, the style's own
    /// default reduction is used instead of the preset's.
    ///
    /// # Errors
    /// - If the preset is unknown
    /// - If the reduction cannot drive the chosen style
    /// - If no output path can be derived from the input file name
    pub fn resolve(request: &RenderRequest, config: &RenderConfig) -> anyhow::Result<Self> {
        let preset_name = request.preset.as_deref().unwrap_or(&config.preset);
        let preset = presets::find(preset_name)?;

        let mut settings = preset.settings();
        config.apply(&mut settings);
        if let Some(width) = request.width {
            settings.set_width(width);
            settings.set_auto_width(false);
        }
        if request.fixed_width {
            settings.set_auto_width(false);
        }
        if let Some(boost) = request.volume_boost {
            settings.set_volume_boost(boost);
        }

        let style = request.style.or(config.style).unwrap_or(preset.style);
        let reduction = match request.reduction.or(config.reduction) {
            Some(reduction) => reduction,
            None if style == preset.style => preset.reduction,
            None => style.default_reduction(),
        }
        .with_decibel_range(request.decibel_range.or(config.decibel_range));

        if !style.accepts(&reduction) {
            return Err(anyhow!(
                "The {style} style cannot be drawn with the {reduction} reduction"
            ));
        }

        let output = match &request.output {
            Some(output) => output.clone(),
            None => default_output(&request.file, config.output_dir().as_deref())?,
        };

        Ok(Self {
            style,
            reduction,
            settings,
            output,
        })
    }
}

/// `<dir>/<stem>.png`, where `dir` is `output_dir` or the input's directory.
///
/// # Errors
/// - If the input path has no file name
pub fn default_output(input: &Path, output_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    let stem = input
        .file_stem()
        .ok_or_else(|| anyhow!("Cannot derive an output name from {}", input.display()))?;
    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    Ok(dir.join(format!("{}.png", stem.to_string_lossy())))
}

/// Renders `request.file` and prints the written image paths to stdout.
///
/// # Errors
/// - If the config cannot be loaded or the options do not resolve
/// - If the audio file cannot be opened or decoded
/// - If the render fails or the images cannot be written
pub fn handle_render(request: RenderRequest) -> anyhow::Result<()> {
    tracing::info!("=== wavr Render Command ===");

    let config = WavrConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {e}");
        anyhow!("Configuration error: {e}")
    })?;
    let plan = RenderPlan::resolve(&request, &config.render)?;

    tracing::info!(
        "Rendering {} with preset '{}' to {}",
        request.file.display(),
        plan.settings.display_name(),
        plan.output.display()
    );

    let mut source = AudioFile::open(&request.file)?;
    let result = waveform::create_with(&mut source, plan.style, plan.reduction, &plan.settings)?;

    if let Some(dir) = plan.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .map_err(|e| anyhow!("Failed to create output directory {}: {e}", dir.display()))?;
    }
    for path in result.save_png(&plan.output)? {
        tracing::info!("Wrote {}", path.display());
        println!("{}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::{PeakStrategy, SampleCalculator};

    fn request() -> RenderRequest {
        RenderRequest {
            file: PathBuf::from("/music/take-1.mp3"),
            ..RenderRequest::default()
        }
    }

    #[test]
    fn test_preset_defaults() {
        let plan = RenderPlan::resolve(&request(), &RenderConfig::default()).unwrap();
        assert_eq!(plan.style, RenderStyle::Sine);
        assert_eq!(plan.reduction, Reduction::Calculator(SampleCalculator::Average));
        assert_eq!(plan.output, PathBuf::from("/music/take-1.png"));
        assert!(plan.settings.auto_width());
    }

    #[test]
    fn test_flags_override_config() {
        let config = RenderConfig {
            preset: "bar".to_string(),
            reduction: Some(Reduction::Calculator(SampleCalculator::Max)),
            volume_boost: 2.0,
            output_dir: Some(PathBuf::from("/tmp/waves")),
            ..RenderConfig::default()
        };
        let mut req = request();
        req.reduction = Some(Reduction::Calculator(SampleCalculator::Min));
        req.width = Some(2000);
        req.volume_boost = Some(3.0);

        let plan = RenderPlan::resolve(&req, &config).unwrap();
        assert_eq!(plan.style, RenderStyle::Bar);
        assert_eq!(plan.reduction, Reduction::Calculator(SampleCalculator::Min));
        assert_eq!(plan.settings.width(), 2000);
        assert!(!plan.settings.auto_width());
        assert_eq!(plan.settings.volume_boost(), 3.0);
        assert_eq!(plan.output, PathBuf::from("/tmp/waves/take-1.png"));
    }

    #[test]
    fn test_style_change_uses_style_default_reduction() {
        let mut req = request();
        req.style = Some(RenderStyle::Block);
        req.decibel_range = Some(36.0);

        let plan = RenderPlan::resolve(&req, &RenderConfig::default()).unwrap();
        match plan.reduction {
            Reduction::Peaks(p) => {
                assert_eq!(p.strategy, PeakStrategy::Max);
                assert_eq!(p.decibel_range, Some(36.0));
            }
            other => panic!("expected a peak reduction, got {other}"),
        }
    }

    #[test]
    fn test_mismatched_reduction_is_rejected() {
        let mut req = request();
        req.preset = Some("block-dark".to_string());
        req.reduction = Some(Reduction::Calculator(SampleCalculator::Rms));
        assert!(RenderPlan::resolve(&req, &RenderConfig::default()).is_err());
    }

    #[test]
    fn test_unknown_preset() {
        let mut req = request();
        req.preset = Some("neon".to_string());
        assert!(RenderPlan::resolve(&req, &RenderConfig::default()).is_err());
    }

    #[test]
    fn test_default_output_relative_input() {
        let output = default_output(Path::new("song.wav"), None).unwrap();
        assert_eq!(output, PathBuf::from("song.png"));
        let output = default_output(Path::new("mix.v2.flac"), None).unwrap();
        assert_eq!(output, PathBuf::from("mix.v2.png"));
    }
}
