//! Render orchestration: sizing, per-channel passes and the result.

use super::calculators::SampleCalculator;
use super::canvas::RasterCanvas;
use super::error::RenderError;
use super::rasterizer::{Channel, ChannelRasterizer, Reduction, RenderStyle};
use super::settings::{RenderSettings, ResolvedGeometry};
use crate::audio::SampleSource;
use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Images produced by one render.
///
/// For a mono source both images are the same allocation.
#[derive(Debug, Clone)]
pub struct RenderResult {
    left: Arc<RasterCanvas>,
    right: Arc<RasterCanvas>,
    channels: u16,
    sample_count: u64,
    geometry: ResolvedGeometry,
}

impl RenderResult {
    pub fn image_left(&self) -> &Arc<RasterCanvas> {
        &self.left
    }

    pub fn image_right(&self) -> &Arc<RasterCanvas> {
        &self.right
    }

    /// 1 or 2.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Interleaved sample count used for sizing.
    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    pub fn geometry(&self) -> &ResolvedGeometry {
        &self.geometry
    }

    /// Writes the images as PNG files.
    ///
    /// Mono results are written to `path`. Stereo results are written next to
    /// it as `<stem>-left.png` and `<stem>-right.png`.
    ///
    /// # Errors
    /// - If an image cannot be written
    pub fn save_png(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if self.channels == 1 {
            self.left.save_png(path)?;
            return Ok(vec![path.to_path_buf()]);
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("Invalid output path: {}", path.display()))?;
        let left = path.with_file_name(format!("{stem}-left.png"));
        let right = path.with_file_name(format!("{stem}-right.png"));
        self.left.save_png(&left)?;
        self.right.save_png(&right)?;
        Ok(vec![left, right])
    }
}

/// Renders `source` as a sine trace reduced with the average calculator.
///
/// # Errors
/// See [`create_with`].
pub fn create<S: SampleSource + ?Sized>(source: &mut S, settings: &RenderSettings) -> Result<RenderResult> {
    create_with(
        source,
        RenderStyle::Sine,
        Reduction::Calculator(SampleCalculator::Average),
        settings,
    )
}

/// Renders `source` with the given style and reduction.
///
/// The left channel is always drawn; the right one only for stereo sources.
///
/// # Errors
/// - [`RenderError::UnsupportedChannels`] for anything but mono or stereo
/// - [`RenderError::EmptyStream`] when the source has no samples
/// - [`RenderError::StyleMismatch`] when the reduction cannot drive the style
/// - Any error of the sample source, unchanged
pub fn create_with<S: SampleSource + ?Sized>(
    source: &mut S,
    style: RenderStyle,
    reduction: Reduction,
    settings: &RenderSettings,
) -> Result<RenderResult> {
    let channels = source.channels();
    if !(1..=2).contains(&channels) {
        return Err(RenderError::UnsupportedChannels(channels).into());
    }
    let sample_count = source.sample_count();
    if sample_count == 0 {
        return Err(RenderError::EmptyStream.into());
    }

    tracing::info!(
        "Rendering {} samples, {} channel(s), {} style, {} reduction, preset '{}'",
        sample_count,
        channels,
        style,
        reduction,
        settings.display_name()
    );

    let (mut left, geometry) = settings.create_canvas(sample_count, channels);
    let mut rasterizer = ChannelRasterizer::new(style);
    rasterizer.init(settings, geometry, reduction)?;
    rasterizer.render(Channel::Left, &mut left, source)?;
    let left = Arc::new(left);

    let right = if channels == 2 {
        let (mut right, _) = settings.create_canvas(sample_count, channels);
        rasterizer.render(Channel::Right, &mut right, source)?;
        Arc::new(right)
    } else {
        Arc::clone(&left)
    };

    tracing::info!("Render finished: {}x{}", geometry.width, geometry.height);
    Ok(RenderResult {
        left,
        right,
        channels,
        sample_count,
        geometry,
    })
}

/// Runs [`create_with`] on a blocking worker and awaits its result.
///
/// There are no partial results and no cancellation.
///
/// # Errors
/// - Everything [`create_with`] returns
/// - If the worker task panics
pub async fn create_async<S>(
    mut source: S,
    style: RenderStyle,
    reduction: Reduction,
    settings: RenderSettings,
) -> Result<RenderResult>
where
    S: SampleSource + Send + 'static,
{
    tokio::task::spawn_blocking(move || create_with(&mut source, style, reduction, &settings))
        .await
        .map_err(|e| anyhow!("Render task failed: {e}"))?
}
