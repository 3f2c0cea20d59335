//! Per-channel draw loops.
//!
//! A [`ChannelRasterizer`] is bound to one render with [`ChannelRasterizer::init`]
//! and then draws one channel at a time onto a canvas sized by the settings.
//! Sine and bar styles reduce windows of samples with a [`SampleCalculator`];
//! the block style reduces windows to peaks with a [`PeakReader`].

use super::calculators::SampleCalculator;
use super::canvas::{Canvas, RectF};
use super::error::RenderError;
use super::peaks::{
    PeakChannel, PeakInfo, PeakReader, PeakReduction, PeakStrategy, PeakValue,
    DEFAULT_AVERAGE_SCALE, DEFAULT_RMS_BLOCK_SIZE, DEFAULT_SAMPLE_INTERVAL,
};
use super::settings::{PenType, RenderSettings, ResolvedGeometry};
use crate::audio::{DownmixWeights, MonoDownmix, SampleSource};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scratch buffer size for calculator styles, 2^20 samples.
pub const BUFFER_SIZE: usize = 1 << 20;

const LEFT_DOWNMIX: DownmixWeights = DownmixWeights {
    left: 0.5,
    right: 0.0,
};

const RIGHT_DOWNMIX: DownmixWeights = DownmixWeights {
    left: 0.0,
    right: 1.5,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    /// Connected trace through the reduced values
    Sine,
    /// Mirrored vertical bars per column
    Bar,
    /// Peak blocks with optional spacers
    Block,
}

impl RenderStyle {
    pub const ALL: [RenderStyle; 3] = [Self::Sine, Self::Bar, Self::Block];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Sine => "Sine",
            Self::Bar => "Bar",
            Self::Block => "Block",
        }
    }

    /// Reduction used when none is configured.
    pub fn default_reduction(&self) -> Reduction {
        match self {
            Self::Sine => Reduction::Calculator(SampleCalculator::Average),
            Self::Bar => Reduction::Calculator(SampleCalculator::Rms),
            Self::Block => Reduction::Peaks(PeakReduction::new(PeakStrategy::Max)),
        }
    }

    /// Whether `reduction` can drive this style.
    pub fn accepts(&self, reduction: &Reduction) -> bool {
        matches!(
            (self, reduction),
            (Self::Sine | Self::Bar, Reduction::Calculator(_)) | (Self::Block, Reduction::Peaks(_))
        )
    }
}

impl fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Which channel of the source a pass draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Left,
    Right,
}

impl Channel {
    fn peak_channel(self) -> PeakChannel {
        match self {
            Channel::Left => PeakChannel::Left,
            Channel::Right => PeakChannel::Right,
        }
    }

    fn downmix(self) -> DownmixWeights {
        match self {
            Channel::Left => LEFT_DOWNMIX,
            Channel::Right => RIGHT_DOWNMIX,
        }
    }
}

/// Reduction strategy for a render: a calculator or a peak provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Reduction {
    Calculator(SampleCalculator),
    Peaks(PeakReduction),
}

impl Reduction {
    /// Names accepted by [`FromStr`], calculators first.
    pub const NAMES: [&'static str; 10] = [
        "first",
        "last",
        "average",
        "min",
        "max",
        "rms",
        "peak-max",
        "peak-rms",
        "peak-sampling",
        "peak-average",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Reduction::Calculator(SampleCalculator::First) => "first",
            Reduction::Calculator(SampleCalculator::Last) => "last",
            Reduction::Calculator(SampleCalculator::Average) => "average",
            Reduction::Calculator(SampleCalculator::Min) => "min",
            Reduction::Calculator(SampleCalculator::Max) => "max",
            Reduction::Calculator(SampleCalculator::Rms) => "rms",
            Reduction::Peaks(p) => match p.strategy {
                PeakStrategy::Max => "peak-max",
                PeakStrategy::Rms { .. } => "peak-rms",
                PeakStrategy::Sampling { .. } => "peak-sampling",
                PeakStrategy::Average { .. } => "peak-average",
            },
        }
    }

    /// Human readable label for prompts and listings.
    pub fn label(&self) -> String {
        match self {
            Reduction::Calculator(c) => format!("{c} calculator"),
            Reduction::Peaks(p) => match p.decibel_range {
                Some(range) => format!("{} ({range} dB)", p.strategy.display_name()),
                None => p.strategy.display_name().to_string(),
            },
        }
    }

    /// Applies a decibel range to peak reductions; calculators are unchanged.
    pub fn with_decibel_range(self, range: Option<f64>) -> Self {
        match (self, range) {
            (Reduction::Peaks(p), Some(range)) => Reduction::Peaks(p.with_decibel_range(range)),
            (other, _) => other,
        }
    }
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Reduction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let peaks = |strategy| Ok(Reduction::Peaks(PeakReduction::new(strategy)));
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Reduction::Calculator(SampleCalculator::First)),
            "last" => Ok(Reduction::Calculator(SampleCalculator::Last)),
            "average" => Ok(Reduction::Calculator(SampleCalculator::Average)),
            "min" => Ok(Reduction::Calculator(SampleCalculator::Min)),
            "max" => Ok(Reduction::Calculator(SampleCalculator::Max)),
            "rms" => Ok(Reduction::Calculator(SampleCalculator::Rms)),
            "peak-max" => peaks(PeakStrategy::Max),
            "peak-rms" => peaks(PeakStrategy::rms(DEFAULT_RMS_BLOCK_SIZE)),
            "peak-sampling" => peaks(PeakStrategy::sampling(DEFAULT_SAMPLE_INTERVAL)),
            "peak-average" => peaks(PeakStrategy::average(DEFAULT_AVERAGE_SCALE)),
            other => Err(anyhow!(
                "Unknown reduction '{other}'. Expected one of: {}",
                Self::NAMES.join(", ")
            )),
        }
    }
}

impl TryFrom<String> for Reduction {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Reduction> for String {
    fn from(value: Reduction) -> Self {
        value.name().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RasterizerState {
    Uninitialized,
    Initialized,
    Rendering(Channel),
    Done,
}

/// Everything bound by [`ChannelRasterizer::init`].
#[derive(Debug, Clone)]
struct RenderJob {
    settings: RenderSettings,
    geometry: ResolvedGeometry,
    reduction: Reduction,
}

impl RenderJob {
    /// Vertical offset for a reduced value, gated by the sample threshold.
    fn scaled(&self, value: f32) -> f32 {
        if self.settings.use_sample_threshold() && value.abs() < self.settings.sample_threshold() {
            0.0
        } else {
            value * self.geometry.center_y * self.settings.volume_boost()
        }
    }
}

/// Draws one channel of a source per [`Self::render`] call.
///
/// A rasterizer is not meant to be shared between threads while rendering;
/// each render owns its settings snapshot and scratch buffer.
#[derive(Debug)]
pub struct ChannelRasterizer {
    style: RenderStyle,
    state: RasterizerState,
    job: Option<RenderJob>,
    buffer: Vec<f32>,
}

impl ChannelRasterizer {
    pub fn new(style: RenderStyle) -> Self {
        Self {
            style,
            state: RasterizerState::Uninitialized,
            job: None,
            buffer: Vec::new(),
        }
    }

    pub fn style(&self) -> RenderStyle {
        self.style
    }

    /// Whether the last [`Self::render`] ran to completion.
    pub fn is_done(&self) -> bool {
        self.state == RasterizerState::Done
    }

    /// Binds the settings snapshot, geometry and reduction for the next renders.
    ///
    /// # Errors
    /// - [`RenderError::StyleMismatch`] if the reduction cannot drive this style
    pub fn init(
        &mut self,
        settings: &RenderSettings,
        geometry: ResolvedGeometry,
        reduction: Reduction,
    ) -> Result<&mut Self, RenderError> {
        if !self.style.accepts(&reduction) {
            return Err(RenderError::StyleMismatch {
                style: self.style,
                reduction: reduction.name().to_string(),
            });
        }
        if self.buffer.len() < BUFFER_SIZE && self.style != RenderStyle::Block {
            self.buffer = vec![0.0; BUFFER_SIZE];
        }
        self.job = Some(RenderJob {
            settings: settings.clone(),
            geometry,
            reduction,
        });
        self.state = RasterizerState::Initialized;
        Ok(self)
    }

    /// Draws `channel` of `source` onto `canvas`.
    ///
    /// The source is rewound first, so left and right passes each read the
    /// whole stream. Stereo sources are folded to mono for the sine and bar
    /// styles.
    ///
    /// # Errors
    /// - [`RenderError::NotInitialized`] before [`Self::init`]
    /// - [`RenderError::CanvasMismatch`] if the canvas does not match the geometry
    /// - Any error of the sample source, unchanged
    pub fn render<C, S>(&mut self, channel: Channel, canvas: &mut C, source: &mut S) -> Result<()>
    where
        C: Canvas + ?Sized,
        S: SampleSource + ?Sized,
    {
        let job = match (&self.job, self.state) {
            (Some(job), state) if state != RasterizerState::Uninitialized => job,
            _ => return Err(RenderError::NotInitialized.into()),
        };
        if canvas.width() != job.geometry.width || canvas.height() != job.geometry.height {
            return Err(RenderError::CanvasMismatch {
                expected_width: job.geometry.width,
                expected_height: job.geometry.height,
                actual_width: canvas.width(),
                actual_height: canvas.height(),
            }
            .into());
        }

        self.state = RasterizerState::Rendering(channel);
        tracing::debug!("Rendering {:?} channel, {} style", channel, self.style);

        let (width, height) = (canvas.width() as f32, canvas.height() as f32);
        canvas.fill_rectangle(
            &job.settings.background_brush(),
            RectF::new(0.0, 0.0, width, height),
        );
        source.seek_start()?;

        match (self.style, job.reduction) {
            (RenderStyle::Block, Reduction::Peaks(reduction)) => {
                draw_blocks(job, reduction, channel, canvas, source)?;
            }
            (style, Reduction::Calculator(calculator)) => {
                if source.channels() == 2 {
                    let mut mono = MonoDownmix::new(source, channel.downmix());
                    draw_calculated(job, style, calculator, &mut self.buffer, canvas, &mut mono)?;
                } else {
                    draw_calculated(job, style, calculator, &mut self.buffer, canvas, source)?;
                }
            }
            (style, reduction) => {
                return Err(RenderError::StyleMismatch {
                    style,
                    reduction: reduction.name().to_string(),
                }
                .into());
            }
        }

        draw_center_line(job, canvas);
        if let RasterizerState::Rendering(channel) = self.state {
            tracing::debug!("{:?} channel done", channel);
        }
        self.state = RasterizerState::Done;
        Ok(())
    }
}

/// Fills `buffer` from `source`, stopping early only when the source is exhausted.
fn fill<S: SampleSource + ?Sized>(source: &mut S, buffer: &mut [f32]) -> Result<usize> {
    let mut read = 0;
    while read < buffer.len() {
        let count = source.read(&mut buffer[read..])?;
        if count == 0 {
            break;
        }
        read += count;
    }
    Ok(read)
}

fn draw_calculated<C, S>(
    job: &RenderJob,
    style: RenderStyle,
    calculator: SampleCalculator,
    buffer: &mut Vec<f32>,
    canvas: &mut C,
    source: &mut S,
) -> Result<()>
where
    C: Canvas + ?Sized,
    S: SampleSource + ?Sized,
{
    let resolution = job.geometry.sample_resolution.max(1);
    // Whole windows per read so no window straddles two reads.
    let chunk = if resolution >= BUFFER_SIZE {
        resolution
    } else {
        BUFFER_SIZE / resolution * resolution
    };
    if buffer.len() < chunk {
        buffer.resize(chunk, 0.0);
    }

    let primary = job.settings.pen(PenType::PrimaryLine, &job.geometry);
    let secondary = job.settings.pen(PenType::SecondaryLine, &job.geometry);
    let center = job.geometry.center_y;
    let bottom = center + job.geometry.center_line_thickness as f32;
    let max_x = job.geometry.width as f32;
    let step = job.geometry.step;

    let mut x = 0.0f32;
    let mut previous: Option<(f32, f32)> = None;

    loop {
        let window = &mut buffer[..chunk];
        window.fill(0.0);
        let count = fill(source, window)?;
        if count == 0 {
            break;
        }

        for start in (0..count).step_by(resolution) {
            if x >= max_x {
                return Ok(());
            }
            let value = job.scaled(calculator.calculate(window, start, start + resolution));
            match style {
                RenderStyle::Sine => {
                    let y = center - value;
                    if let Some((px, py)) = previous {
                        canvas.draw_line(&primary, px, py, x, y);
                    }
                    previous = Some((x, y));
                }
                RenderStyle::Bar | RenderStyle::Block => {
                    let magnitude = value.abs();
                    canvas.draw_line(&primary, x, center, x, center - magnitude);
                    canvas.draw_line(&secondary, x, bottom, x, bottom + magnitude);
                }
            }
            x += step;
        }

        if count < chunk {
            break;
        }
    }
    Ok(())
}

fn draw_blocks<C, S>(
    job: &RenderJob,
    reduction: PeakReduction,
    channel: Channel,
    canvas: &mut C,
    source: &mut S,
) -> Result<()>
where
    C: Canvas + ?Sized,
    S: SampleSource + ?Sized,
{
    let settings = &job.settings;
    let geometry = &job.geometry;
    let pixels_per_peak = settings.pixels_per_peak().max(1) as u32;
    let spacer_pixels = settings.spacer_pixels().max(0) as u32;
    let columns_per_peak = (pixels_per_peak + spacer_pixels) as usize;

    let mut reader = PeakReader::new(reduction);
    reader.init(source.channels(), geometry.sample_resolution * columns_per_peak);

    let primary = settings.pen(PenType::PrimaryLine, geometry);
    let secondary = settings.pen(PenType::SecondaryLine, geometry);
    let spacer = settings.pen(PenType::Spacer, geometry);

    let top = geometry.center_y;
    let bottom = top + geometry.center_line_thickness as f32;
    let half = geometry.center_y * settings.volume_boost();
    let step = geometry.step.max(1.0) as u32;
    let width = geometry.width;
    let peak_channel = channel.peak_channel();

    let next_thresholded = |reader: &mut PeakReader, source: &mut S| -> Result<PeakInfo> {
        let mut peak = reader.next_peak(source)?;
        if settings.use_sample_threshold() {
            peak.apply_noise_threshold(settings.sample_threshold());
        }
        Ok(peak)
    };

    let mut current = next_thresholded(&mut reader, source)?;
    if reader.last_frames() == 0 {
        return Ok(());
    }

    let mut x = 0u32;
    while x < width {
        let next = next_thresholded(&mut reader, source)?;
        let exhausted = reader.last_frames() == 0;

        let max = current.get(peak_channel, PeakValue::Max);
        let min = current.get(peak_channel, PeakValue::Min);
        for _ in 0..pixels_per_peak * step {
            if x >= width {
                return Ok(());
            }
            let column = x as f32;
            canvas.draw_line(&primary, column, top, column, top - half * max);
            canvas.draw_line(&secondary, column, bottom, column, bottom - half * min);
            x += 1;
        }

        if spacer_pixels > 0 {
            let max = max.min(next.get(peak_channel, PeakValue::Max));
            let min = min.max(next.get(peak_channel, PeakValue::Min));
            for _ in 0..spacer_pixels * step {
                if x >= width {
                    return Ok(());
                }
                let column = x as f32;
                canvas.draw_line(&spacer, column, top, column, top - half * max);
                canvas.draw_line(&spacer, column, bottom, column, bottom - half * min);
                x += 1;
            }
        }

        if exhausted {
            break;
        }
        current = next;
    }
    Ok(())
}

fn draw_center_line<C: Canvas + ?Sized>(job: &RenderJob, canvas: &mut C) {
    let thickness = job.geometry.center_line_thickness;
    if thickness == 0 {
        return;
    }
    // The pen stamp covers rows center_y..center_y + thickness.
    let y = job.geometry.center_y + (thickness / 2) as f32;
    let pen = job.settings.pen(PenType::CenterLine, &job.geometry);
    canvas.draw_line(&pen, 0.0, y, canvas.width() as f32, y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MemorySource;
    use crate::waveform::canvas::{Brush, Color, Pen, RasterCanvas};
    use crate::waveform::settings::SettingsKind;

    /// Canvas that records draw calls instead of rasterizing them.
    struct RecordingCanvas {
        width: u32,
        height: u32,
        lines: Vec<(Color, f32, f32, f32, f32)>,
        fills: usize,
    }

    impl RecordingCanvas {
        fn for_geometry(geometry: &ResolvedGeometry) -> Self {
            Self {
                width: geometry.width,
                height: geometry.height,
                lines: Vec::new(),
                fills: 0,
            }
        }

        fn lines_with(&self, color: Color) -> Vec<(f32, f32, f32, f32)> {
            self.lines
                .iter()
                .filter(|l| l.0 == color)
                .map(|l| (l.1, l.2, l.3, l.4))
                .collect()
        }
    }

    impl Canvas for RecordingCanvas {
        fn width(&self) -> u32 {
            self.width
        }

        fn height(&self) -> u32 {
            self.height
        }

        fn fill_rectangle(&mut self, _brush: &Brush, _rect: RectF) {
            self.fills += 1;
        }

        fn draw_line(&mut self, pen: &Pen, x1: f32, y1: f32, x2: f32, y2: f32) {
            self.lines.push((pen.paint.color_at(y1), x1, y1, x2, y2));
        }

        fn make_transparent(&mut self) {}
    }

    fn constant(value: f32, frames: usize) -> MemorySource {
        MemorySource::new(vec![value; frames], 1, 44_100)
    }

    #[test]
    fn test_render_before_init_fails() {
        let settings = RenderSettings::default();
        let geometry = settings.resolve(100, 1);
        let mut canvas = RecordingCanvas::for_geometry(&geometry);
        let mut rasterizer = ChannelRasterizer::new(RenderStyle::Sine);

        let err = rasterizer
            .render(Channel::Left, &mut canvas, &mut constant(0.5, 100))
            .unwrap_err();
        assert_eq!(err.downcast_ref::<RenderError>(), Some(&RenderError::NotInitialized));
    }

    #[test]
    fn test_style_mismatch_is_rejected() {
        let settings = RenderSettings::default();
        let geometry = settings.resolve(100, 1);

        let mut block = ChannelRasterizer::new(RenderStyle::Block);
        let result = block.init(
            &settings,
            geometry,
            Reduction::Calculator(SampleCalculator::Average),
        );
        assert!(matches!(result, Err(RenderError::StyleMismatch { .. })));

        let mut sine = ChannelRasterizer::new(RenderStyle::Sine);
        let result = sine.init(&settings, geometry, RenderStyle::Block.default_reduction());
        assert!(matches!(result, Err(RenderError::StyleMismatch { .. })));
    }

    #[test]
    fn test_canvas_mismatch_is_rejected() {
        let settings = RenderSettings::default();
        let geometry = settings.resolve(1000, 1);
        let mut canvas = RasterCanvas::new(geometry.width + 1, geometry.height);
        let mut rasterizer = ChannelRasterizer::new(RenderStyle::Sine);
        rasterizer
            .init(&settings, geometry, RenderStyle::Sine.default_reduction())
            .unwrap();

        let err = rasterizer
            .render(Channel::Left, &mut canvas, &mut constant(0.5, 1000))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RenderError>(),
            Some(RenderError::CanvasMismatch { .. })
        ));
    }

    #[test]
    fn test_sine_follows_constant_signal() {
        let mut settings = RenderSettings::default();
        settings.set_primary_line_color(Color::RED);
        let geometry = settings.resolve(800, 1);
        let mut canvas = RecordingCanvas::for_geometry(&geometry);

        let mut rasterizer = ChannelRasterizer::new(RenderStyle::Sine);
        rasterizer
            .init(&settings, geometry, Reduction::Calculator(SampleCalculator::Average))
            .unwrap()
            .render(Channel::Left, &mut canvas, &mut constant(0.5, 800))
            .unwrap();
        assert!(rasterizer.is_done());
        assert_eq!(canvas.fills, 1);

        let lines = canvas.lines_with(Color::RED);
        // 800 frames at resolution 8 are 100 points, joined by 99 segments.
        assert_eq!(lines.len(), 99);
        let expected_y = geometry.center_y - 0.5 * geometry.center_y;
        for (x1, y1, x2, y2) in &lines {
            assert_eq!(*y1, expected_y);
            assert_eq!(*y2, expected_y);
            assert_eq!(x2 - x1, geometry.step);
        }
    }

    #[test]
    fn test_partial_window_past_width_is_not_drawn() {
        let mut settings = RenderSettings::default();
        settings.set_primary_line_color(Color::RED);
        // 100 whole windows fill the width; the trailing 4 frames would land on x == width.
        let geometry = settings.resolve(804, 1);
        let mut canvas = RecordingCanvas::for_geometry(&geometry);

        let mut rasterizer = ChannelRasterizer::new(RenderStyle::Sine);
        rasterizer
            .init(&settings, geometry, Reduction::Calculator(SampleCalculator::Average))
            .unwrap()
            .render(Channel::Left, &mut canvas, &mut constant(0.5, 804))
            .unwrap();

        let lines = canvas.lines_with(Color::RED);
        assert_eq!(lines.len(), 99);
        assert!(lines.iter().all(|(_, _, x2, _)| *x2 < geometry.width as f32));
    }

    #[test]
    fn test_sample_threshold_gates_quiet_values() {
        let mut settings = RenderSettings::default();
        settings.set_primary_line_color(Color::RED);
        settings.set_use_sample_threshold(true);
        settings.set_sample_threshold(0.01);
        let geometry = settings.resolve(80, 1);
        let mut canvas = RecordingCanvas::for_geometry(&geometry);

        let mut rasterizer = ChannelRasterizer::new(RenderStyle::Sine);
        rasterizer
            .init(&settings, geometry, Reduction::Calculator(SampleCalculator::Average))
            .unwrap()
            .render(Channel::Left, &mut canvas, &mut constant(0.005, 80))
            .unwrap();

        for (_, y1, _, y2) in canvas.lines_with(Color::RED) {
            assert_eq!(y1, geometry.center_y);
            assert_eq!(y2, geometry.center_y);
        }
    }

    #[test]
    fn test_bar_draws_mirrored_columns() {
        let mut settings = RenderSettings::new(SettingsKind::Bar);
        settings.set_primary_line_color(Color::RED);
        settings.set_secondary_line_color(Color::BLUE);
        settings.set_center_line_thickness(2);
        let geometry = settings.resolve(160, 1);
        let mut canvas = RecordingCanvas::for_geometry(&geometry);

        let mut rasterizer = ChannelRasterizer::new(RenderStyle::Bar);
        rasterizer
            .init(&settings, geometry, Reduction::Calculator(SampleCalculator::Max))
            .unwrap()
            .render(Channel::Left, &mut canvas, &mut constant(-0.25, 160))
            .unwrap();

        let top = canvas.lines_with(Color::RED);
        let bottom = canvas.lines_with(Color::BLUE);
        assert_eq!(top.len(), 20);
        assert_eq!(bottom.len(), 20);

        let magnitude = 0.25 * geometry.center_y;
        let c = geometry.center_y;
        let ct = geometry.center_line_thickness as f32;
        assert_eq!(top[0], (0.0, c, 0.0, c - magnitude));
        assert_eq!(bottom[0], (0.0, c + ct, 0.0, c + ct + magnitude));
    }

    #[test]
    fn test_stereo_channels_are_downmixed() {
        let mut settings = RenderSettings::default();
        settings.set_primary_line_color(Color::RED);
        let mut source = MemorySource::from_channels(&[vec![0.5; 80], vec![0.2; 80]], 44_100);
        let geometry = settings.resolve(source.sample_count(), 2);

        let mut rasterizer = ChannelRasterizer::new(RenderStyle::Sine);
        rasterizer
            .init(&settings, geometry, Reduction::Calculator(SampleCalculator::Average))
            .unwrap();

        let mut left = RecordingCanvas::for_geometry(&geometry);
        rasterizer.render(Channel::Left, &mut left, &mut source).unwrap();
        let mut right = RecordingCanvas::for_geometry(&geometry);
        rasterizer.render(Channel::Right, &mut right, &mut source).unwrap();

        let c = geometry.center_y;
        let left_y = left.lines_with(Color::RED)[0].1;
        let right_y = right.lines_with(Color::RED)[0].1;
        assert!((left_y - (c - 0.25 * c)).abs() < 1e-3);
        assert!((right_y - (c - 0.3 * c)).abs() < 1e-3);
    }

    #[test]
    fn test_block_draws_peaks_and_spacers() {
        let mut settings = RenderSettings::new(SettingsKind::Block);
        settings.set_primary_line_color(Color::RED);
        settings.set_secondary_line_color(Color::BLUE);
        settings.set_spacer_color(Color::YELLOW);
        settings.set_pixels_per_peak(4);
        settings.set_spacer_pixels(2);
        settings.set_center_line_thickness(0);
        settings.set_sample_resolution(2);

        // Two peak windows of 2 * (4 + 2) frames each.
        let mut samples: Vec<f32> = [0.5, -0.5].repeat(6);
        samples.extend([0.25, -0.25].repeat(6));
        let mut source = MemorySource::new(samples, 1, 44_100);
        let geometry = settings.resolve(source.sample_count(), 1);
        let mut canvas = RasterCanvas::new(geometry.width, geometry.height);

        let mut rasterizer = ChannelRasterizer::new(RenderStyle::Block);
        rasterizer
            .init(&settings, geometry, RenderStyle::Block.default_reduction())
            .unwrap()
            .render(Channel::Left, &mut canvas, &mut source)
            .unwrap();

        let c = geometry.center_y as u32;
        // First peak columns reach half the upper half.
        assert_eq!(canvas.pixel(0, c - c / 2), Color::RED);
        assert_eq!(canvas.pixel(0, c - c / 2 - 2), Color::TRANSPARENT);
        // Spacer columns use the overlap with the next, quieter peak.
        assert_eq!(canvas.pixel(4, c - c / 4), Color::YELLOW);
        assert_eq!(canvas.pixel(4, c - c / 2), Color::TRANSPARENT);
    }

    #[test]
    fn test_center_line_covers_its_rows() {
        let mut settings = RenderSettings::default();
        settings.set_center_line_color(Color::BLACK);
        settings.set_center_line_thickness(2);
        settings.set_primary_line_color(Color::TRANSPARENT);
        let geometry = settings.resolve(800, 1);
        let mut canvas = RasterCanvas::new(geometry.width, geometry.height);

        let mut rasterizer = ChannelRasterizer::new(RenderStyle::Sine);
        rasterizer
            .init(&settings, geometry, RenderStyle::Sine.default_reduction())
            .unwrap()
            .render(Channel::Left, &mut canvas, &mut constant(0.0, 800))
            .unwrap();

        let c = geometry.center_y as u32;
        assert_eq!(canvas.pixel(10, c - 1), Color::TRANSPARENT);
        assert_eq!(canvas.pixel(10, c), Color::BLACK);
        assert_eq!(canvas.pixel(10, c + 1), Color::BLACK);
        assert_eq!(canvas.pixel(10, c + 2), Color::TRANSPARENT);
    }

    #[test]
    fn test_reduction_names_round_trip() {
        for name in Reduction::NAMES {
            let reduction: Reduction = name.parse().unwrap();
            assert_eq!(reduction.name(), name);
        }
        assert!("loudest".parse::<Reduction>().is_err());
    }

    #[test]
    fn test_decibel_range_only_applies_to_peaks() {
        let calc = Reduction::Calculator(SampleCalculator::Rms).with_decibel_range(Some(48.0));
        assert_eq!(calc, Reduction::Calculator(SampleCalculator::Rms));

        let peaks = RenderStyle::Block.default_reduction().with_decibel_range(Some(30.0));
        assert!(matches!(peaks, Reduction::Peaks(p) if p.decibel_range == Some(30.0)));
    }
}
