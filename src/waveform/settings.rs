//! Render settings and the canvas sizing resolver.
//!
//! A [`RenderSettings`] holds the *desired* visual parameters. Every setter
//! clamps into the documented range instead of rejecting input, so callers
//! driving the values from sliders or config files can never push them out of
//! bounds. The *actual* parameters used for drawing are computed per render by
//! [`RenderSettings::resolve`] and returned as a [`ResolvedGeometry`]; the
//! settings themselves are never mutated by a render.

use super::canvas::{Brush, Canvas, Color, Paint, Pen, RasterCanvas, RectF};
use super::utility::{clamp, clamp_even, get_even_i64, round_to};
use serde::{Deserialize, Serialize};

pub const MIN_WIDTH: i32 = 800;
pub const MAX_WIDTH: i32 = 36_000;
pub const DEFAULT_WIDTH: i32 = 1200;
pub const DEFAULT_AUTO_WIDTH: bool = true;

pub const MIN_HEIGHT: i32 = 32;
pub const MAX_HEIGHT: i32 = 228;
pub const DEFAULT_HEIGHT: i32 = 76;

pub const MIN_SAMPLE_RESOLUTION: i32 = 2;
pub const MAX_SAMPLE_RESOLUTION: i32 = 192;
pub const DEFAULT_SAMPLE_RESOLUTION: i32 = 8;

pub const MIN_STEP: f32 = 0.01;
pub const MAX_STEP: f32 = 8.0;
pub const DEFAULT_STEP: f32 = 2.0;
pub const STEP_DECIMALS: i32 = 2;

pub const MIN_BLOCK_STEP: f32 = 1.0;
pub const MAX_BLOCK_STEP: f32 = 16.0;
pub const DEFAULT_BLOCK_STEP: f32 = 1.0;

pub const MIN_VOLUME_BOOST: f32 = 1.0;
pub const MAX_VOLUME_BOOST: f32 = 9.5;
pub const DEFAULT_VOLUME_BOOST: f32 = 1.0;

pub const MIN_LINE_THICKNESS: f32 = 1.0;
pub const MAX_LINE_THICKNESS: f32 = 8.0;
pub const DEFAULT_LINE_THICKNESS: f32 = 1.0;

pub const MIN_CENTER_LINE_THICKNESS: i32 = 0;
pub const MAX_CENTER_LINE_THICKNESS: i32 = 5;
pub const DEFAULT_CENTER_LINE_THICKNESS: i32 = 1;

pub const MIN_PIXELS_PER_PEAK: i32 = 2;
pub const MAX_PIXELS_PER_PEAK: i32 = 16;
pub const DEFAULT_PIXELS_PER_PEAK: i32 = MIN_PIXELS_PER_PEAK;

pub const MIN_SPACER_PIXELS: i32 = 0;
pub const MAX_SPACER_PIXELS: i32 = 10;
pub const DEFAULT_SPACER_PIXELS: i32 = MIN_SPACER_PIXELS;

pub const DEFAULT_SAMPLE_THRESHOLD: f32 = 0.001;

/// Pens handed out by [`RenderSettings::pen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenType {
    PrimaryLine,
    SecondaryLine,
    CenterLine,
    /// Block style filler between peaks.
    Spacer,
}

/// Style family of a settings instance.
///
/// Selects the two per-style override points of the sizing process: how the
/// actual line thickness follows a shrinking step, and what happens when the
/// height changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SettingsKind {
    /// Sine-style traces. Line thickness is left alone.
    Standard,
    /// Bars that touch: line thickness is kept at step width minus one.
    Bar,
    /// Block peaks with a whole-pixel step.
    Block,
    /// Block peaks drawn with vertical gradient pens sized to the height.
    SoundCloud,
}

/// Allowed range and granularity of the horizontal step for a style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRange {
    pub min: f32,
    pub max: f32,
    pub increment: f32,
    pub decimals: i32,
}

impl SettingsKind {
    pub fn step_range(&self) -> StepRange {
        match self {
            Self::Standard | Self::Bar => StepRange {
                min: MIN_STEP,
                max: MAX_STEP,
                increment: 0.01,
                decimals: STEP_DECIMALS,
            },
            Self::Block | Self::SoundCloud => StepRange {
                min: MIN_BLOCK_STEP,
                max: MAX_BLOCK_STEP,
                increment: 1.0,
                decimals: 0,
            },
        }
    }

    /// Actual line thickness after the resolver changed the step.
    fn actual_line_thickness(&self, actual_step: f32, current: f32) -> f32 {
        match self {
            Self::Bar => actual_step - 1.0,
            Self::Standard | Self::Block | Self::SoundCloud => current,
        }
    }
}

/// Concrete geometry for one render, produced by [`RenderSettings::resolve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedGeometry {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels: two wave halves plus the center line.
    pub height: u32,
    /// Row of the center line; also the height of one wave half.
    pub center_y: f32,
    /// Samples per channel reduced into one column. Even, at least
    /// [`MIN_SAMPLE_RESOLUTION`], grows without upper bound to fit the width.
    pub sample_resolution: usize,
    /// Horizontal pixels per column.
    pub step: f32,
    pub line_thickness: f32,
    pub center_line_thickness: u32,
}

/// Desired visual parameters for a waveform render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    display_name: String,
    kind: SettingsKind,
    width: i32,
    auto_width: bool,
    height: i32,
    sample_resolution: i32,
    step: f32,
    scale_step: bool,
    volume_boost: f32,
    line_thickness: f32,
    center_line_thickness: i32,
    use_sample_threshold: bool,
    sample_threshold: f32,
    pixels_per_peak: i32,
    spacer_pixels: i32,
    background_color: Color,
    primary_paint: Paint,
    secondary_paint: Paint,
    spacer_paint: Paint,
    center_line_color: Color,
}

impl RenderSettings {
    /// Creates settings of the given kind with the base defaults.
    pub fn new(kind: SettingsKind) -> Self {
        let range = kind.step_range();
        let mut settings = Self {
            display_name: "Default".to_string(),
            kind,
            width: DEFAULT_WIDTH,
            auto_width: DEFAULT_AUTO_WIDTH,
            height: DEFAULT_HEIGHT,
            sample_resolution: DEFAULT_SAMPLE_RESOLUTION,
            step: clamp(DEFAULT_STEP, range.min, range.max),
            scale_step: true,
            volume_boost: DEFAULT_VOLUME_BOOST,
            line_thickness: DEFAULT_LINE_THICKNESS,
            center_line_thickness: DEFAULT_CENTER_LINE_THICKNESS,
            use_sample_threshold: false,
            sample_threshold: DEFAULT_SAMPLE_THRESHOLD,
            pixels_per_peak: DEFAULT_PIXELS_PER_PEAK,
            spacer_pixels: DEFAULT_SPACER_PIXELS,
            background_color: Color::TRANSPARENT,
            primary_paint: Paint::Solid(Color::BLUE),
            secondary_paint: Paint::Solid(Color::LIGHT_SLATE_GRAY),
            spacer_paint: Paint::Solid(Color::YELLOW),
            center_line_color: Color::DARK_BLUE,
        };
        if matches!(kind, SettingsKind::Block | SettingsKind::SoundCloud) {
            settings.step = DEFAULT_BLOCK_STEP;
        }
        settings.on_height_set();
        settings
    }

    // Dimensions

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.display_name = name.into();
    }

    pub fn kind(&self) -> SettingsKind {
        self.kind
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    /// Clamped to [`MIN_WIDTH`]..=[`MAX_WIDTH`].
    pub fn set_width(&mut self, value: i32) {
        self.width = clamp(value, MIN_WIDTH, MAX_WIDTH);
    }

    pub fn auto_width(&self) -> bool {
        self.auto_width
    }

    /// When set, the image may grow up to [`MAX_WIDTH`] instead of [`Self::width`].
    pub fn set_auto_width(&mut self, value: bool) {
        self.auto_width = value;
    }

    /// Height of each half of the waveform.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Clamped to [`MIN_HEIGHT`]..=[`MAX_HEIGHT`] and forced even.
    pub fn set_height(&mut self, value: i32) {
        self.height = clamp_even(value, MIN_HEIGHT, MAX_HEIGHT);
        self.on_height_set();
    }

    pub fn sample_resolution(&self) -> i32 {
        self.sample_resolution
    }

    /// Clamped to [`MIN_SAMPLE_RESOLUTION`]..=[`MAX_SAMPLE_RESOLUTION`] and forced even.
    pub fn set_sample_resolution(&mut self, value: i32) {
        self.sample_resolution = clamp_even(value, MIN_SAMPLE_RESOLUTION, MAX_SAMPLE_RESOLUTION);
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Clamped to the kind's [`StepRange`] and rounded to its granularity.
    pub fn set_step(&mut self, value: f32) {
        let range = self.kind.step_range();
        let value = if value.is_nan() { range.min } else { value };
        self.step = round_to(clamp(value, range.min, range.max), range.decimals);
    }

    pub fn scale_step(&self) -> bool {
        self.scale_step
    }

    /// When false the resolver leaves the step alone and only coarsens the
    /// sample resolution.
    pub fn set_scale_step(&mut self, value: bool) {
        self.scale_step = value;
    }

    pub fn volume_boost(&self) -> f32 {
        self.volume_boost
    }

    /// Clamped to [`MIN_VOLUME_BOOST`]..=[`MAX_VOLUME_BOOST`].
    pub fn set_volume_boost(&mut self, value: f32) {
        let value = if value.is_nan() { MIN_VOLUME_BOOST } else { value };
        self.volume_boost = clamp(value, MIN_VOLUME_BOOST, MAX_VOLUME_BOOST);
    }

    pub fn line_thickness(&self) -> f32 {
        self.line_thickness
    }

    /// Clamped to [`MIN_LINE_THICKNESS`]..=[`MAX_LINE_THICKNESS`].
    pub fn set_line_thickness(&mut self, value: f32) {
        let value = if value.is_nan() { MIN_LINE_THICKNESS } else { value };
        self.line_thickness = clamp(value, MIN_LINE_THICKNESS, MAX_LINE_THICKNESS);
    }

    pub fn center_line_thickness(&self) -> i32 {
        self.center_line_thickness
    }

    /// Clamped to [`MIN_CENTER_LINE_THICKNESS`]..=[`MAX_CENTER_LINE_THICKNESS`].
    pub fn set_center_line_thickness(&mut self, value: i32) {
        self.center_line_thickness =
            clamp(value, MIN_CENTER_LINE_THICKNESS, MAX_CENTER_LINE_THICKNESS);
        self.on_height_set();
    }

    pub fn pixels_per_peak(&self) -> i32 {
        self.pixels_per_peak
    }

    /// Clamped to [`MIN_PIXELS_PER_PEAK`]..=[`MAX_PIXELS_PER_PEAK`] and forced even.
    pub fn set_pixels_per_peak(&mut self, value: i32) {
        self.pixels_per_peak = clamp_even(value, MIN_PIXELS_PER_PEAK, MAX_PIXELS_PER_PEAK);
    }

    pub fn spacer_pixels(&self) -> i32 {
        self.spacer_pixels
    }

    /// Clamped to [`MIN_SPACER_PIXELS`]..=[`MAX_SPACER_PIXELS`] and forced even.
    pub fn set_spacer_pixels(&mut self, value: i32) {
        self.spacer_pixels = clamp_even(value, MIN_SPACER_PIXELS, MAX_SPACER_PIXELS);
    }

    // Threshold

    pub fn use_sample_threshold(&self) -> bool {
        self.use_sample_threshold
    }

    pub fn set_use_sample_threshold(&mut self, value: bool) {
        self.use_sample_threshold = value;
    }

    pub fn sample_threshold(&self) -> f32 {
        self.sample_threshold
    }

    /// Values that are not strictly positive are ignored.
    pub fn set_sample_threshold(&mut self, value: f32) {
        if value > 0.0 {
            self.sample_threshold = value;
        }
    }

    // Colors

    pub fn background_color(&self) -> Color {
        self.background_color
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.background_color = color;
    }

    pub fn primary_paint(&self) -> &Paint {
        &self.primary_paint
    }

    pub fn set_primary_line_color(&mut self, color: Color) {
        self.primary_paint = Paint::Solid(color);
    }

    pub fn set_primary_paint(&mut self, paint: Paint) {
        self.primary_paint = paint;
    }

    pub fn secondary_paint(&self) -> &Paint {
        &self.secondary_paint
    }

    pub fn set_secondary_line_color(&mut self, color: Color) {
        self.secondary_paint = Paint::Solid(color);
    }

    pub fn set_secondary_paint(&mut self, paint: Paint) {
        self.secondary_paint = paint;
    }

    pub fn spacer_paint(&self) -> &Paint {
        &self.spacer_paint
    }

    pub fn set_spacer_color(&mut self, color: Color) {
        self.spacer_paint = Paint::Solid(color);
    }

    pub fn center_line_color(&self) -> Color {
        self.center_line_color
    }

    pub fn set_center_line_color(&mut self, color: Color) {
        self.center_line_color = color;
    }

    // Sizing

    /// Largest width the resolver may produce.
    pub fn max_allowed_width(&self) -> i32 {
        if self.auto_width {
            MAX_WIDTH
        } else {
            self.width
        }
    }

    /// Computes the geometry for a stream of `sample_count` interleaved
    /// samples over `channels` channels.
    ///
    /// Starts from the desired values, then shrinks the step (when
    /// [`Self::scale_step`] is set) down to its floor, then grows the sample
    /// resolution two at a time until the image fits the allowed width.
    /// Resolution growth is unbounded, so this always terminates.
    pub fn resolve(&self, sample_count: u64, channels: u16) -> ResolvedGeometry {
        let range = self.kind.step_range();
        let max_allowed = i64::from(self.max_allowed_width());
        let frames = get_even_i64(sample_count.min(i32::MAX as u64) as i64 / i64::from(channels.max(1)));

        let mut resolution = i64::from(self.sample_resolution);
        let mut step = self.step;
        let mut line_thickness = self.line_thickness;
        let target = |resolution: i64, step: f32| ((frames / resolution) as f64 * step as f64) as i64;

        let mut width = target(resolution, step);
        if self.scale_step {
            while width > max_allowed && step > range.min {
                step = round_to((step - range.increment).max(range.min), range.decimals);
                line_thickness = clamp(
                    self.kind.actual_line_thickness(step, line_thickness),
                    MIN_LINE_THICKNESS,
                    MAX_LINE_THICKNESS,
                );
                width = target(resolution, step);
            }
        }

        while width > max_allowed {
            resolution += 2;
            width = target(resolution, step);
        }

        let geometry = ResolvedGeometry {
            width: width.clamp(1, max_allowed) as u32,
            height: (self.height * 2 + self.center_line_thickness) as u32,
            center_y: self.height as f32,
            sample_resolution: resolution as usize,
            step,
            line_thickness,
            center_line_thickness: self.center_line_thickness as u32,
        };
        tracing::debug!(
            "Resolved geometry for {} samples / {} channel(s): {}x{}, resolution {}, step {}, line {}",
            sample_count,
            channels,
            geometry.width,
            geometry.height,
            geometry.sample_resolution,
            geometry.step,
            geometry.line_thickness
        );
        geometry
    }

    /// Allocates a canvas sized by [`Self::resolve`].
    ///
    /// The canvas is transparent unless an opaque background color is set.
    pub fn create_canvas(&self, sample_count: u64, channels: u16) -> (RasterCanvas, ResolvedGeometry) {
        let geometry = self.resolve(sample_count, channels);
        let mut canvas = RasterCanvas::new(geometry.width, geometry.height);
        if self.background_color.is_transparent() {
            canvas.make_transparent();
        } else {
            let (w, h) = (canvas.width() as f32, canvas.height() as f32);
            canvas.fill_rectangle(&self.background_brush(), RectF::new(0.0, 0.0, w, h));
        }
        (canvas, geometry)
    }

    pub fn background_brush(&self) -> Brush {
        Brush::solid(self.background_color)
    }

    /// Pen of the given type for a resolved geometry.
    pub fn pen(&self, pen_type: PenType, geometry: &ResolvedGeometry) -> Pen {
        match pen_type {
            PenType::PrimaryLine => {
                Pen::with_paint(self.primary_paint.clone(), geometry.line_thickness)
            }
            PenType::SecondaryLine => {
                Pen::with_paint(self.secondary_paint.clone(), geometry.line_thickness)
            }
            PenType::Spacer => Pen::with_paint(self.spacer_paint.clone(), geometry.line_thickness),
            PenType::CenterLine => {
                Pen::new(self.center_line_color, self.center_line_thickness as f32)
            }
        }
    }

    /// Style hook run whenever the vertical layout changes.
    fn on_height_set(&mut self) {
        if self.kind == SettingsKind::SoundCloud {
            let height = self.height as f32;
            let bottom_start = height + self.center_line_thickness as f32 + 1.0;
            self.primary_paint = Paint::vertical(
                0.0,
                height,
                Color::rgb(120, 120, 120),
                Color::rgb(50, 50, 50),
            );
            self.secondary_paint = Paint::VerticalGradient {
                from_y: bottom_start,
                to_y: bottom_start + height,
                stops: vec![
                    (0.0, Color::rgb(16, 16, 16)),
                    (0.1, Color::rgb(142, 142, 142)),
                    (1.0, Color::rgb(150, 150, 150)),
                ],
            };
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::new(SettingsKind::Standard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = RenderSettings::default();
        assert_eq!(s.width(), DEFAULT_WIDTH);
        assert!(s.auto_width());
        assert_eq!(s.height(), DEFAULT_HEIGHT);
        assert_eq!(s.sample_resolution(), DEFAULT_SAMPLE_RESOLUTION);
        assert_eq!(s.step(), DEFAULT_STEP);
        assert!(s.scale_step());
        assert_eq!(s.volume_boost(), DEFAULT_VOLUME_BOOST);
        assert_eq!(s.center_line_thickness(), DEFAULT_CENTER_LINE_THICKNESS);
        assert!(s.background_color().is_transparent());
        assert_eq!(RenderSettings::new(SettingsKind::Block).step(), DEFAULT_BLOCK_STEP);
    }

    #[test]
    fn test_setters_clamp_out_of_range() {
        let mut s = RenderSettings::default();

        s.set_width(10);
        assert_eq!(s.width(), MIN_WIDTH);
        s.set_width(i32::MAX);
        assert_eq!(s.width(), MAX_WIDTH);

        s.set_height(1);
        assert_eq!(s.height(), MIN_HEIGHT);
        s.set_height(5000);
        assert_eq!(s.height(), MAX_HEIGHT);
        s.set_height(101);
        assert_eq!(s.height(), 102);

        s.set_sample_resolution(-3);
        assert_eq!(s.sample_resolution(), MIN_SAMPLE_RESOLUTION);
        s.set_sample_resolution(1000);
        assert_eq!(s.sample_resolution(), MAX_SAMPLE_RESOLUTION);
        s.set_sample_resolution(9);
        assert_eq!(s.sample_resolution(), 10);

        s.set_step(0.0);
        assert_eq!(s.step(), MIN_STEP);
        s.set_step(99.0);
        assert_eq!(s.step(), MAX_STEP);
        s.set_step(1.234);
        assert_eq!(s.step(), 1.23);
        s.set_step(f32::NAN);
        assert_eq!(s.step(), MIN_STEP);

        s.set_volume_boost(0.0);
        assert_eq!(s.volume_boost(), MIN_VOLUME_BOOST);
        s.set_volume_boost(100.0);
        assert_eq!(s.volume_boost(), MAX_VOLUME_BOOST);

        s.set_line_thickness(-1.0);
        assert_eq!(s.line_thickness(), MIN_LINE_THICKNESS);
        s.set_line_thickness(80.0);
        assert_eq!(s.line_thickness(), MAX_LINE_THICKNESS);

        s.set_center_line_thickness(-1);
        assert_eq!(s.center_line_thickness(), MIN_CENTER_LINE_THICKNESS);
        s.set_center_line_thickness(50);
        assert_eq!(s.center_line_thickness(), MAX_CENTER_LINE_THICKNESS);

        s.set_pixels_per_peak(0);
        assert_eq!(s.pixels_per_peak(), MIN_PIXELS_PER_PEAK);
        s.set_pixels_per_peak(99);
        assert_eq!(s.pixels_per_peak(), MAX_PIXELS_PER_PEAK);

        s.set_spacer_pixels(-4);
        assert_eq!(s.spacer_pixels(), MIN_SPACER_PIXELS);
        s.set_spacer_pixels(99);
        assert_eq!(s.spacer_pixels(), MAX_SPACER_PIXELS);

        s.set_sample_threshold(-1.0);
        assert_eq!(s.sample_threshold(), DEFAULT_SAMPLE_THRESHOLD);
        s.set_sample_threshold(0.25);
        assert_eq!(s.sample_threshold(), 0.25);
    }

    #[test]
    fn test_block_step_is_whole_pixels() {
        let mut s = RenderSettings::new(SettingsKind::Block);
        s.set_step(2.6);
        assert_eq!(s.step(), 3.0);
        s.set_step(0.2);
        assert_eq!(s.step(), MIN_BLOCK_STEP);
        s.set_step(40.0);
        assert_eq!(s.step(), MAX_BLOCK_STEP);
    }

    #[test]
    fn test_resolve_small_stream_keeps_desired_values() {
        let s = RenderSettings::default();
        // 4000 mono samples / 8 * 2 = 1000 px
        let g = s.resolve(4000, 1);
        assert_eq!(g.width, 1000);
        assert_eq!(g.sample_resolution, 8);
        assert_eq!(g.step, 2.0);
        assert_eq!(g.line_thickness, 1.0);
        assert_eq!(g.height, (DEFAULT_HEIGHT * 2 + DEFAULT_CENTER_LINE_THICKNESS) as u32);
        assert_eq!(g.center_y, DEFAULT_HEIGHT as f32);
    }

    #[test]
    fn test_resolve_shrinks_step_before_resolution() {
        let mut s = RenderSettings::default();
        s.set_auto_width(false);
        s.set_width(1000);
        // 8000 frames / 8 = 1000 columns; step must drop from 2 to 1.
        let g = s.resolve(8000, 1);
        assert_eq!(g.sample_resolution, 8);
        assert!((g.step - 1.0).abs() < 1e-4, "step was {}", g.step);
        assert!(g.width <= 1000);
    }

    #[test]
    fn test_resolve_grows_resolution_without_scale_step() {
        let mut s = RenderSettings::default();
        s.set_auto_width(false);
        s.set_width(1000);
        s.set_scale_step(false);
        let g = s.resolve(8000, 1);
        assert_eq!(g.step, 2.0);
        assert_eq!(g.sample_resolution, 16);
        assert_eq!(g.width, 1000);
    }

    #[test]
    fn test_resolve_divides_by_channels() {
        let s = RenderSettings::default();
        assert_eq!(s.resolve(8000, 2).width, s.resolve(4000, 1).width);
    }

    #[test]
    fn test_resolve_bar_line_thickness_follows_step() {
        let mut s = RenderSettings::new(SettingsKind::Bar);
        s.set_step(5.0);
        s.set_line_thickness(4.0);
        s.set_auto_width(false);
        s.set_width(800);
        // 4000 frames / 8 = 500 columns; 500 * 5 > 800, step drops to 1.6.
        let g = s.resolve(4000, 1);
        assert!(g.width <= 800);
        assert!((g.step - 1.6).abs() < 1e-4, "step was {}", g.step);
        assert_eq!(g.line_thickness, MIN_LINE_THICKNESS);
    }

    #[test]
    fn test_resolve_never_exceeds_max_and_terminates() {
        let counts = [1u64, 2, 999, 44_100, 441_000, 10_000_000, u32::MAX as u64, u64::MAX];
        for kind in [SettingsKind::Standard, SettingsKind::Bar, SettingsKind::Block] {
            for scale_step in [true, false] {
                for auto_width in [true, false] {
                    for &count in &counts {
                        for channels in [1u16, 2] {
                            let mut s = RenderSettings::new(kind);
                            s.set_scale_step(scale_step);
                            s.set_auto_width(auto_width);
                            s.set_step(8.0);
                            s.set_sample_resolution(2);
                            let g = s.resolve(count, channels);
                            assert!(g.width >= 1);
                            assert!(g.width as i32 <= s.max_allowed_width());
                            assert!(g.sample_resolution >= MIN_SAMPLE_RESOLUTION as usize);
                            assert_eq!(g.sample_resolution % 2, 0);
                            let range = kind.step_range();
                            assert!(g.step >= range.min && g.step <= range.max);
                            assert!(g.line_thickness >= MIN_LINE_THICKNESS);
                            assert!(g.line_thickness <= MAX_LINE_THICKNESS);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_resolve_does_not_mutate_settings() {
        let mut s = RenderSettings::new(SettingsKind::Bar);
        s.set_step(5.0);
        let before = s.clone();
        let _ = s.resolve(50_000_000, 2);
        assert_eq!(s, before);
    }

    #[test]
    fn test_create_canvas_dimensions_and_background() {
        let mut s = RenderSettings::default();
        let (canvas, g) = s.create_canvas(4000, 1);
        assert_eq!(canvas.width(), g.width);
        assert_eq!(canvas.height(), g.height);
        assert!(canvas.pixel(0, 0).is_transparent());

        s.set_background_color(Color::WHITE);
        let (canvas, _) = s.create_canvas(4000, 1);
        assert_eq!(canvas.pixel(10, 10), Color::WHITE);
    }

    #[test]
    fn test_pens_use_actual_values() {
        let mut s = RenderSettings::default();
        s.set_primary_line_color(Color::RED);
        s.set_center_line_thickness(3);
        let mut g = s.resolve(4000, 1);
        g.line_thickness = 2.5;

        let primary = s.pen(PenType::PrimaryLine, &g);
        assert_eq!(primary.paint, Paint::Solid(Color::RED));
        assert_eq!(primary.width, 2.5);

        let center = s.pen(PenType::CenterLine, &g);
        assert_eq!(center.paint, Paint::Solid(Color::DARK_BLUE));
        assert_eq!(center.width, 3.0);
    }

    #[test]
    fn test_soundcloud_gradient_follows_height() {
        let mut s = RenderSettings::new(SettingsKind::SoundCloud);
        s.set_height(100);
        match s.primary_paint() {
            Paint::VerticalGradient { to_y, .. } => assert_eq!(*to_y, 100.0),
            other => panic!("expected gradient, got {other:?}"),
        }
        match s.secondary_paint() {
            Paint::VerticalGradient { from_y, to_y, .. } => {
                assert_eq!(*from_y, 102.0);
                assert_eq!(*to_y, 202.0);
            }
            other => panic!("expected gradient, got {other:?}"),
        }
    }
}
