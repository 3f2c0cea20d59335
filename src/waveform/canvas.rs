//! Drawing surface used by the rasterizer.
//!
//! The engine only talks to the [`Canvas`] trait. [`RasterCanvas`] is the
//! concrete implementation backed by an `image::RgbaImage`, which is what the
//! orchestrator allocates and what the CLI writes out as PNG.

use anyhow::anyhow;
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const DARK_BLUE: Color = Color::rgb(0, 0, 139);
    pub const LIGHT_SLATE_GRAY: Color = Color::rgb(119, 136, 153);
    pub const DARK_SLATE_GRAY: Color = Color::rgb(47, 79, 79);
    pub const CADET_BLUE: Color = Color::rgb(95, 158, 160);
    pub const DODGER_BLUE: Color = Color::rgb(30, 144, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Linear interpolation between two colors, `t` in `[0, 1]`.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::rgba(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;

    /// Parses `#rrggbb`, `#rrggbbaa` or `transparent`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("transparent") {
            return Ok(Color::TRANSPARENT);
        }
        let hex = trimmed
            .strip_prefix('#')
            .ok_or_else(|| anyhow!("Invalid color '{s}': expected #rrggbb or #rrggbbaa"))?;
        if hex.len() != 6 && hex.len() != 8 {
            return Err(anyhow!("Invalid color '{s}': expected 6 or 8 hex digits"));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| anyhow!("Invalid color '{s}': bad hex digits"))
        };
        let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Color::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
    }
}

impl TryFrom<String> for Color {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl From<Color> for Rgba<u8> {
    fn from(c: Color) -> Self {
        Rgba([c.r, c.g, c.b, c.a])
    }
}

/// How a pen or brush colors the pixels it touches.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Colors interpolated along the y axis between `from_y` and `to_y`.
    /// Stops are `(position, color)` with positions in `[0, 1]`, ascending.
    VerticalGradient {
        from_y: f32,
        to_y: f32,
        stops: Vec<(f32, Color)>,
    },
}

impl Paint {
    /// Two-stop vertical gradient.
    pub fn vertical(from_y: f32, to_y: f32, start: Color, end: Color) -> Self {
        Paint::VerticalGradient {
            from_y,
            to_y,
            stops: vec![(0.0, start), (1.0, end)],
        }
    }

    /// Color of this paint on row `y`.
    pub fn color_at(&self, y: f32) -> Color {
        match self {
            Paint::Solid(color) => *color,
            Paint::VerticalGradient { from_y, to_y, stops } => {
                let Some(&(_, first)) = stops.first() else {
                    return Color::TRANSPARENT;
                };
                let span = to_y - from_y;
                let t = if span.abs() < f32::EPSILON {
                    0.0
                } else {
                    ((y - from_y) / span).clamp(0.0, 1.0)
                };
                let mut previous = (0.0, first);
                for &(position, color) in stops {
                    if t <= position {
                        let width = position - previous.0;
                        if width <= f32::EPSILON {
                            return color;
                        }
                        return previous.1.lerp(color, (t - previous.0) / width);
                    }
                    previous = (position, color);
                }
                previous.1
            }
        }
    }
}

/// A line-drawing pen: paint plus width in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Pen {
    pub paint: Paint,
    pub width: f32,
}

impl Pen {
    pub fn new(color: Color, width: f32) -> Self {
        Self {
            paint: Paint::Solid(color),
            width,
        }
    }

    pub fn with_paint(paint: Paint, width: f32) -> Self {
        Self { paint, width }
    }

    /// Width rounded to whole pixels, never below one.
    fn pixel_width(&self) -> i64 {
        (self.width.round() as i64).max(1)
    }
}

/// An area-filling brush.
#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    pub paint: Paint,
}

impl Brush {
    pub fn solid(color: Color) -> Self {
        Self {
            paint: Paint::Solid(color),
        }
    }
}

/// A rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// 2D drawing surface consumed by the rasterizer.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn fill_rectangle(&mut self, brush: &Brush, rect: RectF);
    fn draw_line(&mut self, pen: &Pen, x1: f32, y1: f32, x2: f32, y2: f32);
    /// Clears every pixel to fully transparent.
    fn make_transparent(&mut self);
}

/// Canvas backed by an in-memory RGBA raster.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterCanvas {
    image: RgbaImage,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Color of a single pixel. Panics if out of bounds, like `RgbaImage`.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let Rgba([r, g, b, a]) = *self.image.get_pixel(x, y);
        Color::rgba(r, g, b, a)
    }

    /// Writes the raster as a PNG file.
    ///
    /// # Errors
    /// - If the file cannot be created or encoded
    pub fn save_png(&self, path: &Path) -> anyhow::Result<()> {
        self.image
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| anyhow!("Failed to write image '{}': {e}", path.display()))?;
        tracing::debug!(
            "Image written: {} ({}x{})",
            path.display(),
            self.image.width(),
            self.image.height()
        );
        Ok(())
    }

    /// Blends `color` over the pixel at (x, y). Out-of-bounds writes are dropped.
    fn blend(&mut self, x: i64, y: i64, color: Color) {
        if color.a == 0
            || x < 0
            || y < 0
            || x >= i64::from(self.image.width())
            || y >= i64::from(self.image.height())
        {
            return;
        }
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        if color.a == 255 {
            *dst = color.into();
            return;
        }
        let src_a = color.a as f32 / 255.0;
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        let mix = |s: u8, d: u8| {
            ((s as f32 * src_a + d as f32 * dst_a * (1.0 - src_a)) / out_a).round() as u8
        };
        *dst = Rgba([
            mix(color.r, dst[0]),
            mix(color.g, dst[1]),
            mix(color.b, dst[2]),
            (out_a * 255.0).round() as u8,
        ]);
    }

    /// Stamps a square of side `size` centered on (x, y).
    fn stamp(&mut self, x: i64, y: i64, size: i64, paint: &Paint) {
        let low = -(size / 2);
        let high = size - 1 - size / 2;
        for dy in low..=high {
            let color = paint.color_at((y + dy) as f32);
            for dx in low..=high {
                self.blend(x + dx, y + dy, color);
            }
        }
    }
}

impl Canvas for RasterCanvas {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn fill_rectangle(&mut self, brush: &Brush, rect: RectF) {
        let x0 = rect.x.round().max(0.0) as i64;
        let y0 = rect.y.round().max(0.0) as i64;
        let x1 = ((rect.x + rect.width).round() as i64).min(i64::from(self.image.width()));
        let y1 = ((rect.y + rect.height).round() as i64).min(i64::from(self.image.height()));
        for y in y0..y1 {
            let color = brush.paint.color_at(y as f32);
            for x in x0..x1 {
                self.blend(x, y, color);
            }
        }
    }

    fn draw_line(&mut self, pen: &Pen, x1: f32, y1: f32, x2: f32, y2: f32) {
        if !(x1.is_finite() && y1.is_finite() && x2.is_finite() && y2.is_finite()) {
            return;
        }
        let size = pen.pixel_width();
        let margin = size as f64;
        let bounds = (
            -margin,
            -margin,
            f64::from(self.image.width()) + margin,
            f64::from(self.image.height()) + margin,
        );
        let Some((x1, y1, x2, y2)) = clip_segment(
            (f64::from(x1), f64::from(y1)),
            (f64::from(x2), f64::from(y2)),
            bounds,
        ) else {
            return;
        };
        let (mut x, mut y) = (x1.round() as i64, y1.round() as i64);
        let (end_x, end_y) = (x2.round() as i64, y2.round() as i64);

        // Bresenham, stamping the pen at every step.
        let dx = (end_x - x).abs();
        let dy = -(end_y - y).abs();
        let step_x = if x < end_x { 1 } else { -1 };
        let step_y = if y < end_y { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.stamp(x, y, size, &pen.paint);
            if x == end_x && y == end_y {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += step_x;
            }
            if e2 <= dx {
                err += dx;
                y += step_y;
            }
        }
    }

    fn make_transparent(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }
}

/// Liang-Barsky clip of the segment `a`-`b` to `(min_x, min_y, max_x, max_y)`.
///
/// Returns `None` when the segment lies entirely outside.
fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    (min_x, min_y, max_x, max_y): (f64, f64, f64, f64),
) -> Option<(f64, f64, f64, f64)> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    let edges = [
        (-dx, a.0 - min_x),
        (dx, max_x - a.0),
        (-dy, a.1 - min_y),
        (dy, max_y - a.1),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((a.0 + t0 * dx, a.1 + t0 * dy, a.0 + t1 * dx, a.1 + t1 * dy))
}
