//! Waveform rasterization engine.
//!
//! [`settings::RenderSettings`] sizes the canvas for a stream,
//! [`rasterizer::ChannelRasterizer`] draws each channel, and
//! [`renderer`] ties both together into a [`renderer::RenderResult`].

pub mod calculators;
pub mod canvas;
pub mod error;
pub mod peaks;
pub mod presets;
pub mod rasterizer;
pub mod renderer;
pub mod settings;
pub mod utility;

pub use calculators::SampleCalculator;
pub use canvas::{Canvas, Color, RasterCanvas};
pub use error::RenderError;
pub use peaks::{PeakReduction, PeakStrategy};
pub use rasterizer::{Channel, ChannelRasterizer, Reduction, RenderStyle};
pub use renderer::{create, create_async, create_with, RenderResult};
pub use settings::{RenderSettings, ResolvedGeometry, SettingsKind};
