use thiserror::Error;

use super::rasterizer::RenderStyle;

/// Precondition failures of a render. Never retried.
#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("Rasterizer used before init")]
    NotInitialized,
    #[error("Canvas is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    CanvasMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("{style} style cannot use the {reduction} reduction")]
    StyleMismatch {
        style: RenderStyle,
        reduction: String,
    },
    #[error("Unsupported channel count {0}; only mono and stereo can be rendered")]
    UnsupportedChannels(u16),
    #[error("Audio stream contains no samples")]
    EmptyStream,
}
