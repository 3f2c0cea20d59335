//! Single-value sample calculators.
//!
//! A calculator collapses the window `buffer[start..end]` into one value that
//! the sine and bar rasterizers turn into a vertical offset.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SampleCalculator {
    /// First sample of the window
    First,
    /// Last sample of the window
    Last,
    /// Arithmetic mean of the window
    Average,
    /// Smallest sample of the window
    Min,
    /// Largest sample of the window
    Max,
    /// Root mean square of the window
    Rms,
}

impl SampleCalculator {
    pub const ALL: [SampleCalculator; 6] = [
        Self::First,
        Self::Last,
        Self::Average,
        Self::Min,
        Self::Max,
        Self::Rms,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::First => "First",
            Self::Last => "Last",
            Self::Average => "Average",
            Self::Min => "Min",
            Self::Max => "Max",
            Self::Rms => "Rms",
        }
    }

    /// Reduces `buffer[start..end]` to a single value.
    ///
    /// Indices are clamped to the buffer; an empty window yields 0.
    pub fn calculate(&self, buffer: &[f32], start: usize, end: usize) -> f32 {
        let end = end.min(buffer.len());
        if start >= end {
            return 0.0;
        }
        let window = &buffer[start..end];
        match self {
            Self::First => window[0],
            Self::Last => window[window.len() - 1],
            Self::Average => window.iter().sum::<f32>() / window.len() as f32,
            Self::Min => window.iter().copied().fold(f32::INFINITY, f32::min),
            Self::Max => window.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            Self::Rms => {
                let sum: f64 = window.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
                (sum / window.len() as f64).sqrt() as f32
            }
        }
    }
}

impl fmt::Display for SampleCalculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
