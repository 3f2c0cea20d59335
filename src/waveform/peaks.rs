//! Peak providers for the block style.
//!
//! A [`PeakReader`] pulls one window of interleaved samples from a
//! [`SampleSource`], splits it per channel and reduces each channel to a
//! `(min, max)` pair with the configured [`PeakStrategy`]. The optional
//! decibel remap is a plain function applied to the result.

use super::utility::clamp_even;
use crate::audio::SampleSource;
use std::fmt;

pub const DEFAULT_RMS_BLOCK_SIZE: usize = 128;

pub const MIN_SAMPLE_INTERVAL: i32 = 2;
pub const MAX_SAMPLE_INTERVAL: i32 = 128;
pub const DEFAULT_SAMPLE_INTERVAL: i32 = 32;

pub const MIN_AVERAGE_SCALE: f32 = 1.0;
pub const MAX_AVERAGE_SCALE: f32 = 32.0;
pub const DEFAULT_AVERAGE_SCALE: f32 = 8.0;

/// Dynamic range used when decibel scaling is requested without a value.
pub const DEFAULT_DECIBEL_RANGE: f64 = 48.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakChannel {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakValue {
    Min,
    Max,
}

/// Minimum and maximum amplitude of one window, per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeakInfo {
    pub left_min: f32,
    pub left_max: f32,
    pub right_min: f32,
    pub right_max: f32,
}

impl PeakInfo {
    pub fn new(left_min: f32, left_max: f32, right_min: f32, right_max: f32) -> Self {
        Self {
            left_min,
            left_max,
            right_min,
            right_max,
        }
    }

    /// Peak symmetric around zero on both channels.
    pub fn symmetric(left: f32, right: f32) -> Self {
        Self::new(-left, left, -right, right)
    }

    pub fn get(&self, channel: PeakChannel, value: PeakValue) -> f32 {
        match (channel, value) {
            (PeakChannel::Left, PeakValue::Min) => self.left_min,
            (PeakChannel::Left, PeakValue::Max) => self.left_max,
            (PeakChannel::Right, PeakValue::Min) => self.right_min,
            (PeakChannel::Right, PeakValue::Max) => self.right_max,
        }
    }

    /// Zeroes every value whose magnitude does not exceed `threshold`.
    pub fn apply_noise_threshold(&mut self, threshold: f32) -> &mut Self {
        for value in [
            &mut self.left_min,
            &mut self.left_max,
            &mut self.right_min,
            &mut self.right_max,
        ] {
            if value.abs() <= threshold {
                *value = 0.0;
            }
        }
        self
    }
}

impl fmt::Display for PeakInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Min(L): {}, Max(L): {}, Min(R): {}, Max(R): {}",
            self.left_min, self.left_max, self.right_min, self.right_max
        )
    }
}

/// How one window of a channel is reduced to a peak.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PeakStrategy {
    /// Smallest and largest sample of the window.
    #[default]
    Max,
    /// Largest RMS over sub-blocks of `block_size` samples, symmetric.
    Rms { block_size: usize },
    /// Running min/max over every `interval`-th sample.
    Sampling { interval: usize },
    /// Mean absolute value times `scale`, symmetric.
    Average { scale: f32 },
}

impl PeakStrategy {
    pub fn rms(block_size: usize) -> Self {
        Self::Rms {
            block_size: block_size.max(1),
        }
    }

    /// Sampling strategy; `interval` is forced even and clamped to 2..=128.
    pub fn sampling(interval: i32) -> Self {
        Self::Sampling {
            interval: clamp_even(interval, MIN_SAMPLE_INTERVAL, MAX_SAMPLE_INTERVAL) as usize,
        }
    }

    /// Average strategy; `scale` is clamped to 1..=32.
    pub fn average(scale: f32) -> Self {
        Self::Average {
            scale: scale.clamp(MIN_AVERAGE_SCALE, MAX_AVERAGE_SCALE),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Max => "Max Absolute Value",
            Self::Rms { .. } => "Max RMS Value",
            Self::Sampling { .. } => "Sampled Peaks",
            Self::Average { .. } => "Scaled Average",
        }
    }

    /// Reduces one channel window to `(min, max)`. An empty window is silence.
    pub fn reduce(&self, window: &[f32]) -> (f32, f32) {
        if window.is_empty() {
            return (0.0, 0.0);
        }
        match *self {
            Self::Max => window
                .iter()
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| {
                    (lo.min(s), hi.max(s))
                }),
            Self::Rms { block_size } => {
                let peak = window
                    .chunks(block_size.max(1))
                    .map(|block| {
                        let sum: f64 = block.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
                        (sum / block.len() as f64).sqrt() as f32
                    })
                    .fold(0.0f32, f32::max);
                (-peak, peak)
            }
            Self::Sampling { interval } => window
                .iter()
                .step_by(interval.max(1))
                .fold((0.0f32, 0.0f32), |(lo, hi), &s| (lo.min(s), hi.max(s))),
            Self::Average { scale } => {
                let mean = window.iter().map(|s| s.abs()).sum::<f32>() / window.len() as f32;
                (mean * -scale, mean * scale)
            }
        }
    }
}

/// Remaps a linear peak onto a decibel scale with a floor of `-dynamic_range` dB,
/// normalized back to `[0, 1]` and reported symmetrically per channel.
///
/// A non-positive range leaves the peak untouched.
pub fn decibel_scale(peak: PeakInfo, dynamic_range: f64) -> PeakInfo {
    if dynamic_range <= 0.0 {
        return peak;
    }
    let remap = |max: f32| {
        let db = (20.0 * f64::from(max).log10()).max(-dynamic_range);
        ((dynamic_range + db) / dynamic_range) as f32
    };
    PeakInfo::symmetric(remap(peak.left_max), remap(peak.right_max))
}

/// A peak strategy with optional decibel remapping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PeakReduction {
    pub strategy: PeakStrategy,
    pub decibel_range: Option<f64>,
}

impl PeakReduction {
    pub fn new(strategy: PeakStrategy) -> Self {
        Self {
            strategy,
            decibel_range: None,
        }
    }

    pub fn with_decibel_range(mut self, range: f64) -> Self {
        self.decibel_range = Some(range);
        self
    }
}

/// Pulls peak windows from a sample source.
#[derive(Debug, Clone)]
pub struct PeakReader {
    reduction: PeakReduction,
    channels: usize,
    last_frames: usize,
    raw: Vec<f32>,
    left: Vec<f32>,
    right: Vec<f32>,
}

impl PeakReader {
    pub fn new(reduction: PeakReduction) -> Self {
        Self {
            reduction,
            channels: 0,
            last_frames: 0,
            raw: Vec::new(),
            left: Vec::new(),
            right: Vec::new(),
        }
    }

    /// Sizes the buffers for windows of `samples_per_peak` frames of a
    /// `channels`-channel stream.
    pub fn init(&mut self, channels: u16, samples_per_peak: usize) {
        let frames = samples_per_peak.max(1);
        self.channels = usize::from(channels.max(1));
        self.raw = vec![0.0; frames * self.channels];
        self.left = vec![0.0; frames];
        self.right = vec![0.0; frames];
    }

    pub fn is_initialized(&self) -> bool {
        !self.raw.is_empty()
    }

    pub fn reduction(&self) -> PeakReduction {
        self.reduction
    }

    /// Frames read by the last [`Self::next_peak`]; 0 once the source is exhausted.
    pub fn last_frames(&self) -> usize {
        self.last_frames
    }

    /// Reads the next window and reduces it.
    ///
    /// Once the source is exhausted every further peak is all zero.
    ///
    /// # Errors
    /// - If the reader was not initialized
    /// - If the source fails to read
    pub fn next_peak<S: SampleSource + ?Sized>(&mut self, source: &mut S) -> anyhow::Result<PeakInfo> {
        if !self.is_initialized() {
            return Err(anyhow::anyhow!("Peak reader used before init"));
        }
        self.raw.fill(0.0);
        self.left.fill(0.0);
        self.right.fill(0.0);

        let mut read = 0;
        while read < self.raw.len() {
            let count = source.read(&mut self.raw[read..])?;
            if count == 0 {
                break;
            }
            read += count;
        }

        let frames = read / self.channels;
        self.last_frames = frames;
        if self.channels == 1 {
            self.left[..frames].copy_from_slice(&self.raw[..frames]);
            self.right[..frames].copy_from_slice(&self.raw[..frames]);
        } else {
            for (frame, samples) in self.raw[..frames * self.channels]
                .chunks_exact(self.channels)
                .enumerate()
            {
                self.left[frame] = samples[0];
                self.right[frame] = samples[1];
            }
        }

        let strategy = self.reduction.strategy;
        let (left_min, left_max) = strategy.reduce(&self.left[..frames]);
        let (right_min, right_max) = strategy.reduce(&self.right[..frames]);
        let peak = PeakInfo::new(left_min, left_max, right_min, right_max);

        Ok(match self.reduction.decibel_range {
            Some(range) => decibel_scale(peak, range),
            None => peak,
        })
    }
}
