//! Pull-based PCM sample sources consumed by the renderer.

use crate::waveform::utility;

/// A seekable stream of interleaved floating-point samples.
///
/// This is the boundary to audio decoding: the renderer never decodes
/// compressed audio itself, it only asks for the stream layout and pulls
/// samples in `[-1, 1]`.
pub trait SampleSource {
    /// Number of interleaved channels.
    fn channels(&self) -> u16;

    fn sample_rate(&self) -> u32;

    /// Bit depth of the underlying PCM data.
    fn bits_per_sample(&self) -> u16;

    /// Length of the PCM payload in bytes.
    fn byte_len(&self) -> u64;

    /// Total number of interleaved samples, derived from the byte length.
    fn sample_count(&self) -> u64 {
        utility::sample_count(self.byte_len(), self.bits_per_sample())
    }

    /// Moves the read position back to the first sample.
    ///
    /// # Errors
    /// - If the underlying reader cannot seek
    fn seek_start(&mut self) -> anyhow::Result<()>;

    /// Reads up to `buffer.len()` interleaved samples.
    ///
    /// Returns the number of samples written; 0 means the stream is exhausted.
    ///
    /// # Errors
    /// - If the underlying decoder fails
    fn read(&mut self, buffer: &mut [f32]) -> anyhow::Result<usize>;
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn channels(&self) -> u16 {
        (**self).channels()
    }

    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }

    fn bits_per_sample(&self) -> u16 {
        (**self).bits_per_sample()
    }

    fn byte_len(&self) -> u64 {
        (**self).byte_len()
    }

    fn sample_count(&self) -> u64 {
        (**self).sample_count()
    }

    fn seek_start(&mut self) -> anyhow::Result<()> {
        (**self).seek_start()
    }

    fn read(&mut self, buffer: &mut [f32]) -> anyhow::Result<usize> {
        (**self).read(buffer)
    }
}

/// Samples held in memory, reported as 32-bit float PCM.
#[derive(Debug, Clone)]
pub struct MemorySource {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
    position: usize,
}

impl MemorySource {
    /// Creates a source over interleaved `samples`.
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Self {
        Self {
            samples,
            channels,
            sample_rate,
            position: 0,
        }
    }

    /// Interleaves one buffer per channel.
    pub fn from_channels(channels: &[Vec<f32>], sample_rate: u32) -> Self {
        let frames = channels.iter().map(Vec::len).max().unwrap_or(0);
        let mut samples = Vec::with_capacity(frames * channels.len());
        for frame in 0..frames {
            for channel in channels {
                samples.push(channel.get(frame).copied().unwrap_or(0.0));
            }
        }
        Self::new(samples, channels.len() as u16, sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

impl SampleSource for MemorySource {
    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn bits_per_sample(&self) -> u16 {
        32
    }

    fn byte_len(&self) -> u64 {
        self.samples.len() as u64 * 4
    }

    fn seek_start(&mut self) -> anyhow::Result<()> {
        self.position = 0;
        Ok(())
    }

    fn read(&mut self, buffer: &mut [f32]) -> anyhow::Result<usize> {
        let remaining = &self.samples[self.position.min(self.samples.len())..];
        let count = remaining.len().min(buffer.len());
        buffer[..count].copy_from_slice(&remaining[..count]);
        self.position += count;
        Ok(count)
    }
}

/// Weights used to fold a stereo frame into one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownmixWeights {
    pub left: f32,
    pub right: f32,
}

/// Mono view over a stereo source: `out = left * wl + right * wr`.
pub struct MonoDownmix<'a, S: SampleSource + ?Sized> {
    inner: &'a mut S,
    weights: DownmixWeights,
    scratch: Vec<f32>,
}

impl<'a, S: SampleSource + ?Sized> MonoDownmix<'a, S> {
    pub fn new(inner: &'a mut S, weights: DownmixWeights) -> Self {
        Self {
            inner,
            weights,
            scratch: Vec::new(),
        }
    }
}

impl<S: SampleSource + ?Sized> SampleSource for MonoDownmix<'_, S> {
    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn bits_per_sample(&self) -> u16 {
        self.inner.bits_per_sample()
    }

    fn byte_len(&self) -> u64 {
        self.inner.byte_len() / 2
    }

    fn seek_start(&mut self) -> anyhow::Result<()> {
        self.inner.seek_start()
    }

    fn read(&mut self, buffer: &mut [f32]) -> anyhow::Result<usize> {
        let wanted = buffer.len() * 2;
        if self.scratch.len() < wanted {
            self.scratch.resize(wanted, 0.0);
        }
        let read = self.inner.read(&mut self.scratch[..wanted])?;
        let frames = read / 2;
        for (out, frame) in buffer.iter_mut().zip(self.scratch[..frames * 2].chunks_exact(2)) {
            *out = frame[0] * self.weights.left + frame[1] * self.weights.right;
        }
        Ok(frames)
    }
}
