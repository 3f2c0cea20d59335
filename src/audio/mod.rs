//! Audio input for the renderer.
//!
//! The renderer consumes a [`SampleSource`]: a pull-based reader of
//! interleaved `f32` samples. WAV files are decoded with `hound`; other
//! formats are converted through ffmpeg first.

pub mod ffmpeg;
mod source;
mod wav;

pub use source::{DownmixWeights, MemorySource, MonoDownmix, SampleSource};
pub use wav::{AudioFile, WavSource};
