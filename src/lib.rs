//! wavr renders audio files into static waveform images.
//!
//! The [`waveform`] module is the engine: it sizes a canvas for a sample
//! stream and rasterizes each channel as a sine trace, mirrored bars or peak
//! blocks. [`audio`] provides sample sources, and the remaining modules make
//! up the `wavr` command-line tool.

pub mod app;
pub mod audio;
pub mod commands;
pub mod config;
pub mod logging;
pub mod setup;
pub mod waveform;
