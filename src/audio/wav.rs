//! WAV file source backed by `hound`.

use super::ffmpeg;
use super::source::SampleSource;
use anyhow::{anyhow, Context, Result};
use hound::{SampleFormat, WavReader, WavSpec};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tempfile::TempPath;

/// Reads integer or float PCM from a WAV stream as `f32` in `[-1, 1]`.
pub struct WavSource<R: Read + Seek> {
    reader: WavReader<R>,
    spec: WavSpec,
    int_scale: f32,
}

impl WavSource<BufReader<File>> {
    /// Opens a WAV file.
    ///
    /// # Errors
    /// - If the file cannot be opened or is not a valid WAV file
    pub fn open(path: &Path) -> Result<Self> {
        let reader = WavReader::open(path)
            .with_context(|| format!("Failed to open WAV file '{}'", path.display()))?;
        Ok(Self::from_reader(reader))
    }
}

impl<R: Read + Seek> WavSource<R> {
    /// Wraps any seekable WAV stream.
    ///
    /// # Errors
    /// - If the stream has no valid WAV header
    pub fn new(inner: R) -> Result<Self> {
        let reader = WavReader::new(inner).map_err(|e| anyhow!("Invalid WAV stream: {e}"))?;
        Ok(Self::from_reader(reader))
    }

    fn from_reader(reader: WavReader<R>) -> Self {
        let spec = reader.spec();
        let bits = u32::from(spec.bits_per_sample.clamp(1, 32));
        Self {
            reader,
            spec,
            int_scale: 1.0 / (1u64 << (bits - 1)) as f32,
        }
    }

    pub fn spec(&self) -> WavSpec {
        self.spec
    }
}

impl<R: Read + Seek> SampleSource for WavSource<R> {
    fn channels(&self) -> u16 {
        self.spec.channels
    }

    fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    fn bits_per_sample(&self) -> u16 {
        self.spec.bits_per_sample
    }

    fn byte_len(&self) -> u64 {
        u64::from(self.reader.len()) * u64::from(self.spec.bits_per_sample / 8).max(1)
    }

    fn seek_start(&mut self) -> Result<()> {
        self.reader
            .seek(0)
            .map_err(|e| anyhow!("Failed to rewind WAV stream: {e}"))
    }

    fn read(&mut self, buffer: &mut [f32]) -> Result<usize> {
        let mut count = 0;
        match self.spec.sample_format {
            SampleFormat::Float => {
                for (slot, sample) in buffer.iter_mut().zip(self.reader.samples::<f32>()) {
                    *slot = sample.map_err(|e| anyhow!("Failed to decode WAV sample: {e}"))?;
                    count += 1;
                }
            }
            SampleFormat::Int => {
                let scale = self.int_scale;
                for (slot, sample) in buffer.iter_mut().zip(self.reader.samples::<i32>()) {
                    let value = sample.map_err(|e| anyhow!("Failed to decode WAV sample: {e}"))?;
                    *slot = value as f32 * scale;
                    count += 1;
                }
            }
        }
        Ok(count)
    }
}

/// An audio file opened for rendering.
///
/// WAV files are read directly; anything else is first converted by ffmpeg
/// into a temporary float WAV that is removed when this value is dropped.
pub struct AudioFile {
    source: WavSource<BufReader<File>>,
    // Declared after `source` so the reader is closed before the file is removed.
    temp_wav: Option<TempPath>,
}

impl AudioFile {
    /// Opens `path`, converting it through ffmpeg when it is not a WAV file.
    ///
    /// # Errors
    /// - If the file does not exist
    /// - If ffmpeg is needed but missing or fails
    /// - If the resulting WAV cannot be read
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow!("Audio file not found: {}", path.display()));
        }

        if ffmpeg::is_wav(path) {
            return Ok(Self {
                source: WavSource::open(path)?,
                temp_wav: None,
            });
        }

        let temp_wav = conversion_target(path)?;
        ffmpeg::convert_to_wav(path, &temp_wav)?;
        let source = WavSource::open(&temp_wav)?;
        Ok(Self {
            source,
            temp_wav: Some(temp_wav),
        })
    }

    /// Path of the converted WAV, when ffmpeg was needed.
    pub fn converted_path(&self) -> Option<&Path> {
        self.temp_wav.as_deref()
    }
}

/// A fresh, uniquely named temporary `.wav` for converting `input`.
///
/// The file is removed when the returned path is dropped.
fn conversion_target(input: &Path) -> Result<TempPath> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("input");
    let file = tempfile::Builder::new()
        .prefix(&format!("wavr-{stem}-"))
        .suffix(".wav")
        .tempfile()
        .map_err(|e| anyhow!("Failed to create temporary file: {e}"))?;
    Ok(file.into_temp_path())
}

impl SampleSource for AudioFile {
    fn channels(&self) -> u16 {
        self.source.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.source.sample_rate()
    }

    fn bits_per_sample(&self) -> u16 {
        self.source.bits_per_sample()
    }

    fn byte_len(&self) -> u64 {
        self.source.byte_len()
    }

    fn seek_start(&mut self) -> Result<()> {
        self.source.seek_start()
    }

    fn read(&mut self, buffer: &mut [f32]) -> Result<usize> {
        self.source.read(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn wav_bytes(spec: WavSpec, write: impl FnOnce(&mut hound::WavWriter<&mut Cursor<Vec<u8>>>)) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            write(&mut writer);
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_reads_16_bit_int_scaled() {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, |w| {
            for s in [i16::MAX, i16::MIN, 0, 16_384] {
                w.write_sample(s).unwrap();
            }
        });

        let mut source = WavSource::new(Cursor::new(bytes)).unwrap();
        assert_eq!(source.channels(), 2);
        assert_eq!(source.bits_per_sample(), 16);
        assert_eq!(source.byte_len(), 8);
        assert_eq!(source.sample_count(), 4);

        let mut buffer = [0.0f32; 8];
        assert_eq!(source.read(&mut buffer).unwrap(), 4);
        assert!((buffer[0] - 1.0).abs() < 1e-4);
        assert_eq!(buffer[1], -1.0);
        assert_eq!(buffer[2], 0.0);
        assert_eq!(buffer[3], 0.5);
        assert_eq!(source.read(&mut buffer).unwrap(), 0);
    }

    #[test]
    fn test_float_source_rewinds() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let bytes = wav_bytes(spec, |w| {
            for s in [0.25f32, -0.5, 0.75] {
                w.write_sample(s).unwrap();
            }
        });

        let mut source = WavSource::new(Cursor::new(bytes)).unwrap();
        let mut buffer = [0.0f32; 2];
        assert_eq!(source.read(&mut buffer).unwrap(), 2);
        assert_eq!(buffer, [0.25, -0.5]);

        source.seek_start().unwrap();
        assert_eq!(source.read(&mut buffer).unwrap(), 2);
        assert_eq!(buffer, [0.25, -0.5]);
        assert_eq!(source.read(&mut buffer).unwrap(), 1);
        assert_eq!(buffer[0], 0.75);
    }

    #[test]
    fn test_conversion_targets_are_unique() {
        let first = conversion_target(Path::new("/music/a/take.mp3")).unwrap();
        let second = conversion_target(Path::new("/music/b/take.mp3")).unwrap();
        assert_ne!(first.to_path_buf(), second.to_path_buf());
        assert!(first.extension().is_some_and(|ext| ext == "wav"));

        let kept = first.to_path_buf();
        assert!(kept.exists());
        drop(first);
        assert!(!kept.exists());
    }

    #[test]
    fn test_wav_input_is_not_converted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("direct.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        std::fs::write(&path, wav_bytes(spec, |w| w.write_sample(0i16).unwrap())).unwrap();

        let file = AudioFile::open(&path).unwrap();
        assert!(file.converted_path().is_none());
        assert_eq!(file.sample_count(), 1);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = AudioFile::open(Path::new("/definitely/not/here.wav"));
        assert!(result.is_err());
    }
}
