//! FFmpeg locator and converter.
//!
//! Inputs that are not WAV files are handed to an external ffmpeg binary,
//! which writes a 32-bit float WAV that [`super::WavSource`] can read.
//! Standard installation locations are checked before falling back to PATH.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Locates the ffmpeg binary on the system.
///
/// Checks platform install locations first (Homebrew, `/usr/bin`, snap,
/// `C:\ffmpeg`), then searches PATH via `which` or `where`.
///
/// # Errors
/// - If no ffmpeg binary can be found
pub fn find_ffmpeg() -> Result<PathBuf> {
    let candidates: Vec<PathBuf> = if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/opt/homebrew/bin/ffmpeg"),
            PathBuf::from("/usr/local/bin/ffmpeg"),
            PathBuf::from("/usr/bin/ffmpeg"),
        ]
    } else if cfg!(target_os = "linux") {
        vec![
            PathBuf::from("/usr/bin/ffmpeg"),
            PathBuf::from("/usr/local/bin/ffmpeg"),
            PathBuf::from("/snap/bin/ffmpeg"),
        ]
    } else if cfg!(target_os = "windows") {
        vec![
            PathBuf::from("C:\\ffmpeg\\bin\\ffmpeg.exe"),
            PathBuf::from("C:\\Program Files\\ffmpeg\\bin\\ffmpeg.exe"),
        ]
    } else {
        vec![]
    };

    if let Some(path) = candidates.into_iter().find(|path| path.exists()) {
        tracing::debug!("Found ffmpeg at: {}", path.display());
        return Ok(path);
    }

    let ffmpeg_path = find_in_path("ffmpeg")?;
    tracing::debug!("Found ffmpeg in PATH at: {}", ffmpeg_path.display());
    Ok(ffmpeg_path)
}

fn find_in_path(binary_name: &str) -> Result<PathBuf> {
    let search_cmd = if cfg!(target_os = "windows") {
        "where"
    } else {
        "which"
    };

    let output = Command::new(search_cmd)
        .arg(binary_name)
        .output()
        .map_err(|e| anyhow!("Failed to search PATH for {binary_name}: {e}"))?;

    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        // `where` may list several matches, one per line.
        let path = PathBuf::from(stdout.lines().next().unwrap_or_default().trim());
        if !path.as_os_str().is_empty() {
            return Ok(path);
        }
    }

    Err(anyhow!(
        "ffmpeg not found. It is needed to read non-WAV audio. Please install ffmpeg:\n\
         macOS: brew install ffmpeg\n\
         Linux: apt install ffmpeg (Debian/Ubuntu) or dnf install ffmpeg (Fedora)\n\
         Windows: Download from https://ffmpeg.org/download.html"
    ))
}

/// Returns true when `path` has a `.wav` extension (any case).
pub fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

/// Converts `input` to a 32-bit float PCM WAV at `output`, keeping the
/// source channel layout and sample rate.
///
/// # Errors
/// - If ffmpeg cannot be found or started
/// - If ffmpeg exits with a failure status
pub fn convert_to_wav(input: &Path, output: &Path) -> Result<()> {
    let ffmpeg = find_ffmpeg()?;
    tracing::info!(
        "Converting {} to float WAV with ffmpeg",
        input.display()
    );

    let result = Command::new(&ffmpeg)
        .arg("-loglevel")
        .arg("error")
        .arg("-i")
        .arg(input)
        .arg("-vn")
        .arg("-acodec")
        .arg("pcm_f32le")
        .arg("-f")
        .arg("wav")
        .arg("-y")
        .arg(output)
        .output()
        .map_err(|e| anyhow!("Failed to run ffmpeg: {e}"))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        tracing::error!("ffmpeg conversion failed: {}", stderr.trim());
        return Err(anyhow!(
            "ffmpeg could not decode '{}': {}",
            input.display(),
            stderr.trim()
        ));
    }

    tracing::debug!("ffmpeg wrote {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_ffmpeg() {
        // Succeeds either way; only reports whether ffmpeg is installed.
        match find_ffmpeg() {
            Ok(path) => println!("Found ffmpeg at: {}", path.display()),
            Err(e) => println!("ffmpeg not found (expected on CI): {e}"),
        }
    }

    #[test]
    fn test_is_wav() {
        assert!(is_wav(Path::new("song.wav")));
        assert!(is_wav(Path::new("/tmp/SONG.WAV")));
        assert!(!is_wav(Path::new("song.mp3")));
        assert!(!is_wav(Path::new("wav")));
    }
}
