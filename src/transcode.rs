use std::path::Path;
use std::process::Command;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("ffmpeg not found — required for non-wav input")]
    FfmpegNotFound,
    #[error("ffmpeg failed for {path}: {stderr}")]
    Ffmpeg { path: String, stderr: String },
    #[error("ffmpeg produced no output file at {0}")]
    MissingOutput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert an audio file to mono 44.1 kHz wav by shelling out to ffmpeg.
///
/// Stderr is captured and carried in the error so a failed conversion
/// shows up in the per-file log instead of vanishing silently.
pub fn convert_to_wav(input: &Path, output: &Path) -> Result<(), TranscodeError> {
    let ffmpeg_check = Command::new("ffmpeg").arg("-version").output();
    if ffmpeg_check.is_err() {
        return Err(TranscodeError::FfmpegNotFound);
    }

    let result = Command::new("ffmpeg")
        .args([
            "-y",
            "-i",
            &input.to_string_lossy(),
            "-ar",
            "44100",
            "-ac",
            "1",
            &output.to_string_lossy(),
        ])
        .output()?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        // Don't leave a truncated wav behind for the next run to trip on
        std::fs::remove_file(output).ok();
        return Err(TranscodeError::Ffmpeg {
            path: input.to_string_lossy().to_string(),
            stderr: last_stderr_line(&stderr),
        });
    }

    if !output.exists() {
        return Err(TranscodeError::MissingOutput(
            output.to_string_lossy().to_string(),
        ));
    }

    Ok(())
}

/// ffmpeg stderr is long; the last non-empty line carries the actual error.
fn last_stderr_line(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("(no stderr)")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_stderr_line() {
        let out = "header noise\nmore noise\nreal error here\n\n";
        assert_eq!(last_stderr_line(out), "real error here");
        assert_eq!(last_stderr_line(""), "(no stderr)");
    }
}
