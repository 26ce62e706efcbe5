use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::{Result, ScribeError};

/// Video file extensions that need an audio extraction pass
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "wmv", "webm", "m4v", "flv"];

/// Media converter backed by the ffmpeg command-line tool
pub struct MediaConverter {
    ffmpeg_path: String,
}

impl MediaConverter {
    pub fn new() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }

    /// Strip the video track and re-encode the audio to MP3
    pub async fn video_to_audio(&self, input_path: &Path, output_path: &Path) -> Result<()> {
        tracing::info!(
            "Converting {} -> {}",
            input_path.display(),
            output_path.display()
        );

        let output = Command::new(&self.ffmpeg_path)
            .args([
                "-i",
                &input_path.to_string_lossy(),
                "-vn",
                "-acodec",
                "libmp3lame",
                "-y",
                &output_path.to_string_lossy(),
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ScribeError::Conversion(format!("failed to spawn ffmpeg: {}", e)))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(ScribeError::Conversion(format!("ffmpeg failed: {}", error)).into());
        }

        Ok(())
    }
}

impl Default for MediaConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check whether a path looks like a video file by extension
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let lowered = ext.to_lowercase();
            VIDEO_EXTENSIONS.contains(&lowered.as_str())
        })
        .unwrap_or(false)
}
