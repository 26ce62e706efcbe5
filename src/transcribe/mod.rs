use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::config::WhisperConfig;
use crate::{Result, ScribeError};

/// Text output of speech recognition, paired with its source identifier
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub text: String,
    pub source: String,
}

impl Transcript {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
        }
    }
}

/// Input handed to the transcriber: a path to an existing audio file or an
/// in-memory buffer that still needs a file.
#[derive(Debug)]
pub enum AudioSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// Transcriber backed by the whisper command-line runtime
pub struct WhisperTranscriber {
    config: WhisperConfig,
}

impl WhisperTranscriber {
    pub fn new(config: WhisperConfig) -> Self {
        Self { config }
    }

    /// Transcribe the given audio, producing a [`Transcript`]
    ///
    /// In-memory buffers are materialized to a named temporary file because
    /// the whisper runtime only accepts file paths; the temporary file is
    /// removed when it drops, on every exit path.
    pub async fn transcribe(&self, source: AudioSource) -> Result<Transcript> {
        match source {
            AudioSource::Path(path) => {
                if !path.is_file() {
                    return Err(ScribeError::Transcription(format!(
                        "audio file does not exist: {}",
                        path.display()
                    ))
                    .into());
                }
                let source_name = path.display().to_string();
                let text = self.run_whisper(&path).await?;
                Ok(Transcript::new(text, source_name))
            }
            AudioSource::Bytes(bytes) => {
                if bytes.is_empty() {
                    return Err(
                        ScribeError::Transcription("empty audio buffer".to_string()).into()
                    );
                }

                let mut tmp = tempfile::Builder::new()
                    .suffix(".mp3")
                    .tempfile()
                    .map_err(|e| {
                        ScribeError::Transcription(format!("could not create temp file: {}", e))
                    })?;
                tmp.write_all(&bytes).map_err(|e| {
                    ScribeError::Transcription(format!("could not write temp file: {}", e))
                })?;
                tmp.flush()?;

                // tmp lives until the end of this arm, so the runtime sees the
                // file; deletion happens on drop even when run_whisper fails
                let text = self.run_whisper(tmp.path()).await?;
                Ok(Transcript::new(text, "memory_buffer"))
            }
        }
    }

    /// Invoke the whisper runtime with JSON output and pull the text out
    async fn run_whisper(&self, audio_path: &Path) -> Result<String> {
        let output_dir = tempfile::tempdir().map_err(|e| {
            ScribeError::Transcription(format!("could not create output dir: {}", e))
        })?;

        tracing::info!(
            "Transcribing {} with whisper model {}",
            audio_path.display(),
            self.config.model
        );

        let output = Command::new(&self.config.binary)
            .arg(audio_path)
            .args(["--model", &self.config.model, "--output_format", "json"])
            .arg("--output_dir")
            .arg(output_dir.path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ScribeError::Transcription(format!("failed to spawn whisper: {}", e)))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(ScribeError::Transcription(format!("whisper failed: {}", error)).into());
        }

        let result_path = whisper_json_path(audio_path, output_dir.path());
        let raw = fs_err::read_to_string(&result_path).map_err(|e| {
            ScribeError::Transcription(format!("whisper produced no JSON output: {}", e))
        })?;

        parse_whisper_output(&raw)
    }
}

/// Where the whisper runtime writes its JSON result for a given input
fn whisper_json_path(audio_path: &Path, output_dir: &Path) -> PathBuf {
    let stem = audio_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{}.json", stem))
}

/// Extract the recognized text from whisper's JSON output
fn parse_whisper_output(raw: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| ScribeError::Transcription(format!("unparseable whisper output: {}", e)))?;

    value["text"]
        .as_str()
        .map(|text| text.trim().to_string())
        .ok_or_else(|| {
            ScribeError::Transcription("whisper output has no text field".to_string()).into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whisper_output() {
        let raw = r#"{"text": "  hello from the meeting  ", "segments": [], "language": "en"}"#;
        assert_eq!(
            parse_whisper_output(raw).expect("parse"),
            "hello from the meeting"
        );
    }

    #[test]
    fn test_parse_whisper_output_missing_text() {
        assert!(parse_whisper_output(r#"{"segments": []}"#).is_err());
        assert!(parse_whisper_output("not json").is_err());
    }

    #[test]
    fn test_whisper_json_path_uses_input_stem() {
        let path = whisper_json_path(Path::new("/tmp/meeting.mp3"), Path::new("/out"));
        assert_eq!(path, PathBuf::from("/out/meeting.json"));
    }

    #[tokio::test]
    async fn test_missing_path_is_a_transcription_error() {
        let transcriber = WhisperTranscriber::new(WhisperConfig::default());
        let err = transcriber
            .transcribe(AudioSource::Path(PathBuf::from("/nonexistent/audio.mp3")))
            .await
            .expect_err("should fail");

        assert!(err
            .downcast_ref::<ScribeError>()
            .map(|e| matches!(e, ScribeError::Transcription(_)))
            .unwrap_or(false));
    }

    #[tokio::test]
    async fn test_empty_buffer_is_a_transcription_error() {
        let transcriber = WhisperTranscriber::new(WhisperConfig::default());
        let err = transcriber
            .transcribe(AudioSource::Bytes(Vec::new()))
            .await
            .expect_err("should fail");

        assert!(err
            .downcast_ref::<ScribeError>()
            .map(|e| matches!(e, ScribeError::Transcription(_)))
            .unwrap_or(false));
    }
}
