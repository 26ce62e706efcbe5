//! Sharescribe - A Rust CLI tool for transcribing meeting recordings
//!
//! This library provides functionality to download media from SharePoint share
//! links or direct URLs, convert video to audio, transcribe the audio with a
//! Whisper runtime, and optionally summarize the transcript with the Anthropic API.

pub mod cli;
pub mod config;
pub mod convert;
pub mod download;
pub mod output;
pub mod pipeline;
pub mod summarize;
pub mod transcribe;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use cli::Cli;
pub use config::Config;
pub use download::{DownloaderRegistry, FileDownloader};
pub use pipeline::TranscriptionPipeline;
pub use transcribe::Transcript;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the pipeline
#[derive(thiserror::Error, Debug)]
pub enum ScribeError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Remote file not found: {0}")]
    NotFound(String),

    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("Media conversion failed: {0}")]
    Conversion(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Summarization failed: {0}")]
    Summarization(String),
}
