use std::path::PathBuf;

use crate::config::Config;
use crate::convert::{is_video_file, MediaConverter};
use crate::download::DownloaderRegistry;
use crate::output;
use crate::summarize::TextSummarizer;
use crate::transcribe::{AudioSource, Transcript, WhisperTranscriber};
use crate::utils;
use crate::Result;

/// What a pipeline run produced
#[derive(Debug)]
pub struct PipelineOutput {
    pub transcript: Transcript,
    pub transcript_file: PathBuf,
    pub summary_file: Option<PathBuf>,
}

/// Options for a single run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Skip summarization even when a key is configured
    pub no_summary: bool,

    /// Keep downloaded and converted media files afterwards
    pub keep_media: bool,
}

/// Main transcription pipeline
///
/// Sequences download, conditional conversion, transcription and conditional
/// summarization. Summarization failure is logged and swallowed; every other
/// failure aborts the run.
pub struct TranscriptionPipeline {
    config: Config,
    downloaders: DownloaderRegistry,
    converter: MediaConverter,
    transcriber: WhisperTranscriber,
    summarizer: Option<TextSummarizer>,
}

impl TranscriptionPipeline {
    /// Create a new transcription pipeline
    pub fn new(config: Config) -> Self {
        let downloaders = DownloaderRegistry::new(&config);
        let transcriber = WhisperTranscriber::new(config.whisper.clone());
        let summarizer = config
            .anthropic_api_key
            .as_ref()
            .map(|key| TextSummarizer::new(key.clone()));

        Self {
            config,
            downloaders,
            converter: MediaConverter::new(),
            transcriber,
            summarizer,
        }
    }

    /// Run the whole pipeline for one link
    pub async fn run(&self, filename: &str, link: &str, options: RunOptions) -> Result<PipelineOutput> {
        let media_path = self.fetch_media(filename, link).await?;
        let audio_path = self.ensure_audio(&media_path).await?;

        tracing::info!("Transcribing {}", audio_path.display());
        let transcript = self
            .transcriber
            .transcribe(AudioSource::Path(audio_path.clone()))
            .await?;

        let summary = if options.no_summary {
            None
        } else {
            self.try_summarize(&transcript).await
        };

        let transcript_file = output::save_transcript(&transcript, filename)?;
        let summary_file = match summary {
            Some(summary) => Some(output::save_summary(&summary, filename)?),
            None => None,
        };

        if !options.keep_media {
            cleanup_media(&media_path);
            if audio_path != media_path {
                cleanup_media(&audio_path);
            }
        }

        Ok(PipelineOutput {
            transcript,
            transcript_file,
            summary_file,
        })
    }

    /// Download the linked media into the downloads directory
    async fn fetch_media(&self, filename: &str, link: &str) -> Result<PathBuf> {
        fs_err::create_dir_all(&self.config.downloads_dir)?;

        let safe_name = utils::sanitize_filename(filename);
        let extension = utils::extension_from_url(link).unwrap_or_else(|| "mp3".to_string());
        let media_path = self
            .config
            .downloads_dir
            .join(format!("{}.{}", safe_name, extension));

        self.downloaders.download(link, &media_path).await?;

        Ok(media_path)
    }

    /// Convert video to audio when needed, returning the audio path
    async fn ensure_audio(&self, media_path: &PathBuf) -> Result<PathBuf> {
        if !is_video_file(media_path) {
            return Ok(media_path.clone());
        }

        let audio_path = media_path.with_extension("mp3");
        self.converter.video_to_audio(media_path, &audio_path).await?;

        Ok(audio_path)
    }

    /// Summarize if configured; failure is logged, never fatal
    async fn try_summarize(&self, transcript: &Transcript) -> Option<String> {
        let summarizer = self.summarizer.as_ref()?;

        tracing::info!("Summarizing transcript for {}", transcript.source);
        match summarizer.summarize(&transcript.text).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!("Summarization failed, continuing without summary: {}", e);
                None
            }
        }
    }
}

/// Best-effort removal of intermediate media files
fn cleanup_media(path: &PathBuf) {
    if let Err(e) = fs_err::remove_file(path) {
        tracing::debug!("Could not remove {}: {}", path.display(), e);
    }
}
