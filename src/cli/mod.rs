use clap::Parser;

#[derive(Parser)]
#[command(
    name = "sharescribe",
    about = "Download, transcribe and summarize meeting recordings from SharePoint and direct URLs",
    version,
    long_about = "A CLI tool that downloads an audio or video file from a SharePoint share link \
                  or a direct URL, converts video to audio when needed, transcribes the audio \
                  with a Whisper runtime, and optionally produces a summary via the Anthropic API."
)]
pub struct Cli {
    /// Base name for output files (produces <FILENAME>_transcript.txt and
    /// optionally <FILENAME>_summary.txt)
    #[arg(value_name = "FILENAME")]
    pub filename: String,

    /// SharePoint share link or direct media URL to download
    #[arg(value_name = "LINK")]
    pub link: String,

    /// Skip summarization even if an API key is configured
    #[arg(long)]
    pub no_summary: bool,

    /// Keep the downloaded media file after transcription
    #[arg(long)]
    pub keep_media: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
