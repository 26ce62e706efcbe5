use std::path::PathBuf;

use crate::transcribe::Transcript;
use crate::Result;

/// Output file for a transcript: `<filename>_transcript.txt`
pub fn transcript_path(filename: &str) -> PathBuf {
    PathBuf::from(format!("{}_transcript.txt", filename))
}

/// Output file for a summary: `<filename>_summary.txt`
pub fn summary_path(filename: &str) -> PathBuf {
    PathBuf::from(format!("{}_summary.txt", filename))
}

/// Write the transcript to its output file
pub fn save_transcript(transcript: &Transcript, filename: &str) -> Result<PathBuf> {
    let path = transcript_path(filename);
    fs_err::write(&path, &transcript.text)?;
    Ok(path)
}

/// Write the summary to its output file
pub fn save_summary(summary: &str, filename: &str) -> Result<PathBuf> {
    let path = summary_path(filename);
    fs_err::write(&path, summary)?;
    Ok(path)
}
