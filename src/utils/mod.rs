use url::Url;

/// Sanitize filename for safe filesystem usage
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            c if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '.' => c,
            _ => '_',
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Pull a file extension out of a URL path, if any
pub fn extension_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segments = parsed.path_segments()?;
    let last = segments.last().filter(|s| !s.is_empty())?;

    let decoded = urlencoding::decode(last).ok()?;
    let dot = decoded.rfind('.')?;
    let ext = &decoded[dot + 1..];

    if ext.is_empty() || ext.contains('/') {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Check if the current environment has required tools
pub async fn check_dependencies() -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available("ffmpeg").await {
        missing.push("ffmpeg - required for video to audio conversion".to_string());
    }

    if !check_command_available("whisper").await {
        missing.push("whisper - required for transcription".to_string());
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Hello World!"), "Hello World_");
        assert_eq!(sanitize_filename("test/file?name"), "test_file_name");
        assert_eq!(sanitize_filename("  spaced  "), "spaced");
    }

    #[test]
    fn test_extension_from_url() {
        assert_eq!(
            extension_from_url("https://example.com/media/meeting.mp4"),
            Some("mp4".to_string())
        );
        assert_eq!(
            extension_from_url(
                "https://contoso.sharepoint.com/sites/Team/Shared%20Documents/All%20Hands.MP3"
            ),
            Some("mp3".to_string())
        );
        assert_eq!(extension_from_url("https://example.com/media/"), None);
        assert_eq!(extension_from_url("https://example.com/noext"), None);
        assert_eq!(extension_from_url("not-a-url"), None);
    }
}
