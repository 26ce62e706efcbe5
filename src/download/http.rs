use async_trait::async_trait;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use std::io::Write;
use std::path::Path;

use super::FileDownloader;
use crate::{Result, ScribeError};

const MAX_TRANSFER_RETRIES: u32 = 3;

/// Plain HTTP(S) downloader for direct media URLs
///
/// Performs an unauthenticated streamed GET. Transient network failures are
/// retried with exponential backoff before surfacing a transfer error.
pub struct HttpDownloader {
    client: ClientWithMiddleware,
}

impl HttpDownloader {
    pub fn new() -> Self {
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(MAX_TRANSFER_RETRIES);
        let client = ClientBuilder::new(reqwest::Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Self { client }
    }
}

#[async_trait]
impl FileDownloader for HttpDownloader {
    async fn download(&self, url: &str, output_path: &Path) -> Result<()> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScribeError::Transfer(format!("GET {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(
                ScribeError::Transfer(format!("HTTP {} for {}", response.status(), url)).into(),
            );
        }

        write_body_to_file(response, output_path).await
    }

    fn supports_url(&self, url: &str) -> bool {
        url.starts_with("http://") || url.starts_with("https://")
    }

    fn source_name(&self) -> &'static str {
        "Direct URL"
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new()
    }
}

/// Stream a response body to disk with a progress bar
pub(crate) async fn write_body_to_file(response: reqwest::Response, path: &Path) -> Result<()> {
    let total_size = response.content_length().unwrap_or(0);

    let progress = ProgressBar::new(total_size);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress.set_message("Downloading...");

    let mut file = fs_err::File::create(path)?;
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ScribeError::Transfer(format!("stream error: {}", e)))?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        progress.set_position(downloaded);
    }

    progress.finish_with_message("Download complete");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_http_and_https_only() {
        let downloader = HttpDownloader::new();
        assert!(downloader.supports_url("https://example.com/audio.mp3"));
        assert!(downloader.supports_url("http://example.com/audio.mp3"));
        assert!(!downloader.supports_url("file:///tmp/audio.mp3"));
        assert!(!downloader.supports_url("/tmp/audio.mp3"));
    }
}
