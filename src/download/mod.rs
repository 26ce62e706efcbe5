use async_trait::async_trait;
use std::path::Path;
use url::Url;

pub mod http;
pub mod sharepoint;

use crate::config::Config;
use crate::Result;

/// Trait for fetching remote media from different sources
#[async_trait]
pub trait FileDownloader: Send + Sync {
    /// Download the file behind `url` to `output_path`
    async fn download(&self, url: &str, output_path: &Path) -> Result<()>;

    /// Check if this downloader handles the given URL
    fn supports_url(&self, url: &str) -> bool;

    /// Get the name of this source
    fn source_name(&self) -> &'static str;
}

/// Registry dispatching URLs to the right downloader
pub struct DownloaderRegistry {
    downloaders: Vec<Box<dyn FileDownloader>>,
}

impl DownloaderRegistry {
    /// Create a registry from the active configuration
    ///
    /// The SharePoint downloader is registered first so share links are
    /// resolved through Graph; the plain HTTP downloader is the catch-all.
    pub fn new(config: &Config) -> Self {
        let mut registry = Self {
            downloaders: Vec::new(),
        };

        if let Some(sharepoint) = &config.sharepoint {
            registry.register(Box::new(sharepoint::SharePointDownloader::new(
                sharepoint.clone(),
            )));
        }
        registry.register(Box::new(http::HttpDownloader::new()));

        registry
    }

    /// Register a new downloader
    pub fn register(&mut self, downloader: Box<dyn FileDownloader>) {
        self.downloaders.push(downloader);
    }

    /// Find a downloader that supports the given URL
    pub fn find_downloader(&self, url: &str) -> Option<&dyn FileDownloader> {
        self.downloaders
            .iter()
            .find(|downloader| downloader.supports_url(url))
            .map(|boxed| boxed.as_ref())
    }

    /// Download using the appropriate downloader
    pub async fn download(&self, url: &str, output_path: &Path) -> Result<()> {
        validate_url(url)?;

        let downloader = self
            .find_downloader(url)
            .ok_or_else(|| anyhow::anyhow!("No downloader found for URL: {}", url))?;

        tracing::info!("Downloading via {}: {}", downloader.source_name(), url);
        downloader.download(url, output_path).await
    }

    /// List all registered sources
    pub fn list_sources(&self) -> Vec<&'static str> {
        self.downloaders
            .iter()
            .map(|downloader| downloader.source_name())
            .collect()
    }
}

/// Check whether a URL points at a SharePoint-hosted document
pub fn is_sharepoint_url(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|host| host.to_lowercase()))
        .map(|host| host.ends_with(".sharepoint.com") || host.ends_with(".sharepoint.cn"))
        .unwrap_or(false)
}

/// Validate and normalize URLs
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed)
}
