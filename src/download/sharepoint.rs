use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use url::Url;

use super::{http, is_sharepoint_url, FileDownloader};
use crate::config::SharePointConfig;
use crate::{Result, ScribeError};

const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Downloader for SharePoint share links
///
/// Resolves the human-readable site/library/file path into a concrete drive
/// item through the Microsoft Graph API, then streams the item's pre-signed
/// download URL without an Authorization header.
pub struct SharePointDownloader {
    graph: GraphClient,
}

impl SharePointDownloader {
    pub fn new(config: SharePointConfig) -> Self {
        Self {
            graph: GraphClient::new(config),
        }
    }
}

#[async_trait]
impl FileDownloader for SharePointDownloader {
    async fn download(&self, url: &str, output_path: &Path) -> Result<()> {
        let item = self.graph.resolve_item(url).await?;

        let download_url = item.download_url.ok_or_else(|| {
            ScribeError::NotFound(format!("Drive item {} has no download URL", item.name))
        })?;

        tracing::debug!("Fetching content for drive item: {}", item.name);

        // Pre-signed URL; Graph rejects requests that add a bearer token here
        let response = self
            .graph
            .client
            .get(&download_url)
            .send()
            .await
            .map_err(|e| ScribeError::Transfer(format!("content fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ScribeError::Transfer(format!(
                "HTTP {} while fetching content for {}",
                response.status(),
                item.name
            ))
            .into());
        }

        http::write_body_to_file(response, output_path).await
    }

    fn supports_url(&self, url: &str) -> bool {
        is_sharepoint_url(url)
    }

    fn source_name(&self) -> &'static str {
        "SharePoint"
    }
}

/// Minimal Microsoft Graph client for drive-item resolution
pub struct GraphClient {
    client: Client,
    config: SharePointConfig,
    login_base: String,
    graph_base: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SiteResponse {
    id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct Drive {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct DriveList {
    value: Vec<Drive>,
}

/// Drive item metadata as returned by Graph
#[derive(Debug, Clone, Deserialize)]
pub struct DriveItem {
    pub name: String,

    #[serde(rename = "@microsoft.graph.downloadUrl")]
    pub download_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DriveItemList {
    value: Vec<DriveItem>,
}

impl GraphClient {
    pub fn new(config: SharePointConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            login_base: "https://login.microsoftonline.com".to_string(),
            graph_base: "https://graph.microsoft.com/v1.0".to_string(),
        }
    }

    /// Override the identity and Graph endpoint bases
    pub fn with_endpoints(
        mut self,
        login_base: impl Into<String>,
        graph_base: impl Into<String>,
    ) -> Self {
        self.login_base = login_base.into();
        self.graph_base = graph_base.into();
        self
    }

    /// Resolve a share link to a drive item carrying a download URL
    pub async fn resolve_item(&self, url: &str) -> Result<DriveItem> {
        let link = ShareLink::parse(url)?;
        let token = self.acquire_token().await?;

        let site_id = self.lookup_site(&token, &link).await?;
        let drive = self.pick_drive(&token, &site_id, &link.library).await?;

        // Direct path lookup first, then the listing and search fallbacks
        if let Some(item) = self.item_by_path(&token, &drive.id, &link.file_path).await? {
            return Ok(item);
        }

        let file_name = link.file_name();
        tracing::debug!(
            "Direct path lookup missed, listing drive {} for {}",
            drive.name,
            file_name
        );

        let children = self.list_root_children(&token, &drive.id).await?;
        if let Some(item) = match_by_name(&children, file_name) {
            return Ok(item);
        }

        tracing::debug!("Listing missed, searching drive {} for {}", drive.name, file_name);

        let hits = self.search_drive(&token, &drive.id, file_name).await?;
        if let Some(item) = match_by_name(&hits, file_name) {
            return Ok(item);
        }

        Err(ScribeError::NotFound(format!(
            "File {} not found in drive {} (tried path lookup, listing and search)",
            file_name, drive.name
        ))
        .into())
    }

    /// OAuth2 client-credentials token exchange
    async fn acquire_token(&self) -> Result<String> {
        let token_url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.login_base, self.config.tenant_id
        );

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("scope", GRAPH_SCOPE),
        ];

        let response = self
            .client
            .post(&token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| ScribeError::Authentication(format!("token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ScribeError::Authentication(format!(
                "token exchange returned HTTP {}: {}",
                status, body
            ))
            .into());
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            ScribeError::Authentication(format!("token response missing access_token: {}", e))
        })?;

        Ok(token.access_token)
    }

    /// Resolve the site id for the share link's hostname and site name
    async fn lookup_site(&self, token: &str, link: &ShareLink) -> Result<SiteId> {
        let url = format!(
            "{}/sites/{}:/sites/{}",
            self.graph_base,
            link.hostname,
            urlencoding::encode(&link.site_name)
        );

        let site: SiteResponse = self
            .get_json(token, &url)
            .await
            .map_err(|_| ScribeError::NotFound(format!("Site {} not found", link.site_name)))?;

        Ok(SiteId(site.id))
    }

    /// Pick the drive backing the link's document library
    async fn pick_drive(&self, token: &str, site_id: &SiteId, library: &str) -> Result<Drive> {
        let url = format!("{}/sites/{}/drives", self.graph_base, site_id.0);

        let drives: DriveList = self
            .get_json(token, &url)
            .await
            .map_err(|_| ScribeError::NotFound("Could not list site drives".to_string()))?;

        pick_drive_by_library(&drives.value, library)
            .ok_or_else(|| ScribeError::NotFound(format!("No drive for library {}", library)).into())
    }

    /// Direct path lookup; a miss is a None, not an error
    async fn item_by_path(
        &self,
        token: &str,
        drive_id: &str,
        file_path: &str,
    ) -> Result<Option<DriveItem>> {
        let encoded_path = file_path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let url = format!("{}/drives/{}/root:/{}", self.graph_base, drive_id, encoded_path);

        match self.get_json::<DriveItem>(token, &url).await {
            Ok(item) => Ok(Some(item)),
            Err(_) => Ok(None),
        }
    }

    async fn list_root_children(&self, token: &str, drive_id: &str) -> Result<Vec<DriveItem>> {
        let url = format!("{}/drives/{}/root/children", self.graph_base, drive_id);

        let items: DriveItemList = self
            .get_json(token, &url)
            .await
            .map_err(|_| ScribeError::NotFound("Could not list drive contents".to_string()))?;

        Ok(items.value)
    }

    async fn search_drive(&self, token: &str, drive_id: &str, query: &str) -> Result<Vec<DriveItem>> {
        let url = format!(
            "{}/drives/{}/root/search(q='{}')",
            self.graph_base,
            drive_id,
            urlencoding::encode(query)
        );

        let items: DriveItemList = self
            .get_json(token, &url)
            .await
            .map_err(|_| ScribeError::NotFound("Drive search failed".to_string()))?;

        Ok(items.value)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, token: &str, url: &str) -> Result<T> {
        let response = self.client.get(url).bearer_auth(token).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Graph returned HTTP {} for {}", response.status(), url);
        }

        Ok(response.json::<T>().await?)
    }
}

struct SiteId(String);

/// Parsed form of a SharePoint share link
#[derive(Debug, PartialEq)]
pub struct ShareLink {
    /// e.g. `contoso.sharepoint.com`
    pub hostname: String,

    /// Site name from the `/sites/{name}` segment
    pub site_name: String,

    /// Document library segment, e.g. `Shared Documents`
    pub library: String,

    /// Drive-relative file path, decoded
    pub file_path: String,
}

impl ShareLink {
    /// Parse `https://{host}/sites/{site}/{library}/{path...}` into its parts
    pub fn parse(url: &str) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|_| ScribeError::NotFound(format!("Unparseable share link: {}", url)))?;

        let hostname = parsed
            .host_str()
            .ok_or_else(|| ScribeError::NotFound(format!("Share link has no host: {}", url)))?
            .to_string();

        let segments: Vec<String> = parsed
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .map(|s| {
                        urlencoding::decode(s)
                            .map(|decoded| decoded.into_owned())
                            .unwrap_or_else(|_| s.to_string())
                    })
                    .collect()
            })
            .unwrap_or_default();

        // Expect /sites/{site}/{library}/{file...}
        if segments.len() < 4 || segments[0] != "sites" {
            return Err(ScribeError::NotFound(format!(
                "Share link is not a /sites/ document path: {}",
                url
            ))
            .into());
        }

        Ok(Self {
            hostname,
            site_name: segments[1].clone(),
            library: segments[2].clone(),
            file_path: segments[3..].join("/"),
        })
    }

    /// Final path component, the bare file name
    pub fn file_name(&self) -> &str {
        self.file_path.rsplit('/').next().unwrap_or(&self.file_path)
    }
}

/// Match a drive item by name, exact first and case-insensitive second
fn match_by_name(items: &[DriveItem], file_name: &str) -> Option<DriveItem> {
    if let Some(item) = items.iter().find(|item| item.name == file_name) {
        return Some(item.clone());
    }

    let lowered = file_name.to_lowercase();
    items
        .iter()
        .find(|item| item.name.to_lowercase() == lowered)
        .cloned()
}

/// Map a library URL segment to a site drive
///
/// The default library shows up as `Shared Documents` in share links but its
/// drive is named `Documents`.
fn pick_drive_by_library(drives: &[Drive], library: &str) -> Option<Drive> {
    if let Some(drive) = drives.iter().find(|drive| drive.name == library) {
        return Some(drive.clone());
    }

    if library == "Shared Documents" {
        if let Some(drive) = drives.iter().find(|drive| drive.name == "Documents") {
            return Some(drive.clone());
        }
    }

    let lowered = library.to_lowercase();
    drives
        .iter()
        .find(|drive| drive.name.to_lowercase() == lowered)
        .cloned()
        .or_else(|| drives.first().cloned())
}
