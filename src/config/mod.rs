use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SharePoint / Microsoft Graph credentials, if configured
    pub sharepoint: Option<SharePointConfig>,

    /// Anthropic API key; summarization is skipped when absent
    pub anthropic_api_key: Option<String>,

    /// Whisper runtime settings
    pub whisper: WhisperConfig,

    /// Directory downloaded media is written to
    pub downloads_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePointConfig {
    /// Azure AD application (client) id
    pub client_id: String,

    /// Azure AD client secret
    pub client_secret: String,

    /// Azure AD tenant id
    pub tenant_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperConfig {
    /// Model size passed to the whisper runtime
    pub model: String,

    /// Name or path of the whisper executable
    pub binary: String,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model: "tiny".to_string(),
            binary: "whisper".to_string(),
        }
    }
}

impl Config {
    /// Build configuration from environment variables
    ///
    /// SharePoint credentials are optional as a group: if none of the three
    /// variables are set, SharePoint links simply cannot be resolved. Setting
    /// only some of them is treated as a configuration mistake.
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("SHAREPOINT_CLIENT_ID").ok();
        let client_secret = std::env::var("SHAREPOINT_CLIENT_SECRET").ok();
        let tenant_id = std::env::var("SHAREPOINT_TENANT_ID").ok();

        let sharepoint = match (client_id, client_secret, tenant_id) {
            (Some(client_id), Some(client_secret), Some(tenant_id)) => Some(SharePointConfig {
                client_id,
                client_secret,
                tenant_id,
            }),
            (None, None, None) => None,
            _ => anyhow::bail!(
                "Incomplete SharePoint configuration: set all of SHAREPOINT_CLIENT_ID, \
                 SHAREPOINT_CLIENT_SECRET and SHAREPOINT_TENANT_ID, or none of them"
            ),
        };

        let anthropic_api_key = std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        let whisper = WhisperConfig {
            model: std::env::var("WHISPER_MODEL").unwrap_or_else(|_| "tiny".to_string()),
            ..WhisperConfig::default()
        };

        Ok(Self {
            sharepoint,
            anthropic_api_key,
            whisper,
            downloads_dir: PathBuf::from("downloads"),
        })
    }

    /// Whether summarization can run
    pub fn summarization_enabled(&self) -> bool {
        self.anthropic_api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarization_enabled_requires_key() {
        let mut config = Config {
            sharepoint: None,
            anthropic_api_key: None,
            whisper: WhisperConfig::default(),
            downloads_dir: PathBuf::from("downloads"),
        };
        assert!(!config.summarization_enabled());

        config.anthropic_api_key = Some("sk-test".to_string());
        assert!(config.summarization_enabled());
    }

    #[test]
    fn test_whisper_defaults() {
        let whisper = WhisperConfig::default();
        assert_eq!(whisper.model, "tiny");
        assert_eq!(whisper.binary, "whisper");
    }
}
