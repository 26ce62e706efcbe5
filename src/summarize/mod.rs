use reqwest::Client;
use serde::Deserialize;

use crate::{Result, ScribeError};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const SUMMARY_MODEL: &str = "claude-3-opus-20240229";
const MAX_TOKENS: u32 = 1000;

const INSTRUCTION: &str =
    "Summarize the following text concisely and clearly, keeping the most important points:";

/// Summarizer backed by the Anthropic Messages API
pub struct TextSummarizer {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

impl TextSummarizer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.anthropic.com/v1".to_string(),
        }
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Produce a condensed version of the given text
    ///
    /// Returns a [`ScribeError::Summarization`] on any failure; the caller
    /// decides whether that is fatal.
    pub async fn summarize(&self, text: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": SUMMARY_MODEL,
            "max_tokens": MAX_TOKENS,
            "messages": [
                {
                    "role": "user",
                    "content": build_prompt(text)
                }
            ]
        });

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScribeError::Summarization(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(ScribeError::Summarization(format!(
                "API returned HTTP {}: {}",
                status, message
            ))
            .into());
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ScribeError::Summarization(format!("unparseable response: {}", e)))?;

        parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                ScribeError::Summarization("response contained no text content".to_string()).into()
            })
    }
}

fn build_prompt(text: &str) -> String {
    format!("{}\n\n{}", INSTRUCTION, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestServer;
    use crate::ScribeError;

    #[tokio::test]
    async fn test_summarize_returns_api_text() {
        let server = TestServer::start().await;
        server.route(
            "/v1/messages",
            200,
            r#"{"id":"msg_123","content":[{"type":"text","text":"A short summary."}]}"#,
        );

        let summarizer =
            TextSummarizer::new("key-123").with_base_url(format!("{}/v1", server.base_url));
        let summary = summarizer.summarize("long transcript").await.expect("summary");

        assert_eq!(summary, "A short summary.");

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].has_header("x-api-key"));
        assert!(requests[0].has_header("anthropic-version"));
    }

    #[tokio::test]
    async fn test_api_failure_is_summarization_error() {
        let server = TestServer::start().await;
        server.route("/v1/messages", 500, r#"{"error":"overloaded"}"#);

        let summarizer =
            TextSummarizer::new("key-123").with_base_url(format!("{}/v1", server.base_url));
        let err = summarizer
            .summarize("long transcript")
            .await
            .expect_err("should fail");

        assert!(err
            .downcast_ref::<ScribeError>()
            .map(|e| matches!(e, ScribeError::Summarization(_)))
            .unwrap_or(false));
    }

    #[test]
    fn test_build_prompt_carries_instruction_and_text() {
        let prompt = build_prompt("the transcript body");
        assert!(prompt.starts_with(INSTRUCTION));
        assert!(prompt.ends_with("the transcript body"));
    }

    #[test]
    fn test_messages_response_parsing() {
        let json = r#"{
            "id": "msg_123",
            "content": [
                {"type": "text", "text": "A short summary."}
            ],
            "model": "claude-3-opus-20240229"
        }"#;

        let parsed: MessagesResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(
            parsed.content[0].text.as_deref(),
            Some("A short summary.")
        );
    }
}
