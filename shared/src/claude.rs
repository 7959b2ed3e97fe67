//! Claude API client.

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{Error, Result};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// A single chat message sent to the model.
#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [ChatMessage],
}

/// Response content arrives either as a plain string or as an array of
/// text chunks; both are flattened to one string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Chunks(Vec<ContentChunk>),
}

#[derive(Debug, Deserialize)]
struct ContentChunk {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default = "empty_content")]
    content: MessageContent,
}

fn empty_content() -> MessageContent {
    MessageContent::Text(String::new())
}

impl MessageContent {
    fn into_text(self) -> String {
        match self {
            MessageContent::Text(text) => text,
            MessageContent::Chunks(chunks) => {
                chunks.into_iter().map(|chunk| chunk.text).collect()
            }
        }
    }
}

/// Client for the Claude messages endpoint.
pub struct ClaudeClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeClient {
    /// Create a new client.
    pub fn new(endpoint: String, api_key: String, model: String, max_tokens: u32) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            endpoint,
            api_key,
            model,
            max_tokens,
        }
    }

    /// Send a system/user prompt pair and return the model's text output.
    pub async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let messages = [
            ChatMessage {
                role: "system",
                content: system_prompt.to_string(),
            },
            ChatMessage {
                role: "user",
                content: user_prompt.to_string(),
            },
        ];

        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: &messages,
        };

        let response = self
            .http_client
            .post(format!("{}/v1/messages", self.endpoint))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Claude API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Claude API returned {}: {}", status, body);
            return Err(Error::Upstream(format!(
                "Claude API request failed with status {}",
                status
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("Failed to parse Claude response: {}", e)))?;

        Ok(parsed.content.into_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_as_plain_string() {
        let raw = r#"{"content":"hello"}"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.content.into_text(), "hello");
    }

    #[test]
    fn test_content_as_chunk_array() {
        let raw = r#"{"content":[{"type":"text","text":"hel"},{"type":"text","text":"lo"}]}"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.content.into_text(), "hello");
    }

    #[test]
    fn test_missing_content_is_empty() {
        let raw = r#"{"id":"msg_123"}"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.content.into_text(), "");
    }
}
