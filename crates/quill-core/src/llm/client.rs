//! OpenAI-compatible chat completions client.
//!
//! Defaults target Groq's hosted endpoint.
//!
//! # Usage
//!
//! ```rust,no_run
//! use quill_core::llm::{ChatCompletionsClient, ClientConfig, CompletionRequest, TextGenerator};
//!
//! #[tokio::main]
//! async fn main() -> quill_core::Result<()> {
//!     let client = ChatCompletionsClient::new(ClientConfig::from_env())?;
//!     let text = client.complete(CompletionRequest::new("Say hi", 0.7)).await?;
//!     println!("{}", text);
//!     Ok(())
//! }
//! ```

use super::{CompletionRequest, TextGenerator};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

const PROVIDER: &str = "chat-completions";

/// Connection settings for [`ChatCompletionsClient`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

impl ClientConfig {
    /// Defaults with the API key taken from `GROQ_API_KEY`
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty()),
            ..Self::default()
        }
    }
}

/// Client for `/chat/completions` endpoints
#[derive(Clone)]
pub struct ChatCompletionsClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl ChatCompletionsClient {
    /// Create a client. Fails without an API key.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(Error::provider(PROVIDER, "API key not configured"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let mut req = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("Request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(Error::provider(
                PROVIDER,
                format!("API error {}: {}", status, error_text),
            ));
        }

        let data: ChatResponse = resp
            .json()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("Failed to parse response: {}", e)))?;

        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        debug!(model = %self.config.model, chars = content.len(), "Completion received");
        Ok(content)
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_provider_error() {
        let err = ChatCompletionsClient::new(ClientConfig::default())
            .err()
            .expect("client without key must fail");
        assert!(err.is_provider_unavailable());
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = ChatCompletionsClient::new(ClientConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            api_key: Some("test".to_string()),
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(client.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_request_serialization_omits_missing_max_tokens() {
        let body = ChatRequest {
            model: "m",
            messages: vec![],
            temperature: 0.3,
            max_tokens: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_response_parsing() {
        let data: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"{\"topic\":\"x\"}"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            data.choices[0].message.content.as_deref(),
            Some("{\"topic\":\"x\"}")
        );
    }
}
