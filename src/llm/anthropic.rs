use super::LlmClient;
use crate::errors::ClientError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const OAUTH_BETA: &str = "oauth-2025-04-20";
const SYSTEM_PROMPT: &str = "You are Claude Code, Anthropic's official CLI for Claude.";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: Vec<TextBlock<'a>>,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct TextBlock<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<TextBlock<'a>>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Messages API client authenticated with an OAuth bearer token.
pub struct AnthropicClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: vec![TextBlock {
                kind: "text",
                text: SYSTEM_PROMPT,
            }],
            messages: vec![Message {
                role: "user",
                content: vec![TextBlock {
                    kind: "text",
                    text: prompt,
                }],
            }],
        }
    }
}

impl Default for AnthropicClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, DEFAULT_MODEL, DEFAULT_MAX_TOKENS)
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn ask(&self, token: &str, prompt: &str) -> Result<String, ClientError> {
        let url = format!("{}/v1/messages", self.base_url);
        tracing::debug!(model = %self.model, prompt_bytes = prompt.len(), "sending prompt");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(token)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("anthropic-beta", OAUTH_BETA)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = resp.json().await?;
        let text: String = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        tracing::debug!(reply_bytes = text.len(), "model replied");
        Ok(text)
    }
}
