//! Language-model client.

mod anthropic;

pub use anthropic::{AnthropicClient, DEFAULT_API_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};

use crate::errors::ClientError;
use async_trait::async_trait;

/// Sends one prompt and returns the generated text.
///
/// Retries and backoff are the implementation's concern; callers treat any
/// error as final.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn ask(&self, token: &str, prompt: &str) -> Result<String, ClientError>;
}
