//! Message generation: collect, budget, ask the model.

use crate::auth::CredentialProvider;
use crate::budget::{PromptBudget, build_diff_section, build_prompt};
use crate::collector::{RepositorySnapshot, collect};
use crate::errors::{ClientError, CollectError};
use crate::git::RepoInspector;
use crate::llm::LlmClient;
use anyhow::{Context, Result};
use std::time::Instant;

/// A snapshot and the prompt assembled from it.
#[derive(Debug, Clone)]
pub struct PreparedPrompt {
    pub snapshot: RepositorySnapshot,
    pub prompt: String,
}

/// Collect the repository and assemble the prompt.
///
/// Returns `Ok(None)` when the combined diff is empty or whitespace-only.
pub async fn prepare_prompt(
    inspector: &dyn RepoInspector,
    budget: &PromptBudget,
    hint: Option<&str>,
) -> Result<Option<PreparedPrompt>, CollectError> {
    let started = Instant::now();
    let snapshot = collect(inspector, budget.history_limit).await?;
    tracing::debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        files = snapshot.changes.len(),
        diff_bytes = snapshot.diff.len(),
        "collected repository state"
    );

    if !snapshot.has_changes() {
        return Ok(None);
    }

    let diff = build_diff_section(&snapshot, budget, inspector).await?;
    let prompt = build_prompt(&snapshot, &diff, hint);
    Ok(Some(PreparedPrompt { snapshot, prompt }))
}

/// Produce a commit message for the current changes, or `None` if there
/// is nothing to commit.
pub async fn generate_message(
    inspector: &dyn RepoInspector,
    client: &dyn LlmClient,
    credentials: &dyn CredentialProvider,
    budget: &PromptBudget,
    hint: Option<&str>,
) -> Result<Option<String>> {
    let Some(prepared) = prepare_prompt(inspector, budget, hint)
        .await
        .context("Failed to read repository state")?
    else {
        tracing::info!("no changes to commit");
        return Ok(None);
    };

    complete(client, credentials, &prepared.prompt)
        .await
        .map(Some)
}

/// Send an assembled prompt and return the trimmed reply.
pub async fn complete(
    client: &dyn LlmClient,
    credentials: &dyn CredentialProvider,
    prompt: &str,
) -> Result<String> {
    let token = credentials.current_token().await?;

    let started = Instant::now();
    let reply = client
        .ask(&token, prompt)
        .await
        .context("Failed to generate commit message")?;
    tracing::debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "model call finished"
    );

    let message = reply.trim();
    if message.is_empty() {
        return Err(ClientError::EmptyResponse.into());
    }
    Ok(message.to_string())
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::auth::CredentialProvider;
    use crate::errors::{AuthError, ClientError};
    use crate::llm::LlmClient;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records prompts and answers with a canned reply.
    #[derive(Default)]
    pub struct FakeLlm {
        pub reply: String,
        pub prompts: Mutex<Vec<String>>,
        pub tokens: Mutex<Vec<String>>,
    }

    impl FakeLlm {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LlmClient for FakeLlm {
        async fn ask(&self, token: &str, prompt: &str) -> Result<String, ClientError> {
            self.tokens.lock().unwrap().push(token.to_string());
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    /// Fixed token, or `NotAuthenticated` when `None`.
    pub struct FakeCredentials(pub Option<&'static str>);

    #[async_trait]
    impl CredentialProvider for FakeCredentials {
        async fn current_token(&self) -> Result<String, AuthError> {
            self.0
                .map(str::to_string)
                .ok_or(AuthError::NotAuthenticated)
        }
    }
}
