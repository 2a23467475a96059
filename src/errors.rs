//! Typed error hierarchy for gic.
//!
//! One enum per collaborator:
//! - `GitError`: a single `git` invocation failed
//! - `CollectError`: a repository read failed, tagged with the sub-operation
//! - `ClientError`: the language-model request failed
//! - `AuthError`: token storage, login or refresh failed

use thiserror::Error;

/// Errors from invoking the `git` binary.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Failed to spawn git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("git {args} failed: {stderr}")]
    CommandFailed { args: String, stderr: String },
}

impl GitError {
    /// True when git refused because the current branch has no commits yet.
    pub fn is_unborn_branch(&self) -> bool {
        matches!(
            self,
            GitError::CommandFailed { stderr, .. } if stderr.contains("does not have any commits yet")
        )
    }
}

/// Errors from a collection pass. Each variant names the read that failed.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("git status failed: {0}")]
    Status(#[source] GitError),

    #[error("git diff stat failed: {0}")]
    DiffStat(#[source] GitError),

    #[error("git diff failed: {0}")]
    Diff(#[source] GitError),

    #[error("git log failed: {0}")]
    History(#[source] GitError),

    #[error("git diff for selected files failed: {0}")]
    SelectedDiff(#[source] GitError),
}

/// Errors from the language-model client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API call failed: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Model returned an empty response")]
    EmptyResponse,
}

/// Errors from the credential provider.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token file error at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid token file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid code format, expected: code#state")]
    InvalidCodeFormat,

    #[error("token exchange failed: {status} - {body}")]
    ExchangeFailed { status: u16, body: String },

    #[error("token refresh failed: {status}")]
    RefreshFailed { status: u16 },

    #[error("OAuth request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to generate PKCE verifier: {0}")]
    Random(String),

    #[error("authentication required: please run 'gic auth login' first")]
    NotAuthenticated,
}
