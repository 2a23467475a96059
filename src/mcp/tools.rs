//! Tool and resource catalogue.

use super::protocol::{Resource, Tool};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const GENERATE_COMMIT_MESSAGE: &str = "generate_commit_message";
pub const CREATE_COMMIT: &str = "create_commit";

pub const STATUS_URI: &str = "git://status";
pub const DIFF_URI: &str = "git://diff";
pub const RECENT_COMMITS_URI: &str = "git://recent-commits";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateArgs {
    #[serde(default)]
    pub user_context: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCommitArgs {
    #[serde(default)]
    pub user_context: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Reported by `create_commit`, success or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCommitOutput {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub commit_hash: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

impl CreateCommitOutput {
    pub fn failed(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            commit_hash: String::new(),
            error: error.into(),
        }
    }
}

fn context_property() -> serde_json::Value {
    json!({
        "type": "string",
        "description": "Additional context about the changes"
    })
}

pub fn tool_definitions() -> Vec<Tool> {
    vec![
        Tool {
            name: GENERATE_COMMIT_MESSAGE.to_string(),
            description: "Use this tool whenever the user asks to generate a commit message. \
                Analyzes the staged and unstaged git changes and recent history, then writes a \
                concise message that explains why the changes were made, following the \
                repository's commit style."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": { "user_context": context_property() }
            }),
        },
        Tool {
            name: CREATE_COMMIT.to_string(),
            description: "Use this tool whenever the user asks to commit changes or save work \
                to git. Stages all changes and creates a commit with the provided message, or \
                with a generated one when no message is given. Optionally pass user_context to \
                guide generation."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "user_context": context_property(),
                    "message": {
                        "type": "string",
                        "description": "Custom commit message (if not provided, one will be generated)"
                    }
                }
            }),
        },
    ]
}

pub fn resource_definitions() -> Vec<Resource> {
    let text = |uri: &str, name: &str, description: &str| Resource {
        uri: uri.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        mime_type: "text/plain".to_string(),
    };
    vec![
        text(STATUS_URI, "Git Status", "Current git repository status"),
        text(
            DIFF_URI,
            "Git Diff",
            "Current git diff (staged and unstaged changes)",
        ),
        text(
            RECENT_COMMITS_URI,
            "Recent Commits",
            "Recent commit history (last 10 commits)",
        ),
    ]
}
