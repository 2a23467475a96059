//! MCP server (`gic mcp`).

use anyhow::Result;
use gic::auth::TokenStore;
use gic::config::GicConfig;
use gic::errors::AuthError;
use gic::git::GitCli;
use gic::llm::AnthropicClient;
use gic::mcp::McpServer;
use std::path::PathBuf;
use std::sync::Arc;

use crate::Cli;

pub async fn cmd_mcp(cli: &Cli, project_dir: PathBuf) -> Result<()> {
    let config = GicConfig::with_cli_args(project_dir, cli.config.clone(), true, cli.max_chars)?;

    let store = TokenStore::new(config.token_path()?);
    let token = store.load()?.ok_or(AuthError::NotAuthenticated)?;
    store.ensure_valid(token).await?;

    let server = McpServer::new(
        Arc::new(GitCli::new(&config.project_dir)),
        Arc::new(AnthropicClient::new(
            config.api_url(),
            config.model_name(),
            config.max_tokens(),
        )),
        Arc::new(store),
        config.budget(),
    );
    server.run_stdio().await
}
