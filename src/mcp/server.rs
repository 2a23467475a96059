//! Request dispatch and the stdio loop.

use super::protocol::*;
use super::tools::{
    CREATE_COMMIT, CreateCommitArgs, CreateCommitOutput, DIFF_URI, GENERATE_COMMIT_MESSAGE,
    GenerateArgs, RECENT_COMMITS_URI, STATUS_URI, resource_definitions, tool_definitions,
};
use crate::auth::CredentialProvider;
use crate::budget::PromptBudget;
use crate::git::RepoInspector;
use crate::llm::LlmClient;
use crate::workflow::generate_message;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

pub const SERVER_NAME: &str = "gic";

/// MCP server over newline-delimited JSON-RPC.
pub struct McpServer {
    inspector: Arc<dyn RepoInspector>,
    client: Arc<dyn LlmClient>,
    credentials: Arc<dyn CredentialProvider>,
    budget: PromptBudget,
}

fn parse_params<T: DeserializeOwned + Default>(params: Option<Value>) -> Result<T, JsonRpcError> {
    match params {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value)
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e))),
    }
}

fn required_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, JsonRpcError> {
    let value = params.ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?;
    serde_json::from_value(value)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
}

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}

impl McpServer {
    pub fn new(
        inspector: Arc<dyn RepoInspector>,
        client: Arc<dyn LlmClient>,
        credentials: Arc<dyn CredentialProvider>,
        budget: PromptBudget,
    ) -> Self {
        Self {
            inspector,
            client,
            credentials,
            budget,
        }
    }

    /// Serve requests from stdin until it closes.
    pub async fn run_stdio(&self) -> Result<()> {
        info!("starting gic MCP server on stdio");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// One JSON message per line in, one per line out.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await.context("Failed to read request")? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(line).await {
                let mut payload =
                    serde_json::to_vec(&response).context("Failed to encode response")?;
                payload.push(b'\n');
                writer
                    .write_all(&payload)
                    .await
                    .context("Failed to write response")?;
                writer.flush().await.context("Failed to write response")?;
            }
        }
        info!("stdin closed, MCP server stopping");
        Ok(())
    }

    /// Decode one line and handle it. Malformed JSON yields a parse error.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "invalid JSON-RPC message");
                return Some(JsonRpcResponse::error(
                    JsonRpcId::Null,
                    JsonRpcError::parse_error(format!("Parse error: {}", e)),
                ));
            }
        };

        let id = value
            .get("id")
            .and_then(|id| serde_json::from_value::<JsonRpcId>(id.clone()).ok());
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => Some(JsonRpcResponse::error(
                id.unwrap_or(JsonRpcId::Null),
                JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
            )),
        }
    }

    /// Handle a decoded request. Notifications get no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "notification");
            return None;
        };

        debug!(method = %request.method, "request");
        let response = match self.dispatch(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        };
        Some(response)
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value, JsonRpcError> {
        match method {
            "initialize" => Ok(self.initialize(params)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tool_definitions() })),
            "tools/call" => self.call_tool(required_params(params)?).await,
            "resources/list" => Ok(json!({ "resources": resource_definitions() })),
            "resources/read" => self.read_resource(required_params(params)?).await,
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }

    fn initialize(&self, params: Option<Value>) -> Value {
        let protocol_version = params
            .as_ref()
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or(MCP_PROTOCOL_VERSION)
            .to_string();

        json!(InitializeResult {
            protocol_version,
            capabilities: json!({
                "tools": { "listChanged": false },
                "resources": { "subscribe": false, "listChanged": false }
            }),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        })
    }

    async fn call_tool(&self, params: CallToolParams) -> Result<Value, JsonRpcError> {
        let arguments = Some(params.arguments);
        let result = match params.name.as_str() {
            GENERATE_COMMIT_MESSAGE => self.generate_tool(parse_params(arguments)?).await,
            CREATE_COMMIT => self.create_commit_tool(parse_params(arguments)?).await?,
            other => {
                return Err(JsonRpcError::invalid_params(format!(
                    "Unknown tool: {}",
                    other
                )));
            }
        };
        to_value(result)
    }

    async fn generate(&self, hint: Option<&str>) -> Result<Option<String>> {
        generate_message(
            &*self.inspector,
            &*self.client,
            &*self.credentials,
            &self.budget,
            hint,
        )
        .await
    }

    async fn generate_tool(&self, args: GenerateArgs) -> CallToolResult {
        match self.generate(args.user_context.as_deref()).await {
            Ok(Some(message)) => CallToolResult::text(message.clone())
                .with_structured(json!({ "commit_message": message })),
            Ok(None) => CallToolResult::error("no changes to commit"),
            Err(e) => CallToolResult::error(format!("{:#}", e)),
        }
    }

    async fn create_commit_tool(
        &self,
        args: CreateCommitArgs,
    ) -> Result<CallToolResult, JsonRpcError> {
        let output = self.create_commit(args).await;
        let value = to_value(&output)?;
        let text = value.to_string();
        let result = if output.success {
            CallToolResult::text(text)
        } else {
            CallToolResult::error(text)
        };
        Ok(result.with_structured(value))
    }

    async fn create_commit(&self, args: CreateCommitArgs) -> CreateCommitOutput {
        if let Err(e) = self.inspector.stage_all().await {
            return CreateCommitOutput::failed("", format!("failed to stage changes: {}", e));
        }

        let message = match args.message.filter(|m| !m.trim().is_empty()) {
            Some(message) => message,
            None => match self.generate(args.user_context.as_deref()).await {
                Ok(Some(message)) => message,
                Ok(None) => return CreateCommitOutput::failed("", "no changes to commit"),
                Err(e) => {
                    return CreateCommitOutput::failed(
                        "",
                        format!("failed to generate commit message: {:#}", e),
                    );
                }
            },
        };

        if let Err(e) = self.inspector.commit(&message).await {
            return CreateCommitOutput::failed(message, format!("failed to create commit: {}", e));
        }

        let commit_hash = match self.inspector.head_short_sha().await {
            Ok(hash) => hash.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "commit created but HEAD could not be resolved");
                String::new()
            }
        };
        info!(commit = %commit_hash, "commit created");

        CreateCommitOutput {
            success: true,
            message,
            commit_hash,
            error: String::new(),
        }
    }

    async fn read_resource(&self, params: ReadResourceParams) -> Result<Value, JsonRpcError> {
        let text = match params.uri.as_str() {
            STATUS_URI => self.inspector.status().await,
            DIFF_URI => self.inspector.diff().await,
            RECENT_COMMITS_URI => match self.inspector.history(self.budget.history_limit).await {
                Err(e) if e.is_unborn_branch() => Ok(String::new()),
                other => other,
            },
            other => {
                return Err(JsonRpcError::invalid_params(format!(
                    "Unknown resource: {}",
                    other
                )));
            }
        }
        .map_err(|e| JsonRpcError::internal_error(format!("failed to read {}: {}", params.uri, e)))?;

        Ok(json!({
            "contents": [ResourceContent {
                uri: params.uri,
                mime_type: "text/plain".to_string(),
                text,
            }]
        }))
    }
}
