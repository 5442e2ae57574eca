//! MCP stdio server implementation
//!
//! Reads one JSON-RPC request per line and writes one response per line.
//! Logs must go to stderr; stdout carries protocol traffic only.
//!
//! # Security
//!
//! When `FEEDMARK_MCP_TOKEN` is set, every request must carry a matching
//! `auth_token` in its params object. Unset or empty disables the check.

use crate::error::{Error, McpError, Result};
use crate::mcp::tools::ToolRegistry;
use crate::mcp::types::{
    JsonRpcRequest, JsonRpcResponse, McpCapabilities, McpServerInfo, ToolCallParams,
    PROTOCOL_VERSION,
};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

/// Environment variable name for the MCP authentication token
pub const MCP_TOKEN_ENV_VAR: &str = "FEEDMARK_MCP_TOKEN";

/// MCP server state
pub struct McpServer {
    tools: ToolRegistry,
    info: McpServerInfo,
    initialized: RwLock<bool>,
    auth_token: Option<String>,
}

impl McpServer {
    /// Create a server over `tools`, reading the token from the environment
    pub fn new(tools: ToolRegistry) -> Self {
        let token = std::env::var(MCP_TOKEN_ENV_VAR).unwrap_or_default();
        let server = Self::with_auth_token(tools, token);

        if server.is_auth_enabled() {
            info!("MCP server authentication enabled via {}", MCP_TOKEN_ENV_VAR);
        } else {
            warn!(
                "MCP server running without authentication. Set {} to enable.",
                MCP_TOKEN_ENV_VAR
            );
        }
        server
    }

    /// Create a server with an explicit token; empty disables auth
    pub fn with_auth_token(tools: ToolRegistry, token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            tools,
            info: McpServerInfo::default(),
            initialized: RwLock::new(false),
            auth_token: (!token.is_empty()).then_some(token),
        }
    }

    /// Check if authentication is enabled
    pub fn is_auth_enabled(&self) -> bool {
        self.auth_token.is_some()
    }

    /// The tool registry this server dispatches to
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Whether `initialize` has been received
    pub async fn is_initialized(&self) -> bool {
        *self.initialized.read().await
    }

    fn validate_auth(&self, request: &JsonRpcRequest) -> std::result::Result<(), JsonRpcResponse> {
        let Some(expected) = &self.auth_token else {
            return Ok(());
        };

        let provided = request
            .params
            .as_ref()
            .and_then(|p| p.get("auth_token"))
            .and_then(|v| v.as_str());

        match provided {
            Some(token) if constant_time_compare(token, expected) => Ok(()),
            Some(_) => {
                warn!(method = %request.method, "Authentication failed: invalid token");
                Err(JsonRpcResponse::unauthorized(request.id.clone()))
            }
            None => {
                warn!(method = %request.method, "Authentication failed: missing auth_token");
                Err(JsonRpcResponse::unauthorized(request.id.clone()))
            }
        }
    }

    /// Serve stdin/stdout until stdin closes
    pub async fn run(&self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve requests from `reader`, writing responses to `writer`
    #[instrument(skip_all)]
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Starting MCP server: {} v{}", self.info.name, self.info.version);

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            debug!("Received: {}", line);

            let Some(response) = self.handle_line(&line).await else {
                continue;
            };

            let json = serde_json::to_string(&response).unwrap_or_else(|e| {
                error!("Failed to serialize response: {}", e);
                r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error"}}"#
                    .to_string()
            });
            debug!("Sending: {}", json);

            writer.write_all(json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        info!("MCP server shutting down");
        if let Err(e) = self.tools.shutdown().await {
            warn!("Browser shutdown failed: {}", e);
        }
        Ok(())
    }

    /// Handle one line of input
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                Some(JsonRpcResponse::parse_error())
            }
        }
    }

    /// Handle a JSON-RPC request; notifications get no response
    #[instrument(skip(self, request), fields(method = %request.method))]
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if let Err(denied) = self.validate_auth(&request) {
            return (!request.is_notification()).then_some(denied);
        }

        if request.is_notification() {
            debug!("Notification: {}", request.method);
            return None;
        }

        let id = request.id.clone();
        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params).await,
            "shutdown" => {
                *self.initialized.write().await = false;
                Ok(Value::Null)
            }
            "tools/list" => Ok(json!({ "tools": self.tools.definitions() })),
            "tools/call" => self.handle_tools_call(request.params).await,
            "ping" => Ok(json!({})),
            method => {
                warn!("Unknown method: {}", method);
                return Some(JsonRpcResponse::method_not_found(id, method));
            }
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(Error::Mcp(McpError::InvalidParams(msg))) => JsonRpcResponse::invalid_params(id, &msg),
            Err(e) => JsonRpcResponse::error(id, -32603, format!("Internal error: {}", e)),
        })
    }

    async fn handle_initialize(&self, params: Option<Value>) -> Result<Value> {
        if let Some(version) = params
            .as_ref()
            .and_then(|p| p.get("protocolVersion"))
            .and_then(|v| v.as_str())
        {
            debug!("Client protocol version: {}", version);
        }

        *self.initialized.write().await = true;

        Ok(json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": McpCapabilities::default(),
            "serverInfo": self.info
        }))
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> Result<Value> {
        let params = params.ok_or_else(|| McpError::InvalidParams("missing params".to_string()))?;
        let call: ToolCallParams = serde_json::from_value(params)
            .map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let result = self.tools.execute(&call.name, call.arguments).await;
        Ok(serde_json::to_value(result)?)
    }
}

/// Compare two strings without exiting at the first differing byte
fn constant_time_compare(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
