//! MCP Server implementation
//!
//! This module contains the stdio server that handles JSON-RPC
//! communication for clients that spawn the binary directly.

mod handlers;

use serde_json::{json, Value};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

use crate::protocol::{
    initialize_result, JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    ServerInfo,
};
use crate::tools::ToolRegistry;
use crate::types::McpResult;

pub use handlers::{extract_arguments, extract_tool_name};

/// MCP Server that handles JSON-RPC communication over stdio
pub struct McpServer {
    server_info: ServerInfo,
    tools: ToolRegistry,
    reader: BufReader<io::Stdin>,
    writer: BufWriter<io::Stdout>,
}

impl McpServer {
    /// Create a new stdio server with the given tools
    pub fn new(server_info: ServerInfo, tools: ToolRegistry) -> Self {
        Self {
            server_info,
            tools,
            reader: BufReader::new(io::stdin()),
            writer: BufWriter::new(io::stdout()),
        }
    }

    /// Get the number of registered tools
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Run the server until stdin closes
    pub async fn run(&mut self) -> McpResult<()> {
        let mut line = String::new();
        while self.reader.read_line(&mut line).await? > 0 {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                self.handle_request(trimmed).await?;
            }
            line.clear();
        }
        Ok(())
    }

    /// Handle a single JSON-RPC request line
    async fn handle_request(&mut self, request_str: &str) -> McpResult<()> {
        let request: JsonRpcRequest = match serde_json::from_str(request_str) {
            Ok(request) => request,
            Err(e) => {
                return self
                    .send_error(JsonRpcError::parse_error(Value::Null, e.to_string()))
                    .await;
            }
        };

        if !request.is_valid() {
            let id = request.id.unwrap_or(Value::Null);
            return self
                .send_error(JsonRpcError::invalid_request(
                    id,
                    "jsonrpc must be '2.0'".to_string(),
                ))
                .await;
        }

        // Client notifications (initialized, cancelled, ...) take no reply
        if request.is_notification() {
            return Ok(());
        }

        let id = request.id.clone().unwrap_or(Value::Null);
        match request.method.as_str() {
            "initialize" => {
                let result = initialize_result(&self.server_info);
                self.send_response(JsonRpcResponse::new(id, result)).await
            }
            "tools/list" => {
                let result = json!({ "tools": self.tools.definitions() });
                self.send_response(JsonRpcResponse::new(id, result)).await
            }
            "tools/call" => self.handle_tool_call(id, request.params).await,
            "ping" => self.send_response(JsonRpcResponse::new(id, json!({}))).await,
            other => {
                self.send_error(JsonRpcError::method_not_found(id, other.to_string()))
                    .await
            }
        }
    }

    /// Handle tools/call request
    async fn handle_tool_call(&mut self, id: Value, params: Option<Value>) -> McpResult<()> {
        let params = params.unwrap_or_else(|| json!({}));
        let Some(tool_name) = extract_tool_name(&params).map(str::to_string) else {
            return self
                .send_error(JsonRpcError::invalid_params(
                    id,
                    "missing tool name".to_string(),
                ))
                .await;
        };
        let Some(tool) = self.tools.get(&tool_name).cloned() else {
            return self
                .send_error(JsonRpcError::invalid_params(
                    id,
                    format!("unknown tool: {tool_name}"),
                ))
                .await;
        };

        let arguments = extract_arguments(&params);
        self.send_notification(JsonRpcNotification::log_message(
            "info",
            json!(format!("Calling tool: {tool_name}")),
        ))
        .await?;

        match tool.execute(arguments).await {
            Ok(result) => self.send_response(JsonRpcResponse::new(id, result)).await,
            Err(e) => {
                self.send_notification(JsonRpcNotification::log_message(
                    "error",
                    json!(format!("Tool {tool_name} failed: {e}")),
                ))
                .await?;
                self.send_error(JsonRpcError::internal_error(id, e.to_string()))
                    .await
            }
        }
    }

    /// Send a success response
    async fn send_response(&mut self, response: JsonRpcResponse) -> McpResult<()> {
        self.write_line(serde_json::to_string(&response)?).await
    }

    /// Send an error response
    async fn send_error(&mut self, error: JsonRpcError) -> McpResult<()> {
        self.write_line(serde_json::to_string(&error)?).await
    }

    /// Send a server-initiated notification
    async fn send_notification(&mut self, notification: JsonRpcNotification) -> McpResult<()> {
        self.write_line(serde_json::to_string(&notification)?).await
    }

    async fn write_line(&mut self, json: String) -> McpResult<()> {
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}
