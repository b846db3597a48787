//! MCP (Model Context Protocol) types

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use crate::types::McpResult;

/// MCP protocol revision implemented by this server
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP Tool definition
#[derive(Serialize, Debug, Clone)]
pub struct McpTool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl McpTool {
    /// Create a new MCP tool definition
    pub fn new(name: String, description: String, input_schema: Value) -> Self {
        Self {
            name,
            description,
            input_schema,
        }
    }
}

/// Server information for MCP handshake
#[derive(Clone, Debug)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl ServerInfo {
    /// Create new server info
    pub fn new(name: String, version: String) -> Self {
        Self { name, version }
    }
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: "finance".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

/// Build the result payload for an `initialize` request
pub fn initialize_result(info: &ServerInfo) -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {},
            "logging": {}
        },
        "serverInfo": {
            "name": info.name,
            "version": info.version
        }
    })
}

/// Trait for MCP tools
///
/// All tools must implement this trait to be registered with the MCP server.
/// Execution is async because most tools call out to a market data provider.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool definition for tools/list
    fn definition(&self) -> McpTool;

    /// Execute the tool with the given parameters
    async fn execute(&self, params: Value) -> McpResult<Value>;

    /// Get the tool name (convenience method)
    fn name(&self) -> String {
        self.definition().name
    }
}
